#[tokio::main]
async fn main() {
    if let Err(e) = catalog_api::run_server().await {
        eprintln!("Fatal: {e:#}");
        std::process::exit(1);
    }
}
