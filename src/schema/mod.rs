pub mod item;
pub mod user;

pub use item::{Item, ItemPayload};
pub use user::{User, UserPayload};
