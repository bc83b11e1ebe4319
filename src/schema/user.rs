use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::services::storage::Entity;

/// User record. Plain data, no logic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub username: String,
}

impl User {
    /// Build a user awaiting id assignment by the store.
    pub fn new(username: String) -> Self {
        Self { id: 0, username }
    }
}

impl Entity for User {
    const KIND: &'static str = "user";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

/// Payload for creating a user. Shape checks only.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserPayload {
    #[garde(length(min = 1, max = 64))]
    pub username: String,
}
