use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::services::storage::Entity;

/// Catalog item record. Plain data, no logic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

impl Item {
    /// Build an item awaiting id assignment by the store.
    pub fn new(name: String) -> Self {
        Self { id: 0, name }
    }
}

impl Entity for Item {
    const KIND: &'static str = "item";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

/// Payload for creating or replacing an item. Shape checks only.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ItemPayload {
    #[garde(length(min = 1, max = 120))]
    pub name: String,
}
