//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity. Reference data owned by restaurant administration;
/// the booking core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DiningTable {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub is_active: bool,
}
