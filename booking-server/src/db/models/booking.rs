//! Booking Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A confirmed reservation of one table for one exact slot.
///
/// Rows exist only through admission; reschedule rewrites the slot in place
/// under the same conflict discipline, cancellation deletes the row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: i64,
    pub customer_id: i64,
    pub table_id: i64,
    /// UTC timestamp the table is reserved for. Two bookings conflict on
    /// exact slot equality, not on overlapping time ranges.
    pub slot: DateTime<Utc>,
    pub party_size: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: i64,
}

/// Admission request payload
#[derive(Debug, Clone, Deserialize)]
pub struct BookingCreate {
    pub customer_id: i64,
    pub table_id: i64,
    pub slot: DateTime<Utc>,
    pub party_size: i32,
    #[serde(default)]
    pub notes: Option<String>,
}
