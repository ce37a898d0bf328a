//! Booking Admission Service
//!
//! Sits in front of a relational store holding table, booking and customer
//! records. Receives booking requests (table, slot, customer, party size),
//! decides admit/reject, and commits an atomic state change on admit. The
//! no-double-booking invariant is enforced by a scoped transaction around
//! the check-then-write sequence, backstopped by a unique index on
//! `(table_id, slot)`.
//!
//! Module structure:
//!
//! ```text
//! booking-server/src/
//! ├── config.rs      # Environment configuration
//! ├── state.rs       # Shared application state
//! ├── error.rs       # Error taxonomy + HTTP translation
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # Pools, migrations, models, repositories
//! └── util.rs        # IDs, timestamps
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod util;

// Re-export public types
pub use config::Config;
pub use db::DbService;
pub use error::AppError;
pub use state::AppState;
