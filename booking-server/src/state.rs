//! Application state for booking-server

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::db::DbService;
use crate::db::repository::BookingRepository;
use crate::error::AppError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pools
    pub db: DbService,
    /// Booking admission core
    pub bookings: BookingRepository,
    /// Cancelled on shutdown; in-flight admission transactions abort and
    /// roll back instead of committing after the server stopped.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        Ok(Self {
            bookings: BookingRepository::new(db.clone()),
            db,
            shutdown: CancellationToken::new(),
        })
    }
}
