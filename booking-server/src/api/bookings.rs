//! Booking API handlers
//!
//! Thin HTTP facade over the admission core. Handlers validate request
//! shape, derive a child token from the shutdown token so server shutdown
//! aborts in-flight transactions, and translate outcomes to status codes:
//! admitted 201, rejected 409, missing 404.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::db::models::{Booking, BookingCreate};
use crate::db::repository::{AdmitOutcome, Availability, RescheduleOutcome};
use crate::error::AppError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;

#[derive(Debug, Deserialize, Validate)]
pub struct AdmitRequest {
    pub customer_id: i64,
    pub table_id: i64,
    pub slot: DateTime<Utc>,
    #[validate(range(min = 1, message = "party_size must be positive"))]
    pub party_size: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<AdmitRequest> for BookingCreate {
    fn from(req: AdmitRequest) -> Self {
        BookingCreate {
            customer_id: req.customer_id,
            table_id: req.table_id,
            slot: req.slot,
            party_size: req.party_size,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub slot: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub new_slot: DateTime<Utc>,
}

pub async fn check_availability(
    State(state): State<AppState>,
    Path(table_id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Availability> {
    let availability = state
        .bookings
        .check_availability(table_id, query.slot)
        .await?;
    Ok(Json(availability))
}

pub async fn admit_booking(
    State(state): State<AppState>,
    Json(req): Json<AdmitRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let cancel = state.shutdown.child_token();
    match state.bookings.admit(req.into(), &cancel).await? {
        AdmitOutcome::Admitted(booking) => Ok((StatusCode::CREATED, Json(booking))),
        AdmitOutcome::Rejected(reason) => Err(AppError::conflict(reason.message())),
    }
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Booking> {
    let booking = state
        .bookings
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))?;
    Ok(Json(booking))
}

pub async fn reschedule_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RescheduleRequest>,
) -> ApiResult<Booking> {
    let cancel = state.shutdown.child_token();
    match state.bookings.reschedule(id, req.new_slot, &cancel).await? {
        RescheduleOutcome::Rescheduled(booking) => Ok(Json(booking)),
        RescheduleOutcome::Rejected(reason) => Err(AppError::conflict(reason.message())),
    }
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.bookings.cancel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
