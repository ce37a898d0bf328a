//! Booking Repository
//!
//! Admission, reschedule and cancellation for table bookings. The
//! check-then-write sequence runs inside a sqlx transaction: commit happens
//! only on the success path, every other exit (rejection, error, cancelled
//! future) drops the transaction and rolls back. The unique index on
//! `(table_id, slot)` turns a lost race between the conflict count and the
//! insert into a constraint error, which is translated back into a rejection.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Sqlite, Transaction};
use tokio_util::sync::CancellationToken;

use super::{BaseRepository, RepoError, RepoResult, is_fk_violation, is_unique_violation};
use crate::db::DbService;
use crate::db::models::{Booking, BookingCreate, DiningTable};
use crate::util;

/// Slot status for one table, with a message naming the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub status: SlotStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Occupied,
}

/// Why an admission or reschedule was turned away without a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Another booking holds the exact (table, slot) pair
    SlotTaken,
    /// Party is larger than the table seats
    OverCapacity { capacity: i32 },
}

impl RejectReason {
    pub fn message(&self) -> String {
        match self {
            RejectReason::SlotTaken => "table already booked".to_string(),
            RejectReason::OverCapacity { capacity } => {
                format!("party size exceeds table capacity of {capacity}")
            }
        }
    }
}

#[derive(Debug)]
pub enum AdmitOutcome {
    Admitted(Booking),
    Rejected(RejectReason),
}

#[derive(Debug)]
pub enum RescheduleOutcome {
    Rescheduled(Booking),
    Rejected(RejectReason),
}

#[derive(Clone)]
pub struct BookingRepository {
    base: BaseRepository,
}

impl BookingRepository {
    pub fn new(db: DbService) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Is `table_id` free at exactly `slot`? Read-only, no side effects.
    pub async fn check_availability(
        &self,
        table_id: i64,
        slot: DateTime<Utc>,
    ) -> RepoResult<Availability> {
        let (table_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM dining_table WHERE id = ?")
                .bind(table_id)
                .fetch_one(self.base.read())
                .await?;
        if table_count == 0 {
            return Err(RepoError::NotFound(format!(
                "Dining table {table_id} not found"
            )));
        }

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM booking WHERE table_id = ? AND slot = ?")
                .bind(table_id)
                .bind(slot)
                .fetch_one(self.base.read())
                .await?;

        Ok(if count > 0 {
            Availability {
                status: SlotStatus::Occupied,
                message: format!("Table {table_id} is already booked for the requested slot"),
            }
        } else {
            Availability {
                status: SlotStatus::Available,
                message: format!("Table {table_id} is available for the requested slot"),
            }
        })
    }

    /// Find booking by id
    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            "SELECT id, customer_id, table_id, slot, party_size, notes, created_at
             FROM booking WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.base.read())
        .await?;
        Ok(booking)
    }

    /// Admit a booking request, rejecting double-bookings.
    ///
    /// Input validation happens before a transaction is opened; the conflict
    /// check and the insert share one transaction. Cancelling `cancel` before
    /// commit aborts the operation and rolls back.
    pub async fn admit(
        &self,
        data: BookingCreate,
        cancel: &CancellationToken,
    ) -> RepoResult<AdmitOutcome> {
        if data.party_size < 1 {
            return Err(RepoError::InvalidInput(format!(
                "party_size must be positive, got {}",
                data.party_size
            )));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RepoError::Cancelled),
            res = self.admit_tx(data) => res,
        }
    }

    async fn admit_tx(&self, data: BookingCreate) -> RepoResult<AdmitOutcome> {
        let mut tx = self.base.write().begin().await?;
        match admit_in_tx(&mut tx, &data).await? {
            AdmitOutcome::Admitted(booking) => {
                tx.commit().await?;
                tracing::info!(
                    booking_id = booking.id,
                    table_id = booking.table_id,
                    slot = %booking.slot,
                    "Booking admitted"
                );
                Ok(AdmitOutcome::Admitted(booking))
            }
            // Dropping the transaction rolls back; no state change
            rejected => Ok(rejected),
        }
    }

    /// Move a booking to `new_slot` under the same conflict discipline as
    /// admission. The original slot is untouched on rejection.
    pub async fn reschedule(
        &self,
        booking_id: i64,
        new_slot: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> RepoResult<RescheduleOutcome> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RepoError::Cancelled),
            res = self.reschedule_tx(booking_id, new_slot) => res,
        }
    }

    async fn reschedule_tx(
        &self,
        booking_id: i64,
        new_slot: DateTime<Utc>,
    ) -> RepoResult<RescheduleOutcome> {
        let mut tx = self.base.write().begin().await?;

        let booking = sqlx::query_as::<_, Booking>(
            "SELECT id, customer_id, table_id, slot, party_size, notes, created_at
             FROM booking WHERE id = ?",
        )
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Booking {booking_id} not found")))?;

        // Conflict check against the new slot; the booking itself does not
        // conflict with its own row (rescheduling onto the same slot is a
        // no-op success).
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM booking WHERE table_id = ? AND slot = ? AND id != ?",
        )
        .bind(booking.table_id)
        .bind(new_slot)
        .bind(booking_id)
        .fetch_one(&mut *tx)
        .await?;
        if count > 0 {
            return Ok(RescheduleOutcome::Rejected(RejectReason::SlotTaken));
        }

        let updated = sqlx::query("UPDATE booking SET slot = ? WHERE id = ?")
            .bind(new_slot)
            .bind(booking_id)
            .execute(&mut *tx)
            .await;
        match updated {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Ok(RescheduleOutcome::Rejected(RejectReason::SlotTaken));
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;
        tracing::info!(booking_id, new_slot = %new_slot, "Booking rescheduled");
        Ok(RescheduleOutcome::Rescheduled(Booking {
            slot: new_slot,
            ..booking
        }))
    }

    /// Unconditional delete. Removing a reservation cannot violate the
    /// no-double-booking invariant, so no conflict check runs. A second call
    /// for the same id observes `NotFound`, never an error.
    pub async fn cancel(&self, booking_id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM booking WHERE id = ?")
            .bind(booking_id)
            .execute(self.base.write())
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!(
                "Booking {booking_id} not found"
            )));
        }
        tracing::info!(booking_id, "Booking cancelled");
        Ok(())
    }
}

/// Check-then-insert inside the caller's transaction. Never commits; the
/// caller owns the transaction boundary.
async fn admit_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    data: &BookingCreate,
) -> RepoResult<AdmitOutcome> {
    let table = sqlx::query_as::<_, DiningTable>(
        "SELECT id, name, capacity, is_active FROM dining_table WHERE id = ?",
    )
    .bind(data.table_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", data.table_id)))?;

    if !table.is_active {
        return Err(RepoError::NotFound(format!(
            "Dining table {} is not in service",
            data.table_id
        )));
    }

    if data.party_size > table.capacity {
        return Ok(AdmitOutcome::Rejected(RejectReason::OverCapacity {
            capacity: table.capacity,
        }));
    }

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM booking WHERE table_id = ? AND slot = ?")
            .bind(data.table_id)
            .bind(data.slot)
            .fetch_one(&mut **tx)
            .await?;
    if count > 0 {
        return Ok(AdmitOutcome::Rejected(RejectReason::SlotTaken));
    }

    let booking = Booking {
        id: util::snowflake_id(),
        customer_id: data.customer_id,
        table_id: data.table_id,
        slot: data.slot,
        party_size: data.party_size,
        notes: data.notes.clone(),
        created_at: util::now_millis(),
    };

    let inserted = sqlx::query(
        "INSERT INTO booking (id, customer_id, table_id, slot, party_size, notes, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(booking.id)
    .bind(booking.customer_id)
    .bind(booking.table_id)
    .bind(booking.slot)
    .bind(booking.party_size)
    .bind(&booking.notes)
    .bind(booking.created_at)
    .execute(&mut **tx)
    .await;

    match inserted {
        Ok(_) => Ok(AdmitOutcome::Admitted(booking)),
        // Two admissions raced past the count; the unique index decides
        Err(e) if is_unique_violation(&e) => Ok(AdmitOutcome::Rejected(RejectReason::SlotTaken)),
        Err(e) if is_fk_violation(&e) => Err(RepoError::NotFound(format!(
            "Customer {} not found",
            data.customer_id
        ))),
        Err(e) => Err(e.into()),
    }
}
