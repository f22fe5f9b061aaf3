use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::booking::{validate_new_window, BookingStatus};
use crate::domain::conflict::find_conflicts;
use crate::domain::renting::{PaymentMethod, RentingStatus};
use crate::domain::stay::{parse_date, StayRange};
use crate::error::{Error, Result};
use crate::models::{
    validate_input, Booking, BookingId, EmployeeId, NewBooking, NewRenting, Payment, Renting,
    RentingId, RoomId,
};
use crate::store::{BookingRecord, RentingRecord, StayStore};

/// Coordinates the pure domain checks with store writes. Every mutation
/// for a room runs under that room's lock: the record is re-read and its
/// lifecycle guard evaluated inside the critical section, so the guard,
/// the conflict check and the write they protect are atomic with respect
/// to other writers on the same room. A first, unguarded read only
/// resolves which room to lock.
pub struct LifecycleEngine<S> {
    store: S,
    room_locks: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
}

impl<S: StayStore> LifecycleEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            room_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn room_lock(&self, room_id: RoomId) -> Arc<Mutex<()>> {
        let mut locks = self.room_locks.lock().await;
        Arc::clone(locks.entry(room_id).or_default())
    }

    /// Create a booking in `Reserved`. Fails with `BookingConflict` —
    /// never silently succeeds — when the window overlaps any record that
    /// still holds the room.
    pub async fn create_booking(&self, new: &NewBooking) -> Result<Booking> {
        validate_input(new)?;
        let booking_date = parse_date(&new.booking_date)?;
        let stay = StayRange::parse(&new.check_in_date, &new.check_out_date)?;
        validate_new_window(booking_date, &stay)?;

        let lock = self.room_lock(new.room_id).await;
        let _guard = lock.lock().await;

        let occupancy = self.store.room_occupancy(new.room_id).await?;
        let conflicts = find_conflicts(
            new.room_id,
            &stay,
            &occupancy.bookings,
            &occupancy.rentings,
            None,
        );
        if !conflicts.is_empty() {
            tracing::warn!(
                room_id = new.room_id,
                customer_id = new.customer_id,
                %stay,
                conflicts = conflicts.len(),
                "booking rejected: dates overlap an existing stay"
            );
            return Err(Error::BookingConflict {
                room_id: new.room_id,
                conflicts,
            });
        }

        let booking = self
            .store
            .insert_booking(&BookingRecord {
                customer_id: new.customer_id,
                room_id: new.room_id,
                booking_date,
                stay,
            })
            .await?;
        tracing::info!(
            booking_id = booking.booking_id,
            room_id = booking.room_id,
            customer_id = booking.customer_id,
            %stay,
            "booking created"
        );
        Ok(booking)
    }

    /// Change a `Reserved` booking's window, re-validated against every
    /// other stay on the room.
    pub async fn update_booking_dates(
        &self,
        booking_id: BookingId,
        stay: StayRange,
    ) -> Result<Booking> {
        let room_id = self.store.booking(booking_id).await?.room_id;
        let lock = self.room_lock(room_id).await;
        let _guard = lock.lock().await;

        // Re-read under the lock; the status may have moved since the
        // first read resolved the room.
        let booking = self.store.booking(booking_id).await?;
        if booking.status != BookingStatus::Reserved {
            return Err(Error::Validation(format!(
                "only a reserved booking can change dates; booking {booking_id} is {}",
                booking.status.as_str()
            )));
        }

        let occupancy = self.store.room_occupancy(booking.room_id).await?;
        let conflicts = find_conflicts(
            booking.room_id,
            &stay,
            &occupancy.bookings,
            &occupancy.rentings,
            Some(booking_id),
        );
        if !conflicts.is_empty() {
            tracing::warn!(
                booking_id,
                room_id = booking.room_id,
                %stay,
                "date change rejected: dates overlap an existing stay"
            );
            return Err(Error::BookingConflict {
                room_id: booking.room_id,
                conflicts,
            });
        }

        let updated = self.store.update_booking_dates(booking_id, stay).await?;
        tracing::info!(booking_id, room_id = booking.room_id, %stay, "booking dates updated");
        Ok(updated)
    }

    pub async fn confirm_booking(&self, booking_id: BookingId) -> Result<Booking> {
        self.transition_booking(booking_id, BookingStatus::Confirmed)
            .await
    }

    /// Allowed from any non-terminal state; frees the room immediately for
    /// conflict purposes.
    pub async fn cancel_booking(&self, booking_id: BookingId) -> Result<Booking> {
        self.transition_booking(booking_id, BookingStatus::Cancelled)
            .await
    }

    async fn transition_booking(
        &self,
        booking_id: BookingId,
        to: BookingStatus,
    ) -> Result<Booking> {
        let room_id = self.store.booking(booking_id).await?.room_id;
        let lock = self.room_lock(room_id).await;
        let _guard = lock.lock().await;

        let mut booking = self.store.booking(booking_id).await?;
        let from = booking.status;
        booking.transition(to)?;

        let updated = self.store.update_booking_status(booking_id, to).await?;
        tracing::info!(
            booking_id,
            room_id = booking.room_id,
            from = from.as_str(),
            to = to.as_str(),
            "booking transitioned"
        );
        Ok(updated)
    }

    /// Convert a `Reserved`/`Confirmed` booking into an `Active` renting.
    /// The renting window may differ from the booking's (early or late
    /// checkout), so it is conflict-checked excluding the source booking.
    ///
    /// The renting insert and the booking update are one logical unit: a
    /// failed booking update is compensated by cancelling the renting just
    /// created, and only a failed compensation surfaces `PartialFailure`.
    pub async fn check_in(
        &self,
        booking_id: BookingId,
        employee_id: EmployeeId,
        stay: StayRange,
    ) -> Result<(Booking, Renting)> {
        let room_id = self.store.booking(booking_id).await?.room_id;
        let lock = self.room_lock(room_id).await;
        let _guard = lock.lock().await;

        // Guard under the lock: not already cancelled or checked in, even
        // by a transition that raced this call.
        let mut booking = self.store.booking(booking_id).await?;
        booking.transition(BookingStatus::CheckedIn)?;

        let occupancy = self.store.room_occupancy(booking.room_id).await?;
        let conflicts = find_conflicts(
            booking.room_id,
            &stay,
            &occupancy.bookings,
            &occupancy.rentings,
            Some(booking_id),
        );
        if !conflicts.is_empty() {
            tracing::warn!(
                booking_id,
                room_id = booking.room_id,
                %stay,
                "check-in rejected: renting window overlaps an existing stay"
            );
            return Err(Error::BookingConflict {
                room_id: booking.room_id,
                conflicts,
            });
        }

        let renting = self
            .store
            .insert_renting(&RentingRecord {
                customer_id: booking.customer_id,
                room_id: booking.room_id,
                employee_id,
                stay,
                source_booking: Some(booking_id),
            })
            .await?;

        match self
            .store
            .update_booking_status(booking_id, BookingStatus::CheckedIn)
            .await
        {
            Ok(updated) => {
                tracing::info!(
                    booking_id,
                    renting_id = renting.renting_id,
                    room_id = booking.room_id,
                    employee_id,
                    %stay,
                    "checked in"
                );
                Ok((updated, renting))
            }
            Err(update_error) => {
                tracing::warn!(
                    booking_id,
                    renting_id = renting.renting_id,
                    error = %update_error,
                    "booking update failed after renting insert; compensating"
                );
                match self
                    .store
                    .update_renting_status(renting.renting_id, RentingStatus::Cancelled)
                    .await
                {
                    Ok(_) => Err(update_error),
                    Err(compensation_error) => {
                        tracing::error!(
                            booking_id,
                            renting_id = renting.renting_id,
                            error = %compensation_error,
                            "compensating cancel failed; records need manual reconciliation"
                        );
                        Err(Error::PartialFailure {
                            booking_id,
                            renting_id: renting.renting_id,
                            detail: format!(
                                "renting {} was created but the booking update failed \
                                 ({update_error}) and the compensating cancel failed \
                                 ({compensation_error})",
                                renting.renting_id
                            ),
                        })
                    }
                }
            }
        }
    }

    /// Walk-in rental: same conflict check as a booking, no source booking.
    pub async fn create_direct_renting(&self, new: &NewRenting) -> Result<Renting> {
        validate_input(new)?;
        let stay = StayRange::parse(&new.check_in_date, &new.check_out_date)?;

        let lock = self.room_lock(new.room_id).await;
        let _guard = lock.lock().await;

        let occupancy = self.store.room_occupancy(new.room_id).await?;
        let conflicts = find_conflicts(
            new.room_id,
            &stay,
            &occupancy.bookings,
            &occupancy.rentings,
            None,
        );
        if !conflicts.is_empty() {
            tracing::warn!(
                room_id = new.room_id,
                customer_id = new.customer_id,
                %stay,
                "walk-in rejected: dates overlap an existing stay"
            );
            return Err(Error::BookingConflict {
                room_id: new.room_id,
                conflicts,
            });
        }

        let renting = self
            .store
            .insert_renting(&RentingRecord {
                customer_id: new.customer_id,
                room_id: new.room_id,
                employee_id: new.employee_id,
                stay,
                source_booking: None,
            })
            .await?;
        tracing::info!(
            renting_id = renting.renting_id,
            room_id = renting.room_id,
            employee_id = renting.employee_id,
            %stay,
            "walk-in renting created"
        );
        Ok(renting)
    }

    /// Settle an `Active` renting. Returns the updated renting and the
    /// payment record; persisting the payment is the caller's concern.
    pub async fn close_renting(
        &self,
        renting_id: RentingId,
        amount: f64,
        method: PaymentMethod,
    ) -> Result<(Renting, Payment)> {
        let room_id = self.store.renting(renting_id).await?.room_id;
        let lock = self.room_lock(room_id).await;
        let _guard = lock.lock().await;

        // Guard under the lock: a concurrent close or cancel must not
        // settle the same stay twice.
        let mut renting = self.store.renting(renting_id).await?;
        let payment = renting.close(amount, method)?;

        let updated = self
            .store
            .update_renting_status(renting_id, RentingStatus::Completed)
            .await?;
        tracing::info!(
            renting_id,
            room_id = renting.room_id,
            amount,
            "renting closed"
        );
        Ok((updated, payment))
    }

    pub async fn cancel_renting(&self, renting_id: RentingId) -> Result<Renting> {
        let room_id = self.store.renting(renting_id).await?.room_id;
        let lock = self.room_lock(room_id).await;
        let _guard = lock.lock().await;

        let mut renting = self.store.renting(renting_id).await?;
        renting.cancel()?;

        let updated = self
            .store
            .update_renting_status(renting_id, RentingStatus::Cancelled)
            .await?;
        tracing::info!(renting_id, room_id = renting.room_id, "renting cancelled");
        Ok(updated)
    }
}
