use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::domain::booking::BookingStatus;
use crate::domain::renting::RentingStatus;
use crate::domain::stay::StayRange;
use crate::error::{Error, Result};
use crate::models::{
    Booking, BookingId, CustomerId, EmployeeId, Renting, RentingId, RoomId,
};

/// Validated booking insert, dates already parsed by the engine.
#[derive(Debug, Clone)]
pub struct BookingRecord {
    pub customer_id: CustomerId,
    pub room_id: RoomId,
    pub booking_date: NaiveDate,
    pub stay: StayRange,
}

#[derive(Debug, Clone)]
pub struct RentingRecord {
    pub customer_id: CustomerId,
    pub room_id: RoomId,
    pub employee_id: EmployeeId,
    pub stay: StayRange,
    pub source_booking: Option<BookingId>,
}

/// All stay records for one room, read as a single snapshot. The engine
/// only trusts a snapshot taken under the room's write lock.
#[derive(Debug, Clone, Default)]
pub struct RoomOccupancy {
    pub bookings: Vec<Booking>,
    pub rentings: Vec<Renting>,
}

/// Persistence seam for bookings and rentings. Implemented by
/// [`MemoryStore`] and by the REST collaborator
/// [`crate::client::RestBackend`]; the engine is generic over it.
#[allow(async_fn_in_trait)]
pub trait StayStore {
    async fn room_occupancy(&self, room_id: RoomId) -> Result<RoomOccupancy>;
    async fn booking(&self, booking_id: BookingId) -> Result<Booking>;
    async fn renting(&self, renting_id: RentingId) -> Result<Renting>;
    async fn insert_booking(&self, record: &BookingRecord) -> Result<Booking>;
    async fn update_booking_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking>;
    async fn update_booking_dates(
        &self,
        booking_id: BookingId,
        stay: StayRange,
    ) -> Result<Booking>;
    async fn insert_renting(&self, record: &RentingRecord) -> Result<Renting>;
    async fn update_renting_status(
        &self,
        renting_id: RentingId,
        status: RentingStatus,
    ) -> Result<Renting>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    bookings: Vec<Booking>,
    rentings: Vec<Renting>,
    next_booking_id: BookingId,
    next_renting_id: RentingId,
    failing_booking_updates: u32,
    failing_renting_updates: u32,
}

/// In-memory store for tests and local demos. Update failures can be
/// injected to drive the engine's check-in compensation path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` booking updates fail with a backend error.
    pub async fn fail_booking_updates(&self, count: u32) {
        self.inner.write().await.failing_booking_updates = count;
    }

    /// Make the next `count` renting updates fail with a backend error.
    pub async fn fail_renting_updates(&self, count: u32) {
        self.inner.write().await.failing_renting_updates = count;
    }
}

impl StayStore for MemoryStore {
    async fn room_occupancy(&self, room_id: RoomId) -> Result<RoomOccupancy> {
        let inner = self.inner.read().await;
        Ok(RoomOccupancy {
            bookings: inner
                .bookings
                .iter()
                .filter(|booking| booking.room_id == room_id)
                .cloned()
                .collect(),
            rentings: inner
                .rentings
                .iter()
                .filter(|renting| renting.room_id == room_id)
                .cloned()
                .collect(),
        })
    }

    async fn booking(&self, booking_id: BookingId) -> Result<Booking> {
        self.inner
            .read()
            .await
            .bookings
            .iter()
            .find(|booking| booking.booking_id == booking_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("booking {booking_id} not found")))
    }

    async fn renting(&self, renting_id: RentingId) -> Result<Renting> {
        self.inner
            .read()
            .await
            .rentings
            .iter()
            .find(|renting| renting.renting_id == renting_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("renting {renting_id} not found")))
    }

    async fn insert_booking(&self, record: &BookingRecord) -> Result<Booking> {
        let mut inner = self.inner.write().await;
        inner.next_booking_id += 1;
        let booking = Booking {
            booking_id: inner.next_booking_id,
            customer_id: record.customer_id,
            room_id: record.room_id,
            status: BookingStatus::Reserved,
            booking_date: record.booking_date,
            check_in_date: record.stay.check_in,
            check_out_date: record.stay.check_out,
        };
        inner.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn update_booking_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking> {
        let mut inner = self.inner.write().await;
        if inner.failing_booking_updates > 0 {
            inner.failing_booking_updates -= 1;
            return Err(Error::Backend("injected booking update failure".to_string()));
        }
        let booking = inner
            .bookings
            .iter_mut()
            .find(|booking| booking.booking_id == booking_id)
            .ok_or_else(|| Error::NotFound(format!("booking {booking_id} not found")))?;
        booking.status = status;
        Ok(booking.clone())
    }

    async fn update_booking_dates(
        &self,
        booking_id: BookingId,
        stay: StayRange,
    ) -> Result<Booking> {
        let mut inner = self.inner.write().await;
        if inner.failing_booking_updates > 0 {
            inner.failing_booking_updates -= 1;
            return Err(Error::Backend("injected booking update failure".to_string()));
        }
        let booking = inner
            .bookings
            .iter_mut()
            .find(|booking| booking.booking_id == booking_id)
            .ok_or_else(|| Error::NotFound(format!("booking {booking_id} not found")))?;
        booking.check_in_date = stay.check_in;
        booking.check_out_date = stay.check_out;
        Ok(booking.clone())
    }

    async fn insert_renting(&self, record: &RentingRecord) -> Result<Renting> {
        let mut inner = self.inner.write().await;
        inner.next_renting_id += 1;
        let renting = Renting {
            renting_id: inner.next_renting_id,
            customer_id: record.customer_id,
            room_id: record.room_id,
            employee_id: record.employee_id,
            check_in_date: record.stay.check_in,
            check_out_date: record.stay.check_out,
            status: RentingStatus::Active,
            source_booking: record.source_booking,
        };
        inner.rentings.push(renting.clone());
        Ok(renting)
    }

    async fn update_renting_status(
        &self,
        renting_id: RentingId,
        status: RentingStatus,
    ) -> Result<Renting> {
        let mut inner = self.inner.write().await;
        if inner.failing_renting_updates > 0 {
            inner.failing_renting_updates -= 1;
            return Err(Error::Backend("injected renting update failure".to_string()));
        }
        let renting = inner
            .rentings
            .iter_mut()
            .find(|renting| renting.renting_id == renting_id)
            .ok_or_else(|| Error::NotFound(format!("renting {renting_id} not found")))?;
        renting.status = status;
        Ok(renting.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{BookingRecord, MemoryStore, StayStore};
    use crate::domain::booking::BookingStatus;
    use crate::domain::stay::StayRange;
    use crate::error::Error;

    fn record(room_id: i64) -> BookingRecord {
        BookingRecord {
            customer_id: 1,
            room_id,
            booking_date: "2025-05-01".parse().unwrap(),
            stay: StayRange::parse("2025-05-10", "2025-05-12").unwrap(),
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids_and_filters_by_room() {
        let store = MemoryStore::new();
        let first = store.insert_booking(&record(2833)).await.unwrap();
        let second = store.insert_booking(&record(99)).await.unwrap();
        assert_eq!(first.booking_id, 1);
        assert_eq!(second.booking_id, 2);

        let occupancy = store.room_occupancy(2833).await.unwrap();
        assert_eq!(occupancy.bookings.len(), 1);
        assert_eq!(occupancy.bookings[0].booking_id, 1);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let store = MemoryStore::new();
        let booking = store.insert_booking(&record(2833)).await.unwrap();
        store.fail_booking_updates(1).await;

        let error = store
            .update_booking_status(booking.booking_id, BookingStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Backend(_)));

        // Second attempt goes through.
        let updated = store
            .update_booking_status(booking.booking_id, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.booking(42).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(store.renting(42).await, Err(Error::NotFound(_))));
    }
}
