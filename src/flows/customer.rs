use crate::client::RestBackend;
use crate::domain::stay::StayRange;
use crate::engine::LifecycleEngine;
use crate::error::{Error, Result};
use crate::models::{
    Booking, BookingId, CustomerId, NewBooking, NewCustomer, Room, RoomId, RoomSearch,
};
use crate::store::StayStore;

/// Customer-facing operations: search, book, reschedule, cancel. A
/// customer can only touch their own bookings.
pub struct CustomerFlow<'a, S> {
    engine: &'a LifecycleEngine<S>,
    customer_id: CustomerId,
}

impl<'a, S: StayStore> CustomerFlow<'a, S> {
    pub fn new(engine: &'a LifecycleEngine<S>, customer_id: CustomerId) -> Self {
        Self {
            engine,
            customer_id,
        }
    }

    /// Book a room starting today or later. The booking date is stamped
    /// with the current day, as the booking form does.
    pub async fn book_room(
        &self,
        room_id: RoomId,
        check_in: &str,
        check_out: &str,
    ) -> Result<Booking> {
        let booking_date = chrono::Utc::now().date_naive();
        self.engine
            .create_booking(&NewBooking {
                customer_id: self.customer_id,
                room_id,
                booking_date: booking_date.to_string(),
                check_in_date: check_in.to_string(),
                check_out_date: check_out.to_string(),
            })
            .await
    }

    pub async fn reschedule_booking(
        &self,
        booking_id: BookingId,
        check_in: &str,
        check_out: &str,
    ) -> Result<Booking> {
        self.owned_booking(booking_id).await?;
        let stay = StayRange::parse(check_in, check_out)?;
        self.engine.update_booking_dates(booking_id, stay).await
    }

    pub async fn cancel_booking(&self, booking_id: BookingId) -> Result<Booking> {
        self.owned_booking(booking_id).await?;
        self.engine.cancel_booking(booking_id).await
    }

    async fn owned_booking(&self, booking_id: BookingId) -> Result<Booking> {
        let booking = self.engine.store().booking(booking_id).await?;
        if booking.customer_id != self.customer_id {
            return Err(Error::NotFound(format!(
                "booking {booking_id} does not belong to customer {}",
                self.customer_id
            )));
        }
        Ok(booking)
    }
}

impl<'a> CustomerFlow<'a, RestBackend> {
    /// Self-service registration: create the account and return a flow
    /// bound to it. Desk-side registration lives on the employee flow.
    pub async fn register(
        engine: &'a LifecycleEngine<RestBackend>,
        new: &NewCustomer,
    ) -> Result<CustomerFlow<'a, RestBackend>> {
        crate::models::validate_input(new)?;
        let customer = engine.store().create_customer(new).await?;
        Ok(Self::new(engine, customer.customer_id))
    }

    /// Availability search against the backend; the result is shown as-is,
    /// an empty list stays an empty list.
    pub async fn search_rooms(&self, search: &RoomSearch) -> Result<Vec<Room>> {
        self.engine.store().search_available(search).await
    }

    /// Full room inventory for the initial dashboard view.
    pub async fn all_rooms(&self) -> Result<Vec<Room>> {
        self.engine.store().list_rooms().await
    }

    pub async fn my_bookings(&self) -> Result<Vec<Booking>> {
        self.engine
            .store()
            .bookings_for_customer(self.customer_id)
            .await
    }
}
