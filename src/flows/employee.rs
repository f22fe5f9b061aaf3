use crate::client::RestBackend;
use crate::domain::renting::PaymentMethod;
use crate::domain::stay::StayRange;
use crate::engine::LifecycleEngine;
use crate::error::Result;
use crate::models::{
    Booking, BookingId, Customer, CustomerId, Employee, EmployeeId, NewCustomer, NewEmployee,
    NewRenting, Payment, Renting, RentingId, RoomId,
};
use crate::store::StayStore;

/// Front-desk operations: confirmation, check-in, walk-in rentals, payment
/// settlement and directory registration. Every renting created here is
/// stamped with the processing employee.
pub struct EmployeeFlow<'a, S> {
    engine: &'a LifecycleEngine<S>,
    employee_id: EmployeeId,
}

impl<'a, S: StayStore> EmployeeFlow<'a, S> {
    pub fn new(engine: &'a LifecycleEngine<S>, employee_id: EmployeeId) -> Self {
        Self {
            engine,
            employee_id,
        }
    }

    pub async fn confirm_booking(&self, booking_id: BookingId) -> Result<Booking> {
        self.engine.confirm_booking(booking_id).await
    }

    pub async fn cancel_booking(&self, booking_id: BookingId) -> Result<Booking> {
        self.engine.cancel_booking(booking_id).await
    }

    /// Check a guest in with an adjusted window (early or late checkout).
    pub async fn check_in(
        &self,
        booking_id: BookingId,
        check_in: &str,
        check_out: &str,
    ) -> Result<(Booking, Renting)> {
        let stay = StayRange::parse(check_in, check_out)?;
        self.engine
            .check_in(booking_id, self.employee_id, stay)
            .await
    }

    /// Check a guest in on the booking's own dates.
    pub async fn check_in_as_booked(&self, booking_id: BookingId) -> Result<(Booking, Renting)> {
        let booking = self.engine.store().booking(booking_id).await?;
        self.engine
            .check_in(booking_id, self.employee_id, booking.stay())
            .await
    }

    /// Walk-in rental with no prior booking.
    pub async fn rent_walk_in(
        &self,
        customer_id: CustomerId,
        room_id: RoomId,
        check_in: &str,
        check_out: &str,
    ) -> Result<Renting> {
        self.engine
            .create_direct_renting(&NewRenting {
                customer_id,
                room_id,
                employee_id: self.employee_id,
                check_in_date: check_in.to_string(),
                check_out_date: check_out.to_string(),
            })
            .await
    }

    pub async fn collect_payment(
        &self,
        renting_id: RentingId,
        amount: f64,
        method: PaymentMethod,
    ) -> Result<(Renting, Payment)> {
        self.engine.close_renting(renting_id, amount, method).await
    }

    pub async fn cancel_renting(&self, renting_id: RentingId) -> Result<Renting> {
        self.engine.cancel_renting(renting_id).await
    }
}

impl<'a> EmployeeFlow<'a, RestBackend> {
    /// Purge a booking record entirely. Guests cancelling go through
    /// [`Self::cancel_booking`]; this is the desk cleaning up bad data.
    pub async fn remove_booking(&self, booking_id: BookingId) -> Result<()> {
        self.engine.store().delete_booking(booking_id).await
    }

    pub async fn register_customer(&self, new: &NewCustomer) -> Result<Customer> {
        crate::models::validate_input(new)?;
        self.engine.store().create_customer_with_id(new).await
    }

    pub async fn register_employee(&self, new: &NewEmployee) -> Result<Employee> {
        crate::models::validate_input(new)?;
        self.engine.store().create_employee(new).await
    }

    pub async fn customer_directory(&self) -> Result<Vec<Customer>> {
        self.engine.store().list_customers().await
    }

    pub async fn employee_directory(&self) -> Result<Vec<Employee>> {
        self.engine.store().list_employees().await
    }
}

#[cfg(test)]
mod tests {
    use super::EmployeeFlow;
    use crate::domain::booking::BookingStatus;
    use crate::domain::renting::{PaymentMethod, RentingStatus};
    use crate::engine::LifecycleEngine;
    use crate::flows::customer::CustomerFlow;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn desk_settles_a_booked_stay_end_to_end() {
        let engine = LifecycleEngine::new(MemoryStore::new());
        let customer = CustomerFlow::new(&engine, 1);
        let desk = EmployeeFlow::new(&engine, 4);

        let booking = customer
            .book_room(2833, "2999-05-10", "2999-05-12")
            .await
            .unwrap();
        desk.confirm_booking(booking.booking_id).await.unwrap();

        let (checked_in, renting) = desk.check_in_as_booked(booking.booking_id).await.unwrap();
        assert_eq!(checked_in.status, BookingStatus::CheckedIn);
        assert_eq!(renting.status, RentingStatus::Active);
        assert_eq!(renting.source_booking, Some(booking.booking_id));
        assert_eq!(renting.employee_id, 4);

        let (closed, payment) = desk
            .collect_payment(renting.renting_id, 250.0, PaymentMethod::CreditCard)
            .await
            .unwrap();
        assert_eq!(closed.status, RentingStatus::Completed);
        assert_eq!(payment.amount, 250.0);
    }
}
