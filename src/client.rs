use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::config::BackendConfig;
use crate::domain::booking::BookingStatus;
use crate::domain::conflict::{Conflict, ConflictKind};
use crate::domain::renting::RentingStatus;
use crate::domain::stay::StayRange;
use crate::error::{Error, Result};
use crate::models::{
    Booking, BookingId, Customer, CustomerId, Employee, NewCustomer, NewEmployee, Renting,
    RentingId, Room, RoomId, RoomSearch,
};
use crate::store::{BookingRecord, RentingRecord, RoomOccupancy, StayStore};

/// Client for the e-hotels REST backend. Base URL and timeout come from an
/// explicit [`BackendConfig`]; errors propagate as-is — no sample-data
/// fallback on a failed fetch.
#[derive(Debug, Clone)]
pub struct RestBackend {
    http: reqwest::Client,
    base: Url,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| Error::Backend(format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base: config.api_base()?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Backend(format!("invalid endpoint path '{path}': {e}")))
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>> {
        let response = self.http.get(self.endpoint("rooms")?).send().await?;
        decode(response).await
    }

    /// Availability search; ranking and filtering are the backend's job,
    /// the core only consumes the result.
    pub async fn search_available(&self, search: &RoomSearch) -> Result<Vec<Room>> {
        let response = self
            .http
            .get(self.endpoint("rooms/available")?)
            .query(search)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn bookings_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Booking>> {
        let response = self
            .http
            .get(self.endpoint("bookings")?)
            .query(&[("customerId", customer_id)])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn bookings_for_room(&self, room_id: RoomId) -> Result<Vec<Booking>> {
        let response = self
            .http
            .get(self.endpoint("bookings")?)
            .query(&[("roomId", room_id)])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn rentings_for_room(&self, room_id: RoomId) -> Result<Vec<Renting>> {
        let response = self
            .http
            .get(self.endpoint("rentings")?)
            .query(&[("roomId", room_id)])
            .send()
            .await?;
        decode(response).await
    }

    /// Hard removal of a booking record. Routine cancellation goes through
    /// the lifecycle engine as a status transition instead.
    pub async fn delete_booking(&self, booking_id: BookingId) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("bookings/{booking_id}"))?)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Err(decode_error(status, &body))
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        let response = self.http.get(self.endpoint("customers")?).send().await?;
        decode(response).await
    }

    pub async fn create_customer(&self, new: &NewCustomer) -> Result<Customer> {
        let response = self
            .http
            .post(self.endpoint("customers")?)
            .json(new)
            .send()
            .await?;
        decode(response).await
    }

    /// Registration variant that returns the assigned customer id in the
    /// created record.
    pub async fn create_customer_with_id(&self, new: &NewCustomer) -> Result<Customer> {
        let response = self
            .http
            .post(self.endpoint("customers/with-id")?)
            .json(new)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>> {
        let response = self.http.get(self.endpoint("employees")?).send().await?;
        decode(response).await
    }

    pub async fn create_employee(&self, new: &NewEmployee) -> Result<Employee> {
        let response = self
            .http
            .post(self.endpoint("employees")?)
            .json(new)
            .send()
            .await?;
        decode(response).await
    }
}

impl StayStore for RestBackend {
    async fn room_occupancy(&self, room_id: RoomId) -> Result<RoomOccupancy> {
        Ok(RoomOccupancy {
            bookings: self.bookings_for_room(room_id).await?,
            rentings: self.rentings_for_room(room_id).await?,
        })
    }

    async fn booking(&self, booking_id: BookingId) -> Result<Booking> {
        let response = self
            .http
            .get(self.endpoint(&format!("bookings/{booking_id}"))?)
            .send()
            .await?;
        decode(response).await
    }

    async fn renting(&self, renting_id: RentingId) -> Result<Renting> {
        let response = self
            .http
            .get(self.endpoint(&format!("rentings/{renting_id}"))?)
            .send()
            .await?;
        decode(response).await
    }

    async fn insert_booking(&self, record: &BookingRecord) -> Result<Booking> {
        let response = self
            .http
            .post(self.endpoint("bookings/with-params")?)
            .query(&[
                ("customerId", record.customer_id),
                ("roomId", record.room_id),
            ])
            .json(&json!({
                "status": BookingStatus::Reserved,
                "bookingDate": record.booking_date,
                "checkInDate": record.stay.check_in,
                "checkOutDate": record.stay.check_out,
            }))
            .send()
            .await?;
        decode(response).await
    }

    async fn update_booking_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking> {
        let mut booking = self.booking(booking_id).await?;
        booking.status = status;
        self.put_booking(&booking).await
    }

    async fn update_booking_dates(
        &self,
        booking_id: BookingId,
        stay: StayRange,
    ) -> Result<Booking> {
        let mut booking = self.booking(booking_id).await?;
        booking.check_in_date = stay.check_in;
        booking.check_out_date = stay.check_out;
        self.put_booking(&booking).await
    }

    async fn insert_renting(&self, record: &RentingRecord) -> Result<Renting> {
        let response = self
            .http
            .post(self.endpoint("rentings")?)
            .json(&json!({
                "customerId": record.customer_id,
                "roomId": record.room_id,
                "employeeId": record.employee_id,
                "checkInDate": record.stay.check_in,
                "checkOutDate": record.stay.check_out,
                "status": RentingStatus::Active,
                "sourceBooking": record.source_booking,
            }))
            .send()
            .await?;
        decode(response).await
    }

    async fn update_renting_status(
        &self,
        renting_id: RentingId,
        status: RentingStatus,
    ) -> Result<Renting> {
        let mut renting = self.renting(renting_id).await?;
        renting.status = status;
        let response = self
            .http
            .put(self.endpoint(&format!("rentings/{renting_id}"))?)
            .json(&renting)
            .send()
            .await?;
        decode(response).await
    }
}

impl RestBackend {
    /// The backend updates bookings by full-object PUT.
    async fn put_booking(&self, booking: &Booking) -> Result<Booking> {
        let response = self
            .http
            .put(self.endpoint(&format!("bookings/{}", booking.booking_id))?)
            .json(booking)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| Error::Backend(format!("could not decode backend response: {e}")));
    }
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    Err(decode_error(status, &body))
}

/// Map an error response to the taxonomy. A `booking_conflict` body is
/// rebuilt into [`Error::BookingConflict`] so the caller sees the room id
/// and conflicting dates, exactly as the backend reported them.
fn decode_error(status: StatusCode, body: &Value) -> Error {
    let code = body.get("error").and_then(Value::as_str).unwrap_or_default();

    if code == "booking_conflict" {
        if let Some(conflicts) = decoded_conflicts(body) {
            let room_id = body.get("roomId").and_then(Value::as_i64).unwrap_or_default();
            return Error::BookingConflict { room_id, conflicts };
        }
    }

    match status {
        StatusCode::NOT_FOUND => Error::NotFound(body_detail(body, "record not found")),
        _ => Error::Backend(format!(
            "backend returned {status}: {}",
            body_detail(body, "no detail")
        )),
    }
}

fn decoded_conflicts(body: &Value) -> Option<Vec<Conflict>> {
    // Preferred: the full conflict list, as `Error::detail` emits it.
    if let Some(conflicts) = body.get("conflicts") {
        if let Ok(parsed) = serde_json::from_value::<Vec<Conflict>>(conflicts.clone()) {
            if !parsed.is_empty() {
                return Some(parsed);
            }
        }
    }

    // Minimal payload: just the conflicting date pair.
    let dates = body.get("conflictingDates")?;
    let range = StayRange::parse(
        dates.get("checkIn")?.as_str()?,
        dates.get("checkOut")?.as_str()?,
    )
    .ok()?;
    Some(vec![Conflict {
        id: body.get("conflictId").and_then(Value::as_i64).unwrap_or_default(),
        kind: ConflictKind::Booking,
        range,
    }])
}

fn body_detail(body: &Value, fallback: &str) -> String {
    body.get("detail")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| {
            if body.is_null() {
                fallback.to_string()
            } else {
                body.to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{decode_error, RestBackend};
    use crate::config::BackendConfig;
    use crate::error::Error;

    #[test]
    fn endpoints_resolve_under_the_api_prefix() {
        let client = RestBackend::new(&BackendConfig::new("http://localhost:8080")).unwrap();
        assert_eq!(
            client.endpoint("customers").unwrap().as_str(),
            "http://localhost:8080/api/customers"
        );
        // Record removal targets the booking by id.
        assert_eq!(
            client.endpoint("bookings/42").unwrap().as_str(),
            "http://localhost:8080/api/bookings/42"
        );
        // A leading slash must not clobber the prefix.
        assert_eq!(
            client.endpoint("/rooms/available").unwrap().as_str(),
            "http://localhost:8080/api/rooms/available"
        );
    }

    #[test]
    fn booking_conflict_body_round_trips() {
        let body = json!({
            "error": "booking_conflict",
            "roomId": 2833,
            "conflictingDates": { "checkIn": "2025-05-11", "checkOut": "2025-05-14" },
        });
        let error = decode_error(reqwest::StatusCode::CONFLICT, &body);
        match error {
            Error::BookingConflict { room_id, conflicts } => {
                assert_eq!(room_id, 2833);
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].range.to_string(), "2025-05-11 to 2025-05-14");
            }
            other => panic!("expected BookingConflict, got {other:?}"),
        }
    }

    #[test]
    fn other_statuses_map_to_backend_errors() {
        let body = json!({ "detail": "room does not exist" });
        assert!(matches!(
            decode_error(reqwest::StatusCode::NOT_FOUND, &body),
            Error::NotFound(_)
        ));
        assert!(matches!(
            decode_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body),
            Error::Backend(_)
        ));
    }
}
