use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::booking::BookingStatus;
use crate::domain::renting::{PaymentMethod, RentingStatus};
use crate::error::{Error, Result};

pub type CustomerId = i64;
pub type EmployeeId = i64;
pub type HotelId = i64;
pub type RoomId = i64;
pub type BookingId = i64;
pub type RentingId = i64;

pub fn validate_input<T: Validate>(input: &T) -> Result<()> {
    input
        .validate()
        .map_err(|errors| Error::Validation(format!("Validation failed: {errors}")))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub address: String,
    pub ssn: String,
    pub registration_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_id: EmployeeId,
    pub name: String,
    pub ssn: String,
    pub address: String,
}

/// Static reference data; the lifecycle core reads rooms but never
/// mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: RoomId,
    pub hotel_id: HotelId,
    pub price: f64,
    pub capacity: i32,
    pub view_type: Option<String>,
    pub extension: bool,
    pub any_problems: Option<String>,
    #[serde(default)]
    pub hotel_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub booking_id: BookingId,
    pub customer_id: CustomerId,
    pub room_id: RoomId,
    pub status: BookingStatus,
    pub booking_date: NaiveDate,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Renting {
    pub renting_id: RentingId,
    pub customer_id: CustomerId,
    pub room_id: RoomId,
    pub employee_id: EmployeeId,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub status: RentingStatus,
    /// `Some` when the renting came from a check-in, `None` for walk-ins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_booking: Option<BookingId>,
}

/// Emitted when a renting is closed. The core hands it to the caller; it
/// does not persist payments itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub renting_id: RentingId,
    pub amount: f64,
    pub method: PaymentMethod,
}

/// Booking request as the customer submits it: raw `%Y-%m-%d` date
/// strings, parsed and validated by the engine before anything is written.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub customer_id: CustomerId,
    pub room_id: RoomId,
    #[validate(length(min = 1))]
    pub booking_date: String,
    #[validate(length(min = 1))]
    pub check_in_date: String,
    #[validate(length(min = 1))]
    pub check_out_date: String,
}

/// Walk-in renting request, processed at the desk without a booking.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewRenting {
    pub customer_id: CustomerId,
    pub room_id: RoomId,
    pub employee_id: EmployeeId,
    #[validate(length(min = 1))]
    pub check_in_date: String,
    #[validate(length(min = 1))]
    pub check_out_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub ssn: String,
    pub registration_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub ssn: String,
    #[validate(length(min = 1))]
    pub address: String,
}

/// Query for `GET /rooms/available`, mirroring the customer search
/// sidebar. `None` filters are left off the query string.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSearch {
    pub start: String,
    pub end: String,
    pub guests: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_chain_id: Option<HotelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_category: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

impl RoomSearch {
    pub fn for_stay(start: impl Into<String>, end: impl Into<String>, guests: i32) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            guests,
            hotel_chain_id: None,
            hotel_category: None,
            area: None,
            min_price: None,
            max_price: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_input, NewBooking, RoomSearch};

    #[test]
    fn rejects_empty_date_fields() {
        let input = NewBooking {
            customer_id: 1,
            room_id: 2833,
            booking_date: String::new(),
            check_in_date: "2025-05-10".to_string(),
            check_out_date: "2025-05-12".to_string(),
        };
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn room_search_skips_unset_filters() {
        let search = RoomSearch::for_stay("2025-05-10", "2025-05-12", 2);
        let encoded = serde_json::to_value(&search).unwrap();
        assert!(encoded.get("hotelChainId").is_none());
        assert_eq!(encoded["guests"], 2);
    }
}
