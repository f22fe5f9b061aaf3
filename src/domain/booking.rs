use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::stay::StayRange;
use crate::error::{Error, Result};
use crate::models::Booking;

/// Booking lifecycle. `Reserved` is where every booking starts; `Confirmed`
/// is the optional manual confirmation step; `CheckedIn` and `Cancelled`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Reserved,
    Confirmed,
    CheckedIn,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Reserved => "Reserved",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::CheckedIn => "CheckedIn",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::CheckedIn | BookingStatus::Cancelled)
    }

    /// Whether a booking in this state still holds its room for conflict
    /// purposes. Once checked in, the renting owns the occupancy window;
    /// counting the booking as well would double-block the room.
    pub fn blocks_room(self) -> bool {
        matches!(self, BookingStatus::Reserved | BookingStatus::Confirmed)
    }
}

pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
    match from {
        BookingStatus::Reserved => matches!(
            to,
            BookingStatus::Confirmed | BookingStatus::CheckedIn | BookingStatus::Cancelled
        ),
        BookingStatus::Confirmed => {
            matches!(to, BookingStatus::CheckedIn | BookingStatus::Cancelled)
        }
        BookingStatus::CheckedIn | BookingStatus::Cancelled => false,
    }
}

impl Booking {
    pub fn stay(&self) -> StayRange {
        StayRange {
            check_in: self.check_in_date,
            check_out: self.check_out_date,
        }
    }

    pub fn transition(&mut self, to: BookingStatus) -> Result<()> {
        if !can_transition(self.status, to) {
            return Err(Error::InvalidTransition {
                entity: "booking",
                from: self.status.as_str(),
                to: to.as_str(),
            });
        }
        self.status = to;
        Ok(())
    }
}

/// Creation-time date rules: the window must be well-formed and the stay
/// cannot start before the day the booking is made.
pub fn validate_new_window(booking_date: NaiveDate, stay: &StayRange) -> Result<()> {
    if stay.check_in < booking_date {
        return Err(Error::InvalidRange(format!(
            "check-in {} cannot precede the booking date {booking_date}",
            stay.check_in
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{can_transition, validate_new_window, BookingStatus};
    use crate::domain::stay::StayRange;
    use crate::error::Error;
    use crate::models::Booking;

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            booking_id: 1,
            customer_id: 1,
            room_id: 2833,
            status,
            booking_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            check_in_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2025, 5, 12).unwrap(),
        }
    }

    #[test]
    fn lifecycle_edges() {
        assert!(can_transition(
            BookingStatus::Reserved,
            BookingStatus::Confirmed
        ));
        assert!(can_transition(
            BookingStatus::Reserved,
            BookingStatus::CheckedIn
        ));
        assert!(can_transition(
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn
        ));
        assert!(can_transition(
            BookingStatus::Confirmed,
            BookingStatus::Cancelled
        ));
        assert!(!can_transition(
            BookingStatus::CheckedIn,
            BookingStatus::Cancelled
        ));
        assert!(!can_transition(
            BookingStatus::Cancelled,
            BookingStatus::Reserved
        ));
        assert!(!can_transition(
            BookingStatus::CheckedIn,
            BookingStatus::CheckedIn
        ));
    }

    #[test]
    fn transition_rejects_terminal_states() {
        let mut checked_in = booking(BookingStatus::CheckedIn);
        let error = checked_in.transition(BookingStatus::Cancelled).unwrap_err();
        assert!(matches!(
            error,
            Error::InvalidTransition {
                entity: "booking",
                from: "CheckedIn",
                to: "Cancelled",
            }
        ));

        let mut reserved = booking(BookingStatus::Reserved);
        reserved.transition(BookingStatus::Cancelled).unwrap();
        assert_eq!(reserved.status, BookingStatus::Cancelled);
    }

    #[test]
    fn window_cannot_start_before_booking_date() {
        let booked_on = NaiveDate::from_ymd_opt(2025, 5, 11).unwrap();
        let stay = StayRange::parse("2025-05-10", "2025-05-12").unwrap();
        assert!(matches!(
            validate_new_window(booked_on, &stay),
            Err(Error::InvalidRange(_))
        ));

        // Booking for the same day is fine.
        let today = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        assert!(validate_new_window(today, &stay).is_ok());
    }

    #[test]
    fn status_serializes_with_wire_casing() {
        let encoded = serde_json::to_string(&BookingStatus::CheckedIn).unwrap();
        assert_eq!(encoded, "\"CheckedIn\"");
    }
}
