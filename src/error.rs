use serde_json::{json, Value};

use crate::domain::conflict::Conflict;
use crate::models::{BookingId, RentingId, RoomId};

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the lifecycle engine can report. Each variant carries
/// enough structure for the caller to render a specific message; nothing
/// collapses into generic fallback data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid stay range: {0}")]
    InvalidRange(String),

    #[error("room {room_id} is already taken for the requested dates")]
    BookingConflict {
        room_id: RoomId,
        conflicts: Vec<Conflict>,
    },

    #[error("invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// A multi-step operation committed partially and the compensating
    /// write also failed. Operators must reconcile the named records.
    #[error("partially committed check-in for booking {booking_id}: {detail}")]
    PartialFailure {
        booking_id: BookingId,
        renting_id: RentingId,
        detail: String,
    },

    #[error("backend request failed: {0}")]
    Backend(String),
}

impl Error {
    /// Stable snake_case code, matching the backend wire vocabulary.
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidRange(_) => "invalid_range",
            Error::BookingConflict { .. } => "booking_conflict",
            Error::InvalidTransition { .. } => "invalid_transition",
            Error::Validation(_) => "validation_error",
            Error::NotFound(_) => "not_found",
            Error::PartialFailure { .. } => "partial_failure",
            Error::Backend(_) => "backend_error",
        }
    }

    /// Structured payload for the caller. A booking conflict carries the
    /// room id and every blocking range so the UI can render
    /// "conflicting dates: X to Y" for each one.
    pub fn detail(&self) -> Value {
        match self {
            Error::BookingConflict { room_id, conflicts } => {
                let first = conflicts.first().map(|conflict| {
                    json!({
                        "checkIn": conflict.range.check_in.to_string(),
                        "checkOut": conflict.range.check_out.to_string(),
                    })
                });
                json!({
                    "error": "booking_conflict",
                    "roomId": room_id,
                    "conflictingDates": first,
                    "conflicts": conflicts,
                })
            }
            Error::PartialFailure {
                booking_id,
                renting_id,
                detail,
            } => json!({
                "error": "partial_failure",
                "bookingId": booking_id,
                "rentingId": renting_id,
                "detail": detail,
            }),
            other => json!({
                "error": other.error_code(),
                "detail": other.to_string(),
            }),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Backend(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::Error;
    use crate::domain::conflict::{Conflict, ConflictKind};
    use crate::domain::stay::StayRange;

    #[test]
    fn booking_conflict_detail_carries_room_and_dates() {
        let error = Error::BookingConflict {
            room_id: 2833,
            conflicts: vec![Conflict {
                id: 7,
                kind: ConflictKind::Renting,
                range: StayRange {
                    check_in: NaiveDate::from_ymd_opt(2025, 5, 11).unwrap(),
                    check_out: NaiveDate::from_ymd_opt(2025, 5, 14).unwrap(),
                },
            }],
        };

        let detail = error.detail();
        assert_eq!(detail["error"], "booking_conflict");
        assert_eq!(detail["roomId"], 2833);
        assert_eq!(detail["conflictingDates"]["checkIn"], "2025-05-11");
        assert_eq!(detail["conflictingDates"]["checkOut"], "2025-05-14");
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            Error::InvalidRange("x".to_string()).error_code(),
            "invalid_range"
        );
        assert_eq!(
            Error::InvalidTransition {
                entity: "booking",
                from: "Cancelled",
                to: "CheckedIn",
            }
            .error_code(),
            "invalid_transition"
        );
    }
}
