use serde::{Deserialize, Serialize};

use super::stay::StayRange;
use crate::error::{Error, Result};
use crate::models::{Booking, BookingId, Renting, RoomId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Booking,
    Renting,
}

/// One stay record blocking a candidate window, with enough detail for a
/// "conflicting dates: X to Y" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub id: i64,
    pub kind: ConflictKind,
    pub range: StayRange,
}

/// Scan the supplied collections for stay records that block `candidate`
/// on `room_id`. Pure function: callers may pass unfiltered collections,
/// records for other rooms are skipped, and cancelled bookings as well as
/// cancelled/completed rentings never conflict. `exclude_booking` leaves
/// out the record being re-validated (check-in, date change).
pub fn find_conflicts(
    room_id: RoomId,
    candidate: &StayRange,
    bookings: &[Booking],
    rentings: &[Renting],
    exclude_booking: Option<BookingId>,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for booking in bookings {
        if booking.room_id != room_id || !booking.status.blocks_room() {
            continue;
        }
        if exclude_booking == Some(booking.booking_id) {
            continue;
        }
        let range = booking.stay();
        if candidate.overlaps(&range) {
            conflicts.push(Conflict {
                id: booking.booking_id,
                kind: ConflictKind::Booking,
                range,
            });
        }
    }

    for renting in rentings {
        if renting.room_id != room_id || !renting.status.blocks_room() {
            continue;
        }
        let range = renting.stay();
        if candidate.overlaps(&range) {
            conflicts.push(Conflict {
                id: renting.renting_id,
                kind: ConflictKind::Renting,
                range,
            });
        }
    }

    conflicts
}

/// The one hard invariant of the system: no two stay records that hold
/// `room_id` may overlap. The test harness calls this after every
/// mutation; a violation is reported as the offending pair.
pub fn assert_room_consistent(
    room_id: RoomId,
    bookings: &[Booking],
    rentings: &[Renting],
) -> Result<()> {
    let mut held: Vec<Conflict> = Vec::new();

    for booking in bookings {
        if booking.room_id == room_id && booking.status.blocks_room() {
            held.push(Conflict {
                id: booking.booking_id,
                kind: ConflictKind::Booking,
                range: booking.stay(),
            });
        }
    }
    for renting in rentings {
        if renting.room_id == room_id && renting.status.blocks_room() {
            held.push(Conflict {
                id: renting.renting_id,
                kind: ConflictKind::Renting,
                range: renting.stay(),
            });
        }
    }

    for (index, first) in held.iter().enumerate() {
        for second in &held[index + 1..] {
            if first.range.overlaps(&second.range) {
                return Err(Error::BookingConflict {
                    room_id,
                    conflicts: vec![*first, *second],
                });
            }
        }
    }

    Ok(())
}
