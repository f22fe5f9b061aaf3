//! Pure booking/renting domain: stay intervals, conflict detection and the
//! lifecycle state machines. Nothing in here performs I/O; the engine and
//! the callers supply the collections these functions operate on.

pub mod booking;
pub mod conflict;
pub mod renting;
pub mod stay;
