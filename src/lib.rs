//! Booking and renting lifecycle core for the e-hotels system.
//!
//! The pure rules live in [`domain`]: half-open stay intervals, conflict
//! detection over explicitly passed collections, and the booking/renting
//! state machines. [`engine::LifecycleEngine`] coordinates those rules
//! with a [`store::StayStore`] and serializes writes per room, so a
//! conflict check and the write it protects are atomic against other
//! writers on the same room. [`client::RestBackend`] is the collaborator
//! for the existing REST backend; [`flows`] are the two callers (customer
//! and employee) that differ only in which transitions they may trigger.

pub mod client;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod flows;
pub mod models;
pub mod store;

pub use client::RestBackend;
pub use config::BackendConfig;
pub use domain::booking::BookingStatus;
pub use domain::conflict::{assert_room_consistent, find_conflicts, Conflict, ConflictKind};
pub use domain::renting::{PaymentMethod, RentingStatus};
pub use domain::stay::StayRange;
pub use engine::LifecycleEngine;
pub use error::{Error, Result};
pub use flows::customer::CustomerFlow;
pub use flows::employee::EmployeeFlow;
pub use store::{MemoryStore, StayStore};
