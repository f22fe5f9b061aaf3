//! The two consumers of the lifecycle engine. They share every domain
//! rule and differ only in which transitions they may trigger: customers
//! book, reschedule and cancel their own stays; employees confirm, check
//! guests in, process walk-ins and settle payments.

pub mod customer;
pub mod employee;
