//! Ticket Types - Pure type definitions shared by the ticket desk
//!
//! This crate contains only data types and the pure rules that mutate them.
//! It has no async runtime or storage dependencies.

pub mod priority;
pub mod request;
pub mod ticket;

pub use priority::*;
pub use request::*;
pub use ticket::*;
