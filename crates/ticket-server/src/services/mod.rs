//! Business logic services

pub mod tickets;

pub use tickets::TicketService;
