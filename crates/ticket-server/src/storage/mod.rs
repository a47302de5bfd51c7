//! Storage layer
//!
//! A single SQLite table holds every ticket.

pub mod db;

pub use db::Database;
