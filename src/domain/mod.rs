//! Core domain types and logic.

pub mod order;
pub mod trade;
pub mod matcher;
pub mod stats;
pub mod import;
pub mod error;
