//! Outbound adapters (driven side).

pub mod memory;
pub mod process;
pub mod sqlite;
