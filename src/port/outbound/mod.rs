//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies: launching the
//! deployment tool and persisting store records.

pub mod process;
pub mod store;
