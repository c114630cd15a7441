//! Command-line front end.

pub mod command;
pub mod output;
pub mod run;
pub mod serve;
pub mod store;
