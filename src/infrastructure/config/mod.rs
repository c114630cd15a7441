//! Infrastructure configuration modules.

pub mod deploy;
pub mod logging;
pub mod server;
pub mod settings;
