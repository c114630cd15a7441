//! Store records: creation, lookup, retry and deletion.

mod service;

pub use service::StoreService;
