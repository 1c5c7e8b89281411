mod api;
mod store;
mod store_db;

pub mod error;
pub use api::LedgerEngine;
pub use store::{AccountSnapshot, EngineType, LedgerSnapshot, LedgerStore};
