pub mod config;
pub mod decider;
pub mod dispatch;
pub mod enrich;
pub mod error;
pub mod key;
pub mod ledger;
pub mod logging;
pub mod mode_gate;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod repository;
pub mod store;
pub mod sync_service;
pub mod syncbuf;
pub mod transaction;

pub use config::Config;
pub use error::{Error, Result};
pub use transaction::{with_transaction, UnitOfWork};
