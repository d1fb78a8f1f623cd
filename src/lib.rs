pub mod account;
pub mod amount;
pub mod cli;
pub mod common;
pub mod config;
pub mod context;
pub mod crypto;
pub mod encoding;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod genesis;
pub mod loader;
pub mod registry;
pub mod state;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testing;

pub use amount::Amount;
pub use common::{Address, Coordinate, Hash256, PublicHash};
pub use context::{Context, StateDiff};
pub use engine::{Engine, Receipt};
pub use envelope::{Block, SignedTransaction};
pub use error::{ErrorKind, LedgerError, Result};
pub use loader::Loader;
pub use registry::Registry;
pub use state::LedgerState;
