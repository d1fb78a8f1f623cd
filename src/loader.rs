use crate::account::Account;
use crate::amount::Amount;
use crate::common::{Address, Coordinate};
use crate::error::Result;
use crate::registry::Accounter;

/// Read-only view of the last committed ledger state.
///
/// Validation only ever sees a `Loader`. The view may be stale with respect
/// to transactions already staged in a [`crate::context::Context`]; execution
/// re-checks sequence numbers for that reason.
pub trait Loader {
    fn chain_coord(&self) -> Coordinate;

    /// Last committed sequence number of `address` (zero if none).
    fn seq(&self, address: &Address) -> u64;

    /// Owned deep copy of the committed account.
    fn account(&self, address: &Address) -> Result<Box<dyn Account>>;

    fn balance(&self, address: &Address, coord: &Coordinate) -> Amount;

    fn accounter(&self) -> &Accounter;
}
