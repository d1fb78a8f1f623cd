use std::fs;
use std::path::Path;

use tracing::info;

use crate::amount::Amount;
use crate::common::{Address, Coordinate};
use crate::engine::{Engine, Receipt};
use crate::envelope::Block;
use crate::error::{LedgerError, Result};
use crate::loader::Loader;
use crate::registry::Registry;
use crate::state::LedgerState;
use crate::transaction::Transaction;

pub fn handle_inspect(hex_tx: &str, registry: &Registry) -> Result<()> {
    let bytes = hex::decode(hex_tx.trim())
        .map_err(|e| LedgerError::Serialization(format!("bad transaction hex: {}", e)))?;
    let tx = registry.transactions.decode_exact(&bytes)?;

    println!("Kind:  {}", registry.transactions.name_of(tx.tx_type())?);
    println!("Hash:  {}", tx.hash());
    println!("Chain: {}", tx.chain_coord());
    println!("From:  {}", tx.from());
    println!("Seq:   {}", tx.seq());
    println!("{:#?}", tx);
    Ok(())
}

/// Applies every transaction in the block file to `state`. Rejected
/// transactions are reported and skipped.
pub fn handle_apply(
    block_path: &Path,
    engine: &Engine,
    state: &mut LedgerState,
    default_fee: &Amount,
) -> Result<Vec<Receipt>> {
    let block: Block = serde_json::from_str(&fs::read_to_string(block_path)?)?;
    let txs = block.decode(&engine.registry().transactions)?;
    let fee = block.fee.as_ref().unwrap_or(default_fee);
    info!(block = %block_path.display(), txs = txs.len(), fee = %fee, "applying block");

    let receipts = engine.apply_batch(state, &txs, fee);
    for r in &receipts {
        match &r.outcome {
            Ok(Some(result)) => println!("{} committed {}", r.tx_hash, serde_json::to_string(result)?),
            Ok(None) => println!("{} committed", r.tx_hash),
            Err(e) => println!("{} rejected: {}", r.tx_hash, e),
        }
    }
    Ok(receipts)
}

pub fn handle_balance(state: &LedgerState, address: &Address, coord: &Coordinate) -> Result<()> {
    let account = state.account(address)?;
    let name = state.accounter().name_of(account.account_type())?;
    println!("Account: {} ({})", address, name);
    println!("Seq:     {}", state.seq(address));
    println!("Balance: {} at {}", state.balance(address, coord), coord);
    println!("Supply:  {}", state.balances.total_supply(coord)?);
    Ok(())
}
