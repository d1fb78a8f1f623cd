use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use tracing::info;

use super::keys::default_address;
use crate::amount::Amount;
use crate::common::{Address, Coordinate};
use crate::crypto::KeyPair;
use crate::envelope::{Block, SignedTransaction};
use crate::error::Result;
use crate::registry::Registry;
use crate::transaction::burn::{Burn, BURN};
use crate::transaction::token_issue::{TokenIssue, TOKEN_ISSUE};
use crate::transaction::transfer::{Transfer, TRANSFER};
use crate::transaction::Transaction;

#[derive(Args, Debug, Clone)]
pub struct TxArgs {
    /// Hex-encoded ed25519 secret key of the signer
    #[arg(long)]
    pub secret: String,
    /// Origin account; defaults to the address derived from the key
    #[arg(long)]
    pub from: Option<Address>,
    /// Sequence number, one above the account's last committed one
    #[arg(long)]
    pub seq: u64,
    /// Append the signed transaction to this block file
    #[arg(long)]
    pub block: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TxCommands {
    /// Remove coins from circulation
    Burn {
        #[command(flatten)]
        args: TxArgs,
        #[arg(long)]
        amount: Amount,
        #[arg(long, default_value = "0:0")]
        token_coord: Coordinate,
    },
    /// Move coins to another account
    Transfer {
        #[command(flatten)]
        args: TxArgs,
        #[arg(long)]
        to: Address,
        #[arg(long)]
        amount: Amount,
        #[arg(long, default_value = "0:0")]
        token_coord: Coordinate,
    },
    /// Pay for issuing a token (main chain only)
    Issue {
        #[command(flatten)]
        args: TxArgs,
        #[arg(long)]
        token_address: Address,
        #[arg(long)]
        height: u32,
        #[arg(long)]
        amount: Amount,
        #[arg(long, default_value = "")]
        tag: String,
    },
}

pub fn handle_tx_command(cmd: TxCommands, registry: &Registry, chain_coord: Coordinate) -> Result<()> {
    let txs = &registry.transactions;
    let (args, tx): (TxArgs, Box<dyn Transaction>) = match cmd {
        TxCommands::Burn {
            args,
            amount,
            token_coord,
        } => {
            let mut tx = Burn::new(chain_coord, txs.type_by_name(BURN)?);
            tx.token_coord = token_coord;
            tx.amount = amount;
            (args, Box::new(tx))
        }
        TxCommands::Transfer {
            args,
            to,
            amount,
            token_coord,
        } => {
            let mut tx = Transfer::new(chain_coord, txs.type_by_name(TRANSFER)?);
            tx.to = to;
            tx.token_coord = token_coord;
            tx.amount = amount;
            (args, Box::new(tx))
        }
        TxCommands::Issue {
            args,
            token_address,
            height,
            amount,
            tag,
        } => {
            let mut tx = TokenIssue::new(chain_coord, txs.type_by_name(TOKEN_ISSUE)?);
            tx.token_address = token_address;
            tx.height = height;
            tx.amount = amount;
            tx.tag = tag.into_bytes();
            (args, Box::new(tx))
        }
    };

    let signed = sign(tx, &args)?;
    let encoded = signed.to_encoded();
    println!("Hash: {}", signed.hash());
    println!("{}", serde_json::to_string_pretty(&encoded)?);

    if let Some(path) = &args.block {
        let mut block = load_block_or_default(path)?;
        block.transactions.push(encoded);
        fs::write(path, serde_json::to_string_pretty(&block)?)?;
        info!(block = %path.display(), txs = block.transactions.len(), "transaction appended");
        println!("Appended to {} ({} transactions)", path.display(), block.transactions.len());
    }
    Ok(())
}

fn sign(mut tx: Box<dyn Transaction>, args: &TxArgs) -> Result<SignedTransaction> {
    let keypair = KeyPair::from_secret_hex(&args.secret)?;
    let base = tx.base_mut();
    base.seq = args.seq;
    base.from = args
        .from
        .unwrap_or_else(|| default_address(&keypair.public_hash()));
    Ok(SignedTransaction::new(tx).signed_by(&keypair))
}

fn load_block_or_default(path: &Path) -> Result<Block> {
    if path.exists() {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    } else {
        Ok(Block::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_fills_origin_and_sequence() {
        let keypair = KeyPair::generate();
        let args = TxArgs {
            secret: keypair.secret_hex(),
            from: None,
            seq: 4,
            block: None,
        };
        let tx = Box::new(Burn::new(Coordinate::main(), crate::transaction::burn::BURN_TYPE));
        let signed = sign(tx, &args).unwrap();
        assert_eq!(signed.tx.seq(), 4);
        assert_eq!(signed.tx.from(), default_address(&keypair.public_hash()));
        assert_eq!(signed.signers().unwrap(), vec![keypair.public_hash()]);
    }

    #[test]
    fn test_transactions_accumulate_in_block_file() {
        let registry = Registry::standard().unwrap();
        let keypair = KeyPair::generate();
        let path = std::env::temp_dir().join(format!("compass-block-{}.json", std::process::id()));
        let _ = fs::remove_file(&path);

        for seq in 1..=2 {
            let cmd = TxCommands::Burn {
                args: TxArgs {
                    secret: keypair.secret_hex(),
                    from: None,
                    seq,
                    block: Some(path.clone()),
                },
                amount: "1".parse().unwrap(),
                token_coord: Coordinate::main(),
            };
            handle_tx_command(cmd, &registry, Coordinate::main()).unwrap();
        }

        let block = load_block_or_default(&path).unwrap();
        let _ = fs::remove_file(&path);
        let txs = block.decode(&registry.transactions).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[1].tx.seq(), 2);
    }
}
