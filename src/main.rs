use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use compass_ledger::cli::{keys, ops, tx, Cli, Commands};
use compass_ledger::config::LedgerConfig;
use compass_ledger::genesis::GenesisConfig;
use compass_ledger::{Engine, LedgerState, Loader, Registry, Result};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let (config, source) = LedgerConfig::load_or_default(&cli.config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.node.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    LedgerConfig::describe(&cli.config, &source);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &LedgerConfig) -> Result<()> {
    let registry = Arc::new(Registry::standard()?);
    let chain_coord = config.chain.coord;

    match command {
        Commands::Keygen => keys::handle_keygen(),
        Commands::Tx { cmd } => tx::handle_tx_command(cmd, &registry, chain_coord),
        Commands::Inspect { hex } => ops::handle_inspect(&hex, &registry),
        Commands::Balance { address, coord } => {
            let state = load_state(config, registry)?;
            ops::handle_balance(&state, &address, &coord)
        }
        Commands::Apply { block } => {
            let mut state = load_state(config, registry.clone())?;
            let engine = Engine::new(registry);
            ops::handle_apply(&block, &engine, &mut state, &config.fees.base_fee)?;
            save_state(config, &state)
        }
    }
}

/// Saved state when there is one, otherwise the genesis state.
fn load_state(config: &LedgerConfig, registry: Arc<Registry>) -> Result<LedgerState> {
    let state_path = Path::new(&config.node.state_path);
    if state_path.exists() {
        let state = LedgerState::load_from_file(state_path, registry)?;
        if state.chain_coord() != config.chain.coord {
            warn!(
                "state at {} is for chain {}, config says {}",
                state_path.display(),
                state.chain_coord(),
                config.chain.coord
            );
        }
        return Ok(state);
    }

    info!("No state at {}, starting from genesis {}", state_path.display(), config.node.genesis);
    GenesisConfig::load(&config.node.genesis)?.build(config.chain.coord, registry)
}

fn save_state(config: &LedgerConfig, state: &LedgerState) -> Result<()> {
    let state_path = Path::new(&config.node.state_path);
    if let Some(dir) = state_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    state.save_to_file(state_path)
}
