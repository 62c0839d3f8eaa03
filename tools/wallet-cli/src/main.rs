//! Command-line front end for the wallet engine.

mod output;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use wallet_core::{init_logging, WalletConfig, WalletSession, WordCount};

/// Litecoin-first non-custodial wallet.
#[derive(Parser)]
#[command(name = "ltc-wallet", version, about)]
struct Cli {
    /// Output in JSON format.
    #[arg(long, global = true)]
    json: bool,

    /// JSON config file, applied before `LTC_WALLET_*` variables.
    #[arg(long, global = true, env = "LTC_WALLET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new wallet and store it.
    Create {
        /// 12 or 24.
        #[arg(long, default_value = "12")]
        words: usize,
    },
    /// Import an existing recovery phrase.
    Import {
        #[arg(env = "LTC_WALLET_MNEMONIC", hide_env_values = true)]
        phrase: String,
    },
    /// Show the receive address of every supported coin.
    Addresses,
    /// Refresh once and print balance, price and recent history.
    Status,
    /// Keep refreshing in the background and print every change.
    Sync {
        /// Stop after this many updates.
        #[arg(long, default_value = "10")]
        updates: usize,
    },
    /// Current network fee for a standard transaction.
    Fee,
    /// Send coins to an address.
    Send {
        to: String,
        /// Amount in coins, e.g. 0.015.
        amount: String,
        /// Wait for the first confirmation.
        #[arg(long)]
        wait: bool,
    },
    /// List recovery words starting with a prefix.
    Words { prefix: String },
    /// Stop, forget the wallet and delete its store.
    Logout,
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli).await {
        output::print_error(&e, json);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<WalletConfig> {
    let base = match path {
        Some(path) => WalletConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => WalletConfig::default(),
    };
    let config = base.overlay_env(|key| std::env::var(key).ok())?;
    debug!(coin = %config.primary_coin, store = %config.store_path.display(), "config loaded");
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    let config = load_config(cli.config.as_ref())?;
    let mut session = WalletSession::new(config)?;

    match cli.command {
        Commands::Create { words } => {
            let words = WordCount::try_from(words)?;
            let identity = session.create(words).await?;
            output::print_identity(identity, true, json);
        }
        Commands::Import { phrase } => {
            let identity = session.import(&phrase).await?;
            output::print_identity(identity, false, json);
        }
        Commands::Words { prefix } => {
            output::print_words(&wallet_core::mnemonic::words_with_prefix(&prefix), json);
        }
        Commands::Addresses => {
            restore(&mut session).await?;
            let identity = session.identity().context("wallet not loaded")?;
            output::print_identity(identity, false, json);
        }
        Commands::Status => {
            restore(&mut session).await?;
            session.refresh().await?;
            output::print_snapshot(&session.snapshot(), session.coin(), json);
        }
        Commands::Sync { updates } => {
            restore(&mut session).await?;
            let mut rx = session.subscribe().context("wallet not loaded")?;
            session.start_sync()?;
            for _ in 0..updates {
                rx.changed().await?;
                let snapshot = rx.borrow_and_update().clone();
                output::print_snapshot(&snapshot, session.coin(), json);
            }
            session.stop_sync().await;
        }
        Commands::Fee => {
            let fee = session.estimate_fee().await;
            output::print_fee(&fee, session.coin(), json);
        }
        Commands::Send { to, amount, wait } => {
            restore(&mut session).await?;
            let sats = chain_data::parse_coin_amount(&amount)?;
            if sats <= 0 {
                bail!("amount must be positive");
            }
            let receipt = session.send(&to, sats as u64).await?;
            output::print_receipt(&receipt, session.coin(), json);
            if wait {
                let status = session.wait_for_confirmation(&receipt.txid).await;
                output::print_confirmation(&receipt.txid, &status, json);
                if !status.confirmed {
                    let waited = session.config().confirmation_poll_interval
                        * session.config().confirmation_max_polls;
                    bail!("not confirmed after {}s", waited.as_secs());
                }
            }
        }
        Commands::Logout => {
            session.restore().await?;
            session.logout().await?;
            output::print_message("wallet removed", json);
        }
    }

    Ok(())
}

async fn restore(session: &mut WalletSession) -> Result<()> {
    if !session.restore().await? {
        bail!(
            "no wallet at {}; run `create` or `import` first",
            session.config().store_path.display()
        );
    }
    Ok(())
}
