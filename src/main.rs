//! suiforge - NFT mint/deploy client for a Sui fullnode
//!
//! Command-line front end over the library: builds typed transaction
//! intents, submits them through the local `sui` CLI wallet, resolves the
//! created object id from the transaction's effects, and runs read-only
//! queries (balance, owned objects) against the fullnode.

// Compiler warning configuration
#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(dead_code)]
#![warn(unused_must_use)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use suiforge::cli_wallet::SuiCliWallet;
use suiforge::config::Config;
use suiforge::intent::{build_move_call, build_publish, CallArg, MoveTarget, TransactionIntent};
use suiforge::resolver::{ResolutionAttempt, ResolutionState};
use suiforge::rpc::LedgerClient;
use suiforge::security::validator;
use suiforge::submit::{execute_and_resolve, ExecutedAction, SubmissionError};
use suiforge::types::{NetworkId, ObjectId, SuiAddress};
use suiforge::wallet::{WalletKey, WalletSession};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Target network (devnet, testnet, mainnet); overrides the config
    #[arg(short, long)]
    network: Option<NetworkId>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Publish the NFT package; the upgrade capability is transferred back
    /// to the publishing account in the same transaction
    Deploy {
        /// Move package directory (expects build/<name>/bytecode_modules/*.mv)
        #[arg(long)]
        package_dir: PathBuf,

        /// Gas ceiling; defaults to the configured budget
        #[arg(long)]
        gas_budget: Option<u64>,
    },

    /// Mint a GameNFT
    Mint {
        /// Package id of the deployed basic_nft module
        #[arg(long)]
        package: String,

        #[arg(long, default_value = "My Hero NFT")]
        name: String,

        #[arg(long, default_value = "A powerful hero for the hackathon")]
        description: String,

        #[arg(long, default_value = "https://example.com/hero.png")]
        image_url: String,

        #[arg(long, default_value_t = 1)]
        level: u64,

        #[arg(long, default_value_t = 100)]
        power: u64,

        /// Rarity, 1 (common) to 4 (legendary)
        #[arg(long, default_value_t = 4)]
        rarity: u64,

        #[arg(long)]
        gas_budget: Option<u64>,
    },

    /// Level up an owned NFT
    LevelUp {
        #[arg(long)]
        package: String,

        /// Object id of the NFT
        #[arg(long)]
        nft: String,

        #[arg(long)]
        gas_budget: Option<u64>,
    },

    /// Transfer an owned NFT to another address
    Transfer {
        #[arg(long)]
        package: String,

        #[arg(long)]
        nft: String,

        #[arg(long)]
        recipient: String,

        #[arg(long)]
        gas_budget: Option<u64>,
    },

    /// Show the active account's balance
    Balance {
        /// Address to query; defaults to the CLI wallet's active address
        #[arg(long)]
        address: Option<String>,
    },

    /// List GameNFTs owned by an address
    Objects {
        #[arg(long)]
        package: String,

        #[arg(long)]
        address: Option<String>,
    },

    /// Derive the account address from the private key in the configured
    /// environment variable; the key itself is never printed or logged
    ImportKey,

    /// Re-run resolution for an already submitted digest
    Resolve {
        #[arg(long)]
        digest: String,

        /// Sender to exclude from fallback candidates; defaults to the CLI
        /// wallet's active address
        #[arg(long)]
        sender: Option<String>,

        /// Known package ids to exclude from fallback candidates
        #[arg(long)]
        known_package: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    info!("🎮 suiforge {}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(&args.config)?;
    if let Some(network) = args.network {
        config.network.name = network;
    }
    let network = config.network.name;
    info!("🌐 Network: {}", network);

    let client = LedgerClient::new(
        config.network.effective_fullnode_url(),
        config.rpc.timeout(),
        config.rpc.retry_policy(),
    )
    .context("Failed to build fullnode client")?;

    match args.command {
        CliCommand::Deploy {
            package_dir,
            gas_budget,
        } => {
            let modules = load_bytecode_modules(&package_dir)?;
            info!("📦 Loaded {} bytecode module(s)", modules.len());

            let wallet = SuiCliWallet::new().with_publish_source(package_dir);
            let (session, binding) = connect(&wallet).await?;

            let intent = build_publish(
                binding.address().clone(),
                modules,
                Vec::new(),
                Some(gas_budget.unwrap_or(config.gas.default_budget)),
            )?;

            let action = run_flow(&wallet, &client, &session, &binding, intent, network, &config)
                .await?;
            report_outcome(&action, "package");
        }

        CliCommand::Mint {
            package,
            name,
            description,
            image_url,
            level,
            power,
            rarity,
            gas_budget,
        } => {
            // Domain range check belongs here, not in the builder
            if !(1..=4).contains(&rarity) {
                bail!("Rarity must be between 1 and 4, got {}", rarity);
            }

            let package = validator::validate_address(&package)?;
            let target = MoveTarget::new(package.clone(), "basic_nft", "mint_game_nft")?;
            info!("🎨 Minting '{}' (rarity {})", name, rarity);

            let wallet = SuiCliWallet::new();
            let (session, binding) = connect(&wallet).await?;

            let intent = build_move_call(
                binding.address().clone(),
                target,
                vec![
                    CallArg::str(name),
                    CallArg::str(description),
                    CallArg::str(image_url),
                    CallArg::u64(level),
                    CallArg::u64(power),
                    CallArg::u8_checked(rarity)?,
                ],
                Some(gas_budget.unwrap_or(config.gas.default_budget)),
            )?;

            let action = run_flow_known(
                &wallet,
                &client,
                &session,
                &binding,
                intent,
                network,
                &config,
                [package].into_iter().collect(),
            )
            .await?;
            report_outcome(&action, "NFT");
        }

        CliCommand::LevelUp {
            package,
            nft,
            gas_budget,
        } => {
            let package = validator::validate_address(&package)?;
            let nft = validator::validate_address(&nft)?;
            let target = MoveTarget::new(package.clone(), "basic_nft", "level_up")?;
            info!("⬆️ Leveling up {}", nft);

            let wallet = SuiCliWallet::new();
            let (session, binding) = connect(&wallet).await?;

            let intent = build_move_call(
                binding.address().clone(),
                target,
                vec![CallArg::object(nft)],
                Some(gas_budget.unwrap_or(config.gas.default_budget)),
            )?;

            let action = run_flow_known(
                &wallet,
                &client,
                &session,
                &binding,
                intent,
                network,
                &config,
                [package].into_iter().collect(),
            )
            .await?;
            report_outcome(&action, "NFT");
        }

        CliCommand::Transfer {
            package,
            nft,
            recipient,
            gas_budget,
        } => {
            let package = validator::validate_address(&package)?;
            let nft = validator::validate_address(&nft)?;
            let recipient = validator::validate_address(&recipient)?;
            let target = MoveTarget::new(package.clone(), "basic_nft", "transfer_nft")?;
            info!("📤 Transferring {} to {}", nft, recipient);

            let wallet = SuiCliWallet::new();
            let (session, binding) = connect(&wallet).await?;

            let intent = build_move_call(
                binding.address().clone(),
                target,
                vec![CallArg::object(nft), CallArg::address(recipient)],
                Some(gas_budget.unwrap_or(config.gas.default_budget)),
            )?;

            let action = run_flow_known(
                &wallet,
                &client,
                &session,
                &binding,
                intent,
                network,
                &config,
                [package].into_iter().collect(),
            )
            .await?;
            report_outcome(&action, "NFT");
        }

        CliCommand::Balance { address } => {
            let owner = resolve_owner(address, &SuiCliWallet::new()).await?;
            let balance = client.get_balance(&owner).await?;
            // Base units to whole coins, 9 decimals
            let sui = balance as f64 / 1_000_000_000.0;
            println!("💰 Balance of {}: {:.4} SUI", owner, sui);
        }

        CliCommand::Objects { package, address } => {
            let package = validator::validate_address(&package)?;
            let owner = resolve_owner(address, &SuiCliWallet::new()).await?;
            let nft_type = format!("{}::basic_nft::GameNFT", package);

            let summaries = client.get_owned_objects(&owner, Some(&nft_type)).await?;
            println!("📊 {} owns {} GameNFT(s)", owner, summaries.len());

            // Detail lookups are independent reads; fire them concurrently
            let details = join_all(
                summaries
                    .iter()
                    .map(|summary| client.get_object(&summary.object_id)),
            )
            .await;

            for (summary, detail) in summaries.iter().zip(details) {
                match detail {
                    Ok(content) => {
                        let display = content
                            .pointer("/content/fields/name")
                            .and_then(serde_json::Value::as_str)
                            .unwrap_or("<unnamed>");
                        println!("  🎨 {} ({})", summary.object_id, display);
                    }
                    Err(e) => warn!(object_id = %summary.object_id, error = %e, "Detail fetch failed"),
                }
            }
        }

        CliCommand::ImportKey => {
            let var = &config.wallet.key_env;
            let raw = std::env::var(var)
                .with_context(|| format!("Environment variable {} is not set", var))?;

            let key = if raw.trim().starts_with("suiprivkey") {
                WalletKey::from_bech32(&raw)
            } else {
                WalletKey::from_base64(&raw)
            }
            .map_err(|e| anyhow::anyhow!("Key import failed: {}", e))?;

            println!("🔑 Imported account: {}", key.address());

            if let Some(expected) = &config.wallet.expected_address {
                if !key.matches(expected) {
                    warn!("Imported address does not match the expected address");
                    warn!("Expected: {}", expected);
                    warn!("Got: {}", key.address());
                }
            }
        }

        CliCommand::Resolve {
            digest,
            sender,
            known_package,
        } => {
            let digest = validator::validate_digest(&digest)?;
            let sender = resolve_owner(sender, &SuiCliWallet::new()).await?;
            let known: HashSet<ObjectId> = known_package
                .iter()
                .map(|s| validator::validate_address(s))
                .collect::<Result<_>>()?;

            let mut attempt =
                ResolutionAttempt::new(digest, sender, config.resolver.to_resolver_config())
                    .with_known_packages(known);

            // Manual invocation skips the visibility delay
            let state = attempt.retry(&client).await.clone();
            print_resolution(&state, "entity");
        }
    }

    Ok(())
}

/// Connect the wallet session to the CLI's active account.
async fn connect(
    wallet: &SuiCliWallet,
) -> Result<(WalletSession, suiforge::wallet::SessionBinding)> {
    let address = wallet
        .active_address()
        .await
        .context("Failed to read the active address from the sui CLI")?;
    let mut session = WalletSession::new();
    let binding = session.connect(address);
    info!("🔑 Active account: {}", binding.address());
    Ok((session, binding))
}

async fn run_flow(
    wallet: &SuiCliWallet,
    client: &LedgerClient,
    session: &WalletSession,
    binding: &suiforge::wallet::SessionBinding,
    intent: TransactionIntent,
    network: NetworkId,
    config: &Config,
) -> Result<ExecutedAction> {
    run_flow_known(
        wallet,
        client,
        session,
        binding,
        intent,
        network,
        config,
        HashSet::new(),
    )
    .await
}

#[allow(clippy::too_many_arguments)]
async fn run_flow_known(
    wallet: &SuiCliWallet,
    client: &LedgerClient,
    session: &WalletSession,
    binding: &suiforge::wallet::SessionBinding,
    intent: TransactionIntent,
    network: NetworkId,
    config: &Config,
    known_packages: HashSet<ObjectId>,
) -> Result<ExecutedAction> {
    let result = execute_and_resolve(
        wallet,
        client,
        session,
        binding,
        intent,
        network,
        config.resolver.to_resolver_config(),
        known_packages,
    )
    .await;

    match result {
        Ok(action) => Ok(action),
        Err(SubmissionError::Rejected) => {
            bail!("Transaction rejected by user")
        }
        Err(SubmissionError::InsufficientGas(msg)) => {
            bail!(
                "Insufficient gas: {}. Get test tokens at https://faucet.sui.io",
                msg
            )
        }
        Err(err) => Err(err).context("Submission failed"),
    }
}

/// Print the outcome of a submit/resolve sequence. Every terminal state gets
/// distinct text: "succeeded but identifier unknown" is not "failed".
fn report_outcome(action: &ExecutedAction, entity: &str) {
    println!("📋 Transaction: {}", action.digest);
    println!("🔗 Explorer: {}", action.explorer_url);
    print_resolution(&action.resolution, entity);
}

fn print_resolution(state: &ResolutionState, entity: &str) {
    match state {
        ResolutionState::Resolved(id) => {
            println!("✅ Created {}: {}", entity, id);
        }
        ResolutionState::Unresolved => {
            println!(
                "⚠️ Transaction succeeded, but the new {} id could not be determined. \
                 Check the explorer link and supply the id manually.",
                entity
            );
        }
        ResolutionState::FetchFailed(err) => {
            println!(
                "❌ Could not fetch effects ({}). The transaction may still have succeeded; \
                 retry with: suiforge resolve --digest <digest>",
                err
            );
        }
        ResolutionState::Pending | ResolutionState::Fetching => {
            println!(
                "⚠️ Resolution skipped (wallet connection changed). \
                 Retry with: suiforge resolve --digest <digest>"
            );
        }
    }
}

async fn resolve_owner(address: Option<String>, wallet: &SuiCliWallet) -> Result<SuiAddress> {
    match address {
        Some(s) => validator::validate_address(&s),
        None => wallet
            .active_address()
            .await
            .context("No address given and the sui CLI has no active address"),
    }
}

/// Read compiled bytecode modules from a Move build directory.
fn load_bytecode_modules(package_dir: &Path) -> Result<Vec<Vec<u8>>> {
    let build_dir = package_dir.join("build");
    if !build_dir.exists() {
        bail!(
            "No build directory under {}. Run `sui move build` first.",
            package_dir.display()
        );
    }

    let mut modules = Vec::new();
    for entry in std::fs::read_dir(&build_dir)? {
        let bytecode_dir = entry?.path().join("bytecode_modules");
        if !bytecode_dir.is_dir() {
            continue;
        }
        for module in std::fs::read_dir(&bytecode_dir)? {
            let path = module?.path();
            if path.extension().is_some_and(|ext| ext == "mv") {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                modules.push(bytes);
            }
        }
    }

    if modules.is_empty() {
        bail!(
            "No .mv modules found under {}. Run `sui move build` first.",
            build_dir.display()
        );
    }
    Ok(modules)
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "suiforge=debug,info"
    } else {
        "suiforge=info,warn,error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        warn!("Config file '{}' not found, using defaults", path);
        Ok(Config::default())
    }
}
