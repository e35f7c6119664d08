use clap::{Parser, Subcommand};
use estate_ledger::contract::{ContractConfig, RealEstateContract, FUNCTIONS};
use estate_ledger::gateway::{Gateway, GatewayConfig};
use estate_ledger::identity::{SigningIdentity, DEFAULT_MSP_ID};
use estate_ledger::ledger::WorldState;
use estate_ledger::model::TransitionPolicy;
use estate_ledger::storage::{LedgerStore, StoreConfig};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "estate")]
#[command(about = "Real-estate marketplace ledger.")]
struct CommandLine {
    /// Directory holding the ledger database
    #[arg(long, default_value = "estate-data")]
    data_dir: PathBuf,

    /// Username to act as; its signing key is created on first use
    #[arg(long, default_value = "admin")]
    user: String,

    #[arg(long, default_value = DEFAULT_MSP_ID)]
    msp_id: String,

    /// Only decide representations that are still pending or invited
    #[arg(long)]
    strict_transitions: bool,

    /// Resubmissions after a read conflict
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate queries and submit everything else
    #[command(alias = "i")]
    Invoke {
        function: String,
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run an entry point without committing
    #[command(alias = "e")]
    Evaluate {
        function: String,
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run an entry point and wait for the commit
    #[command(alias = "s")]
    Submit {
        function: String,
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List entry points
    Functions,
    /// Show ledger statistics
    Info,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn format_json(payload: &[u8]) -> Result<String, serde_json::Error> {
    if payload.is_empty() {
        return Ok(String::new());
    }
    let value: serde_json::Value = serde_json::from_slice(payload)?;
    serde_json::to_string_pretty(&value)
}

async fn run(cli: CommandLine) -> Result<(), Box<dyn Error>> {
    let store = Arc::new(LedgerStore::open_with_config(&StoreConfig::new(&cli.data_dir))?);

    if let Commands::Info = cli.command {
        let stats = store.stats()?;
        println!("keys:   {}", stats.key_count);
        println!("height: {}", stats.height);
        println!("disk:   {} bytes", stats.disk_size_bytes);
        return Ok(());
    }
    if let Commands::Functions = cli.command {
        for function in FUNCTIONS {
            println!("{}", function);
        }
        return Ok(());
    }

    let keypair = store.get_or_create_keypair(&cli.user)?;
    let signer = SigningIdentity::new(&cli.msp_id, &cli.user, keypair);

    let policy = if cli.strict_transitions {
        TransitionPolicy::Strict
    } else {
        TransitionPolicy::Permissive
    };
    let contract = RealEstateContract::new(ContractConfig::new().with_transition_policy(policy));
    let config = GatewayConfig::new().with_max_commit_retries(cli.max_retries);

    let world: Arc<dyn WorldState> = store.clone();
    let gateway = Gateway::connect(world, Arc::new(contract), signer, config)?;

    match cli.command {
        Commands::Invoke { function, args } => {
            let payload = gateway.invoke(&function, &args).await?;
            println!("{}", format_json(&payload)?);
        }
        Commands::Evaluate { function, args } => {
            let payload = gateway.evaluate(&function, &args)?;
            println!("{}", format_json(&payload)?);
        }
        Commands::Submit { function, args } => {
            let result = gateway.submit(&function, &args).await?;
            println!(
                "committed {} at height {} ({} attempt(s))",
                result.tx_id, result.height, result.attempts
            );
            let formatted = format_json(&result.payload)?;
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
        }
        Commands::Functions | Commands::Info => {}
    }

    store.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = CommandLine::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}
