mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::Context;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "poolchem",
    version,
    about = "Pool chemistry rule editor and daily reading log"
)]
struct Cli {
    /// Configuration file (default: poolchem.toml in the working directory)
    #[arg(short, long, global = true, env = "POOLCHEM_CONFIG")]
    config: Option<PathBuf>,

    /// Store file (overrides store_path from the config)
    #[arg(long, global = true, env = "POOLCHEM_STORE", value_name = "FILE")]
    store: Option<PathBuf>,

    /// Output format: table (default) or json
    #[arg(short, long, global = true, default_value = "table")]
    output: String,

    /// Log level
    #[arg(long, global = true, env = "POOLCHEM_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true, env = "POOLCHEM_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage pool documents and their rules
    Pools {
        #[command(subcommand)]
        action: PoolsAction,
    },
    /// Inspect and install the bundled reference pools
    Presets {
        #[command(subcommand)]
        action: PresetsAction,
    },
    /// Record a chemistry reading and show the guidance for it
    Submit {
        #[arg(long)]
        staff: String,

        #[arg(long)]
        market: String,

        /// Pool document id or name
        #[arg(long)]
        pool: String,

        /// Which pool at the site (1-based)
        #[arg(long, default_value_t = 1)]
        pool_number: usize,

        /// Sanitation method: bleach or granular
        #[arg(long, default_value = "bleach")]
        method: String,

        #[arg(long)]
        ph: Decimal,

        /// Free chlorine (ppm)
        #[arg(long)]
        cl: Decimal,

        #[arg(long)]
        notes: Option<String>,
    },
    /// Browse and export recorded readings
    Submissions {
        #[command(subcommand)]
        action: SubmissionsAction,
    },
    /// Sign up for a training session
    Signup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        market: String,

        #[arg(long)]
        session: String,
    },
    /// Inspect training signups
    Signups {
        #[command(subcommand)]
        action: SignupsAction,
    },
}

#[derive(Subcommand)]
enum PoolsAction {
    /// List stored pools
    List,
    /// Show one pool's rules
    Show {
        /// Pool id or name
        id: String,
    },
    /// Validate a pool document file
    Validate {
        /// Path to JSON pool document
        file: PathBuf,
    },
    /// Store a pool document file
    Import {
        /// Path to JSON pool document
        file: PathBuf,

        /// Key to store under (default: the document's id, else its name)
        #[arg(long)]
        id: Option<String>,
    },
    /// Create a pool from the reference pool's rules
    New {
        #[arg(long)]
        name: String,

        /// Number of pools at the site (1-5)
        #[arg(long)]
        count: Option<usize>,

        /// Market(s) served; repeat for several
        #[arg(long = "market", value_name = "MARKET")]
        markets: Vec<String>,
    },
    /// Delete a stored pool
    Delete {
        id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum PresetsAction {
    /// List bundled reference pools
    List,
    /// Print a reference pool's rules
    Explain { name: String },
    /// Store a reference pool as the one new pools are cloned from
    Install { name: String },
}

#[derive(Subcommand)]
enum SignupsAction {
    /// List every signup
    List,
}

#[derive(Subcommand)]
enum SubmissionsAction {
    /// Show one page of readings, newest first
    List {
        #[command(flatten)]
        filter: commands::submissions::FilterArgs,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Write filtered readings as CSV
    Export {
        #[command(flatten)]
        filter: commands::submissions::FilterArgs,

        /// Output file (default: stdout)
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn init_logging(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json);

    let ctx = match Context::load(cli.config.as_deref(), cli.store, &cli.output) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Pools { action } => match action {
            PoolsAction::List => commands::pools::list(&ctx).await,
            PoolsAction::Show { id } => commands::pools::show(&ctx, &id).await,
            PoolsAction::Validate { file } => commands::pools::validate(&file),
            PoolsAction::Import { file, id } => commands::pools::import(&ctx, &file, id).await,
            PoolsAction::New {
                name,
                count,
                markets,
            } => commands::pools::create(&ctx, &name, count, markets).await,
            PoolsAction::Delete { id, yes } => commands::pools::delete(&ctx, &id, yes).await,
        },
        Commands::Presets { action } => match action {
            PresetsAction::List => commands::presets::list(),
            PresetsAction::Explain { name } => commands::presets::explain(&ctx, &name),
            PresetsAction::Install { name } => commands::presets::install(&ctx, &name).await,
        },
        Commands::Submit {
            staff,
            market,
            pool,
            pool_number,
            method,
            ph,
            cl,
            notes,
        } => {
            let reading = commands::submissions::Reading {
                staff,
                market,
                pool,
                pool_number,
                method,
                ph,
                cl,
                notes,
            };
            commands::submissions::submit(&ctx, reading).await
        }
        Commands::Submissions { action } => match action {
            SubmissionsAction::List { filter, page } => {
                commands::submissions::list(&ctx, filter, page).await
            }
            SubmissionsAction::Export { filter, out } => {
                commands::submissions::export(&ctx, filter, out).await
            }
        },
        Commands::Signup {
            name,
            email,
            market,
            session,
        } => commands::signups::signup(&ctx, name, email, market, session).await,
        Commands::Signups { action } => match action {
            SignupsAction::List => commands::signups::list(&ctx).await,
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
