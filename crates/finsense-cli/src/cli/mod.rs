//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use finsense_core::api::ApiClient;
use finsense_core::config::Config;

mod commands;

#[derive(Parser)]
#[command(name = "finsense")]
#[command(version = "0.1")]
#[command(about = "FinSense terminal client: financial Q&A and budget forecasting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account and sign in
    Register {
        /// Email address (prompted when omitted)
        #[arg(long)]
        email: Option<String>,

        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,

        /// Full name (prompted when omitted)
        #[arg(long = "full-name")]
        full_name: Option<String>,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the signed-in profile
    Whoami,

    /// Ask the assistant (interactive chat when no question is given)
    Chat {
        /// One-shot question; omit for interactive mode
        question: Option<String>,
    },

    /// Budget forecasting from transaction statements
    Budget {
        #[command(subcommand)]
        command: BudgetCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum BudgetCommands {
    /// Upload statements and generate a forecast
    Predict {
        /// Transaction statement files (.xlsx)
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Monthly income
        #[arg(long)]
        income: String,

        /// Savings target
        #[arg(long)]
        savings: String,

        /// Where to write the forecast chart (default: budget_forecast.png)
        #[arg(long, value_name = "PATH")]
        chart: Option<PathBuf>,
    },

    /// Download a spreadsheet produced by the last forecast
    Download {
        /// The per-transaction classification spreadsheet
        #[arg(long)]
        classification: bool,

        /// The budget forecast spreadsheet
        #[arg(long)]
        budget: bool,

        /// Output path override
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set the backend base URL
    SetUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    finsense_core::logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;

    // default to chat mode
    let Some(command) = cli.command else {
        let client = ApiClient::new(&config).context("create API client")?;
        return commands::chat::run(&client, None).await;
    };

    match command {
        Commands::Login { username, password } => {
            let client = ApiClient::new(&config)?;
            commands::auth::login(&client, username.as_deref(), password.as_deref()).await
        }

        Commands::Register {
            email,
            username,
            full_name,
            password,
        } => {
            let client = ApiClient::new(&config)?;
            commands::auth::register(
                &client,
                email.as_deref(),
                username.as_deref(),
                full_name.as_deref(),
                password.as_deref(),
            )
            .await
        }

        Commands::Logout => commands::auth::logout(),

        Commands::Whoami => {
            let client = ApiClient::new(&config)?;
            commands::auth::whoami(&client).await
        }

        Commands::Chat { question } => {
            let client = ApiClient::new(&config)?;
            commands::chat::run(&client, question.as_deref()).await
        }

        Commands::Budget { command } => {
            let client = ApiClient::new(&config)?;
            match command {
                BudgetCommands::Predict {
                    files,
                    income,
                    savings,
                    chart,
                } => {
                    commands::budget::predict(&client, &files, &income, &savings, chart.as_deref())
                        .await
                }
                BudgetCommands::Download {
                    classification,
                    budget,
                    output,
                } => commands::budget::download(&client, classification, budget, output).await,
            }
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetUrl { url } => commands::config::set_url(&url),
        },
    }
}
