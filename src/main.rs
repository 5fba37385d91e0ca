use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use spendx::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for spendx::AppCommand {
    fn from(cmd: Commands) -> spendx::AppCommand {
        match cmd {
            Commands::Summary => spendx::AppCommand::Summary,
            Commands::Categories => spendx::AppCommand::Categories,
            Commands::Timeline => spendx::AppCommand::Timeline,
            Commands::Monthly => spendx::AppCommand::Monthly,
            Commands::Schedule => spendx::AppCommand::Schedule,
            Commands::Rates => spendx::AppCommand::Rates,
            Commands::Insights => spendx::AppCommand::Insights,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display income, expenses and the full transaction list
    Summary,
    /// Display spending grouped by category
    Categories,
    /// Display daily income and expense totals
    Timeline,
    /// Display monthly totals and savings rate
    Monthly,
    /// Display spending by time of day
    Schedule,
    /// Display the latest exchange rate table
    Rates,
    /// Display AI budgeting insights
    Insights,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => spendx::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = spendx::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
base_currency: "USD"

# Path to a JSON export of transactions
transactions: "transactions.json"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
