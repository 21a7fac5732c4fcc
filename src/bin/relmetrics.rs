use std::path::PathBuf;

use clap::{Parser, Subcommand};

use relmetrics::{page_title, Config, ReportMonth, Reporter};

#[derive(Parser)]
#[command(name = "relmetrics", about = "Monthly Jira release metrics publisher")]
struct Cli {
    /// Config file path (default: ./config.yaml, then ~/.relmetrics/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report month as YYYY-MM (default: the current month)
    #[arg(long)]
    month: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect metrics and publish the monthly Confluence page
    Report {
        /// Print the rendered page body instead of publishing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Collect metrics and print the summary tables
    Preview {
        /// Print the raw collected metrics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the config and verify Jira/Confluence credentials
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let month = match &cli.month {
        Some(s) => ReportMonth::parse(s)?,
        None => ReportMonth::current(),
    };

    let reporter = Reporter::from_config(config, month)?;

    match cli.command {
        Commands::Check => {
            reporter.check().await?;
            println!("Config OK. Jira and Confluence credentials verified.");
        }
        Commands::Preview { json } => {
            reporter.authenticate().await?;
            let metrics = reporter.collect().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                let tables = reporter.tabulate(&metrics);
                for table in &tables.tables {
                    println!("{}", table.to_text());
                }
            }
        }
        Commands::Report { dry_run } => {
            if dry_run {
                reporter.authenticate().await?;
                let metrics = reporter.collect().await;
                let tables = reporter.tabulate(&metrics);
                println!("{}", reporter.render(&tables));
            } else {
                reporter.run().await?;
                println!("Published \"{}\"", page_title(reporter.month()));
            }
        }
    }

    Ok(())
}
