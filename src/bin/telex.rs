//! telex CLI: run the tracker web app and inspect its store.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use telex_tracker::config::secrets::ExposeSecret;
use telex_tracker::config::Config;
use telex_tracker::db::Db;
use telex_tracker::telemetry::{TelemetryConfig, init_telemetry};
use telex_tracker::tracker::Tracker;
use telex_tracker::web::{self, AppContext};

#[derive(Parser)]
#[command(name = "telex", about = "Telex work-item tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web app
    Serve {
        /// Address to listen on (overrides BIND_ADDRESS)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Create the schema and exit
    Migrate,
    /// Print every telex, newest first
    List,
    /// Write the CSV export to a file
    Export {
        /// Output path (defaults to the generated data_telex_*.csv name)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _telemetry = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "telex-tracker".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let db = Db::connect(config.database_url.expose_secret()).await?;
    db.migrate().await?;
    let tracker = Tracker::new(db);

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or(config.bind_address);
            web::serve(AppContext::new(tracker)?, bind).await?;
        }
        Command::Migrate => println!("Schema ready."),
        Command::List => cmd_list(&tracker).await?,
        Command::Export { out } => cmd_export(&tracker, out).await?,
    }

    Ok(())
}

async fn cmd_list(tracker: &Tracker) -> anyhow::Result<()> {
    let listing = tracker.list_all().await?;

    if listing.records.is_empty() {
        println!("No telexes found.");
        return Ok(());
    }

    println!(
        "{:<6}  {:<30}  {:<8}  {:<16}  {:<16}  CREATED",
        "ID", "TELEX", "STATUS", "WIDEBODY", "NARROWBODY"
    );
    println!("{}", "-".repeat(100));

    for t in &listing.records {
        let number = telex_tracker::export::single_line(&t.telex_number);
        let number: String = number.chars().take(30).collect();
        println!(
            "{:<6}  {:<30}  {:<8}  {:<16}  {:<16}  {}",
            t.id,
            number,
            t.status,
            t.assignee_widebody.as_deref().unwrap_or("-"),
            t.assignee_narrowbody.as_deref().unwrap_or("-"),
            t.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!(
        "\n{} telex(es): {} pending, {} done",
        listing.total(),
        listing.pending,
        listing.done
    );
    Ok(())
}

async fn cmd_export(tracker: &Tracker, out: Option<PathBuf>) -> anyhow::Result<()> {
    let export = tracker.export_csv(chrono::Utc::now()).await?;
    let path = out.unwrap_or_else(|| PathBuf::from(&export.filename));
    tokio::fs::write(&path, export.body.as_bytes()).await?;
    println!("Wrote {}", path.display());
    Ok(())
}
