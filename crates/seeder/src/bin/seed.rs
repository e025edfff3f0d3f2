use clap::{Parser, Subcommand};
use seeder::{Fixture, FixtureLoader, FixtureValidator, ensure_demo_user};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use storage::Database;
use storage::services::rating::rebuild_ratings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fishing-seed")]
#[command(about = "Fishing events database seeder", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load users, teams and events from a JSON fixture
    Fixture {
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
    /// Create the test@example.com account
    DemoUser,
    /// Recompute every rating from the rating history ledger
    RebuildRatings,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("fishing_seed={},seeder={},storage={}", log_level, log_level, log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Fixture {
            file,
            validate_only,
        } => {
            handle_fixture(file, validate_only, &cli.database_url).await?;
        }
        Commands::DemoUser => {
            let db = connect(&cli.database_url).await?;
            if !ensure_demo_user(db.pool()).await? {
                tracing::info!("Demo user already exists");
            }
        }
        Commands::RebuildRatings => {
            let db = connect(&cli.database_url).await?;
            let summary = rebuild_ratings(db.pool()).await?;
            tracing::info!(
                "Rebuilt {} user and {} team rating(s)",
                summary.users_updated,
                summary.teams_updated
            );
        }
    }

    Ok(())
}

async fn connect(database_url: &str) -> Result<Database, Box<dyn std::error::Error>> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    let db = Database::from_pool(pool);
    db.run_migrations().await?;
    Ok(db)
}

async fn handle_fixture(
    file: PathBuf,
    validate_only: bool,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Reading fixture: {}", file.display());

    let json_content = tokio::fs::read_to_string(&file).await?;
    let fixture: Fixture = serde_json::from_str(&json_content)?;

    let report = FixtureValidator::validate(&fixture)?;
    report.log_warnings();
    tracing::info!(
        "Fixture is valid: {} user(s), {} team(s), {} event(s)",
        fixture.users.len(),
        fixture.teams.len(),
        fixture.events.len()
    );

    if validate_only {
        return Ok(());
    }

    let db = connect(database_url).await?;
    let summary = FixtureLoader::new(db.pool()).load(&fixture).await?;
    tracing::info!(
        "Loaded {} user(s), {} new team(s), {} new event(s)",
        summary.users,
        summary.teams,
        summary.events
    );

    Ok(())
}
