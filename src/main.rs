use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod db;
mod dedup;
mod error;
mod models;
mod month;
mod report;
mod store;
mod timeline;

use error::EngineError;
use models::ParticipationRecord;
use store::RecordStore;

#[derive(Parser)]
#[command(name = "campaign-retention")]
#[command(about = "Editor retention metrics for photo campaign cohorts", long_about = None)]
struct Cli {
    /// Emit JSON instead of human-readable lines
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import activity events from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// List campaigns and their cohort years
    Campaigns,
    /// List projects with activity for a campaign cohort
    Projects {
        #[arg(long)]
        campaign: String,
        #[arg(long)]
        year: i32,
    },
    /// List months with activity for a campaign cohort
    Months {
        #[arg(long)]
        campaign: String,
        #[arg(long)]
        year: i32,
    },
    /// Monthly active-editor timeline from the campaign's first active month
    Timeline {
        #[arg(long)]
        campaign: String,
        #[arg(long)]
        year: i32,
        /// Number of months to include
        #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(1..))]
        horizon: u32,
        /// Restrict editor counts to a single project
        #[arg(long)]
        project: Option<String>,
    },
    /// Editor participation by country
    Countries {
        #[arg(long)]
        campaign: String,
        #[arg(long)]
        year: i32,
    },
    /// Top ten projects by active editors in one month
    TopProjects {
        #[arg(long)]
        campaign: String,
        #[arg(long)]
        year: i32,
        /// Month key such as "September-2021"
        #[arg(long)]
        month: String,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        campaign: String,
        #[arg(long)]
        year: i32,
        #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(1..))]
        horizon: u32,
        /// Month key for the project table, defaults to the first active month
        #[arg(long)]
        month: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "campaign_retention=debug"
    } else {
        "campaign_retention=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn select_participation(
    store: &RecordStore,
    campaign: &str,
    year: i32,
) -> anyhow::Result<Option<Vec<ParticipationRecord>>> {
    match store.filter(campaign, year) {
        Ok(records) => Ok(Some(dedup::deduplicate(&records))),
        Err(EngineError::EmptyResult { .. }) => {
            println!("No activity recorded for {campaign} in {year}.");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} events from {}.", csv.display());
        }
        Commands::Campaigns => {
            let store = db::load_records(&pool).await?;
            let campaigns = store.campaigns();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&campaigns)?);
            } else if campaigns.is_empty() {
                println!("No campaigns recorded.");
            } else {
                for entry in campaigns.iter() {
                    let years = entry
                        .cohort_years
                        .iter()
                        .map(i32::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!("- {} ({years})", entry.campaign);
                }
            }
        }
        Commands::Projects { campaign, year } => {
            let store = db::load_records(&pool).await?;
            let Some(participation) = select_participation(&store, &campaign, year)? else {
                return Ok(());
            };
            let projects = dedup::distinct_projects(&participation);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&projects)?);
            } else {
                for project in projects.iter() {
                    println!("- {project}");
                }
            }
        }
        Commands::Months { campaign, year } => {
            let store = db::load_records(&pool).await?;
            let Some(participation) = select_participation(&store, &campaign, year)? else {
                return Ok(());
            };
            let months = dedup::distinct_months(&participation);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&months)?);
            } else {
                for option in months.iter() {
                    println!("- {}", option.month_key);
                }
            }
        }
        Commands::Timeline {
            campaign,
            year,
            horizon,
            project,
        } => {
            let store = db::load_records(&pool).await?;
            let Some(participation) = select_participation(&store, &campaign, year)? else {
                return Ok(());
            };
            let months = dedup::month_key_index(&participation);
            let counts = aggregate::by_month(&participation, project.as_deref());
            let Some(start) = months.keys().next().cloned() else {
                println!("No activity recorded for {campaign} in {year}.");
                return Ok(());
            };
            let points = timeline::build_timeline(&counts, &months, &start, horizon as usize)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                for point in points.iter() {
                    println!("- {}: {} editors", point.month_key, point.editors_count);
                }
            }
        }
        Commands::Countries { campaign, year } => {
            let store = db::load_records(&pool).await?;
            let Some(participation) = select_participation(&store, &campaign, year)? else {
                return Ok(());
            };
            let countries = aggregate::by_country(&participation);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&countries)?);
            } else {
                for country in countries.iter() {
                    println!(
                        "- {} ({}): {} editors",
                        country.country, country.iso_code, country.editors_count
                    );
                }
            }
        }
        Commands::TopProjects {
            campaign,
            year,
            month,
        } => {
            let store = db::load_records(&pool).await?;
            let Some(participation) = select_participation(&store, &campaign, year)? else {
                return Ok(());
            };
            match aggregate::by_project(&participation, &month) {
                Ok(shares) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&shares)?);
                    } else {
                        for (rank, share) in shares.iter().enumerate() {
                            println!(
                                "{}. {}: {} editors ({:.2}%)",
                                rank + 1,
                                share.project,
                                share.editors_count,
                                share.percentage
                            );
                        }
                    }
                }
                Err(EngineError::NoDataForMonth { month_key }) => {
                    println!(
                        "No participation data for {month_key}. Run `campaign-retention months` \
                         to list available months."
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Report {
            campaign,
            year,
            horizon,
            month,
            out,
        } => {
            let store = db::load_records(&pool).await?;
            let Some(participation) = select_participation(&store, &campaign, year)? else {
                return Ok(());
            };
            let months = dedup::month_key_index(&participation);
            let counts = aggregate::by_month(&participation, None);
            let Some((start, first_month_key)) =
                months.iter().next().map(|(s, k)| (s.clone(), k.clone()))
            else {
                println!("No activity recorded for {campaign} in {year}.");
                return Ok(());
            };
            let target_month = month.unwrap_or(first_month_key);

            let points = timeline::build_timeline(&counts, &months, &start, horizon as usize)?;
            let countries = aggregate::by_country(&participation);
            let shares = match aggregate::by_project(&participation, &target_month) {
                Ok(shares) => shares,
                Err(EngineError::NoDataForMonth { month_key }) => {
                    println!(
                        "No participation data for {month_key}. Run `campaign-retention months` \
                         to list available months."
                    );
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            };

            let report = report::build_report(
                &campaign,
                year,
                &target_month,
                &points,
                &countries,
                &shares,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
