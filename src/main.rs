use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::error;

use catalog_harvester::config;
use catalog_harvester::logging;
use catalog_harvester::services::database::traits::Dialect;
use catalog_harvester::services::database::{ConnectionFactory, extract_database};
use catalog_harvester::services::spreadsheet::{self, extract_spreadsheet};
use catalog_harvester::services::transform::Harvest;

/// Harvest structural metadata from a database catalog or a spreadsheet and
/// print it as JSON.
#[derive(Parser)]
#[command(name = "harvest", version, about)]
struct Cli {
    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Harvest a PostgreSQL database (PG_* variables)
    Postgres(DatabaseArgs),
    /// Harvest a MySQL database (MYSQL_* variables)
    Mysql(DatabaseArgs),
    /// Harvest an Oracle database (ORACLE_* variables)
    Oracle(DatabaseArgs),
    /// Harvest an .xlsx or .xls workbook
    Spreadsheet {
        /// Workbook path; defaults to EXCEL_FILE_PATH
        path: Option<PathBuf>,

        #[arg(long)]
        connection_qualified_name: Option<String>,
    },
}

#[derive(Args)]
struct DatabaseArgs {
    /// Root of every qualified name; defaults to default/<dialect>
    #[arg(long)]
    connection_qualified_name: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    config::load_dotenv();
    logging::init(cli.verbose);

    match smol::block_on(run(cli.command)) {
        Ok(harvest) => match print_json(&harvest, cli.pretty) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "failed to write result");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!(error = %format!("{e:#}"), "harvest failed");
            let body = ErrorBody {
                error: format!("{e:#}"),
            };
            if let Err(e) = print_json(&body, cli.pretty) {
                error!(error = %e, "failed to write error");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<Harvest> {
    match command {
        Command::Postgres(args) => harvest_database(Dialect::PostgreSQL, args).await,
        Command::Mysql(args) => harvest_database(Dialect::MySQL, args).await,
        Command::Oracle(args) => harvest_database(Dialect::Oracle, args).await,
        Command::Spreadsheet {
            path,
            connection_qualified_name,
        } => {
            let path = path
                .or_else(config::spreadsheet_path_from_env)
                .context("no workbook path given and EXCEL_FILE_PATH is not set")?;
            let connection_qualified_name = connection_qualified_name
                .unwrap_or_else(|| spreadsheet::DEFAULT_CONNECTION_QUALIFIED_NAME.to_string());

            let harvest =
                smol::unblock(move || extract_spreadsheet(&path, &connection_qualified_name))
                    .await?;
            Ok(harvest)
        }
    }
}

async fn harvest_database(dialect: Dialect, args: DatabaseArgs) -> Result<Harvest> {
    let credentials = config::credentials_from_env(dialect);
    let connector = ConnectionFactory::create(dialect)?;
    let connection_qualified_name = args
        .connection_qualified_name
        .unwrap_or_else(|| dialect.default_connection_qualified_name().to_string());

    let harvest = extract_database(connector, &credentials, &connection_qualified_name, dialect).await?;
    Ok(harvest)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
