//! Environment configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory. Nothing here is validated: an absent
//! credential only fails once a connector tries to use it.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::services::database::traits::{Credentials, Dialect};

/// Variable naming the workbook to harvest when no path is given
pub const EXCEL_FILE_PATH: &str = "EXCEL_FILE_PATH";

/// Load `.env` into the process environment if one is found.
///
/// Variables already set in the environment win over the file.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "loaded .env");
            Some(path)
        }
        Err(_) => None,
    }
}

/// Credentials for `dialect` from `<PREFIX>_*` environment variables.
pub fn credentials_from_env(dialect: Dialect) -> Credentials {
    let credentials = Credentials::from_lookup(dialect, |key| std::env::var(key).ok());
    info!(
        dialect = %dialect,
        server = %credentials.display_name(),
        "loaded credentials"
    );
    credentials
}

/// Workbook path from `EXCEL_FILE_PATH`, if set and non-empty.
pub fn spreadsheet_path_from_env() -> Option<PathBuf> {
    std::env::var_os(EXCEL_FILE_PATH)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
