//! Dialect definitions and connection credentials.
//!
//! This module contains:
//! - `Dialect` - Enum of supported database dialects
//! - `Credentials` - Connection parameters handed to a connector

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{HarvestError, HarvestResult};

/// Supported database dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    PostgreSQL,
    MySQL,
    Oracle,
}

impl Dialect {
    /// Get the display name for this dialect
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
            Self::Oracle => "Oracle",
        }
    }

    /// Prefix of the environment variables holding this dialect's credentials
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "PG",
            Self::MySQL => "MYSQL",
            Self::Oracle => "ORACLE",
        }
    }

    /// Connection-qualified name used when the caller does not supply one
    pub fn default_connection_qualified_name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "default/postgresql",
            Self::MySQL => "default/mysql",
            Self::Oracle => "default/oracle",
        }
    }

    /// Get all supported dialects
    pub fn all() -> Vec<Dialect> {
        vec![Self::PostgreSQL, Self::MySQL, Self::Oracle]
    }

    /// Lower-case tag, also used as the transformer's connector name
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "postgresql",
            Self::MySQL => "mysql",
            Self::Oracle => "oracle",
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Self::PostgreSQL),
            "mysql" | "mariadb" => Ok(Self::MySQL),
            "oracle" => Ok(Self::Oracle),
            other => Err(format!("unsupported dialect: {other}")),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Connection parameters for one extraction request.
///
/// Every field is optional on purpose: nothing is validated when the
/// credentials are loaded, so an absent value only shows up as a connection
/// failure once a connector tries to use it.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub user: Option<String>,
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub database: Option<String>,
    /// Oracle service name, used in place of `database`
    pub service_name: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("service_name", &self.service_name)
            .finish()
    }
}

impl Credentials {
    /// Build credentials for `dialect` from a key lookup.
    ///
    /// Keys are `<PREFIX>_USER`, `<PREFIX>_PASSWORD`, `<PREFIX>_HOST`,
    /// `<PREFIX>_PORT`, `<PREFIX>_DATABASE`, plus `ORACLE_SERVICE` for Oracle.
    pub fn from_lookup<F>(dialect: Dialect, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = dialect.env_prefix();
        let var = |suffix: &str| lookup(&format!("{prefix}_{suffix}"));

        Self {
            user: var("USER"),
            password: var("PASSWORD"),
            host: var("HOST"),
            port: var("PORT"),
            database: var("DATABASE"),
            service_name: match dialect {
                Dialect::Oracle => var("SERVICE"),
                _ => None,
            },
        }
    }

    /// Database name recorded on every entity: the database, else the
    /// Oracle service name, else empty.
    pub fn database_name(&self) -> &str {
        self.database
            .as_deref()
            .or(self.service_name.as_deref())
            .unwrap_or("")
    }

    /// Parse the port. Absent, empty and non-numeric values are connection
    /// errors for `dialect`.
    pub fn port(&self, dialect: Dialect) -> HarvestResult<u16> {
        match self.port.as_deref().map(str::trim) {
            None | Some("") => Err(HarvestError::connection(
                dialect,
                format!("{}_PORT is not set", dialect.env_prefix()),
            )),
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| HarvestError::connection(dialect, format!("invalid port {raw:?}"))),
        }
    }

    /// The host, or a connection error for `dialect` when it is absent.
    pub fn host(&self, dialect: Dialect) -> HarvestResult<&str> {
        match self.host.as_deref().map(str::trim) {
            None | Some("") => Err(HarvestError::connection(
                dialect,
                format!("{}_HOST is not set", dialect.env_prefix()),
            )),
            Some(host) => Ok(host),
        }
    }

    /// "user@host:port" summary, safe to log
    pub fn display_name(&self) -> String {
        format!(
            "{}@{}:{}",
            self.user.as_deref().unwrap_or(""),
            self.host.as_deref().unwrap_or(""),
            self.port.as_deref().unwrap_or("")
        )
    }
}
