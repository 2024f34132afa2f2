use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use benchdb_parser::{AliasTable, Metric};
use serde::Deserialize;
use tracing::debug;

use crate::error::{BenchError, Result};

pub const CONFIG_PATH_VAR: &str = "BENCHDB_CONFIG";
const DEFAULT_PORT: &str = "5432";

/// Where to find the Postgres database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
}

impl DatabaseConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// `DATABASE_URL` (or `BENCHDB_DATABASE_URL`) wins; otherwise the URL is
    /// assembled from `DB_DIALECT`, `DB_USER`, `DB_PASS`, `DB_HOST`, `DB_PORT`
    /// and `DB_NAME`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get("DATABASE_URL").or_else(|| get("BENCHDB_DATABASE_URL")) {
            return Ok(Self { url });
        }

        let require = |key: &str| {
            get(key).ok_or_else(|| {
                BenchError::Config(format!(
                    "{key} must be set when DATABASE_URL (or BENCHDB_DATABASE_URL) is not"
                ))
            })
        };

        let dialect = normalize_dialect(get("DB_DIALECT").as_deref().unwrap_or("postgres"))?;
        let user = require("DB_USER")?;
        let pass = require("DB_PASS")?;
        let host = require("DB_HOST")?;
        let port = get("DB_PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
        let name = require("DB_NAME")?;

        Ok(Self {
            url: format!("{dialect}://{user}:{pass}@{host}:{port}/{name}"),
        })
    }
}

/// Accepts SQLAlchemy-style dialects such as `postgresql+psycopg2`.
fn normalize_dialect(raw: &str) -> Result<&'static str> {
    let base = raw.split('+').next().unwrap_or_default().trim();
    if base.eq_ignore_ascii_case("postgres") || base.eq_ignore_ascii_case("postgresql") {
        Ok("postgres")
    } else {
        Err(BenchError::Config(format!(
            "unsupported DB_DIALECT '{raw}'; only PostgreSQL is supported"
        )))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    aliases: BTreeMap<String, Vec<String>>,
}

/// Optional TOML configuration. Today it only carries extra capture-header
/// aliases:
///
/// ```toml
/// [aliases]
/// cpu_busy = ["CPU Busy (ms)"]
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BenchConfig {
    pub aliases: BTreeMap<Metric, Vec<String>>,
}

impl BenchConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let mut aliases = BTreeMap::new();
        for (name, headers) in raw.aliases {
            let metric = name
                .parse::<Metric>()
                .map_err(|err| BenchError::Config(format!("[aliases]: {err}")))?;
            aliases.insert(metric, headers);
        }
        Ok(Self { aliases })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| BenchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads the file at `explicit`, else the file named by `BENCHDB_CONFIG`,
    /// else returns the empty configuration.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_PATH_VAR).map(PathBuf::from));
        match path {
            Some(path) => {
                debug!(path = %path.display(), "loading benchdb config");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Built-in alias table extended with the configured aliases.
    pub fn alias_table(&self) -> AliasTable {
        let mut table = AliasTable::default();
        for (metric, headers) in &self.aliases {
            table.extend(*metric, headers.iter().cloned());
        }
        table
    }
}
