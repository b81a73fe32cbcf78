use anyhow::{Context, Result, bail};
use std::env;

const DEFAULT_SQLITE_FILE: &str = "database.db";
const SQLITE_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
    Memory,
}

impl DatabaseBackend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            _ => bail!("DB_ENGINE must be one of: sqlite, postgres, memory"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => bail!("LOG_FORMAT must be one of: pretty, json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
    /// Log every SQL statement at INFO.
    pub echo: bool,
}

impl DatabaseConfig {
    /// Single shared in-memory SQLite database.
    pub fn sqlite_in_memory() -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            echo: false,
        }
    }

    pub fn is_in_memory_sqlite(&self) -> bool {
        self.backend == DatabaseBackend::Sqlite
            && (self.url.contains(SQLITE_MEMORY) || self.url.contains("mode=memory"))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("APP_HOST", "0.0.0.0");

        let port = var("APP_PORT", "8000")
            .parse::<u16>()
            .context("APP_PORT must be a valid u16")?;

        let backend = DatabaseBackend::parse(&var("DB_ENGINE", "sqlite"))?;

        let url = match backend {
            DatabaseBackend::Sqlite => {
                sqlite_url(lookup("DATABASE_URL"), lookup("SQLITE_FILE_NAME"))?
            }
            DatabaseBackend::Postgres => postgres_url(lookup("DATABASE_URL"))?,
            DatabaseBackend::Memory => String::new(),
        };

        let max_connections = var("DB_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid u32")?;
        if max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be greater than 0");
        }

        let echo = parse_bool(&var("DB_ECHO", "false")).context("DB_ECHO must be a boolean")?;

        let log_format = LogFormat::parse(&var("LOG_FORMAT", "pretty"))?;

        Ok(Self {
            host,
            port,
            database: DatabaseConfig {
                backend,
                url,
                max_connections,
                echo,
            },
            log_format,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn sqlite_url(database_url: Option<String>, file_name: Option<String>) -> Result<String> {
    if let Some(url) = database_url {
        if !url.starts_with("sqlite:") {
            bail!("DATABASE_URL must start with sqlite: when DB_ENGINE=sqlite");
        }
        return Ok(url);
    }

    let file_name = file_name.unwrap_or_else(|| DEFAULT_SQLITE_FILE.to_string());
    if file_name.trim().is_empty() {
        bail!("SQLITE_FILE_NAME must be set when DB_ENGINE=sqlite");
    }

    if file_name == SQLITE_MEMORY {
        Ok("sqlite::memory:".to_string())
    } else {
        Ok(format!("sqlite://{file_name}"))
    }
}

fn postgres_url(database_url: Option<String>) -> Result<String> {
    let url = database_url.context("DATABASE_URL must be set when DB_ENGINE=postgres")?;
    if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
        bail!("Invalid DATABASE_URL for postgres: {url}");
    }
    Ok(url)
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("expected true or false, got {raw}"),
    }
}
