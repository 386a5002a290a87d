use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection string; when set it wins over the discrete fields.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// Directory of the server's unix socket.
    pub socket: Option<String>,
    pub ssl: bool,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_host = get("DB_HOST").unwrap_or_else(|| "127.0.0.1".into());
        let ssl = match get("DB_SSL") {
            Some(v) => v.eq_ignore_ascii_case("true"),
            None => is_hosted_provider(&db_host),
        };

        let database = DatabaseConfig {
            url: get("DATABASE_URL").filter(|v| !v.is_empty()),
            port: parse_or("DB_PORT", get("DB_PORT"), 5432)?,
            user: get("DB_USER").unwrap_or_else(|| "postgres".into()),
            password: get("DB_PASSWORD").unwrap_or_default(),
            name: get("DB_NAME").unwrap_or_else(|| "kms".into()),
            socket: get("DB_SOCKET").filter(|v| !v.is_empty()),
            ssl,
            max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 10)?,
            host: db_host,
        };

        Ok(Self {
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or("APP_PORT", get("APP_PORT"), 8080)?,
            database,
        })
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        let mut opts = match &self.url {
            Some(url) => url.parse::<PgConnectOptions>()?,
            None => {
                let base = PgConnectOptions::new()
                    .username(&self.user)
                    .password(&self.password)
                    .database(&self.name);
                match &self.socket {
                    Some(dir) => base.socket(dir),
                    None => base.host(&self.host).port(self.port),
                }
            }
        };
        if self.ssl {
            opts = opts.ssl_mode(PgSslMode::Require);
        }
        Ok(opts)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T> {
    match raw {
        Some(v) if !v.is_empty() => v
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value: {v}")),
        _ => Ok(default),
    }
}

// Managed hosts only accept TLS connections.
fn is_hosted_provider(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host.contains("rlwy.net") || host.contains("railway")
}
