use cabezal_core::collection::Collection;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8003`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on pooled database connections (default: `10`).
    pub database_max_connections: u32,
    /// Due-soon window for the `cabezales` collection, in days.
    pub cabezales_due_soon_days: i64,
    /// Due-soon window for the `mantenimientos` collection, in days.
    pub mantenimientos_due_soon_days: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                 |
    /// |--------------------------------|-------------------------|
    /// | `HOST`                         | `0.0.0.0`               |
    /// | `PORT`                         | `8003`                  |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                    |
    /// | `DATABASE_MAX_CONNECTIONS`     | `10`                    |
    /// | `CABEZALES_DUE_SOON_DAYS`      | `14`                    |
    /// | `MANTENIMIENTOS_DUE_SOON_DAYS` | `7`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8003".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("DATABASE_MAX_CONNECTIONS must be a valid u32");

        let cabezales_due_soon_days =
            due_soon_from_env("CABEZALES_DUE_SOON_DAYS", Collection::Cabezales);
        let mantenimientos_due_soon_days =
            due_soon_from_env("MANTENIMIENTOS_DUE_SOON_DAYS", Collection::Mantenimientos);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_max_connections,
            cabezales_due_soon_days,
            mantenimientos_due_soon_days,
        }
    }

    /// Due-soon threshold applied when categorising records of `collection`.
    pub fn due_soon_days(&self, collection: Collection) -> i64 {
        match collection {
            Collection::Cabezales => self.cabezales_due_soon_days,
            Collection::Mantenimientos => self.mantenimientos_due_soon_days,
        }
    }
}

fn due_soon_from_env(var: &str, collection: Collection) -> i64 {
    let days: i64 = match std::env::var(var) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("{var} must be a valid integer")),
        Err(_) => collection.default_due_soon_days(),
    };
    assert!(days >= 0, "{var} must not be negative");
    days
}
