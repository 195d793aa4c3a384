use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub inventory: DatabaseConfig,
    pub ledger: LedgerConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Operational inventory database (system of record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// SAS accounting ledger database. Optional: sync endpoints refuse to run
/// when the URL is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Rows per upsert chunk inside the sync transaction.
    pub batch_size: usize,
    /// MODALIDAD code the reconciliation is restricted to.
    /// 2 = INVENTARIOS, 3 = ALQUILERES.
    pub modality: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            inventory: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "mysql://localhost/inventory".to_string()),
            },
            ledger: LedgerConfig {
                url: std::env::var("LEDGER_DB_URL").ok(),
            },
            sync: SyncConfig {
                batch_size: 100,
                modality: "2".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            inventory: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "mysql://localhost/inventory".to_string()),
            },
            ledger: LedgerConfig {
                url: std::env::var("LEDGER_DB_URL").ok(),
            },
            sync: SyncConfig {
                batch_size: std::env::var("SYNC_BATCH_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(100),
                modality: std::env::var("SIAT_MODALITY").unwrap_or_else(|_| "2".to_string()),
            },
        }
    }
}
