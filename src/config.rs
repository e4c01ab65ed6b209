use serde::Deserialize;

/// Verification parameters for tokens issued by the external identity
/// provider; this service holds no signing-side configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Retry policy for conflicting weekly-ledger transactions.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub ledger: LedgerConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "drinkwise".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "drinkwise-users".into()),
        };
        let ledger = LedgerConfig {
            max_attempts: std::env::var("LEDGER_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(3),
            backoff_ms: std::env::var("LEDGER_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(50),
        };
        Ok(Self {
            database_url,
            jwt,
            ledger,
        })
    }
}
