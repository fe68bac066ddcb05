use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Switches for the `email` and `lowercase` rules applied to submitted addresses.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EmailRulesConfig {
    pub check_dns: bool,
    pub require_lowercase: bool,
}

impl Default for EmailRulesConfig {
    fn default() -> Self {
        Self {
            check_dns: true,
            require_lowercase: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub email: EmailRulesConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")?,
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
        };
        let defaults = EmailRulesConfig::default();
        let email = EmailRulesConfig {
            check_dns: env_flag("EMAIL_DNS_CHECK").unwrap_or(defaults.check_dns),
            require_lowercase: env_flag("EMAIL_REQUIRE_LOWERCASE")
                .unwrap_or(defaults.require_lowercase),
        };
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            database,
            email,
        })
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
