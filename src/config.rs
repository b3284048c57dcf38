use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Requests per minute for the customer-facing routes.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub customer_rpm: u32,
    /// Health and status probes
    pub relaxed_rpm: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            customer_rpm: 30,
            relaxed_rpm: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Where generated installer archives are written and served from
    pub downloads_path: PathBuf,
    /// Directory holding the vendor binary and install scripts
    pub builder_path: PathBuf,
    /// Public hostname of the rendezvous/relay server embedded into installers
    pub server_domain: String,
    /// Static bearer key for the admin API (None = admin API is open)
    pub admin_api_key: Option<String>,
    pub packager_timeout: Duration,
    /// How often expired artifacts are swept from disk (None = never)
    pub package_sweep_interval: Option<Duration>,
    pub rate_limit: RateLimitConfig,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("CONNECTASSIST_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5001);

        let admin_api_key = env::var("ADMIN_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let packager_timeout = Duration::from_secs(parse_env_u64("PACKAGER_TIMEOUT_SECS", 120).max(1));

        let sweep_secs = parse_env_u64("PACKAGE_SWEEP_INTERVAL_SECS", 3600);
        let package_sweep_interval = (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs));

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            customer_rpm: parse_rpm("RATE_LIMIT_CUSTOMER_RPM", defaults.customer_rpm),
            relaxed_rpm: parse_rpm("RATE_LIMIT_RELAXED_RPM", defaults.relaxed_rpm),
        };

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "connectassist.db".to_string()),
            downloads_path: env::var("DOWNLOADS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("downloads")),
            builder_path: env::var("BUILDER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("builder")),
            server_domain: env::var("SERVER_DOMAIN")
                .unwrap_or_else(|_| "connectassist.live".to_string()),
            admin_api_key,
            packager_timeout,
            package_sweep_interval,
            rate_limit,
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_rpm(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}
