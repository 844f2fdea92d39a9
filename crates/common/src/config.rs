use std::env;

/// Process-wide pipeline configuration, loaded once at startup and treated
/// as immutable for the run (spec §5 "Config is loaded once at process
/// start").
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the on-disk data hierarchy (`raw/`, `silver_merged/`, ...).
    pub data_dir: String,
    /// Postgres connection string backing the Store.
    pub database_url: String,

    /// LLM provider credentials (extractor + confidence reviewer).
    pub llm_api_key: String,
    pub llm_model: String,

    /// Google Places credentials (seeder). Empty disables seeding.
    pub google_places_api_key: String,
    /// Feature flag gate. Seeding additionally requires `--confirm` on the CLI.
    pub google_places_enabled: bool,

    /// Admin transport credentials (curation bridge's inbound callback auth).
    pub admin_webhook_secret: String,

    pub budget: BudgetConfig,
    pub heuristic: HeuristicConfig,
    pub retry: RetryConfig,
}

/// Budget & gate knobs (spec §9 "Budget & gate config" — a single typed
/// struct, no string-keyed runtime config reads in hot paths).
#[derive(Debug, Clone, Copy)]
pub struct BudgetConfig {
    pub max_incremental_files: usize,
    pub per_url_timeout_ms: u64,
    pub fetcher_concurrency: usize,
    pub extractor_concurrency: usize,
    pub stale_run_threshold_ms: i64,
    pub backup_retain: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_incremental_files: 90,
            per_url_timeout_ms: 30_000,
            fetcher_concurrency: 10,
            extractor_concurrency: 2,
            stale_run_threshold_ms: 2 * 60 * 60 * 1000,
            backup_retain: 7,
        }
    }
}

/// Confidence review thresholds (spec §4.8).
#[derive(Debug, Clone, Copy)]
pub struct HeuristicConfig {
    pub t_high: f32,
    pub t_low: f32,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            t_high: 0.75,
            t_low: 0.35,
        }
    }
}

/// Shared retry/backoff spec (spec §9 "single reusable backoff
/// specification" used by both fetcher and extractor).
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub base_ms: u64,
    pub cap_ms: u64,
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_ms: 500,
            cap_ms: 8_000,
            max_attempts: 3,
        }
    }
}

impl Config {
    /// Load configuration from environment variables. Panics with a clear
    /// message if a required variable is missing — a config error is fatal
    /// at startup, before any work (spec §7).
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            database_url: required_env("DATABASE_URL"),
            llm_api_key: env::var("LLM_API_KEY").unwrap_or_default(),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            google_places_api_key: env::var("GOOGLE_PLACES_API_KEY").unwrap_or_default(),
            google_places_enabled: env::var("GOOGLE_PLACES_ENABLED")
                .map(|v| v == "true")
                .unwrap_or(false),
            admin_webhook_secret: env::var("ADMIN_WEBHOOK_SECRET").unwrap_or_default(),
            budget: BudgetConfig {
                max_incremental_files: env_parse_or("MAX_INCREMENTAL_FILES", 90),
                per_url_timeout_ms: env_parse_or("PER_URL_TIMEOUT_MS", 30_000),
                fetcher_concurrency: env_parse_or("FETCHER_CONCURRENCY", 10),
                extractor_concurrency: env_parse_or("EXTRACTOR_CONCURRENCY", 2),
                stale_run_threshold_ms: env_parse_or("STALE_RUN_THRESHOLD_MS", 2 * 60 * 60 * 1000),
                backup_retain: env_parse_or("BACKUP_RETAIN", 7),
            },
            heuristic: HeuristicConfig {
                t_high: env_parse_or("CONFIDENCE_T_HIGH", 0.75),
                t_low: env_parse_or("CONFIDENCE_T_LOW", 0.35),
            },
            retry: RetryConfig::default(),
        }
    }

    /// Log the presence (not the value) of each sensitive env var.
    pub fn log_redacted(&self) {
        let vars = [
            ("DATABASE_URL", &self.database_url),
            ("LLM_API_KEY", &self.llm_api_key),
            ("GOOGLE_PLACES_API_KEY", &self.google_places_api_key),
            ("ADMIN_WEBHOOK_SECRET", &self.admin_webhook_secret),
        ];
        for (name, value) in vars {
            if value.is_empty() {
                tracing::info!("{name} = (empty)");
            } else {
                tracing::info!("{name} = ({} chars)", value.len());
            }
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
