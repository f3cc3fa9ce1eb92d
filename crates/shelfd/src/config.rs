use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    /// JSON file backing the catalog store
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Browser access from other origins.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// `["*"]` allows any origin; an empty list turns CORS off.
    #[serde(default = "default_cors_origins")]
    pub allowed_origins: Vec<String>,
    /// How long browsers may cache a preflight answer.
    #[serde(default = "default_cors_max_age")]
    pub max_age_seconds: u64,
}

fn default_addr() -> String {
    "0.0.0.0:5000".into()
}
fn default_catalog_path() -> String {
    "catalog.json".into()
}
fn default_limit() -> usize {
    shelfmate::query::DEFAULT_LIMIT
}
fn default_max_limit() -> usize {
    50
}
// the bundled web UI is served from a different origin
fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}
fn default_cors_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_cors_origins(),
            max_age_seconds: default_cors_max_age(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            catalog_path: default_catalog_path(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let addr = std::env::var("SHELF_ADDR").unwrap_or_else(|_| default_addr());
        let catalog_path =
            std::env::var("SHELF_CATALOG").unwrap_or_else(|_| default_catalog_path());
        let default_limit = env_parse("SHELF_DEFAULT_LIMIT").unwrap_or(default_limit());
        let max_limit = env_parse("SHELF_MAX_LIMIT").unwrap_or(default_max_limit());

        let mut cors = CorsConfig::default();
        if let Ok(origins) = std::env::var("SHELF_CORS_ALLOWED_ORIGINS") {
            cors.allowed_origins = parse_cors_origins(&origins);
        }
        if let Some(max_age) = env_parse("SHELF_CORS_MAX_AGE_SECONDS") {
            cors.max_age_seconds = max_age;
        }

        Self {
            addr,
            catalog_path,
            default_limit,
            max_limit,
            cors,
        }
    }

    /// Requested limit, falling back to the default and capped at `max_limit`.
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Comma separated origins; blank means none.
pub fn parse_cors_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
