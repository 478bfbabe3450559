use std::env;

pub const DEFAULT_API_URL: &str = "https://api-v3.mbta.com";
pub const DEFAULT_PORT: u16 = 3000;

pub struct Config {
    pub api_url: String,
    pub api_key: Option<String>,
    pub port: u16,
    /// Upstream `filter[type]` value, e.g. "3" for buses only.
    pub route_types: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            api_key: None,
            port: DEFAULT_PORT,
            route_types: None,
        }
    }
}

impl Config {
    /// Reads `HEADWAY_*` variables. The first process argument, when given,
    /// overrides the API url.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();
        if let Ok(url) = env::var("HEADWAY_API_URL") {
            config.api_url = url;
        }
        if let Some(url) = env::args().nth(1) {
            config.api_url = url;
        }
        config.api_key = env::var("HEADWAY_API_KEY").ok().filter(|key| !key.is_empty());
        config.route_types = env::var("HEADWAY_ROUTE_TYPES")
            .ok()
            .filter(|types| !types.is_empty());
        if let Ok(port) = env::var("HEADWAY_PORT") {
            config.port = port
                .parse()
                .map_err(|err| format!("Invalid HEADWAY_PORT {port}: {err}"))?;
        }
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(config)
    }
}
