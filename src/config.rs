use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub api_base: String,          // chess.com public API root
    pub user_agent: String,        // the API rejects anonymous clients
    pub fetch_concurrency: usize,  // months fetched in parallel
    pub caps_window: usize,        // moving-average window for accuracy trends
    pub rayon_threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://api.chess.com/pub".to_string(),
            user_agent: "chessmetrics/0.1".to_string(),
            fetch_concurrency: 4,
            caps_window: 10,
            rayon_threads: None,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let mut cfg = match std::fs::read_to_string("config.toml") {
            Ok(s) => toml::from_str(&s).unwrap_or_else(|_| Self::default()),
            Err(_) => Self::default(),
        };
        // .env / environment overrides (loaded by dotenvy in main)
        if let Ok(ua) = std::env::var("CHESSMETRICS_UA") {
            cfg.user_agent = ua;
        }
        if let Ok(base) = std::env::var("CHESSMETRICS_API_BASE") {
            cfg.api_base = base;
        }
        cfg
    }
}
