use log::warn;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::blockchain::{DEFAULT_DIFFICULTY, DIFF_MIN, TARGET_BLOCK_INTERVAL_MILLIS};

/// Ledger tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Difficulty used for the first block mined by this process.
    pub initial_difficulty: u32,
    /// Retargeting never lowers difficulty below this.
    pub min_difficulty: u32,
    pub target_interval_millis: i64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            initial_difficulty: DEFAULT_DIFFICULTY,
            min_difficulty: DIFF_MIN,
            target_interval_millis: TARGET_BLOCK_INTERVAL_MILLIS,
        }
    }
}

/// Node settings read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` keeps blocks in memory only.
    pub data_dir: Option<PathBuf>,
    pub node_address: String,
    pub peers: Vec<String>,
    /// Re-read the store before every authenticity lookup.
    pub reload_before_lookup: bool,
    pub chain: ChainConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ChainConfig::default();
        let port = parse_or(&var, "PORT", 4000u16);
        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            data_dir: var("DATA_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            node_address: var("NODE_ADDRESS")
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            peers: var("PEERS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            reload_before_lookup: parse_or(&var, "RELOAD_BEFORE_LOOKUP", false),
            chain: ChainConfig {
                initial_difficulty: parse_or(&var, "DIFFICULTY", defaults.initial_difficulty),
                min_difficulty: parse_or(&var, "MIN_DIFFICULTY", defaults.min_difficulty),
                target_interval_millis: parse_or(
                    &var,
                    "TARGET_INTERVAL_MS",
                    defaults.target_interval_millis,
                ),
            },
        }
    }
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("CONFIG - ignoring invalid {key}={raw:?}");
            default
        }),
    }
}
