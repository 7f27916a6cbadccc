use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use color_eyre::{
    Result,
    eyre::{ensure, eyre},
};
use flux_engine::{PollOptions, RetryPolicy, transport::DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

use crate::{cli::GenerateArgs, load_ron_file};

pub const API_KEY_VAR: &str = "BLACK_FOREST_LABS_API_KEY";
pub const DEFAULT_IMAGES_DIR: &str = "images";

/// Contents of the config file. Everything is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub retries: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub images_dir: Option<PathBuf>,
}

impl Config {
    /// What `init-config` writes: the built-in defaults spelled out.
    pub fn with_defaults() -> Self {
        Self {
            api_key: None,
            base_url: Some(DEFAULT_BASE_URL.into()),
            poll_interval_secs: Some(PollOptions::DEFAULT_INTERVAL.as_secs()),
            timeout_secs: None,
            retries: Some(0),
            request_timeout_secs: Some(PollOptions::DEFAULT_REQUEST_TIMEOUT.as_secs()),
            images_dir: Some(DEFAULT_IMAGES_DIR.into()),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_local_dir()
        .ok_or(eyre!("Couldn't get config dir"))?
        .join("flux_studio.ron"))
}

pub fn load_config(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        Ok(None)
    } else {
        load_ron_file(path).map(Some)
    }
}

/// Everything a generation run needs, after merging flags, environment and config file.
#[derive(Debug)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub poll: PollOptions,
    pub images_dir: PathBuf,
}

impl Settings {
    /// Flags win over the environment, which wins over the config file.
    pub fn resolve(args: &GenerateArgs, cfg: &Config, env_key: Option<String>) -> Result<Self> {
        let api_key = args
            .api_key
            .clone()
            .or(env_key)
            .or_else(|| cfg.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                eyre!("{API_KEY_VAR} is not set. Please set it before running, or pass --api-key")
            })?;

        let interval = args
            .interval
            .or(cfg.poll_interval_secs)
            .map(Duration::from_secs)
            .unwrap_or(PollOptions::DEFAULT_INTERVAL);
        ensure!(!interval.is_zero(), "The poll interval must be at least one second");

        let request_timeout = cfg
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(PollOptions::DEFAULT_REQUEST_TIMEOUT);
        ensure!(
            !request_timeout.is_zero(),
            "The request timeout must be at least one second"
        );

        Ok(Self {
            api_key,
            base_url: cfg
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            poll: PollOptions {
                interval,
                timeout: args.timeout.or(cfg.timeout_secs).map(Duration::from_secs),
                retry: RetryPolicy::with_retries(args.retries.or(cfg.retries).unwrap_or(0)),
                request_timeout,
            },
            images_dir: args
                .out
                .clone()
                .or_else(|| cfg.images_dir.clone())
                .unwrap_or_else(|| DEFAULT_IMAGES_DIR.into()),
        })
    }
}
