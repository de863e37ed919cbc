use crate::error::{GhToolsError, Result};
use crate::mux::ExcludeSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_ORGANIZATION: &str = "napalm-automation";

pub const DEFAULT_EXCLUDE: &[&str] = &[
    "napalm",
    "napalm-salt",
    "napalm-ansible",
    "napalm-skeleton",
    "iosxr-ez",
    "tooling",
];

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    pub organization: Option<String>,
    pub exclude: Option<Vec<String>>,
}

/// Global options as given on the command line (flag or environment).
#[derive(Debug, Default, Clone)]
pub struct GlobalArgs {
    pub json: bool,
    pub organization: Option<String>,
    pub token: Option<String>,
    pub exclude: Vec<String>,
}

/// Fully resolved options every command runs with.
#[derive(Debug, Clone)]
pub struct Context {
    pub json: bool,
    pub organization: String,
    pub token: String,
    pub exclude: ExcludeSet,
}

impl Context {
    /// Merges command-line options over the config file, then the built-in defaults.
    pub fn resolve(args: GlobalArgs, config: Config) -> Result<Self> {
        let token = args
            .token
            .or(config.auth.token)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(GhToolsError::MissingToken)?;

        let organization = args
            .organization
            .or(config.defaults.organization)
            .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string());

        let exclude = if !args.exclude.is_empty() {
            ExcludeSet::from_iter(args.exclude)
        } else if let Some(names) = config.defaults.exclude {
            ExcludeSet::from_iter(names)
        } else {
            ExcludeSet::from_iter(DEFAULT_EXCLUDE.iter().copied())
        };

        Ok(Self {
            json: args.json,
            organization,
            token,
            exclude,
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("gh-tools").join("config.toml");
        return Ok(path);
    }

    let home = dirs::home_dir()
        .ok_or_else(|| GhToolsError::Config("Cannot find home directory".into()))?;
    Ok(home.join(".config").join("gh-tools").join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}
