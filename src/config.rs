//! Global config for valhash
//! Includes the leaf hash seed and the sizing of the cycle-detection set.
use std::collections::HashMap;

use camino::Utf8PathBuf;
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde::Deserialize;

/// Global config variable for `Settings`
pub static VALHASH_CONFIG: OnceCell<Settings> = OnceCell::new();

/// Global path variable for configuration file
pub static VALHASH_CONFIG_FILE: OnceCell<Utf8PathBuf> = OnceCell::new();

const HASH_SEED: &str = "hash_seed";
const ON_STACK_CAPACITY: &str = "on_stack_capacity";

/// Upper bound on the initial size of the on-stack set. Larger configured
/// values are clamped to it.
pub const MAX_ON_STACK_CAPACITY: usize = 1024;

/// Gets the `VALHASH_CONFIG` settings. If uninitialized, sets the global
/// variable in the following order (greatest to least precedence):
/// - `settings` map if provided, e.g. with key ("hash_seed", "42")
/// - Env var per setting, e.g. `VALHASH_HASH_SEED`
/// - Config file, which also has a configurable location (see `valhash_config_file()`),
///   and has the following syntax for e.g. TOML:
///   ```toml
///   hash_seed = 42
///   on_stack_capacity = 64
///   ```
/// - Default values, see `Settings::default()`
///
/// The settings are read once per process. The hash functions never consult
/// them; pass them to `ValueHasher::with_settings` to opt in. Hash codes are
/// only comparable between hashers that agree on `hash_seed`.
pub fn valhash_config(
    file: Option<&Utf8PathBuf>,
    settings: Option<&HashMap<&str, String>>,
) -> &'static Settings {
    VALHASH_CONFIG.get_or_init(|| {
        Settings::from_config(valhash_config_file(file), settings).unwrap_or_else(|e| {
            tracing::warn!("invalid valhash config, using defaults: {e}");
            Settings::default()
        })
    })
}

/// Gets the `VALHASH_CONFIG_FILE` path. If uninitialized, sets the global variable
/// in the following order (greatest to least precedence):
/// - `config_file` parameter if provided
/// - `VALHASH_CONFIG_FILE` env var
/// - Default location at `$HOME/.valhash/valhash.toml`
pub fn valhash_config_file(config_file: Option<&Utf8PathBuf>) -> &'static Utf8PathBuf {
    VALHASH_CONFIG_FILE.get_or_init(|| {
        if let Some(file) = config_file {
            file.clone()
        } else if let Ok(file) = std::env::var("VALHASH_CONFIG_FILE") {
            Utf8PathBuf::from(file)
        } else {
            valhash_default_dir().join("valhash.toml")
        }
    })
}

/// Contains the valhash config settings
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Mixed into every leaf contribution (symbols, numbers, characters,
    /// references). Changing it changes every hash code.
    pub hash_seed: u64,

    /// Initial capacity of the on-stack set used by structural hashing, at
    /// most `MAX_ON_STACK_CAPACITY`
    pub on_stack_capacity: usize,
}

impl Settings {
    /// Loads config settings from a file or env vars
    pub fn from_config(
        config_file: &Utf8PathBuf,
        settings: Option<&HashMap<&str, String>>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| settings.and_then(|s| s.get(key).map(|v| v.to_owned()));
        // Settings are read first to last, in order of increasing precedence.
        // Hence, default values must come first so they are overriden by all other methods.
        Config::builder()
            .set_default(HASH_SEED, defaults.hash_seed.to_string())?
            .set_default(ON_STACK_CAPACITY, defaults.on_stack_capacity.to_string())?
            .add_source(File::with_name(config_file.as_str()).required(false))
            // Then override with any `VALHASH` environment variables
            .add_source(Environment::with_prefix("VALHASH").try_parsing(true))
            // Optionally override if settings were specified programmatically
            .set_override_option(HASH_SEED, get(HASH_SEED))?
            .set_override_option(ON_STACK_CAPACITY, get(ON_STACK_CAPACITY))?
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map(|settings| Self {
                on_stack_capacity: settings.on_stack_capacity.min(MAX_ON_STACK_CAPACITY),
                ..settings
            })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hash_seed: 0,
            on_stack_capacity: 16,
        }
    }
}

/// Returns `$HOME/.valhash`, or a relative `.valhash` without a home directory
pub fn valhash_default_dir() -> Utf8PathBuf {
    home::home_dir()
        .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
        .unwrap_or_default()
        .join(".valhash")
}
