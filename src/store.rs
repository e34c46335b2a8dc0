//! Layered lookup and persistence over the config file
//!
//! [`CliConfig`] merges two sources into one surface: environment variables,
//! checked first and always winning, and the persisted section/option file,
//! loaded once at construction and reloaded after every write made through
//! the same instance.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::env::{Environment, ProcessEnv};
use crate::error::ConfigError;
use crate::snapshot::ConfigSnapshot;

/// File name of the persisted store inside the config directory.
const CONFIG_FILE_NAME: &str = "config";

/// Layered configuration store for a command-line tool.
///
/// Values live in a per-user file of named sections, and any single value can
/// be overridden through an environment variable derived from the namespace:
/// `MYTOOL_CORE_OUTPUT` overrides `(core, output)` for the `mytool`
/// namespace. The override wins on presence alone, even when set to the
/// empty string; there is no merging.
///
/// # Example
/// ```ignore
/// let mut config = CliConfig::new("mytool", None)?;
/// let output = config.get("core", "output", Some("text"))?;
/// config.set_value("core", "output", "json")?;
/// ```
///
/// Mutators take `&mut self`; sharing one instance across threads requires
/// external synchronization. Multiple processes writing the same file race
/// with last-write-wins semantics.
#[derive(Debug)]
pub struct CliConfig<E: Environment = ProcessEnv> {
    env_var_prefix: String,
    config_dir: PathBuf,
    config_path: PathBuf,
    snapshot: ConfigSnapshot,
    env: E,
}

impl CliConfig<ProcessEnv> {
    /// Create a store reading overrides from the process environment.
    ///
    /// # Arguments
    /// * `namespace` - Tool name; drives the default `~/.{namespace}` config
    ///   directory (lower-cased)
    /// * `env_prefix` - Prefix for override variables, defaults to
    ///   `namespace` (upper-cased either way)
    pub fn new(namespace: &str, env_prefix: Option<&str>) -> Result<Self, ConfigError> {
        Self::with_environment(namespace, env_prefix, ProcessEnv)
    }
}

impl<E: Environment> CliConfig<E> {
    /// Create a store reading overrides from an injected environment.
    ///
    /// The config directory is `{PREFIX}_CONFIG_DIR` from the environment if
    /// set, else `.{namespace}` under the home directory. Construction only
    /// reads: the directory and file are never created here, and a missing
    /// file yields an empty snapshot.
    pub fn with_environment(
        namespace: &str,
        env_prefix: Option<&str>,
        env: E,
    ) -> Result<Self, ConfigError> {
        let env_var_prefix = format!("{}_", env_prefix.unwrap_or(namespace).to_uppercase());
        let config_dir = match env.var(&format!("{env_var_prefix}CONFIG_DIR")) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or(ConfigError::HomeDirUnavailable)?
                .join(format!(".{}", namespace.to_lowercase())),
        };
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let snapshot = ConfigSnapshot::read(&config_path)?;
        debug!("loaded config from {}", config_path.display());
        Ok(Self { env_var_prefix, config_dir, config_path, snapshot, env })
    }

    /// Directory holding the persisted config file.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the persisted config file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Environment variable name that overrides `(section, option)`.
    ///
    /// Pure string composition, no lookup: `{PREFIX}_{SECTION}_{OPTION}`,
    /// all upper-cased.
    pub fn env_var_name(&self, section: &str, option: &str) -> String {
        format!("{}{}_{}", self.env_var_prefix, section.to_uppercase(), option.to_uppercase())
    }

    /// True if the pair resolves from the environment or the persisted store.
    ///
    /// The environment is checked first and short-circuits; presence alone
    /// counts, the value may be empty.
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        if self.env.var(&self.env_var_name(section, option)).is_some() {
            return true;
        }
        self.snapshot.has_option(section, option)
    }

    /// True if the persisted store has the section.
    ///
    /// Environment overrides are not considered: override keys are derived
    /// per lookup and cannot be enumerated in advance.
    pub fn has_section(&self, section: &str) -> bool {
        self.snapshot.has_section(section)
    }

    /// Section names currently in the persisted store.
    pub fn sections(&self) -> Vec<String> {
        self.snapshot.sections()
    }

    /// Option names persisted in a section, empty if the section is absent.
    pub fn options(&self, section: &str) -> Vec<String> {
        self.snapshot.options(section)
    }

    /// Resolve the raw value: environment first, persisted store second.
    fn resolve(&self, section: &str, option: &str) -> Option<String> {
        let key = self.env_var_name(section, option);
        if let Some(value) = self.env.var(&key) {
            trace!("{key} overrides {section}.{option}");
            return Some(value);
        }
        self.snapshot.get(section, option)
    }

    /// Get a value as a string.
    ///
    /// Resolution order: (1) the environment override, returned verbatim even
    /// when empty, (2) the persisted store, (3) `fallback`. Without a
    /// fallback, a pair absent from both sources is a
    /// [`ConfigError::MissingOption`].
    ///
    /// # Example
    /// ```ignore
    /// let output = config.get("core", "output", Some("text"))?;
    /// ```
    pub fn get(
        &self,
        section: &str,
        option: &str,
        fallback: Option<&str>,
    ) -> Result<String, ConfigError> {
        match self.resolve(section, option) {
            Some(value) => Ok(value),
            None => fallback.map(str::to_owned).ok_or_else(|| missing(section, option)),
        }
    }

    /// Get a value as an integer.
    ///
    /// The fallback substitutes only for a *missing* pair. A present value
    /// that does not parse is a [`ConfigError::InvalidNumeric`] regardless of
    /// the fallback; malformed values are never silently replaced.
    pub fn get_int(
        &self,
        section: &str,
        option: &str,
        fallback: Option<i64>,
    ) -> Result<i64, ConfigError> {
        match self.resolve(section, option) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumeric {
                section: section.to_string(),
                option: option.to_string(),
                value: raw,
            }),
            None => fallback.ok_or_else(|| missing(section, option)),
        }
    }

    /// Get a value as a float. Same fallback rules as [`Self::get_int`].
    pub fn get_float(
        &self,
        section: &str,
        option: &str,
        fallback: Option<f64>,
    ) -> Result<f64, ConfigError> {
        match self.resolve(section, option) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumeric {
                section: section.to_string(),
                option: option.to_string(),
                value: raw,
            }),
            None => fallback.ok_or_else(|| missing(section, option)),
        }
    }

    /// Get a value as a boolean.
    ///
    /// Recognizes, case-insensitively, `1`/`yes`/`true`/`on` and
    /// `0`/`no`/`false`/`off`. Any other present value is a
    /// [`ConfigError::InvalidBoolean`], never masked by the fallback.
    pub fn get_bool(
        &self,
        section: &str,
        option: &str,
        fallback: Option<bool>,
    ) -> Result<bool, ConfigError> {
        match self.resolve(section, option) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidBoolean {
                section: section.to_string(),
                option: option.to_string(),
                value: raw,
            }),
            None => fallback.ok_or_else(|| missing(section, option)),
        }
    }

    /// Replace the persisted store with `snapshot`.
    ///
    /// In order: create the config directory if needed (idempotent),
    /// overwrite the file, restrict it to owner read/write, reload it into
    /// this instance so later reads reflect the write immediately. The
    /// reload is unconditional: no accessor on this instance returns stale
    /// data after a successful mutation.
    ///
    /// If the process dies between the write and the permission change the
    /// file can transiently carry wider permission bits; that window is
    /// accepted and not recovered from.
    pub fn set(&mut self, snapshot: ConfigSnapshot) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir)?;
        fs::write(&self.config_path, snapshot.to_toml_string()?)?;
        restrict_to_owner(&self.config_path)?;
        self.snapshot = ConfigSnapshot::read(&self.config_path)?;
        debug!("wrote config to {}", self.config_path.display());
        Ok(())
    }

    /// Set one option and persist.
    ///
    /// Loads a fresh copy of the store from disk first - not this instance's
    /// snapshot - so edits made by other writers since construction survive.
    /// The section is created if absent (creating an existing section is a
    /// no-op). No locking: two concurrent writers can still lose an update,
    /// the fresh load only narrows the window.
    pub fn set_value(
        &mut self,
        section: &str,
        option: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let mut snapshot = ConfigSnapshot::read(&self.config_path)?;
        snapshot.add_section(section);
        snapshot.set(section, option, value);
        self.set(snapshot)
    }

    /// Remove one option and persist. Returns whether it was present.
    ///
    /// Same fresh-load-then-persist shape as [`Self::set_value`]; nothing is
    /// written when the option was already absent.
    pub fn remove_value(&mut self, section: &str, option: &str) -> Result<bool, ConfigError> {
        let mut snapshot = ConfigSnapshot::read(&self.config_path)?;
        if !snapshot.remove_option(section, option) {
            return Ok(false);
        }
        self.set(snapshot)?;
        Ok(true)
    }
}

fn missing(section: &str, option: &str) -> ConfigError {
    ConfigError::MissingOption { section: section.to_string(), option: option.to_string() }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Restrict the config file to owner read/write (0600). Platforms without
/// POSIX permission bits skip this step.
#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
