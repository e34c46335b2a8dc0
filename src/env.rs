//! Environment variable access
//!
//! The store never reads `std::env` directly; every lookup goes through the
//! [`Environment`] capability so tests can substitute a fixed key/value map
//! without mutating real process state.

use std::collections::HashMap;

/// Read-only access to environment variables.
pub trait Environment {
    /// Look up a variable by name.
    ///
    /// Returns `None` when the variable is unset. A value that is not valid
    /// unicode is treated as unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed in-memory environment. Useful for tests and embedding.
impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_map_env_lookup() {
        let mut env = HashMap::new();
        env.insert("SOME_KEY".to_string(), "some value".to_string());

        assert_eq!(env.var("SOME_KEY"), Some("some value".to_string()));
        assert_eq!(env.var("OTHER_KEY"), None);
    }

    #[test]
    fn test_map_env_empty_value_is_present() {
        let mut env = HashMap::new();
        env.insert("EMPTY".to_string(), String::new());

        assert_eq!(env.var("EMPTY"), Some(String::new()));
    }

    #[test]
    #[serial]
    fn test_process_env_lookup() {
        std::env::set_var("CLICONF_ENV_PROBE", "probe");
        assert_eq!(ProcessEnv.var("CLICONF_ENV_PROBE"), Some("probe".to_string()));

        std::env::remove_var("CLICONF_ENV_PROBE");
        assert_eq!(ProcessEnv.var("CLICONF_ENV_PROBE"), None);
    }
}
