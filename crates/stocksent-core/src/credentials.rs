//! Named secret resolution.
//!
//! The provider captures its lookup source at construction, so nothing
//! downstream reads the process environment implicitly. Secret values never
//! appear in `Debug` output or logs.

use std::collections::BTreeMap;
use std::env::VarError;

use crate::ConfigError;

/// Environment name of the chronological (NewsAPI) provider key.
pub const API_KEY_NEWSAPI: &str = "API_KEY_NEWSAPI";

/// Environment name of the offset (APITube) provider key.
pub const API_KEY_APITUBE: &str = "API_KEY_APITUBE";

type Lookup = Box<dyn Fn(&str) -> Result<String, VarError> + Send + Sync>;

/// Resolves named secrets from an explicit lookup source.
pub struct CredentialProvider {
    lookup: Lookup,
}

impl CredentialProvider {
    /// Creates a provider backed by an arbitrary lookup function.
    pub fn new<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Result<String, VarError> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Snapshots the current process environment.
    ///
    /// Later changes to the environment are not observed.
    #[must_use]
    pub fn from_env() -> Self {
        let snapshot: BTreeMap<String, String> = std::env::vars().collect();
        Self::from_map(snapshot)
    }

    /// Creates a provider over a fixed set of name/value pairs.
    #[must_use]
    pub fn from_map(map: BTreeMap<String, String>) -> Self {
        Self::new(move |key| map.get(key).cloned().ok_or(VarError::NotPresent))
    }

    /// Resolves every name in `names`.
    ///
    /// A name whose value is absent, not valid unicode, or blank counts as
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecrets`] listing all missing names in the
    /// order they were requested.
    pub fn resolve(&self, names: &[&str]) -> Result<Credentials, ConfigError> {
        let mut secrets = BTreeMap::new();
        let mut missing = Vec::new();

        for &name in names {
            match (self.lookup)(name) {
                Ok(value) if !value.trim().is_empty() => {
                    secrets.insert(name.to_string(), value);
                }
                _ => {
                    if !missing.iter().any(|m| m == name) {
                        missing.push(name.to_string());
                    }
                }
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingSecrets(missing));
        }

        tracing::debug!(count = secrets.len(), "resolved credentials");
        Ok(Credentials { secrets })
    }
}

impl std::fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProvider").finish_non_exhaustive()
    }
}

/// Secrets resolved once for a run. Immutable after construction.
#[derive(Clone)]
pub struct Credentials {
    secrets: BTreeMap<String, String>,
}

impl Credentials {
    /// Returns the secret for `name`, if it was part of the resolved set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.secrets.get(name).map(String::as_str)
    }

    /// Names of all resolved secrets.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.secrets.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for name in self.secrets.keys() {
            map.entry(name, &"[redacted]");
        }
        map.finish()
    }
}
