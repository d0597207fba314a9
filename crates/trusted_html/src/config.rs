//! Sanitizer registry and unsafe-create gate.
//!
//! Both live in one [`Configuration`] so that a host can lock them down together
//! with a single [`Configuration::freeze`] before it starts handling untrusted input.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, TrustedHtmlError};

/// Id looked up when no sanitizer id is given.
pub const DEFAULT_SANITIZER: &str = "default";

/// Caller-supplied sanitizer. Its output is trusted unconditionally.
pub type Sanitizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Open,
    Frozen,
}

struct State {
    sanitizers: HashMap<String, Sanitizer>,
    allow_unsafely_create: bool,
    lifecycle: Lifecycle,
}

pub struct Configuration {
    state: RwLock<State>,
}

impl Configuration {
    /// Open configuration with no sanitizers and the unsafe-create gate closed.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                sanitizers: HashMap::new(),
                allow_unsafely_create: false,
                lifecycle: Lifecycle::Open,
            }),
        }
    }

    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    // Poisoning is ignored: every write is a single assignment.
    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_open(&self) -> Result<RwLockWriteGuard<'_, State>> {
        let state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match state.lifecycle {
            Lifecycle::Open => Ok(state),
            Lifecycle::Frozen => Err(TrustedHtmlError::RegistryFrozen),
        }
    }

    /// Inserts or replaces the sanitizer for `id`.
    pub fn register_sanitizer<F>(&self, id: impl Into<String>, sanitizer: F) -> Result<()>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let id = id.into();
        let mut state = self.write_open()?;
        let sanitizer: Sanitizer = Arc::new(sanitizer);
        let replaced = state.sanitizers.insert(id.clone(), sanitizer).is_some();
        log::debug!(
            target: "trusted_html.config",
            "registered sanitizer {id:?} (replaced: {replaced})"
        );
        Ok(())
    }

    pub fn set_allow_unsafely_create(&self, allowed: bool) -> Result<()> {
        let mut state = self.write_open()?;
        state.allow_unsafely_create = allowed;
        log::debug!(target: "trusted_html.config", "unsafely_create allowed: {allowed}");
        Ok(())
    }

    pub fn allow_unsafely_create(&self) -> bool {
        self.read().allow_unsafely_create
    }

    /// Freezes the registry and the gate permanently. Idempotent.
    pub fn freeze(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.lifecycle == Lifecycle::Frozen {
            log::debug!(target: "trusted_html.config", "configuration already frozen");
            return;
        }
        state.lifecycle = Lifecycle::Frozen;
        log::debug!(
            target: "trusted_html.config",
            "configuration frozen with {} sanitizer(s), unsafely_create allowed: {}",
            state.sanitizers.len(),
            state.allow_unsafely_create
        );
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.read().lifecycle
    }

    pub fn is_frozen(&self) -> bool {
        self.lifecycle() == Lifecycle::Frozen
    }

    pub fn has_sanitizer(&self, id: &str) -> bool {
        self.read().sanitizers.contains_key(id)
    }

    /// Registered sanitizer ids, sorted.
    pub fn sanitizer_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().sanitizers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Looks up `id` (or [`DEFAULT_SANITIZER`]) and applies it to `raw`.
    pub(crate) fn sanitize(&self, id: Option<&str>, raw: &str) -> Result<String> {
        let id = id.unwrap_or(DEFAULT_SANITIZER);
        // Release the lock before running caller code.
        let sanitizer = self.read().sanitizers.get(id).cloned();
        let sanitizer = sanitizer.ok_or_else(|| TrustedHtmlError::UnknownSanitizer {
            id: id.to_string(),
        })?;
        Ok(sanitizer(raw))
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        let mut ids: Vec<&str> = state.sanitizers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("Configuration")
            .field("sanitizers", &ids)
            .field("allow_unsafely_create", &state.allow_unsafely_create)
            .field("lifecycle", &state.lifecycle)
            .finish()
    }
}

/// Startup-time helper that assembles a [`Configuration`] in one expression.
#[derive(Default)]
pub struct ConfigurationBuilder {
    sanitizers: Vec<(String, Sanitizer)>,
    allow_unsafely_create: bool,
    freeze_on_build: bool,
}

impl ConfigurationBuilder {
    pub fn sanitizer<F>(mut self, id: impl Into<String>, sanitizer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let sanitizer: Sanitizer = Arc::new(sanitizer);
        self.sanitizers.push((id.into(), sanitizer));
        self
    }

    pub fn default_sanitizer<F>(self, sanitizer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.sanitizer(DEFAULT_SANITIZER, sanitizer)
    }

    pub fn allow_unsafely_create(mut self, allowed: bool) -> Self {
        self.allow_unsafely_create = allowed;
        self
    }

    pub fn freeze_on_build(mut self, freeze: bool) -> Self {
        self.freeze_on_build = freeze;
        self
    }

    pub fn build(self) -> Configuration {
        let config = Configuration {
            state: RwLock::new(State {
                sanitizers: self.sanitizers.into_iter().collect(),
                allow_unsafely_create: self.allow_unsafely_create,
                lifecycle: Lifecycle::Open,
            }),
        };
        if self.freeze_on_build {
            config.freeze();
        }
        config
    }
}
