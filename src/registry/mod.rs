//! Permitted-method registry and configuration context
//!
//! The generator never decides on its own which functions an analyst may
//! call. Every call is looked up by exact name in the [`Environment`] of the
//! requested [`MethodCategory`], through the [`MethodResolver`] trait.
//!
//! - [`environment`]: per-category method tables
//! - [`options`]: free-form string options stored next to the environments
//! - [`loader`]: YAML (de)serialization of a whole [`Registry`]
//!
//! A [`Registry`] is plain data passed by reference. When administrators may
//! change it while expressions are being rendered, wrap it in a
//! [`SharedRegistry`]: renders take an immutable [`Arc`] snapshot and keep a
//! consistent view for their whole duration, while updates are serialized and
//! published as a fresh snapshot.

pub mod environment;
pub mod loader;
pub mod options;

use rustc_hash::FxHashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

pub use environment::Environment;
pub use options::{DsOption, Options};

/// Classification of permitted functions used to scope lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MethodCategory {
    /// Functions returning (disclosure-checked) results to the analyst
    Aggregate,
    /// Functions whose result is assigned server-side
    Assign,
}

impl MethodCategory {
    pub const ALL: [MethodCategory; 2] = [MethodCategory::Aggregate, MethodCategory::Assign];

    pub fn as_str(self) -> &'static str {
        match self {
            MethodCategory::Aggregate => "aggregate",
            MethodCategory::Assign => "assign",
        }
    }
}

impl fmt::Display for MethodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodCategory {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aggregate" => Ok(MethodCategory::Aggregate),
            "assign" => Ok(MethodCategory::Assign),
            _ => Err(ConfigError::UnknownCategory(s.to_string())),
        }
    }
}

/// Function provided by an installed package, invoked by qualified name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedFunction {
    pub name: String,
    /// Fully qualified target, e.g. `dsBase::meanDS`
    pub function: String,
}

/// Function defined by an administrator-supplied script body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFunction {
    pub name: String,
    pub body: String,
}

/// Outcome of a successful registry lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedMethod {
    Packaged(PackagedFunction),
    Script(ScriptFunction),
}

impl ResolvedMethod {
    pub fn packaged(name: impl Into<String>, function: impl Into<String>) -> Self {
        ResolvedMethod::Packaged(PackagedFunction {
            name: name.into(),
            function: function.into(),
        })
    }

    pub fn script(name: impl Into<String>, body: impl Into<String>) -> Self {
        ResolvedMethod::Script(ScriptFunction {
            name: name.into(),
            body: body.into(),
        })
    }

    /// The bare name analysts call the method by
    pub fn name(&self) -> &str {
        match self {
            ResolvedMethod::Packaged(f) => &f.name,
            ResolvedMethod::Script(f) => &f.name,
        }
    }
}

/// Read-only lookup consumed by the script generator.
///
/// Lookup is by exact name; `None` always means "not permitted".
pub trait MethodResolver {
    fn resolve(&self, name: &str, category: MethodCategory) -> Option<ResolvedMethod>;
}

impl<T: MethodResolver + ?Sized> MethodResolver for Arc<T> {
    fn resolve(&self, name: &str, category: MethodCategory) -> Option<ResolvedMethod> {
        (**self).resolve(name, category)
    }
}

/// Configuration layer errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} option does not exist")]
    NoSuchOption(String),
    #[error("unknown method category '{0}' (expected 'aggregate' or 'assign')")]
    UnknownCategory(String),
    #[error("invalid method '{name}': {reason}")]
    InvalidMethod { name: String, reason: String },
    #[error("invalid registry configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Environments (one per category) plus options
#[derive(Debug, Clone, Default)]
pub struct Registry {
    environments: FxHashMap<MethodCategory, Environment>,
    options: Options,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn environment(&self, category: MethodCategory) -> Option<&Environment> {
        self.environments.get(&category)
    }

    /// Environment for `category`, created empty on first use
    pub fn environment_mut(&mut self, category: MethodCategory) -> &mut Environment {
        self.environments
            .entry(category)
            .or_insert_with(|| Environment::new(category))
    }

    /// Permit `method` in `category`, returning the entry it replaced
    pub fn add_method(
        &mut self,
        category: MethodCategory,
        method: ResolvedMethod,
    ) -> Option<ResolvedMethod> {
        self.environment_mut(category).add_method(method)
    }

    pub fn remove_method(&mut self, category: MethodCategory, name: &str) -> Option<ResolvedMethod> {
        self.environments.get_mut(&category)?.remove_method(name)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains(name)
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn option(&self, name: &str) -> Result<&DsOption, ConfigError> {
        self.options.get(name)
    }

    pub fn add_or_update_option(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.options.add_or_update(name, value);
    }

    pub fn add_option_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        self.options.add_if_absent(name, value)
    }

    /// Remove an option; absent names are ignored
    pub fn remove_option(&mut self, name: &str) {
        self.options.remove(name);
    }
}

impl MethodResolver for Registry {
    fn resolve(&self, name: &str, category: MethodCategory) -> Option<ResolvedMethod> {
        self.environment(category)?.method(name).cloned()
    }
}

/// Registry shared between administrators and concurrent renders
#[derive(Debug, Default)]
pub struct SharedRegistry {
    current: RwLock<Arc<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// Stable view for one or more renders; later updates do not affect it
    pub fn snapshot(&self) -> Arc<Registry> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Apply `change` to a copy of the current registry and publish the copy
    pub fn update<R>(&self, change: impl FnOnce(&mut Registry) -> R) -> R {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Registry::clone(&guard);
        let result = change(&mut next);
        *guard = Arc::new(next);
        debug!("registry snapshot replaced");
        result
    }

    pub fn replace(&self, registry: Registry) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(registry);
        debug!("registry snapshot replaced");
    }
}
