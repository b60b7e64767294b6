//! # Modules & Registry
//!
//! A module is a named unit of process functionality. The orchestrator only
//! needs two things from it: a stable name and, at setup time, a
//! [`ModuleConfig`] carrying its lifecycle hooks.
//!
//! ```rust
//! use service_lifecycle::framework::{Env, ModuleConfig, ModuleRegistry, SimpleModule};
//!
//! let mut registry = ModuleRegistry::new();
//! registry.register(SimpleModule::new("db", |_env| {
//!     Ok(ModuleConfig::new().on_start(|| println!("db up")))
//! }));
//!
//! let resolved = registry.resolve(Env::Test).unwrap();
//! assert_eq!(resolved[0].name(), "db");
//! ```

use crate::framework::env::Env;
use crate::framework::error::{ModuleError, SetupError};
use std::collections::HashSet;
use std::fmt;

/// A zero-argument lifecycle callback. Start hooks must not block.
pub type Hook = Box<dyn Fn() + Send + Sync>;

/// Lifecycle hooks for one module. Built during setup, read-only afterwards.
#[derive(Default)]
pub struct ModuleConfig {
    pub(crate) start: Option<Hook>,
    pub(crate) stop: Option<Hook>,
}

impl ModuleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.start = Some(Box::new(hook));
        self
    }

    pub fn on_stop(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.stop = Some(Box::new(hook));
        self
    }

    pub fn has_start(&self) -> bool {
        self.start.is_some()
    }

    pub fn has_stop(&self) -> bool {
        self.stop.is_some()
    }
}

impl fmt::Debug for ModuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleConfig")
            .field("start", &self.has_start())
            .field("stop", &self.has_stop())
            .finish()
    }
}

/// A registered unit of functionality.
pub trait Module: Send + Sync + 'static {
    /// Stable name, unique within a registry.
    fn name(&self) -> &str;

    /// Resolves this module's hooks for the given environment.
    fn configure(&self, env: Env) -> Result<ModuleConfig, ModuleError>;
}

/// A module built from a name and a configure closure.
pub struct SimpleModule<F> {
    name: String,
    configure: F,
}

impl<F> SimpleModule<F>
where
    F: Fn(Env) -> Result<ModuleConfig, ModuleError> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, configure: F) -> Self {
        Self {
            name: name.into(),
            configure,
        }
    }
}

impl<F> Module for SimpleModule<F>
where
    F: Fn(Env) -> Result<ModuleConfig, ModuleError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&self, env: Env) -> Result<ModuleConfig, ModuleError> {
        (self.configure)(env)
    }
}

/// A module whose configuration has been resolved.
#[derive(Debug)]
pub struct ResolvedModule {
    name: String,
    config: ModuleConfig,
}

impl ResolvedModule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }
}

/// Ordered list of modules. Registration order is start order.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Box<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: impl Module) {
        self.modules.push(Box::new(module));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name())
    }

    /// Resolves every module's configuration, in registry order.
    ///
    /// Fails on the first duplicate name or configure error; no hook has run
    /// at that point.
    pub fn resolve(&self, env: Env) -> Result<Vec<ResolvedModule>, SetupError> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(self.modules.len());

        for module in &self.modules {
            let name = module.name();
            if !seen.insert(name) {
                return Err(SetupError::DuplicateModule(name.to_string()));
            }
            let config = module.configure(env).map_err(|source| SetupError::Module {
                module: name.to_string(),
                source,
            })?;
            resolved.push(ResolvedModule {
                name: name.to_string(),
                config,
            });
        }

        Ok(resolved)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
