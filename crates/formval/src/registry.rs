//! Registry of named rule extensions.

use crate::rules::Rule;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Named rule extensions, checked before built-in dispatch.
///
/// Owned by the composition root and handed to each
/// [`Validator`](crate::Validator) at construction. Cloning is cheap (the
/// rules sit behind `Arc`), and a validator keeps its own clone, so
/// registrations made after construction never affect a live validator.
///
/// Registration is configuration, done once at startup, not a hot-path
/// operation.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    extensions: HashMap<String, Arc<dyn Rule>>,
}

impl RuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule evaluator under `name`.
    ///
    /// The last registration for a name wins, and a registered name
    /// shadows a built-in rule of the same text.
    pub fn register(&mut self, name: impl Into<String>, rule: impl Rule + 'static) {
        let name = name.into();
        debug!(rule = %name, "registering validation rule extension");
        self.extensions.insert(name, Arc::new(rule));
    }

    /// Whether an extension is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether no extensions are registered.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.extensions.get(name)
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish()
    }
}
