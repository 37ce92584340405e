// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filter registry — maps strategy names to shared filter instances.
//
// The registry is populated once at startup (explicitly, no discovery) and is
// read-only afterwards. It is passed to the converter rather than held in a
// global.

use std::collections::BTreeMap;
use std::sync::Arc;

use ocrsift_core::error::{Result, SiftError};
use serde::Serialize;
use tracing::{debug, warn};

use crate::article::ArticleFilter;
use crate::djg::DjgFilter;
use crate::hybrid::HybridFilter;

/// Name of the strategy unknown names fall back to.
pub const DEFAULT_FILTER: &str = "default";

/// Name and human-readable description of a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterInfo {
    pub name: String,
    pub description: String,
}

impl FilterInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl std::fmt::Display for FilterInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

/// Shared contract of every content classification strategy.
pub trait ContentFilter: Send + Sync {
    /// Strip boilerplate from raw document text. Must be deterministic.
    fn extract_main_content(&self, text: &str) -> String;

    fn describe(&self) -> FilterInfo;
}

/// Immutable name → strategy mapping.
#[derive(Clone)]
pub struct FilterRegistry {
    filters: BTreeMap<String, Arc<dyn ContentFilter>>,
}

impl FilterRegistry {
    /// Registry with every built-in strategy.
    pub fn with_builtin() -> Self {
        Self::builder()
            .register(HybridFilter::new())
            .register(DjgFilter::new())
            .register(ArticleFilter::new())
            .build()
    }

    pub fn builder() -> FilterRegistryBuilder {
        FilterRegistryBuilder::default()
    }

    /// Look up a strategy by name.
    ///
    /// Unknown names fall back to the default strategy with a warning. Without a
    /// default, an unknown name is a configuration error naming the available set.
    pub fn get(&self, name: &str) -> Result<Arc<dyn ContentFilter>> {
        if let Some(filter) = self.filters.get(name) {
            debug!(filter = name, "Filter resolved");
            return Ok(Arc::clone(filter));
        }

        let available = self.list();
        match self.filters.get(DEFAULT_FILTER) {
            Some(default) => {
                warn!(
                    requested = name,
                    ?available,
                    "Unknown filter; using the default filter"
                );
                Ok(Arc::clone(default))
            }
            None => Err(SiftError::UnknownFilter {
                name: name.to_string(),
                available,
            }),
        }
    }

    /// Registered names in sorted order.
    pub fn list(&self) -> Vec<String> {
        self.filters.keys().cloned().collect()
    }

    /// Descriptions of every registered strategy, sorted by name.
    pub fn describe_all(&self) -> Vec<FilterInfo> {
        self.filters.values().map(|filter| filter.describe()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.list())
            .finish()
    }
}

/// Collects strategies before freezing them into a [`FilterRegistry`].
#[derive(Default)]
pub struct FilterRegistryBuilder {
    filters: BTreeMap<String, Arc<dyn ContentFilter>>,
}

impl FilterRegistryBuilder {
    /// Register a strategy under the name reported by its `describe()`.
    /// A later registration with the same name replaces the earlier one.
    pub fn register(mut self, filter: impl ContentFilter + 'static) -> Self {
        let name = filter.describe().name;
        debug!(filter = %name, "Registering filter");
        self.filters.insert(name, Arc::new(filter));
        self
    }

    pub fn build(self) -> FilterRegistry {
        FilterRegistry {
            filters: self.filters,
        }
    }
}
