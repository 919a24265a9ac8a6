//! Value-by-value resolution of configuration against a [`ConfigCatalog`].
//!
//! For every key the resolver applies, in order:
//!
//! 1. the raw value from the [`PropertyBag`], verbatim;
//! 2. the value produced by the key's inference rule, if any;
//! 3. the catalog default.
//!
//! Keys are resolved lazily on first access and memoized, so inference rules
//! may depend on each other without a fixed evaluation order. Each key's
//! inference runs at most once per resolver, even with concurrent callers,
//! and a failure is memoized like a value.
//!
//! An inference rule may only resolve the catalog keys it declares in its
//! reads. The declared graph is checked for cycles when the resolver is
//! built, so no two resolutions can wait on each other.

use crate::config::PropertyBag;
use crate::config::catalog::{ConfigCatalog, ConfigProperty};
use crate::config::value::{parse_bool, parse_list};
use crate::error::ConfigError;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// Supplied explicitly in the property bag.
    Raw,
    /// Produced by the key's inference rule.
    Inferred,
    /// Catalog default.
    Default,
}

/// The final value of one key, fixed for the lifetime of the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedValue {
    /// `None` only for keys without default that were neither supplied nor
    /// inferred.
    pub value: Option<String>,
    pub source: ValueSource,
}

/// Resolves the keys of one catalog against one property bag.
#[derive(Debug)]
pub struct ConfigResolver {
    catalog: ConfigCatalog,
    properties: PropertyBag,
    resolved: HashMap<&'static str, OnceCell<Result<ResolvedValue, ConfigError>>>,
}

impl ConfigResolver {
    /// Create a resolver, rejecting catalogs with cyclic inference
    /// dependencies.
    pub fn new(properties: PropertyBag, catalog: ConfigCatalog) -> Result<Self, ConfigError> {
        catalog.check_acyclic()?;

        let resolved = catalog
            .iter()
            .map(|property| (property.key(), OnceCell::new()))
            .collect();

        Ok(Self {
            catalog,
            properties,
            resolved,
        })
    }

    /// Resolver over the partition sync catalog.
    pub fn for_sync(properties: PropertyBag) -> Result<Self, ConfigError> {
        Self::new(properties, ConfigCatalog::sync().clone())
    }

    pub fn catalog(&self) -> &ConfigCatalog {
        &self.catalog
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// Resolve `key`, memoizing the result.
    pub fn resolve(&self, key: &str) -> Result<&ResolvedValue, ConfigError> {
        self.resolve_on_chain(key, &[])
    }

    /// Resolve every catalog key, in catalog order.
    pub fn resolve_all(&self) -> Result<Vec<(&'static str, &ResolvedValue)>, ConfigError> {
        self.catalog
            .iter()
            .map(|property| Ok((property.key(), self.resolve(property.key())?)))
            .collect()
    }

    /// Resolved value of `key`, `None` if it has no value at all.
    pub fn get_string(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        Ok(self.resolve(key)?.value.as_deref())
    }

    /// Resolved value of `key`, failing if it is absent or blank.
    pub fn get_required(&self, key: &str) -> Result<&str, ConfigError> {
        match self.get_string(key)? {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingRequired {
                key: key.to_string(),
            }),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        let value = self.get_required(key)?;
        parse_bool(key, value)
    }

    /// Resolved comma separated list; absent means empty.
    pub fn get_list(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        Ok(self.get_string(key)?.map(parse_list).unwrap_or_default())
    }

    fn resolve_on_chain(
        &self,
        key: &str,
        chain: &[&'static str],
    ) -> Result<&ResolvedValue, ConfigError> {
        let property = self
            .catalog
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey {
                key: key.to_string(),
            })?;

        // Must be checked before touching the cell: re-entering an
        // initializing cell on the same thread never returns.
        if chain.contains(&property.key()) {
            let mut cycle: Vec<String> = chain.iter().map(|k| k.to_string()).collect();
            cycle.push(property.key().to_string());
            return Err(ConfigError::InferenceCycle {
                key: property.key().to_string(),
                chain: cycle,
            });
        }

        let cell = self
            .resolved
            .get(property.key())
            .ok_or_else(|| ConfigError::UnknownKey {
                key: key.to_string(),
            })?;

        cell.get_or_init(|| self.compute(property, chain))
            .as_ref()
            .map_err(ConfigError::clone)
    }

    fn compute(
        &self,
        property: &ConfigProperty,
        chain: &[&'static str],
    ) -> Result<ResolvedValue, ConfigError> {
        let key = property.key();

        if let Some(raw) = self.properties.get(key) {
            log::debug!("Resolved '{key}' from supplied value '{raw}'");
            return Ok(ResolvedValue {
                value: Some(raw.to_string()),
                source: ValueSource::Raw,
            });
        }

        if let Some(inference) = property.inference() {
            let mut chain = chain.to_vec();
            chain.push(key);
            let ctx = InferenceContext {
                resolver: self,
                chain,
                reads: inference.reads(),
            };

            if let Some(value) = inference.infer(&ctx)? {
                log::debug!("Inferred '{key}' = '{value}'");
                return Ok(ResolvedValue {
                    value: Some(value),
                    source: ValueSource::Inferred,
                });
            }
        }

        log::debug!(
            "Using default for '{key}': {}",
            property.default().unwrap_or("<none>")
        );
        Ok(ResolvedValue {
            value: property.default().map(str::to_string),
            source: ValueSource::Default,
        })
    }
}

/// Read-only view handed to inference rules.
///
/// Gives access to the raw property bag and to on-demand resolution of the
/// catalog keys the rule declares. Resolving any other catalog key fails
/// with [`ConfigError::UndeclaredRead`]; resolving a key that is already
/// being resolved further up the chain fails with
/// [`ConfigError::InferenceCycle`].
pub struct InferenceContext<'a> {
    resolver: &'a ConfigResolver,
    chain: Vec<&'static str>,
    reads: &'a [&'static str],
}

impl<'a> InferenceContext<'a> {
    /// The key currently being inferred.
    pub fn key(&self) -> Option<&'static str> {
        self.chain.last().copied()
    }

    /// Raw value supplied for `key`, which need not be a catalog key.
    pub fn raw(&self, key: &str) -> Option<&'a str> {
        self.resolver.properties.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resolver.properties.contains(key)
    }

    /// Resolve another catalog key listed in the rule's reads.
    pub fn resolve(&self, key: &str) -> Result<&'a ResolvedValue, ConfigError> {
        let declared = self.reads.iter().any(|read| *read == key);
        if !declared && self.resolver.catalog.get(key).is_some() {
            return Err(ConfigError::UndeclaredRead {
                key: self.key().unwrap_or_default().to_string(),
                read: key.to_string(),
            });
        }
        self.resolver.resolve_on_chain(key, &self.chain)
    }
}
