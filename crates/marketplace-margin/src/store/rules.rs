use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn};

use super::file::{read_optional, remove_if_exists, write_atomic};
use super::StoreError;
use crate::rules::{merge_with_defaults, MarketplaceRules, PartialMarketplaceRules};

/// Whole-document access to the persisted rule set.
pub trait RuleStore: Send + Sync {
    /// Persisted rules merged over the defaults; defaults when nothing is stored.
    fn load(&self) -> Result<MarketplaceRules, StoreError>;
    /// Validates and replaces the persisted rules.
    fn save(&self, rules: &MarketplaceRules) -> Result<(), StoreError>;
    /// Forgets persisted rules and returns the default table.
    fn reset(&self) -> Result<MarketplaceRules, StoreError>;
}

fn rules_from_document(document: Option<&str>) -> MarketplaceRules {
    let Some(raw) = document else {
        return MarketplaceRules::default();
    };

    match PartialMarketplaceRules::from_json_str(raw) {
        Ok(partial) => merge_with_defaults(partial),
        Err(error) => {
            warn!(%error, "failed to parse persisted rules, using defaults");
            MarketplaceRules::default()
        }
    }
}

fn encode(rules: &MarketplaceRules) -> Result<String, StoreError> {
    rules.validate()?;
    Ok(serde_json::to_string_pretty(rules)?)
}

/// Keeps the encoded document in memory; useful for tests and ephemeral servers.
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    document: Mutex<Option<String>>,
}

impl InMemoryRuleStore {
    /// Starts from an already persisted document, as if written by an earlier release.
    pub fn with_document(raw: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(raw.into())),
        }
    }

    pub fn document(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, StoreError> {
        self.document
            .lock()
            .map_err(|_| StoreError::Unavailable("rule store mutex poisoned".to_string()))
    }
}

impl RuleStore for InMemoryRuleStore {
    fn load(&self) -> Result<MarketplaceRules, StoreError> {
        Ok(rules_from_document(self.lock()?.as_deref()))
    }

    fn save(&self, rules: &MarketplaceRules) -> Result<(), StoreError> {
        let encoded = encode(rules)?;
        *self.lock()? = Some(encoded);
        Ok(())
    }

    fn reset(&self) -> Result<MarketplaceRules, StoreError> {
        *self.lock()? = None;
        Ok(MarketplaceRules::default())
    }
}

/// Rule document stored as a JSON file.
#[derive(Debug)]
pub struct JsonFileRuleStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn exclusive(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("rule file lock poisoned".to_string()))
    }
}

impl RuleStore for JsonFileRuleStore {
    fn load(&self) -> Result<MarketplaceRules, StoreError> {
        let document = read_optional(&self.path)?;
        Ok(rules_from_document(document.as_deref()))
    }

    fn save(&self, rules: &MarketplaceRules) -> Result<(), StoreError> {
        let encoded = encode(rules)?;
        let _guard = self.exclusive()?;
        write_atomic(&self.path, &encoded)?;
        info!(path = %self.path.display(), "marketplace rules saved");
        Ok(())
    }

    fn reset(&self) -> Result<MarketplaceRules, StoreError> {
        let _guard = self.exclusive()?;
        remove_if_exists(&self.path)?;
        info!(path = %self.path.display(), "marketplace rules reset to defaults");
        Ok(MarketplaceRules::default())
    }
}
