use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::file::{read_optional, set_aside, write_atomic};
use super::StoreError;
use crate::pricing::CalculationInput;

/// Identifier of a saved calculation: the UTC instant it was saved, RFC 3339 with
/// milliseconds, suffixed with `-N` if that instant is already taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculationId(pub String);

impl fmt::Display for CalculationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCalculation {
    pub id: CalculationId,
    pub name: String,
    pub input: CalculationInput,
}

/// Named snapshots of calculator input.
pub trait CalculationRepository: Send + Sync {
    /// Saved calculations in insertion order.
    fn list(&self) -> Result<Vec<SavedCalculation>, StoreError>;
    fn save(&self, name: &str, input: CalculationInput) -> Result<SavedCalculation, StoreError>;
    /// Removes `id`; returns whether anything was removed.
    fn delete(&self, id: &CalculationId) -> Result<bool, StoreError>;
}

fn next_id(records: &[SavedCalculation], now: DateTime<Utc>) -> CalculationId {
    let base = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let taken = |candidate: &str| records.iter().any(|record| record.id.0 == candidate);

    if !taken(&base) {
        return CalculationId(base);
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !taken(&candidate) {
            return CalculationId(candidate);
        }
        suffix += 1;
    }
}

fn append(
    records: &mut Vec<SavedCalculation>,
    name: &str,
    input: CalculationInput,
    now: DateTime<Utc>,
) -> Result<SavedCalculation, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::EmptyName);
    }

    let record = SavedCalculation {
        id: next_id(records, now),
        name: name.to_string(),
        input,
    };
    records.push(record.clone());
    Ok(record)
}

fn remove(records: &mut Vec<SavedCalculation>, id: &CalculationId) -> bool {
    let before = records.len();
    records.retain(|record| &record.id != id);
    records.len() != before
}

#[derive(Debug, Default)]
pub struct InMemoryCalculationRepository {
    records: Mutex<Vec<SavedCalculation>>,
}

impl InMemoryCalculationRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<SavedCalculation>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("calculation store mutex poisoned".to_string()))
    }
}

impl CalculationRepository for InMemoryCalculationRepository {
    fn list(&self) -> Result<Vec<SavedCalculation>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, name: &str, input: CalculationInput) -> Result<SavedCalculation, StoreError> {
        append(&mut *self.lock()?, name, input, Utc::now())
    }

    fn delete(&self, id: &CalculationId) -> Result<bool, StoreError> {
        Ok(remove(&mut *self.lock()?, id))
    }
}

/// Saved calculations kept as one JSON array on disk.
#[derive(Debug)]
pub struct JsonFileCalculationRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileCalculationRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<SavedCalculation>, StoreError> {
        Ok(self.read_raw()?.0)
    }

    /// Parsed records, and whether the file existed but could not be parsed.
    fn read_raw(&self) -> Result<(Vec<SavedCalculation>, bool), StoreError> {
        let Some(raw) = read_optional(&self.path)? else {
            return Ok((Vec::new(), false));
        };

        match serde_json::from_str(&raw) {
            Ok(records) => Ok((records, false)),
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    %error,
                    "failed to parse saved calculations, treating store as empty"
                );
                Ok((Vec::new(), true))
            }
        }
    }

    /// Records to extend with a new entry. An unreadable file is moved aside first so
    /// the following write cannot destroy it.
    fn read_for_update(&self) -> Result<Vec<SavedCalculation>, StoreError> {
        let (records, unreadable) = self.read_raw()?;
        if unreadable {
            let moved_to = set_aside(&self.path, "corrupt")?;
            warn!(
                path = %self.path.display(),
                moved_to = %moved_to.display(),
                "unreadable saved calculations moved aside"
            );
        }
        Ok(records)
    }

    fn write(&self, records: &[SavedCalculation]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(records)?;
        write_atomic(&self.path, &encoded)
    }

    fn exclusive(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("calculation file lock poisoned".to_string()))
    }
}

impl CalculationRepository for JsonFileCalculationRepository {
    fn list(&self) -> Result<Vec<SavedCalculation>, StoreError> {
        self.read()
    }

    fn save(&self, name: &str, input: CalculationInput) -> Result<SavedCalculation, StoreError> {
        let _guard = self.exclusive()?;
        let mut records = self.read_for_update()?;
        let record = append(&mut records, name, input, Utc::now())?;
        self.write(&records)?;
        info!(id = %record.id, name = %record.name, "calculation saved");
        Ok(record)
    }

    fn delete(&self, id: &CalculationId) -> Result<bool, StoreError> {
        let _guard = self.exclusive()?;
        let mut records = self.read()?;
        if !remove(&mut records, id) {
            return Ok(false);
        }
        self.write(&records)?;
        info!(%id, "calculation deleted");
        Ok(true)
    }
}
