//! Persistence of tracked dates and recorded schedules.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::parser::{ScheduleBatchResult, ScheduleEntry};

/// Dates a squadron still has no schedule for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SquadronDates {
    pub squadron_id: String,
    pub dates: Vec<String>,
}

pub trait ScheduleStore {
    fn squadrons_missing_schedules(&self) -> Result<Vec<SquadronDates>, StoreError>;

    fn record_schedules(
        &mut self,
        squadron_id: &str,
        schedules: &ScheduleBatchResult,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    squadrons: BTreeMap<String, SquadronRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SquadronRecord {
    #[serde(default)]
    dates: BTreeSet<String>,
    #[serde(default)]
    schedules: BTreeMap<String, ScheduleEntry>,
}

impl SquadronRecord {
    fn missing(&self) -> Vec<String> {
        self.dates
            .iter()
            .filter(|date| !self.schedules.contains_key(*date))
            .cloned()
            .collect()
    }
}

/// Store backed by a single JSON document on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: StoreDocument,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => StoreDocument::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start watching `dates` for `squadron_id`. Returns how many were new.
    pub fn track_dates<S: AsRef<str>>(
        &mut self,
        squadron_id: &str,
        dates: &[S],
    ) -> Result<usize, StoreError> {
        let record = self
            .document
            .squadrons
            .entry(squadron_id.to_string())
            .or_default();
        let mut added = 0;
        for date in dates {
            let date: &str = date.as_ref();
            if record.dates.insert(date.to_string()) {
                added += 1;
            }
        }
        self.persist()?;
        Ok(added)
    }

    pub fn schedules_for(&self, squadron_id: &str) -> Option<&BTreeMap<String, ScheduleEntry>> {
        self.document
            .squadrons
            .get(squadron_id)
            .map(|record| &record.schedules)
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_string_pretty(&self.document)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, serialized)?;
        fs::rename(&staging, &self.path)?;
        debug!(path = %self.path.display(), "Store persisted");
        Ok(())
    }
}

impl ScheduleStore for JsonFileStore {
    fn squadrons_missing_schedules(&self) -> Result<Vec<SquadronDates>, StoreError> {
        Ok(self
            .document
            .squadrons
            .iter()
            .filter_map(|(squadron_id, record)| {
                let dates = record.missing();
                (!dates.is_empty()).then(|| SquadronDates {
                    squadron_id: squadron_id.clone(),
                    dates,
                })
            })
            .collect())
    }

    fn record_schedules(
        &mut self,
        squadron_id: &str,
        schedules: &ScheduleBatchResult,
    ) -> Result<(), StoreError> {
        let record = self
            .document
            .squadrons
            .get_mut(squadron_id)
            .ok_or_else(|| StoreError::UnknownSquadron(squadron_id.to_string()))?;
        for (date, entry) in schedules {
            record.dates.insert(date.clone());
            record.schedules.insert(date.clone(), entry.clone());
        }
        self.persist()
    }
}
