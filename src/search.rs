// Search criteria store
// Shared destination / dates / party size, read by results views and written by the search form

use chrono::{Months, NaiveDate};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const MIN_ADULTS: u32 = 1;
pub const MIN_CHILDREN: u32 = 0;
pub const MAX_GUESTS: u32 = 20;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("Check-in {check_in} is after check-out {check_out}")]
    DateOrder {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Date {date} is outside {min}..={max}")]
    DateOutOfRange {
        date: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },

    #[error("Adult count must be between 1 and 20, got {0}")]
    AdultCount(u32),

    #[error("Child count must be between 0 and 20, got {0}")]
    ChildCount(u32),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Selectable date window for the pickers: today up to one year ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    pub fn from_today(today: NaiveDate) -> Self {
        let max = today
            .checked_add_months(Months::new(12))
            .unwrap_or(NaiveDate::MAX);
        Self { min: today, max }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.min && date <= self.max
    }

    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub destination: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adult_count: u32,
    pub child_count: u32,
}

impl SearchCriteria {
    pub fn default_for(today: NaiveDate) -> Self {
        Self {
            destination: String::new(),
            check_in: today,
            check_out: today,
            adult_count: MIN_ADULTS,
            child_count: MIN_CHILDREN,
        }
    }

    /// Hard check of the bounds the input widgets only advise on
    pub fn validate(&self, bounds: &DateBounds) -> Result<(), SearchError> {
        for date in [self.check_in, self.check_out] {
            if !bounds.contains(date) {
                return Err(SearchError::DateOutOfRange {
                    date,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        if self.check_in > self.check_out {
            return Err(SearchError::DateOrder {
                check_in: self.check_in,
                check_out: self.check_out,
            });
        }
        if !(MIN_ADULTS..=MAX_GUESTS).contains(&self.adult_count) {
            return Err(SearchError::AdultCount(self.adult_count));
        }
        if self.child_count > MAX_GUESTS {
            return Err(SearchError::ChildCount(self.child_count));
        }
        Ok(())
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

pub trait SearchStorage: Send + Sync + 'static {
    fn load(&self) -> Result<Option<SearchCriteria>, StorageError>;

    fn store(&self, criteria: &SearchCriteria) -> Result<(), StorageError>;
}

/// Persists the last saved criteria as a JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SearchStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<SearchCriteria>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn store(&self, criteria: &SearchCriteria) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(criteria)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// The shared store. `save` is the only write path and replaces all five
/// fields under one lock, so readers never see a partial update.
pub struct SearchContext {
    criteria: RwLock<SearchCriteria>,
    storage: Option<Box<dyn SearchStorage>>,
}

impl SearchContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            criteria: RwLock::new(SearchCriteria::default_for(today)),
            storage: None,
        }
    }

    // Storage read failures fall back to defaults
    pub fn with_storage(today: NaiveDate, storage: Box<dyn SearchStorage>) -> Self {
        let initial = match storage.load() {
            Ok(Some(criteria)) => {
                debug!(?criteria, "restored search criteria");
                criteria
            }
            Ok(None) => SearchCriteria::default_for(today),
            Err(e) => {
                warn!(error = %e, "could not restore search criteria, using defaults");
                SearchCriteria::default_for(today)
            }
        };

        Self {
            criteria: RwLock::new(initial),
            storage: Some(storage),
        }
    }

    pub fn read(&self) -> SearchCriteria {
        self.criteria.read().clone()
    }

    pub fn save(
        &self,
        destination: impl Into<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        adult_count: u32,
        child_count: u32,
    ) {
        let criteria = SearchCriteria {
            destination: destination.into(),
            check_in,
            check_out,
            adult_count,
            child_count,
        };
        debug!(?criteria, "saving search criteria");

        // Disk writes happen under the same guard so they land in save order
        let mut guard = self.criteria.write();
        *guard = criteria;

        if let Some(storage) = &self.storage {
            if let Err(e) = storage.store(&guard) {
                warn!(error = %e, "failed to persist search criteria");
            }
        }
    }

    /// Like `save`, but refuses values outside the widget bounds.
    pub fn save_checked(
        &self,
        destination: impl Into<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        adult_count: u32,
        child_count: u32,
        bounds: &DateBounds,
    ) -> Result<(), SearchError> {
        let criteria = SearchCriteria {
            destination: destination.into(),
            check_in,
            check_out,
            adult_count,
            child_count,
        };
        criteria.validate(bounds)?;
        self.save(
            criteria.destination,
            criteria.check_in,
            criteria.check_out,
            criteria.adult_count,
            criteria.child_count,
        );
        Ok(())
    }
}
