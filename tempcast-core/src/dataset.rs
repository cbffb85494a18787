//! Historical hourly measurements keyed by year and calendar hour.
//!
//! The dataset is built once (usually from a JSON export, see
//! [`HistoricalDataset::from_json_file`]) and then only read. Sparse coverage
//! is expected: a missing key is a normal outcome of [`HistoricalLookup::lookup`].

use crate::calendar::HistoricalKey;
use crate::errors::{TempcastError, TempcastResult};
use log::{info, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Measurements for one hour of one year
///
/// `points` has shape `(n, 2)` with `(longitude, latitude)` rows and `values[i]`
/// is the measurement taken at `points[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalHourRecord {
    points: Array2<f64>,
    values: Array1<f64>,
}

impl HistoricalHourRecord {
    /// Create a record from `(longitude, latitude)` pairs and their measured values
    pub fn new(points: Vec<[f64; 2]>, values: Vec<f64>) -> Self {
        let points = Array2::from_shape_fn((points.len(), 2), |(i, j)| points[i][j]);
        Self {
            points,
            values: Array1::from(values),
        }
    }

    pub fn from_arrays(points: Array2<f64>, values: Array1<f64>) -> Self {
        Self { points, values }
    }

    pub fn points(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Number of measured values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check that the record is non-empty and that points and values line up
    pub fn validate(&self) -> TempcastResult<()> {
        if self.points.ncols() != 2 {
            return Err(TempcastError::InvalidPointShape(self.points.ncols()));
        }
        if self.points.nrows() != self.values.len() {
            return Err(TempcastError::MisalignedRecord {
                points: self.points.nrows(),
                values: self.values.len(),
            });
        }
        if self.values.is_empty() {
            return Err(TempcastError::EmptyRecord);
        }
        Ok(())
    }

    pub fn is_usable(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Read access to historical records
///
/// Implementations must only return records that pass
/// [`HistoricalHourRecord::validate`]; anything else is reported as not found.
pub trait HistoricalLookup: Send + Sync {
    fn lookup(&self, key: &HistoricalKey) -> Option<&HistoricalHourRecord>;
}

/// Record layout used by dataset files
#[derive(Debug, Deserialize)]
struct RawHourRecord {
    #[serde(alias = "puntos", default)]
    points: Vec<[f64; 2]>,
    #[serde(alias = "valores", default)]
    values: Vec<f64>,
}

/// In-memory historical dataset
#[derive(Debug, Clone, Default)]
pub struct HistoricalDataset {
    records: HashMap<HistoricalKey, HistoricalHourRecord>,
}

impl HistoricalDataset {
    /// Dataset used when no historical data could be loaded
    ///
    /// Every lookup reports "not found", so forecasts degrade to unavailable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a record, returning the one previously stored under `key`
    pub fn insert(
        &mut self,
        key: HistoricalKey,
        record: HistoricalHourRecord,
    ) -> Option<HistoricalHourRecord> {
        self.records.insert(key, record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years with at least one record
    pub fn years(&self) -> BTreeSet<i32> {
        self.records.keys().map(|key| key.year).collect()
    }

    /// Parse a JSON object keyed by `YYYY-MM-DD HH:00:00`
    ///
    /// Entries with malformed keys or unusable records are skipped with a warning.
    pub fn from_json_reader<R: Read>(reader: R) -> TempcastResult<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_reader(reader)?;
        let mut dataset = Self::empty();
        let mut skipped = 0;

        for (raw_key, raw_value) in raw {
            let key = match raw_key.parse::<HistoricalKey>() {
                Ok(key) => key,
                Err(e) => {
                    warn!("Skipping dataset entry: {}", e);
                    skipped += 1;
                    continue;
                }
            };
            let raw_record = match serde_json::from_value::<RawHourRecord>(raw_value) {
                Ok(raw_record) => raw_record,
                Err(e) => {
                    warn!("Skipping dataset entry {}: {}", key, e);
                    skipped += 1;
                    continue;
                }
            };
            let record = HistoricalHourRecord::new(raw_record.points, raw_record.values);
            if let Err(e) = record.validate() {
                warn!("Skipping dataset entry {}: {}", key, e);
                skipped += 1;
                continue;
            }
            dataset.insert(key, record);
        }

        info!(
            "Loaded {} historical records covering {} years ({} skipped)",
            dataset.len(),
            dataset.years().len(),
            skipped
        );
        Ok(dataset)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> TempcastResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Load a dataset file, falling back to an empty dataset on failure
    ///
    /// A missing or corrupt file must not stop the process; the engine keeps
    /// running and reports every forecast as unavailable.
    pub fn load_or_degraded<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_json_file(path) {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!(
                    "Historical dataset {} could not be loaded ({}); running in degraded mode",
                    path.display(),
                    e
                );
                Self::empty()
            }
        }
    }
}

impl HistoricalLookup for HistoricalDataset {
    fn lookup(&self, key: &HistoricalKey) -> Option<&HistoricalHourRecord> {
        self.records.get(key).filter(|record| record.is_usable())
    }
}

impl FromIterator<(HistoricalKey, HistoricalHourRecord)> for HistoricalDataset {
    fn from_iter<T: IntoIterator<Item = (HistoricalKey, HistoricalHourRecord)>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
