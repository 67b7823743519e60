// src/core/types.rs
use crate::error::{EstimatorError, EstimatorResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Room size in square metres.
pub const ROOM_SIZE_COLUMN: &str = "Luas_Kamar_m2";
pub const AC_COLUMN: &str = "Ada_AC";
pub const PRIVATE_BATH_COLUMN: &str = "Ada_KM_Dalam";
pub const WIFI_COLUMN: &str = "Ada_WiFi";
pub const SEATED_TOILET_COLUMN: &str = "Ada_Kloset_Duduk";
/// Prefix of the one-hot district indicator columns.
pub const DISTRICT_PREFIX: &str = "Lokasi_";

/// Columns every schema must carry besides the district indicators.
pub const BASE_COLUMNS: [&str; 5] = [
    ROOM_SIZE_COLUMN,
    AC_COLUMN,
    PRIVATE_BATH_COLUMN,
    WIFI_COLUMN,
    SEATED_TOILET_COLUMN,
];

/// A kecamatan offered in the input form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum District {
    Ciputat,
    CiputatTimur,
    Pamulang,
    PondokAren,
    Serpong,
    SerpongUtara,
    Setu,
    Cisauk,
    Curug,
    KelapaDua,
    Pagedangan,
}

impl District {
    /// Form order, matching the selection list shown to users.
    pub const ALL: [District; 11] = [
        District::Ciputat,
        District::CiputatTimur,
        District::Pamulang,
        District::PondokAren,
        District::Serpong,
        District::SerpongUtara,
        District::Setu,
        District::Cisauk,
        District::Curug,
        District::KelapaDua,
        District::Pagedangan,
    ];

    pub fn label(self) -> &'static str {
        match self {
            District::Ciputat => "Ciputat",
            District::CiputatTimur => "Ciputat Timur",
            District::Pamulang => "Pamulang",
            District::PondokAren => "Pondok Aren",
            District::Serpong => "Serpong",
            District::SerpongUtara => "Serpong Utara",
            District::Setu => "Setu",
            District::Cisauk => "Cisauk",
            District::Curug => "Curug",
            District::KelapaDua => "Kelapa Dua",
            District::Pagedangan => "Pagedangan",
        }
    }

    /// The indicator column this district maps to, e.g. `Lokasi_Pondok Aren`.
    pub fn feature_name(self) -> String {
        district_column(self.label())
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for District {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        District::ALL
            .iter()
            .copied()
            .find(|d| d.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EstimatorError::config(format!("unknown district '{}'", wanted)))
    }
}

/// Builds the indicator column name for a raw district label.
pub fn district_column(label: &str) -> String {
    format!("{}{}", DISTRICT_PREFIX, label)
}

/// The ordered list of input dimensions the model was trained on.
///
/// Serialized as a plain JSON array of column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Builds a schema without checking it. Duplicate names resolve to the first slot.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self { columns, index }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Slot position of a named column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Labels of every district that has an indicator column, in schema order.
    pub fn known_districts(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|c| c.strip_prefix(DISTRICT_PREFIX))
            .collect()
    }

    /// Form districts the model has no indicator for. These encode with no location signal.
    pub fn unmatched_districts(&self) -> Vec<District> {
        District::ALL
            .iter()
            .copied()
            .filter(|d| !self.contains(&d.feature_name()))
            .collect()
    }

    /// Checks that the base columns exist and that no name repeats.
    pub fn validate(&self) -> EstimatorResult<()> {
        if self.index.len() != self.columns.len() {
            let mut seen = HashSet::new();
            if let Some(dup) = self.columns.iter().find(|name| !seen.insert(*name)) {
                return Err(EstimatorError::schema_mismatch(format!(
                    "duplicate column '{}'",
                    dup
                )));
            }
        }
        for base in BASE_COLUMNS {
            if !self.contains(base) {
                return Err(EstimatorError::schema_mismatch(format!(
                    "missing required column '{}'",
                    base
                )));
            }
        }
        Ok(())
    }
}

impl From<Vec<String>> for FeatureSchema {
    fn from(columns: Vec<String>) -> Self {
        Self::new(columns)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.columns
    }
}

/// A dense model input aligned to a [`FeatureSchema`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    pub(crate) fn set(&mut self, slot: usize, value: f64) {
        self.values[slot] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named slot, looked up through the schema that produced this vector.
    pub fn get(&self, schema: &FeatureSchema, name: &str) -> Option<f64> {
        schema.position(name).and_then(|i| self.values.get(i).copied())
    }
}

/// The four amenity toggles of the input form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenities {
    pub ac: bool,
    pub private_bath: bool,
    pub wifi: bool,
    pub seated_toilet: bool,
}

/// One submission of the input form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    /// Raw district label. Labels without an indicator column are tolerated.
    pub district: String,
    pub room_size: f64,
    pub amenities: Amenities,
}

impl EstimateRequest {
    pub fn new(district: impl Into<String>, room_size: f64, amenities: Amenities) -> Self {
        Self {
            district: district.into(),
            room_size,
            amenities,
        }
    }
}

/// Point estimate with its display range, in rupiah per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub point_estimate: i64,
    pub lower_bound: i64,
    pub upper_bound: i64,
}

/// What the presentation layer receives for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub result: PredictionResult,
    pub margin: i64,
    /// False when the district had no indicator column and the model saw no location.
    pub district_matched: bool,
}
