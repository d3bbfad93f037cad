use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::SnifferError;

/// Canonical column names every loaded record must expose, in projection order.
pub const CANONICAL_COLUMNS: [&str; 4] = ["entity", "source", "date", "text"];

/// Weekday labels indexed by [`Record::weekday`] (Monday = 0).
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// ── Record ────────────────────────────────────────────────────────────────────

/// One normalized social-media post with its derived temporal features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Tracked person or account the batch was attributed to.
    pub entity: String,
    /// Originating platform or dataset label.
    pub source: String,
    /// Post timestamp, keeping the UTC offset it was written with.
    pub date: DateTime<FixedOffset>,
    /// Post body, raw or cleaned depending on the load options.
    pub text: String,
    /// Fractional hour of day in the corpus timezone.
    pub hour: f64,
    /// Fractional hour of day in UTC.
    pub hour_utc: f64,
    /// Day of week of `date`, Monday = 0 .. Sunday = 6.
    pub weekday: u32,
}

impl Record {
    /// Value of the requested derived hour column.
    pub fn hour_value(&self, field: HourField) -> f64 {
        match field {
            HourField::Local => self.hour,
            HourField::Utc => self.hour_utc,
        }
    }

    /// Human-readable weekday name.
    pub fn weekday_name(&self) -> &'static str {
        WEEKDAY_NAMES
            .get(self.weekday as usize)
            .copied()
            .unwrap_or("Unknown")
    }
}

// ── ColumnMapping ─────────────────────────────────────────────────────────────

/// Rename table applied to raw CSV headers: `{original name -> canonical name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(BTreeMap<String, String>);

impl ColumnMapping {
    /// Empty mapping; every column keeps its name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in mapping used by Twitter and Gab exports.
    pub fn twitter() -> Self {
        Self::new()
            .with("created_at", "date")
            .with("comment", "text")
    }

    /// Add (or replace) a single rename rule.
    pub fn with(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.0.insert(from.into(), to.into());
        self
    }

    /// Parse a JSON object such as `{"timestamp": "date", "body": "text"}`.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Name `column` takes after renaming. Unmapped columns keep their name.
    pub fn rename<'a>(&'a self, column: &'a str) -> &'a str {
        self.0.get(column).map(String::as_str).unwrap_or(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(from, to)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ── SourceKind ────────────────────────────────────────────────────────────────

/// Which column mapping a load call uses.
///
/// Recognised platforms carry a fixed mapping; everything else goes through
/// [`SourceKind::Custom`], which falls back to the Twitter mapping when no
/// mapping is supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Twitter,
    Gab,
    Custom(Option<ColumnMapping>),
}

impl Default for SourceKind {
    fn default() -> Self {
        SourceKind::Custom(None)
    }
}

impl SourceKind {
    /// Resolve a free-form platform tag.
    ///
    /// `"twitter"` and `"gab"` select the built-in mapping and ignore
    /// `custom`; any other tag becomes [`SourceKind::Custom`].
    pub fn from_tag(tag: &str, custom: Option<ColumnMapping>) -> Self {
        match tag {
            "twitter" => SourceKind::Twitter,
            "gab" => SourceKind::Gab,
            _ => SourceKind::Custom(custom),
        }
    }

    /// The column mapping this kind applies.
    pub fn mapping(&self) -> ColumnMapping {
        match self {
            SourceKind::Twitter | SourceKind::Gab => ColumnMapping::twitter(),
            SourceKind::Custom(Some(mapping)) => mapping.clone(),
            SourceKind::Custom(None) => ColumnMapping::twitter(),
        }
    }

    /// Short tag used in log output.
    pub fn tag(&self) -> &'static str {
        match self {
            SourceKind::Twitter => "twitter",
            SourceKind::Gab => "gab",
            SourceKind::Custom(_) => "other",
        }
    }
}

// ── HourField ─────────────────────────────────────────────────────────────────

/// Which derived hour column a plot uses for its hour axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HourField {
    /// `hour`: the corpus timezone.
    #[default]
    Local,
    /// `hour_utc`.
    Utc,
}

impl HourField {
    pub fn column_name(self) -> &'static str {
        match self {
            HourField::Local => "hour",
            HourField::Utc => "hour_utc",
        }
    }
}

impl FromStr for HourField {
    type Err = SnifferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(HourField::Local),
            "hour_utc" => Ok(HourField::Utc),
            other => Err(SnifferError::InvalidHourField(other.to_string())),
        }
    }
}

impl fmt::Display for HourField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ── GroupBy ───────────────────────────────────────────────────────────────────

/// Column used to split points into groups (colour hue or marker style).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Entity,
    Source,
    Weekday,
}

impl GroupBy {
    /// Group label of `record` under this column.
    pub fn key(self, record: &Record) -> String {
        match self {
            GroupBy::Entity => record.entity.clone(),
            GroupBy::Source => record.source.clone(),
            GroupBy::Weekday => record.weekday_name().to_string(),
        }
    }
}

impl FromStr for GroupBy {
    type Err = SnifferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entity" => Ok(GroupBy::Entity),
            "source" => Ok(GroupBy::Source),
            "weekday" => Ok(GroupBy::Weekday),
            other => Err(SnifferError::InvalidGroupBy(other.to_string())),
        }
    }
}

// ── PlotKind ──────────────────────────────────────────────────────────────────

/// Chart type rendered by `plot_activity`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlotKind {
    /// 2-D histogram of date against hour.
    #[default]
    Hist,
    /// Date against hour scatterplot.
    Scatter,
    /// Weekday against hour strip plot.
    Week,
}

impl FromStr for PlotKind {
    type Err = SnifferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hist" => Ok(PlotKind::Hist),
            "scatter" => Ok(PlotKind::Scatter),
            "week" => Ok(PlotKind::Week),
            other => Err(SnifferError::InvalidPlotKind(other.to_string())),
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlotKind::Hist => "hist",
            PlotKind::Scatter => "scatter",
            PlotKind::Week => "week",
        };
        f.write_str(name)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
