//! The [`Corpus`]: an append-only table of normalized social-media records.
//!
//! A corpus owns a fixed timezone used to derive local hours, and grows one
//! CSV export at a time through [`Corpus::load_data_from_csv`]. Loads are
//! all-or-nothing: rows are appended only after the whole file has been
//! parsed, mapped, dated and cleaned.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use sniffer_core::cleaning::TextCleaner;
use sniffer_core::models::{Record, SourceKind};
use sniffer_core::time_utils::{TimestampParser, TimezoneHandler};
use sniffer_core::{Result, SnifferError};
use tracing::{debug, info, warn};

use crate::reader::{find_csv_files, read_delimited};

// ── LoadOptions ───────────────────────────────────────────────────────────────

/// Per-call settings for [`Corpus::load_data_from_csv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Export kind and the column mapping it implies.
    pub kind: SourceKind,
    /// Label stamped on every row of this load.
    pub entity: String,
    /// Label stamped on every row of this load.
    pub source: String,
    /// Field delimiter.
    pub sep: u8,
    /// Drop retweets and strip mentions, hashtags and `t.co` links.
    pub clean: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            entity: String::new(),
            source: String::new(),
            sep: b',',
            clean: true,
        }
    }
}

impl LoadOptions {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = entity.into();
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn sep(mut self, sep: u8) -> Self {
        self.sep = sep;
        self
    }

    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }
}

// ── LoadOutcome ───────────────────────────────────────────────────────────────

/// What a load call did to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rows were appended; `dropped` counts rows removed as retweets.
    Appended { rows: usize, dropped: usize },
    /// The mapped file lacked canonical columns; the table is unchanged.
    Skipped { missing: Vec<String> },
}

impl LoadOutcome {
    pub fn rows_appended(&self) -> usize {
        match self {
            LoadOutcome::Appended { rows, .. } => *rows,
            LoadOutcome::Skipped { .. } => 0,
        }
    }
}

// ── Corpus ────────────────────────────────────────────────────────────────────

/// Accumulating table of records plus the timezone used for local hours.
///
/// Loading takes `&mut self`, so a corpus has a single writer; share it
/// across threads only behind external synchronisation.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    table: Vec<Record>,
    timezone: TimezoneHandler,
}

impl Corpus {
    /// Create an empty corpus. `None` selects `US/Pacific`.
    pub fn new(timezone: Option<Tz>) -> Self {
        Self {
            table: Vec::new(),
            timezone: timezone.map(TimezoneHandler::new).unwrap_or_default(),
        }
    }

    /// Create an empty corpus from an IANA timezone name or `"auto"`.
    pub fn with_timezone_name(name: &str) -> Result<Self> {
        Ok(Self {
            table: Vec::new(),
            timezone: TimezoneHandler::from_name(name)?,
        })
    }

    pub fn timezone(&self) -> &TimezoneHandler {
        &self.timezone
    }

    /// All records, in load order.
    pub fn records(&self) -> &[Record] {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Distinct entity labels in first-seen order.
    pub fn entities(&self) -> Vec<&str> {
        distinct(self.table.iter().map(|r| r.entity.as_str()))
    }

    /// Distinct source labels in first-seen order.
    pub fn sources(&self) -> Vec<&str> {
        distinct(self.table.iter().map(|r| r.source.as_str()))
    }

    /// Row selector with one entry per record, `true` where `predicate` holds.
    pub fn mask<F>(&self, predicate: F) -> Vec<bool>
    where
        F: Fn(&Record) -> bool,
    {
        self.table.iter().map(predicate).collect()
    }

    /// Records kept by `mask`, or every record when `mask` is `None`.
    pub fn select(&self, mask: Option<&[bool]>) -> Result<Vec<&Record>> {
        match mask {
            None => Ok(self.table.iter().collect()),
            Some(mask) if mask.len() != self.table.len() => Err(SnifferError::MaskLength {
                expected: self.table.len(),
                actual: mask.len(),
            }),
            Some(mask) => Ok(self
                .table
                .iter()
                .zip(mask)
                .filter(|(_, keep)| **keep)
                .map(|(record, _)| record)
                .collect()),
        }
    }

    /// Load one delimited export and append its rows.
    ///
    /// A file whose mapped headers lack a canonical column is reported with
    /// a warning and yields [`LoadOutcome::Skipped`]; every other failure is
    /// returned as an error. In both cases the table is left unchanged.
    pub fn load_data_from_csv(
        &mut self,
        csv: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> Result<LoadOutcome> {
        let path = csv.as_ref();
        debug!(
            "Loading {} (kind: {}, sep: {:?}, clean: {})",
            path.display(),
            options.kind.tag(),
            options.sep as char,
            options.clean
        );

        match self.build_records(path, options) {
            Ok((records, dropped)) => {
                let rows = records.len();
                self.table.extend(records);
                info!(
                    "Appended {} rows from {} ({} retweets dropped, {} total)",
                    rows,
                    path.display(),
                    dropped,
                    self.table.len()
                );
                Ok(LoadOutcome::Appended { rows, dropped })
            }
            Err(SnifferError::MissingColumn(missing)) => {
                warn!("Missing columns {:?} in {}", missing, path.display());
                warn!("Ensure the data and chosen mapping match up.");
                Ok(LoadOutcome::Skipped { missing })
            }
            Err(e) => Err(e),
        }
    }

    /// Load every `*.csv` under `dir` (recursively, sorted by path).
    ///
    /// Stops at the first file that fails with an error; files loaded before
    /// it stay in the table.
    pub fn load_data_from_dir(
        &mut self,
        dir: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> Result<Vec<(PathBuf, LoadOutcome)>> {
        let dir = dir.as_ref();
        let files = find_csv_files(dir);
        if files.is_empty() {
            warn!("No CSV files found in {}", dir.display());
        }

        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let outcome = self.load_data_from_csv(&file, options)?;
            outcomes.push((file, outcome));
        }
        Ok(outcomes)
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Parse, map, project, date and optionally clean `path`.
    ///
    /// Returns the finished records and the number of retweets dropped.
    fn build_records(&self, path: &Path, options: &LoadOptions) -> Result<(Vec<Record>, usize)> {
        let mut raw = read_delimited(path, options.sep)?;
        raw.rename(&options.kind.mapping());
        let rows = raw.project()?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let date = TimestampParser::parse(&row.date)?;
            let features = self.timezone.derive_features(&date);
            records.push(Record {
                entity: options.entity.clone(),
                source: options.source.clone(),
                date,
                text: row.text,
                hour: features.hour,
                hour_utc: features.hour_utc,
                weekday: features.weekday,
            });
        }

        if !options.clean {
            return Ok((records, 0));
        }

        let before = records.len();
        let cleaned: Vec<Record> = records
            .into_iter()
            .filter_map(|mut record| {
                record.text = TextCleaner::clean(&record.text)?;
                Some(record)
            })
            .collect();
        let dropped = before - cleaned.len();
        Ok((cleaned, dropped))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sniffer_core::models::ColumnMapping;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut f = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(f, "{}", line).unwrap();
        }
        path
    }

    fn twitter_export(dir: &Path) -> PathBuf {
        write_csv(
            dir,
            "tweets.csv",
            &[
                "id,entity,source,created_at,comment",
                "1,raw,raw,2024-01-17T10:30:00Z,Hello @alice and #world http://t.co/xyz  now",
                "2,raw,raw,2024-01-17T11:00:00Z,RT @bob: hi #fun http://t.co/abc123   there",
                "3,raw,raw,2024-07-04T23:45:00Z,plain text",
            ],
        )
    }

    fn twitter_options() -> LoadOptions {
        LoadOptions::new(SourceKind::Twitter)
            .entity("alice")
            .source("twitter")
    }

    // ── Construction ──────────────────────────────────────────────────────────

    #[test]
    fn test_new_corpus_is_empty_with_default_timezone() {
        let corpus = Corpus::new(None);
        assert!(corpus.is_empty());
        assert_eq!(corpus.timezone().name(), "US/Pacific");
        assert_eq!(Corpus::default().timezone().tz(), Tz::US__Pacific);
    }

    #[test]
    fn test_with_timezone_name() {
        let corpus = Corpus::with_timezone_name("Europe/Berlin").unwrap();
        assert_eq!(corpus.timezone().tz(), Tz::Europe__Berlin);
        assert!(matches!(
            Corpus::with_timezone_name("Nowhere/Land"),
            Err(SnifferError::InvalidTimezone(_))
        ));
    }

    // ── load_data_from_csv ────────────────────────────────────────────────────

    #[test]
    fn test_load_twitter_with_cleaning() {
        let dir = TempDir::new().unwrap();
        let path = twitter_export(dir.path());
        let mut corpus = Corpus::new(None);

        let outcome = corpus.load_data_from_csv(&path, &twitter_options()).unwrap();

        assert_eq!(outcome, LoadOutcome::Appended { rows: 2, dropped: 1 });
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.records()[0].text, "Hello and now");
        assert_eq!(corpus.records()[1].text, "plain text");
    }

    #[test]
    fn test_load_without_cleaning_keeps_every_row() {
        let dir = TempDir::new().unwrap();
        let path = twitter_export(dir.path());
        let mut corpus = Corpus::new(None);

        let outcome = corpus
            .load_data_from_csv(&path, &twitter_options().clean(false))
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Appended { rows: 3, dropped: 0 });
        assert!(corpus.records()[1].text.starts_with("RT @bob"));
        assert_eq!(
            corpus.records()[0].text,
            "Hello @alice and #world http://t.co/xyz  now"
        );
    }

    #[test]
    fn test_labels_overwrite_file_values() {
        let dir = TempDir::new().unwrap();
        let path = twitter_export(dir.path());
        let mut corpus = Corpus::new(None);
        corpus.load_data_from_csv(&path, &twitter_options()).unwrap();

        assert!(corpus
            .records()
            .iter()
            .all(|r| r.entity == "alice" && r.source == "twitter"));
    }

    #[test]
    fn test_derived_features_match_date() {
        let dir = TempDir::new().unwrap();
        let path = twitter_export(dir.path());
        let mut corpus = Corpus::new(Some(Tz::US__Pacific));
        corpus.load_data_from_csv(&path, &twitter_options()).unwrap();

        // 2024-01-17 is a Wednesday; 10:30 UTC is 02:30 PST.
        let winter = &corpus.records()[0];
        assert_eq!(winter.weekday, 2);
        assert_eq!(winter.hour_utc, 10.5);
        assert_eq!(winter.hour, 2.5);

        // 2024-07-04 23:45 UTC is 16:45 PDT on a Thursday.
        let summer = &corpus.records()[1];
        assert_eq!(summer.weekday, 3);
        assert_eq!(summer.hour_utc, 23.75);
        assert_eq!(summer.hour, 16.75);
    }

    #[test]
    fn test_missing_column_is_skipped_and_table_unchanged() {
        let dir = TempDir::new().unwrap();
        let good = twitter_export(dir.path());
        let bad = write_csv(
            dir.path(),
            "bad.csv",
            &["entity,source,created_at,body", "x,y,2024-01-17T10:30:00Z,hi"],
        );
        let mut corpus = Corpus::new(None);
        corpus.load_data_from_csv(&good, &twitter_options()).unwrap();
        let before = corpus.records().to_vec();

        let outcome = corpus.load_data_from_csv(&bad, &twitter_options()).unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Skipped {
                missing: vec!["text".to_string()]
            }
        );
        assert_eq!(outcome.rows_appended(), 0);
        assert_eq!(corpus.records(), before.as_slice());
    }

    /// Log sink shared between a test and its subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_missing_column_logs_column_and_hint() {
        let dir = TempDir::new().unwrap();
        let bad = write_csv(
            dir.path(),
            "bad.csv",
            &["entity,source,created_at,body", "x,y,2024-01-17T10:30:00Z,hi"],
        );
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let outcome = tracing::subscriber::with_default(subscriber, || {
            Corpus::new(None).load_data_from_csv(&bad, &twitter_options())
        })
        .unwrap();

        assert_eq!(outcome.rows_appended(), 0);
        let output = logs.contents();
        assert!(output.contains("WARN"), "{}", output);
        assert!(output.contains("\"text\""), "{}", output);
        assert!(output.contains("bad.csv"), "{}", output);
        assert!(
            output.contains("Ensure the data and chosen mapping match up."),
            "{}",
            output
        );
    }

    #[test]
    fn test_raw_file_must_carry_entity_and_source_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "plain.csv",
            &["created_at,comment", "2024-01-17T10:30:00Z,hi"],
        );
        let mut corpus = Corpus::new(None);
        let outcome = corpus.load_data_from_csv(&path, &twitter_options()).unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Skipped {
                missing: vec!["entity".to_string(), "source".to_string()]
            }
        );
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_custom_mapping_and_separator() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "posts.csv",
            &[
                "who;where;posted;body",
                "a;b;Wed Oct 10 20:19:24 +0000 2018;first post",
            ],
        );
        let mapping = ColumnMapping::new()
            .with("who", "entity")
            .with("where", "source")
            .with("posted", "date")
            .with("body", "text");
        let options = LoadOptions::new(SourceKind::from_tag("parler", Some(mapping)))
            .entity("carol")
            .source("parler")
            .sep(b';');
        let mut corpus = Corpus::new(Some(Tz::UTC));

        let outcome = corpus.load_data_from_csv(&path, &options).unwrap();

        assert_eq!(outcome.rows_appended(), 1);
        let record = &corpus.records()[0];
        assert_eq!(record.entity, "carol");
        assert_eq!(record.text, "first post");
        assert_eq!(record.weekday, 2);
        assert!((record.hour - (20.0 + 19.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_unparseable_date_is_error_and_table_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "bad_dates.csv",
            &[
                "entity,source,date,text",
                "a,b,2024-01-17T10:30:00Z,ok",
                "a,b,yesterday-ish,broken",
            ],
        );
        let mut corpus = Corpus::new(None);
        let err = corpus
            .load_data_from_csv(&path, &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, SnifferError::TimestampParse(_)));
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        let mut corpus = Corpus::new(None);
        let err = corpus
            .load_data_from_csv("/no/such/export.csv", &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, SnifferError::FileRead { .. }));
    }

    #[test]
    fn test_loads_accumulate_in_order() {
        let dir = TempDir::new().unwrap();
        let path = twitter_export(dir.path());
        let mut corpus = Corpus::new(None);
        corpus.load_data_from_csv(&path, &twitter_options()).unwrap();
        corpus
            .load_data_from_csv(&path, &twitter_options().entity("bob").source("gab"))
            .unwrap();

        assert_eq!(corpus.len(), 4);
        assert_eq!(corpus.entities(), vec!["alice", "bob"]);
        assert_eq!(corpus.sources(), vec!["twitter", "gab"]);
        assert_eq!(corpus.records()[2].entity, "bob");
        // Same file twice: no de-duplication.
        assert_eq!(corpus.records()[0].date, corpus.records()[2].date);
    }

    // ── mask / select ─────────────────────────────────────────────────────────

    #[test]
    fn test_mask_and_select() {
        let dir = TempDir::new().unwrap();
        let path = twitter_export(dir.path());
        let mut corpus = Corpus::new(None);
        corpus.load_data_from_csv(&path, &twitter_options()).unwrap();
        corpus
            .load_data_from_csv(&path, &twitter_options().entity("bob"))
            .unwrap();

        let mask = corpus.mask(|r| r.entity == "bob");
        assert_eq!(mask, vec![false, false, true, true]);
        let selected = corpus.select(Some(mask.as_slice())).unwrap();
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|r| r.entity == "bob"));
        assert_eq!(corpus.select(None).unwrap().len(), 4);
    }

    #[test]
    fn test_select_rejects_wrong_length_mask() {
        let corpus = Corpus::new(None);
        match corpus.select(Some(&[true][..])) {
            Err(SnifferError::MaskLength { expected, actual }) => {
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!("expected MaskLength, got {:?}", other),
        }
    }

    // ── load_data_from_dir ────────────────────────────────────────────────────

    #[test]
    fn test_load_data_from_dir() {
        let dir = TempDir::new().unwrap();
        twitter_export(dir.path());
        write_csv(
            dir.path(),
            "nested/more.csv",
            &["entity,source,date,text", "a,b,2024-02-01T00:00:00Z,hey"],
        );
        write_csv(dir.path(), "readme.txt", &["not a csv"]);
        let mut corpus = Corpus::new(None);

        let outcomes = corpus
            .load_data_from_dir(dir.path(), &twitter_options())
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(corpus.len(), 3);
    }

    #[test]
    fn test_load_data_from_empty_dir() {
        let dir = TempDir::new().unwrap();
        let mut corpus = Corpus::new(None);
        let outcomes = corpus
            .load_data_from_dir(dir.path(), &LoadOptions::default())
            .unwrap();
        assert!(outcomes.is_empty());
        assert!(corpus.is_empty());
    }
}
