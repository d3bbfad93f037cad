//! Activity plot construction.
//!
//! [`PlotActivity::activity_plot`] turns a [`Corpus`] (or a masked subset of
//! it) into an [`ActivityPlot`]: the binned or plotted points, axis bounds
//! and tick labels for one of the three chart kinds. Rendering lives in
//! [`crate::render`]; displaying in [`crate::app`].

use chrono::DateTime;
use chrono_tz::Tz;
use ratatui::symbols::Marker;

use sniffer_core::models::{GroupBy, HourField, PlotKind, Record, WEEKDAY_NAMES};
use sniffer_core::Result;
use sniffer_data::Corpus;

use crate::themes::Theme;

/// Bins along each axis of the 2-D histogram.
pub const HIST_BINS: usize = 24;

/// Hour-axis tick labels at 0, 4, .., 24.
pub const HOUR_TICK_LABELS: [&str; 7] = [
    "Midnight", "4:00", "8:00", "12:00", "16:00", "20:00", "Midnight",
];

/// Markers cycled through by `style` groups in scatter plots.
const STYLE_MARKERS: [Marker; 4] = [Marker::Braille, Marker::Dot, Marker::Block, Marker::Bar];

/// Width of one weekday slot shared by dodged hue groups.
const DODGE_WIDTH: f64 = 0.8;

const SECONDS_PER_DAY: f64 = 86_400.0;

// ── Options ───────────────────────────────────────────────────────────────────

/// Figure size in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureSize {
    pub width: u16,
    pub height: u16,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            width: 84,
            height: 30,
        }
    }
}

/// Everything `plot_activity` needs besides the corpus.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// Only used to build the default title.
    pub entity: String,
    pub hour: HourField,
    /// Row selector over the whole table; `None` plots every row.
    pub subset: Option<Vec<bool>>,
    pub size: FigureSize,
    pub title: Option<String>,
    pub hue: Option<GroupBy>,
    /// Marker grouping for scatter plots.
    pub style: Option<GroupBy>,
    pub point_size: Option<f64>,
    /// Draw the histogram colour bar.
    pub cbar: bool,
    /// Place hue groups side by side in the week plot.
    pub dodge: bool,
    /// Half-width of the week plot's horizontal jitter, in weekday units.
    pub jitter: f64,
    pub kind: PlotKind,
    pub theme: Theme,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            entity: String::new(),
            hour: HourField::Local,
            subset: None,
            size: FigureSize::default(),
            title: None,
            hue: None,
            style: None,
            point_size: None,
            cbar: true,
            dodge: true,
            jitter: 0.13,
            kind: PlotKind::Hist,
            theme: Theme::default(),
        }
    }
}

impl PlotOptions {
    pub fn new(entity: impl Into<String>, kind: PlotKind) -> Self {
        Self {
            entity: entity.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn hour(mut self, hour: HourField) -> Self {
        self.hour = hour;
        self
    }

    pub fn subset(mut self, mask: Vec<bool>) -> Self {
        self.subset = Some(mask);
        self
    }

    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.size = FigureSize { width, height };
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn hue(mut self, hue: GroupBy) -> Self {
        self.hue = Some(hue);
        self
    }

    pub fn style(mut self, style: GroupBy) -> Self {
        self.style = Some(style);
        self
    }

    pub fn point_size(mut self, size: f64) -> Self {
        self.point_size = Some(size);
        self
    }

    pub fn cbar(mut self, cbar: bool) -> Self {
        self.cbar = cbar;
        self
    }

    pub fn dodge(mut self, dodge: bool) -> Self {
        self.dodge = dodge;
        self
    }

    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

// ── Plot model ────────────────────────────────────────────────────────────────

/// Points sharing one colour and marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    /// Index into the theme palette.
    pub color_index: usize,
    pub marker: Marker,
    /// `(x, hour)` pairs; x is a Unix timestamp or a jittered weekday.
    pub points: Vec<(f64, f64)>,
}

/// Date x hour bin counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2d {
    /// `HIST_BINS + 1` bin edges along the date axis (Unix seconds).
    pub x_edges: Vec<f64>,
    /// `HIST_BINS + 1` bin edges along the hour axis.
    pub y_edges: Vec<f64>,
    /// `counts[y][x]`.
    pub counts: Vec<Vec<u32>>,
    /// Hue group with the most points in each bin, when a hue is set.
    pub dominant: Vec<Vec<Option<usize>>>,
    pub groups: Vec<String>,
    pub max_count: u32,
    pub cbar: bool,
}

impl Histogram2d {
    pub fn total(&self) -> u32 {
        self.counts.iter().flatten().sum()
    }
}

/// A fully laid-out activity chart, ready to render.
#[derive(Debug, Clone)]
pub struct ActivityPlot {
    pub kind: PlotKind,
    pub title: String,
    pub hour_field: HourField,
    /// `"UTC"` for `hour_utc`, otherwise the corpus timezone name.
    pub timezone_label: String,
    pub size: FigureSize,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_ticks: Vec<(f64, String)>,
    pub y_ticks: Vec<(f64, String)>,
    pub x_caption: String,
    pub y_caption: String,
    /// Scatter and week plots.
    pub series: Vec<Series>,
    /// Histogram plots.
    pub histogram: Option<Histogram2d>,
    pub theme: Theme,
}

impl ActivityPlot {
    /// Number of records drawn.
    pub fn point_count(&self) -> usize {
        match &self.histogram {
            Some(hist) => hist.total() as usize,
            None => self.series.iter().map(|s| s.points.len()).sum(),
        }
    }

    /// Legend entries, empty for a single group.
    pub fn legend(&self) -> Vec<LegendEntry> {
        let entries: Vec<LegendEntry> = match &self.histogram {
            Some(hist) => hist
                .groups
                .iter()
                .enumerate()
                .map(|(i, g)| LegendEntry {
                    name: g.clone(),
                    color_index: i,
                    glyph: SWATCH_GLYPH,
                })
                .collect(),
            None => self
                .series
                .iter()
                .map(|s| LegendEntry {
                    name: s.name.clone(),
                    color_index: s.color_index,
                    glyph: marker_glyph(s.marker),
                })
                .collect(),
        };
        if entries.len() > 1 {
            entries
        } else {
            Vec::new()
        }
    }
}

/// One legend line: a coloured glyph and a group name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub name: String,
    pub color_index: usize,
    /// Single-cell form of the series marker.
    pub glyph: &'static str,
}

const SWATCH_GLYPH: &str = "■";

/// Single-cell stand-in for a canvas marker.
pub fn marker_glyph(marker: Marker) -> &'static str {
    match marker {
        Marker::Braille => "⣿",
        Marker::Dot => "•",
        Marker::Block => "█",
        Marker::Bar => "▄",
        _ => SWATCH_GLYPH,
    }
}

// ── PlotActivity ──────────────────────────────────────────────────────────────

/// Activity plotting over a record table.
pub trait PlotActivity {
    /// Build the chart described by `options` without displaying it.
    fn activity_plot(&self, options: &PlotOptions) -> Result<ActivityPlot>;

    /// Build the chart, show it in the terminal until dismissed, and return it.
    fn plot_activity(&self, options: &PlotOptions) -> Result<ActivityPlot> {
        let plot = self.activity_plot(options)?;
        plot.show()?;
        Ok(plot)
    }
}

impl PlotActivity for Corpus {
    fn activity_plot(&self, options: &PlotOptions) -> Result<ActivityPlot> {
        let subset = self.select(options.subset.as_deref())?;
        let handler = self.timezone();
        let display_tz = match options.hour {
            HourField::Local => handler.tz(),
            HourField::Utc => Tz::UTC,
        };
        let timezone_label = handler.display_label(options.hour).to_string();

        let mut plot = ActivityPlot {
            kind: options.kind,
            title: options
                .title
                .clone()
                .unwrap_or_else(|| format!("{} activity", options.entity)),
            hour_field: options.hour,
            y_caption: format!("{} ({})", options.hour.column_name(), timezone_label),
            timezone_label,
            size: options.size,
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 24.0],
            x_ticks: Vec::new(),
            y_ticks: hour_ticks(),
            x_caption: String::new(),
            series: Vec::new(),
            histogram: None,
            theme: options.theme.clone(),
        };

        match options.kind {
            PlotKind::Hist => {
                plot.x_caption = "date".to_string();
                plot.x_bounds = date_bounds(&subset);
                plot.x_ticks = date_ticks(plot.x_bounds, display_tz);
                plot.histogram = Some(build_histogram(&subset, options, plot.x_bounds));
            }
            PlotKind::Scatter => {
                plot.x_caption = "date".to_string();
                plot.x_bounds = date_bounds(&subset);
                plot.x_ticks = date_ticks(plot.x_bounds, display_tz);
                plot.series = build_scatter(&subset, options);
            }
            PlotKind::Week => {
                plot.x_caption = "weekday".to_string();
                plot.x_bounds = [-0.5, 6.5];
                plot.x_ticks = WEEKDAY_NAMES
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (i as f64, name.to_string()))
                    .collect();
                plot.series = build_week(&subset, options);
            }
        }

        Ok(plot)
    }
}

// ── Builders ──────────────────────────────────────────────────────────────────

fn hour_ticks() -> Vec<(f64, String)> {
    HOUR_TICK_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| ((i * 4) as f64, label.to_string()))
        .collect()
}

fn timestamp(record: &Record) -> f64 {
    record.date.timestamp() as f64
}

/// Date-axis bounds over the subset, padded to a day when degenerate.
fn date_bounds(records: &[&Record]) -> [f64; 2] {
    let mut iter = records.iter().map(|r| timestamp(r));
    let Some(first) = iter.next() else {
        return [0.0, 1.0];
    };
    let (lo, hi) = iter.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)));
    if hi - lo < 1.0 {
        let half_day = SECONDS_PER_DAY / 2.0;
        [lo - half_day, hi + half_day]
    } else {
        [lo, hi]
    }
}

/// Five evenly spaced date labels in `tz`; times are shown for short spans.
fn date_ticks(bounds: [f64; 2], tz: Tz) -> Vec<(f64, String)> {
    const COUNT: usize = 5;
    let [lo, hi] = bounds;
    let format = if hi - lo < 2.0 * SECONDS_PER_DAY {
        "%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    };
    (0..COUNT)
        .filter_map(|i| {
            let x = lo + (hi - lo) * i as f64 / (COUNT - 1) as f64;
            let dt = DateTime::from_timestamp(x.round() as i64, 0)?;
            Some((x, dt.with_timezone(&tz).format(format).to_string()))
        })
        .collect()
}

/// Index of `key` in `groups`, appending it on first sight.
fn intern(groups: &mut Vec<String>, key: String) -> usize {
    match groups.iter().position(|g| *g == key) {
        Some(index) => index,
        None => {
            groups.push(key);
            groups.len() - 1
        }
    }
}

/// Bin holding `value` among `bins` equal bins over `[lo, hi]`.
fn bin_index(value: f64, lo: f64, hi: f64, bins: usize) -> usize {
    if hi <= lo {
        return 0;
    }
    let fraction = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    ((fraction * bins as f64) as usize).min(bins - 1)
}

fn edges(lo: f64, hi: f64, bins: usize) -> Vec<f64> {
    (0..=bins)
        .map(|i| lo + (hi - lo) * i as f64 / bins as f64)
        .collect()
}

fn build_histogram(records: &[&Record], options: &PlotOptions, x_bounds: [f64; 2]) -> Histogram2d {
    let [x_lo, x_hi] = x_bounds;
    let mut groups = Vec::new();
    let mut counts = vec![vec![0u32; HIST_BINS]; HIST_BINS];
    // per_group[y][x][group]
    let mut per_group: Vec<Vec<Vec<u32>>> = vec![vec![Vec::new(); HIST_BINS]; HIST_BINS];

    for record in records {
        let bx = bin_index(timestamp(record), x_lo, x_hi, HIST_BINS);
        let by = bin_index(record.hour_value(options.hour), 0.0, 24.0, HIST_BINS);
        counts[by][bx] += 1;
        if let Some(hue) = options.hue {
            let g = intern(&mut groups, hue.key(record));
            let cell = &mut per_group[by][bx];
            if cell.len() <= g {
                cell.resize(g + 1, 0);
            }
            cell[g] += 1;
        }
    }

    let dominant = per_group
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    cell.iter()
                        .enumerate()
                        .filter(|(_, n)| **n > 0)
                        // Ties go to the earlier group.
                        .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
                        .map(|(g, _)| g)
                })
                .collect()
        })
        .collect();

    let max_count = counts.iter().flatten().copied().max().unwrap_or(0);

    Histogram2d {
        x_edges: edges(x_lo, x_hi, HIST_BINS),
        y_edges: edges(0.0, 24.0, HIST_BINS),
        counts,
        dominant,
        groups,
        max_count,
        cbar: options.cbar,
    }
}

/// Marker for ungrouped points, chosen from the requested point size.
fn base_marker(point_size: Option<f64>) -> Marker {
    match point_size {
        None => Marker::Braille,
        Some(size) if size < 4.0 => Marker::Braille,
        Some(size) if size < 8.0 => Marker::Dot,
        Some(_) => Marker::Block,
    }
}

fn default_series_name(options: &PlotOptions) -> String {
    if options.entity.is_empty() {
        "posts".to_string()
    } else {
        options.entity.clone()
    }
}

fn build_scatter(records: &[&Record], options: &PlotOptions) -> Vec<Series> {
    let mut hue_groups = Vec::new();
    let mut style_groups = Vec::new();
    let mut keys: Vec<(Option<usize>, Option<usize>)> = Vec::new();
    let mut series: Vec<Series> = Vec::new();

    for record in records {
        let hue = options
            .hue
            .map(|g| intern(&mut hue_groups, g.key(record)));
        let style = options
            .style
            .map(|g| intern(&mut style_groups, g.key(record)));

        let index = match keys.iter().position(|k| *k == (hue, style)) {
            Some(index) => index,
            None => {
                let name = match (hue, style) {
                    (Some(h), Some(s)) => format!("{} / {}", hue_groups[h], style_groups[s]),
                    (Some(h), None) => hue_groups[h].clone(),
                    (None, Some(s)) => style_groups[s].clone(),
                    (None, None) => default_series_name(options),
                };
                keys.push((hue, style));
                series.push(Series {
                    name,
                    color_index: hue.unwrap_or(0),
                    marker: style
                        .map(|s| STYLE_MARKERS[s % STYLE_MARKERS.len()])
                        .unwrap_or_else(|| base_marker(options.point_size)),
                    points: Vec::new(),
                });
                series.len() - 1
            }
        };

        series[index]
            .points
            .push((timestamp(record), record.hour_value(options.hour)));
    }

    series
}

/// Deterministic offset in `[-1, 1)` for the `n`-th point of a strip.
///
/// Uses the golden-ratio sequence so strips spread evenly and renders are
/// reproducible.
fn jitter_unit(n: usize) -> f64 {
    const GOLDEN: f64 = 0.618_033_988_749_894_9;
    ((n + 1) as f64 * GOLDEN).fract() * 2.0 - 1.0
}

fn build_week(records: &[&Record], options: &PlotOptions) -> Vec<Series> {
    let mut groups = Vec::new();
    let mut series: Vec<Series> = Vec::new();
    let marker = base_marker(options.point_size);

    for record in records {
        let g = match options.hue {
            Some(hue) => intern(&mut groups, hue.key(record)),
            None => 0,
        };
        if g == series.len() {
            series.push(Series {
                name: groups
                    .get(g)
                    .cloned()
                    .unwrap_or_else(|| default_series_name(options)),
                color_index: g,
                marker,
                points: Vec::new(),
            });
        }
        series[g]
            .points
            .push((f64::from(record.weekday), record.hour_value(options.hour)));
    }

    let n = series.len().max(1) as f64;
    let dodge = options.dodge && series.len() > 1;
    for (g, s) in series.iter_mut().enumerate() {
        let (center, spread) = if dodge {
            let slot = DODGE_WIDTH / n;
            (-DODGE_WIDTH / 2.0 + slot * (g as f64 + 0.5), options.jitter / n)
        } else {
            (0.0, options.jitter)
        };
        for (i, point) in s.points.iter_mut().enumerate() {
            point.0 += center + spread * jitter_unit(i);
        }
    }

    series
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sniffer_core::models::SourceKind;
    use sniffer_core::SnifferError;
    use sniffer_data::LoadOptions;
    use std::io::Write;
    use tempfile::TempDir;

    /// Two entities: alice posts on Mon/Wed, bob on Wed/Sat.
    fn sample_corpus() -> Corpus {
        let dir = TempDir::new().unwrap();
        let alice = dir.path().join("alice.csv");
        let mut f = std::fs::File::create(&alice).unwrap();
        writeln!(f, "entity,source,date,text").unwrap();
        writeln!(f, "x,x,2024-01-15T09:00:00Z,monday morning").unwrap();
        writeln!(f, "x,x,2024-01-17T10:30:00Z,wednesday").unwrap();
        writeln!(f, "x,x,2024-01-17T10:45:00Z,wednesday again").unwrap();

        let bob = dir.path().join("bob.csv");
        let mut f = std::fs::File::create(&bob).unwrap();
        writeln!(f, "entity,source,date,text").unwrap();
        writeln!(f, "x,x,2024-01-17T22:00:00Z,late").unwrap();
        writeln!(f, "x,x,2024-01-20T05:15:00Z,saturday").unwrap();

        let mut corpus = Corpus::new(Some(Tz::UTC));
        let options = LoadOptions::new(SourceKind::default());
        corpus
            .load_data_from_csv(&alice, &options.clone().entity("alice").source("twitter"))
            .unwrap();
        corpus
            .load_data_from_csv(&bob, &options.entity("bob").source("gab"))
            .unwrap();
        corpus
    }

    fn options(kind: PlotKind) -> PlotOptions {
        PlotOptions::new("alice", kind).theme(Theme::dark())
    }

    // ── Common ────────────────────────────────────────────────────────────────

    #[test]
    fn test_default_title_and_hour_ticks() {
        let plot = sample_corpus().activity_plot(&options(PlotKind::Hist)).unwrap();
        assert_eq!(plot.title, "alice activity");
        assert_eq!(plot.y_bounds, [0.0, 24.0]);
        let labels: Vec<&str> = plot.y_ticks.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, HOUR_TICK_LABELS.to_vec());
        assert_eq!(plot.y_ticks[6].0, 24.0);
    }

    #[test]
    fn test_title_override() {
        let plot = sample_corpus()
            .activity_plot(&options(PlotKind::Scatter).title("custom"))
            .unwrap();
        assert_eq!(plot.title, "custom");
    }

    #[test]
    fn test_timezone_label_follows_hour_field() {
        let corpus = Corpus::new(None);
        let local = corpus.activity_plot(&options(PlotKind::Hist)).unwrap();
        assert_eq!(local.timezone_label, "US/Pacific");
        assert_eq!(local.y_caption, "hour (US/Pacific)");

        let utc = corpus
            .activity_plot(&options(PlotKind::Hist).hour(HourField::Utc))
            .unwrap();
        assert_eq!(utc.timezone_label, "UTC");
        assert_eq!(utc.y_caption, "hour_utc (UTC)");
    }

    #[test]
    fn test_subset_limits_points() {
        let corpus = sample_corpus();
        let mask = corpus.mask(|r| r.entity == "bob");
        let plot = corpus
            .activity_plot(&options(PlotKind::Scatter).subset(mask))
            .unwrap();
        assert_eq!(plot.point_count(), 2);
    }

    #[test]
    fn test_subset_wrong_length_is_error() {
        let err = sample_corpus()
            .activity_plot(&options(PlotKind::Week).subset(vec![true]))
            .unwrap_err();
        assert!(matches!(err, SnifferError::MaskLength { .. }));
    }

    #[test]
    fn test_empty_corpus_builds_empty_plot() {
        let plot = Corpus::new(None)
            .activity_plot(&options(PlotKind::Scatter))
            .unwrap();
        assert_eq!(plot.point_count(), 0);
        assert!(plot.series.is_empty());
        assert_eq!(plot.x_bounds, [0.0, 1.0]);
    }

    // ── Hist ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_histogram_counts_every_row() {
        let plot = sample_corpus().activity_plot(&options(PlotKind::Hist)).unwrap();
        let hist = plot.histogram.as_ref().unwrap();
        assert_eq!(hist.total(), 5);
        assert_eq!(hist.counts.len(), HIST_BINS);
        assert_eq!(hist.x_edges.len(), HIST_BINS + 1);
        assert_eq!(hist.y_edges[1], 1.0);
        assert!(hist.cbar);
        // 10:30 and 10:45 on the same day share a bin.
        assert_eq!(hist.max_count, 2);
        assert_eq!(hist.counts[10].iter().sum::<u32>(), 2);
    }

    #[test]
    fn test_histogram_hue_dominant_group() {
        let plot = sample_corpus()
            .activity_plot(&options(PlotKind::Hist).hue(GroupBy::Entity).cbar(false))
            .unwrap();
        let hist = plot.histogram.as_ref().unwrap();
        assert_eq!(hist.groups, vec!["alice", "bob"]);
        assert!(!hist.cbar);
        let last_x = HIST_BINS - 1;
        // Bob's Saturday post is the latest timestamp, hour 5.
        assert_eq!(hist.dominant[5][last_x], Some(1));
        assert_eq!(hist.dominant[9][0], Some(0));
        assert_eq!(hist.dominant[0][0], None);
        assert_eq!(plot.legend().len(), 2);
    }

    #[test]
    fn test_histogram_date_ticks() {
        let plot = sample_corpus().activity_plot(&options(PlotKind::Hist)).unwrap();
        assert_eq!(plot.x_ticks.len(), 5);
        assert_eq!(plot.x_ticks[0].1, "2024-01-15");
        assert_eq!(plot.x_ticks[4].1, "2024-01-20");
    }

    // ── Scatter ───────────────────────────────────────────────────────────────

    #[test]
    fn test_scatter_single_series() {
        let plot = sample_corpus()
            .activity_plot(&options(PlotKind::Scatter))
            .unwrap();
        assert_eq!(plot.series.len(), 1);
        assert_eq!(plot.series[0].name, "alice");
        assert_eq!(plot.series[0].marker, Marker::Braille);
        assert_eq!(plot.series[0].points[1].1, 10.5);
        assert!(plot.legend().is_empty());
    }

    #[test]
    fn test_scatter_hue_and_style() {
        let plot = sample_corpus()
            .activity_plot(
                &options(PlotKind::Scatter)
                    .hue(GroupBy::Entity)
                    .style(GroupBy::Source),
            )
            .unwrap();
        assert_eq!(plot.series.len(), 2);
        assert_eq!(plot.series[0].name, "alice / twitter");
        assert_eq!(plot.series[1].name, "bob / gab");
        assert_eq!(plot.series[1].color_index, 1);
        assert_ne!(plot.series[0].marker, plot.series[1].marker);
    }

    #[test]
    fn test_style_only_legend_uses_marker_glyphs() {
        let plot = sample_corpus()
            .activity_plot(&options(PlotKind::Scatter).style(GroupBy::Entity))
            .unwrap();
        let legend = plot.legend();
        assert_eq!(legend.len(), 2);
        // No hue: both groups share a colour, so the glyphs must differ.
        assert_eq!(legend[0].color_index, legend[1].color_index);
        assert_eq!(legend[0].glyph, "⣿");
        assert_eq!(legend[1].glyph, "•");
    }

    #[test]
    fn test_histogram_legend_uses_swatches() {
        let plot = sample_corpus()
            .activity_plot(&options(PlotKind::Hist).hue(GroupBy::Source))
            .unwrap();
        let legend = plot.legend();
        assert_eq!(legend[0].name, "twitter");
        assert!(legend.iter().all(|e| e.glyph == "■"));
    }

    #[test]
    fn test_scatter_point_size_picks_marker() {
        let plot = sample_corpus()
            .activity_plot(&options(PlotKind::Scatter).point_size(10.0))
            .unwrap();
        assert_eq!(plot.series[0].marker, Marker::Block);
    }

    // ── Week ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_week_labels_and_jitter_bounds() {
        let plot = sample_corpus().activity_plot(&options(PlotKind::Week)).unwrap();
        let labels: Vec<&str> = plot.x_ticks.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, WEEKDAY_NAMES.to_vec());
        assert_eq!(plot.x_bounds, [-0.5, 6.5]);

        let weekdays = [0.0, 2.0, 2.0, 2.0, 5.0];
        for (point, day) in plot.series[0].points.iter().zip(weekdays) {
            assert!((point.0 - day).abs() <= 0.13 + 1e-9, "{:?}", point);
        }
    }

    #[test]
    fn test_week_dodge_separates_groups() {
        let plot = sample_corpus()
            .activity_plot(&options(PlotKind::Week).hue(GroupBy::Entity))
            .unwrap();
        assert_eq!(plot.series.len(), 2);
        // Both entities post on Wednesday; dodged strips do not overlap.
        let alice_wed: Vec<f64> = plot.series[0]
            .points
            .iter()
            .filter(|p| (p.0 - 2.0).abs() < 0.5)
            .map(|p| p.0)
            .collect();
        let bob_wed: Vec<f64> = plot.series[1]
            .points
            .iter()
            .filter(|p| (p.0 - 2.0).abs() < 0.5)
            .map(|p| p.0)
            .collect();
        assert!(alice_wed.iter().all(|x| *x < 2.0));
        assert!(bob_wed.iter().all(|x| *x > 2.0));
    }

    #[test]
    fn test_week_without_dodge_overlaps() {
        let plot = sample_corpus()
            .activity_plot(
                &options(PlotKind::Week)
                    .hue(GroupBy::Entity)
                    .dodge(false)
                    .jitter(0.0),
            )
            .unwrap();
        assert_eq!(plot.series[1].points[0].0, 2.0);
    }

    #[test]
    fn test_jitter_unit_range() {
        for n in 0..1000 {
            let j = jitter_unit(n);
            assert!((-1.0..1.0).contains(&j));
        }
    }
}
