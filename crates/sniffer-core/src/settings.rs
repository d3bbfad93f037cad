use clap::Parser;
use std::path::PathBuf;

use crate::error::SnifferError;
use crate::models::{ColumnMapping, GroupBy, HourField, PlotKind, SourceKind};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Load social-media CSV exports and plot posting activity
#[derive(Parser, Debug, Clone)]
#[command(
    name = "socksniffer",
    about = "Load social-media CSV exports and plot posting activity",
    version
)]
pub struct Settings {
    /// CSV files, or directories searched recursively for *.csv
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Export kind; "twitter" and "gab" use the built-in column mapping
    #[arg(long, default_value = "other")]
    pub kind: String,

    /// Label stamped on every loaded row as the tracked entity
    #[arg(long, default_value = "")]
    pub entity: String,

    /// Label stamped on every loaded row as the source
    #[arg(long, default_value = "")]
    pub source: String,

    /// Column mapping as a JSON object, e.g. '{"timestamp": "date"}'
    #[arg(long)]
    pub mapping: Option<String>,

    /// Field delimiter
    #[arg(long, default_value = ",")]
    pub sep: char,

    /// Keep retweets, mentions, hashtags and links in the text
    #[arg(long)]
    pub no_clean: bool,

    /// Chart type
    #[arg(long, default_value = "hist", value_parser = ["hist", "scatter", "week"])]
    pub plot: String,

    /// Hour column for the hour axis
    #[arg(long, default_value = "hour", value_parser = ["hour", "hour_utc"])]
    pub hour: String,

    /// Chart title (defaults to "<entity> activity")
    #[arg(long)]
    pub title: Option<String>,

    /// Colour points by this column
    #[arg(long, value_parser = ["entity", "source", "weekday"])]
    pub hue: Option<String>,

    /// Vary scatter markers by this column
    #[arg(long, value_parser = ["entity", "source", "weekday"])]
    pub style: Option<String>,

    /// Marker size
    #[arg(long)]
    pub point_size: Option<f64>,

    /// Hide the histogram colour bar
    #[arg(long)]
    pub no_cbar: bool,

    /// Overlay hue groups instead of placing them side by side (week plot)
    #[arg(long)]
    pub no_dodge: bool,

    /// Horizontal jitter for the week plot
    #[arg(long, default_value = "0.13")]
    pub jitter: f64,

    /// Figure width in terminal columns
    #[arg(long, default_value = "84")]
    pub width: u16,

    /// Figure height in terminal rows
    #[arg(long, default_value = "30")]
    pub height: u16,

    /// Corpus timezone (IANA name, or "auto" for the system zone)
    #[arg(long, default_value = "US/Pacific", env = "SOCKSNIFFER_TIMEZONE")]
    pub timezone: String,

    /// Colour theme
    #[arg(
        long,
        default_value = "auto",
        env = "SOCKSNIFFER_THEME",
        value_parser = ["auto", "dark", "light", "classic"]
    )]
    pub theme: String,

    /// Build the plot and log a summary instead of displaying it
    #[arg(long)]
    pub no_show: bool,

    /// Logging level
    #[arg(
        long,
        default_value = "INFO",
        env = "SOCKSNIFFER_LOG_LEVEL",
        value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"]
    )]
    pub log_level: String,

    /// Log file path (logs go to stderr when omitted)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Resolve `--kind` and `--mapping` into a [`SourceKind`].
    pub fn source_kind(&self) -> crate::Result<SourceKind> {
        let custom = self
            .mapping
            .as_deref()
            .map(ColumnMapping::from_json)
            .transpose()?;
        Ok(SourceKind::from_tag(&self.kind, custom))
    }

    /// Field delimiter as the single byte the CSV reader expects.
    pub fn sep_byte(&self) -> crate::Result<u8> {
        u8::try_from(self.sep)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                SnifferError::Config(format!("separator must be ASCII, got {:?}", self.sep))
            })
    }

    pub fn plot_kind(&self) -> crate::Result<PlotKind> {
        self.plot.parse()
    }

    pub fn hour_field(&self) -> crate::Result<HourField> {
        self.hour.parse()
    }

    pub fn hue(&self) -> crate::Result<Option<GroupBy>> {
        self.hue.as_deref().map(str::parse).transpose()
    }

    pub fn style(&self) -> crate::Result<Option<GroupBy>> {
        self.style.as_deref().map(str::parse).transpose()
    }

    /// Validate ranges clap cannot express.
    pub fn validate(&self) -> crate::Result<()> {
        self.sep_byte()?;
        if !(0.0..=0.5).contains(&self.jitter) {
            return Err(SnifferError::Config(format!(
                "jitter must be between 0 and 0.5, got {}",
                self.jitter
            )));
        }
        if self.width < 20 || self.height < 8 {
            return Err(SnifferError::Config(format!(
                "figure must be at least 20x8 cells, got {}x{}",
                self.width, self.height
            )));
        }
        if let Some(size) = self.point_size {
            if size <= 0.0 {
                return Err(SnifferError::Config(format!(
                    "point size must be positive, got {}",
                    size
                )));
            }
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
