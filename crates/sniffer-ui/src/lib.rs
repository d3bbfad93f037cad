//! Terminal plotting layer for socksniffer.
//!
//! Builds activity charts (date/hour histogram, date/hour scatter,
//! weekday/hour strip) from a [`sniffer_data::Corpus`] and renders them with
//! [`ratatui`].

pub mod app;
pub mod plot;
pub mod render;
pub mod themes;

pub use plot::{ActivityPlot, FigureSize, LegendEntry, PlotActivity, PlotOptions};
pub use themes::Theme;
