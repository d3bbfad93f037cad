//! Drawing an [`ActivityPlot`] into a ratatui buffer.
//!
//! Layout, top to bottom: title, axis captions, plot body, x axis, x tick
//! labels. The hour axis and its labels sit on the left; the colour bar and
//! legend (when present) on the right.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use crate::plot::{ActivityPlot, Histogram2d, HIST_BINS};
use crate::themes::{Theme, SHADES};

/// Smallest area a plot is drawn into.
pub const MIN_WIDTH: u16 = 20;
pub const MIN_HEIGHT: u16 = 8;

/// Columns reserved for hour labels left of the axis.
const LABEL_WIDTH: u16 = 9;
const LEGEND_MAX_WIDTH: usize = 24;
const CBAR_WIDTH: usize = 10;

impl Widget for &ActivityPlot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            render_too_small(area, buf, &self.theme);
            return;
        }

        let layout = PlotLayout::new(self, area);
        let theme = &self.theme;

        put_centered(buf, area.x, area.width, area.y, &self.title, theme.title);
        buf.set_stringn(
            area.x,
            area.y + 1,
            &self.y_caption,
            area.width as usize,
            theme.caption,
        );
        let caption_width = self.x_caption.width() as u16;
        if caption_width < layout.plot.width {
            buf.set_string(
                layout.plot.right() - caption_width,
                area.y + 1,
                &self.x_caption,
                theme.caption,
            );
        }

        render_axes(self, &layout, buf);

        match &self.histogram {
            Some(hist) => render_histogram(hist, &layout, buf, theme),
            None => {
                for series in &self.series {
                    Canvas::default()
                        .marker(series.marker)
                        .x_bounds(self.x_bounds)
                        .y_bounds(self.y_bounds)
                        .paint(|ctx| {
                            ctx.draw(&Points {
                                coords: &series.points,
                                color: theme.series_color(series.color_index),
                            });
                        })
                        .render(layout.plot, buf);
                }
            }
        }

        if self.point_count() == 0 {
            let y = layout.plot.y + layout.plot.height / 2;
            put_centered(
                buf,
                layout.plot.x,
                layout.plot.width,
                y,
                "No activity to plot",
                theme.dim,
            );
        }

        if let Some(panel) = layout.panel {
            render_panel(self, panel, buf);
        }
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

struct PlotLayout {
    /// Plot body, right of the hour axis and above the date axis.
    plot: Rect,
    axis_col: u16,
    axis_row: u16,
    label_row: u16,
    right: u16,
    /// Colour bar and legend column.
    panel: Option<Rect>,
}

impl PlotLayout {
    fn new(plot: &ActivityPlot, area: Rect) -> Self {
        let axis_col = area.x + LABEL_WIDTH;
        let axis_row = area.bottom() - 2;
        let label_row = area.bottom() - 1;
        let top = area.y + 2;

        let mut panel_width = 0usize;
        let legend = plot.legend();
        if !legend.is_empty() {
            let widest = legend.iter().map(|e| e.name.width()).max().unwrap_or(0);
            panel_width = (widest + 2).min(LEGEND_MAX_WIDTH);
        }
        if plot.histogram.as_ref().is_some_and(|h| h.cbar) {
            panel_width = panel_width.max(CBAR_WIDTH);
        }

        let body_left = axis_col + 1;
        let available = area.right().saturating_sub(body_left) as usize;
        // Keep at least half the width for the plot body.
        let panel_width = if panel_width > 0 && panel_width + 1 <= available / 2 {
            panel_width as u16
        } else {
            0
        };

        let body_right = area.right() - if panel_width > 0 { panel_width + 1 } else { 0 };
        let plot_rect = Rect::new(body_left, top, body_right - body_left, axis_row - top);
        let panel = (panel_width > 0).then(|| {
            Rect::new(body_right + 1, top, panel_width, axis_row - top)
        });

        Self {
            plot: plot_rect,
            axis_col,
            axis_row,
            label_row,
            right: area.right(),
            panel,
        }
    }

    /// Column of data value `x` within the plot body.
    fn column(&self, x: f64, bounds: [f64; 2]) -> u16 {
        let [lo, hi] = bounds;
        let fraction = if hi > lo { (x - lo) / (hi - lo) } else { 0.0 };
        let offset = (fraction.clamp(0.0, 1.0) * f64::from(self.plot.width - 1)).round();
        self.plot.x + offset as u16
    }

    /// Row of data value `y` within the plot body; larger values sit higher.
    fn row(&self, y: f64, bounds: [f64; 2]) -> u16 {
        let [lo, hi] = bounds;
        let fraction = if hi > lo { (y - lo) / (hi - lo) } else { 0.0 };
        let offset = ((1.0 - fraction.clamp(0.0, 1.0)) * f64::from(self.plot.height - 1)).round();
        self.plot.y + offset as u16
    }
}

// ── Pieces ────────────────────────────────────────────────────────────────────

fn render_too_small(area: Rect, buf: &mut Buffer, theme: &Theme) {
    if area.height == 0 {
        return;
    }
    let y = area.y + area.height / 2;
    put_centered(buf, area.x, area.width, y, "Terminal too small", theme.warning);
}

fn render_axes(plot: &ActivityPlot, layout: &PlotLayout, buf: &mut Buffer) {
    let theme = &plot.theme;

    for y in layout.plot.top()..layout.axis_row {
        put(buf, layout.axis_col, y, "│", theme.axis);
    }
    put(buf, layout.axis_col, layout.axis_row, "└", theme.axis);
    for x in layout.plot.left()..layout.plot.right() {
        put(buf, x, layout.axis_row, "─", theme.axis);
    }

    for (value, label) in &plot.y_ticks {
        let row = layout.row(*value, plot.y_bounds);
        put(buf, layout.axis_col, row, "┤", theme.axis);
        let width = (label.width() as u16).min(LABEL_WIDTH - 1);
        let x = layout.axis_col - 1 - width;
        buf.set_stringn(x, row, label, width as usize, theme.tick_label);
    }

    // Labels are centred on their tick and skipped when they would overlap.
    let mut next_free = 0u16;
    for (value, label) in &plot.x_ticks {
        let col = layout.column(*value, plot.x_bounds);
        put(buf, col, layout.axis_row, "┬", theme.axis);

        let width = label.width() as u16;
        let start = col
            .saturating_sub(width / 2)
            .max(layout.plot.x)
            .min(layout.right.saturating_sub(width));
        if start < next_free {
            continue;
        }
        buf.set_string(start, layout.label_row, label, theme.tick_label);
        next_free = start + width + 1;
    }
}

fn render_histogram(hist: &Histogram2d, layout: &PlotLayout, buf: &mut Buffer, theme: &Theme) {
    let bins = HIST_BINS as u16;
    let plot = layout.plot;

    for (yi, row) in hist.counts.iter().enumerate() {
        // Bin 0 (midnight) sits at the bottom.
        let yi = yi as u16;
        let top = plot.y + (bins - yi - 1) * plot.height / bins;
        let bottom = (plot.y + (bins - yi) * plot.height / bins).max(top + 1);

        for (xi, count) in row.iter().enumerate() {
            let Some(glyph) = Theme::shade(*count, hist.max_count) else {
                continue;
            };
            let xi16 = xi as u16;
            let left = plot.x + xi16 * plot.width / bins;
            let right = (plot.x + (xi16 + 1) * plot.width / bins).max(left + 1);
            let style = theme.cell_style(hist.dominant[yi as usize][xi]);

            for y in top..bottom.min(plot.bottom()) {
                for x in left..right.min(plot.right()) {
                    put(buf, x, y, glyph, style);
                }
            }
        }
    }
}

fn render_panel(plot: &ActivityPlot, panel: Rect, buf: &mut Buffer) {
    let theme = &plot.theme;
    let width = panel.width as usize;
    let mut y = panel.y;

    if let Some(hist) = plot.histogram.as_ref().filter(|h| h.cbar) {
        buf.set_stringn(panel.x, y, "count", width, theme.caption);
        y += 1;
        for (level, glyph) in SHADES.iter().enumerate().rev() {
            if y >= panel.bottom() {
                return;
            }
            let upper = (hist.max_count * (level as u32 + 1) / SHADES.len() as u32).max(1);
            buf.set_stringn(panel.x, y, glyph, width, theme.heat);
            buf.set_stringn(panel.x + 2, y, upper.to_string(), width - 2, theme.tick_label);
            y += 1;
        }
        y += 1;
    }

    for entry in plot.legend() {
        if y >= panel.bottom() {
            break;
        }
        let style = Style::default().fg(theme.series_color(entry.color_index));
        buf.set_stringn(panel.x, y, entry.glyph, width, style);
        buf.set_stringn(panel.x + 2, y, &entry.name, width.saturating_sub(2), theme.caption);
        y += 1;
    }
}

// ── Buffer helpers ────────────────────────────────────────────────────────────

fn put(buf: &mut Buffer, x: u16, y: u16, symbol: &str, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_symbol(symbol).set_style(style);
    }
}

fn put_centered(buf: &mut Buffer, x: u16, width: u16, y: u16, text: &str, style: Style) {
    let text_width = (text.width() as u16).min(width);
    let start = x + (width - text_width) / 2;
    buf.set_stringn(start, y, text, text_width as usize, style);
}

// ── Tests ──────────────────────────────────────────────────────────────────────
