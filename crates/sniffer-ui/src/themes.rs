use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .map(|val| background_from_colorfgbg(&val))
        .unwrap_or(BackgroundType::Dark)
}

/// Classify a `COLORFGBG` value of the form `"foreground;background"`.
///
/// Background values 0–6 are dark, anything higher is light. Unparseable
/// values are treated as dark.
pub fn background_from_colorfgbg(val: &str) -> BackgroundType {
    match val.split(';').next_back().map(str::parse::<u8>) {
        Some(Ok(bg)) if bg > 6 => BackgroundType::Light,
        _ => BackgroundType::Dark,
    }
}

/// Shade glyphs for histogram cells, lightest first.
pub const SHADES: [&str; 4] = ["░", "▒", "▓", "█"];

/// Styles used to draw activity plots.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Frame ────────────────────────────────────────────────────────────────
    pub title: Style,
    pub axis: Style,
    pub tick_label: Style,
    pub caption: Style,
    pub dim: Style,
    pub warning: Style,

    // ── Data ─────────────────────────────────────────────────────────────────
    /// Histogram cells when no hue is set.
    pub heat: Style,
    /// One colour per hue group, cycled.
    pub palette: [Color; 6],
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            axis: Style::default().fg(Color::DarkGray),
            tick_label: Style::default().fg(Color::Gray),
            caption: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            warning: Style::default().fg(Color::Yellow),

            heat: Style::default().fg(Color::LightBlue),
            palette: [
                Color::Cyan,
                Color::LightRed,
                Color::Green,
                Color::Yellow,
                Color::Magenta,
                Color::LightBlue,
            ],
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            axis: Style::default().fg(Color::Gray),
            tick_label: Style::default().fg(Color::DarkGray),
            caption: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            warning: Style::default().fg(Color::Red),

            heat: Style::default().fg(Color::Blue),
            palette: [
                Color::Blue,
                Color::Red,
                Color::Green,
                Color::Magenta,
                Color::DarkGray,
                Color::Cyan,
            ],
        }
    }

    /// Classic theme using only the basic 8-colour ANSI palette and no bold.
    pub fn classic() -> Self {
        Self {
            title: Style::default().fg(Color::Cyan),
            axis: Style::default().fg(Color::White),
            tick_label: Style::default().fg(Color::White),
            caption: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::White),
            warning: Style::default().fg(Color::Yellow),

            heat: Style::default().fg(Color::Cyan),
            palette: [
                Color::Cyan,
                Color::Red,
                Color::Green,
                Color::Yellow,
                Color::Magenta,
                Color::Blue,
            ],
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Colour of hue group `index`, cycling through the palette.
    pub fn series_color(&self, index: usize) -> Color {
        self.palette[index % self.palette.len()]
    }

    /// Histogram cell style: the group colour when grouped, else `heat`.
    pub fn cell_style(&self, group: Option<usize>) -> Style {
        match group {
            Some(index) => Style::default().fg(self.series_color(index)),
            None => self.heat,
        }
    }

    /// Shade glyph for a bin holding `count` of at most `max` points.
    ///
    /// Empty bins return `None`; non-empty bins map to one of four levels.
    pub fn shade(count: u32, max: u32) -> Option<&'static str> {
        if count == 0 || max == 0 {
            return None;
        }
        let fraction = f64::from(count) / f64::from(max);
        let level = ((fraction * SHADES.len() as f64).ceil() as usize).clamp(1, SHADES.len());
        Some(SHADES[level - 1])
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::auto_detect()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
