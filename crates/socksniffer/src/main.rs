mod bootstrap;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use sniffer_core::settings::Settings;
use sniffer_data::{Corpus, LoadOptions, LoadOutcome};
use sniffer_ui::{PlotActivity, PlotOptions, Theme};
use tracing::{info, warn};

fn main() -> Result<()> {
    let settings = Settings::parse();
    settings.validate()?;

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    info!("socksniffer v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Plot: {}, Hour: {}, Timezone: {}",
        settings.plot, settings.hour, settings.timezone
    );

    let corpus = load_corpus(&settings)?;
    if corpus.is_empty() {
        warn!("No rows loaded; the plot will be empty");
    }

    let options = plot_options(&settings, &corpus)?;
    if settings.no_show {
        let plot = corpus.activity_plot(&options)?;
        info!(
            "Built {} plot \"{}\" with {} points",
            plot.kind,
            plot.title,
            plot.point_count()
        );
    } else {
        corpus.plot_activity(&options)?;
    }

    Ok(())
}

/// Load every input into a fresh corpus.
fn load_corpus(settings: &Settings) -> Result<Corpus> {
    let mut corpus = Corpus::with_timezone_name(&settings.timezone)?;
    let base = LoadOptions::new(settings.source_kind()?)
        .sep(settings.sep_byte()?)
        .clean(!settings.no_clean);

    for input in &settings.inputs {
        let options = load_options_for(settings, &base, input);
        if input.is_dir() {
            let outcomes = corpus
                .load_data_from_dir(input, &options)
                .with_context(|| format!("failed to load {}", input.display()))?;
            for (path, outcome) in outcomes {
                log_outcome(&path, &outcome);
            }
        } else {
            let outcome = corpus
                .load_data_from_csv(input, &options)
                .with_context(|| format!("failed to load {}", input.display()))?;
            log_outcome(input, &outcome);
        }
    }

    info!(
        "Corpus holds {} rows from {} entities",
        corpus.len(),
        corpus.entities().len()
    );
    Ok(corpus)
}

/// Labels for one input: `--entity` / `--source`, else the input's file
/// stem and the export kind.
fn load_options_for(settings: &Settings, base: &LoadOptions, input: &Path) -> LoadOptions {
    let entity = if settings.entity.is_empty() {
        input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        settings.entity.clone()
    };
    let source = if settings.source.is_empty() {
        base.kind.tag().to_string()
    } else {
        settings.source.clone()
    };
    base.clone().entity(entity).source(source)
}

fn log_outcome(path: &Path, outcome: &LoadOutcome) {
    if let LoadOutcome::Skipped { missing } = outcome {
        warn!("Skipped {}: missing {}", path.display(), missing.join(", "));
    }
}

fn plot_options(settings: &Settings, corpus: &Corpus) -> Result<PlotOptions> {
    let entity = if settings.entity.is_empty() {
        corpus.entities().join(", ")
    } else {
        settings.entity.clone()
    };

    let mut options = PlotOptions::new(entity, settings.plot_kind()?)
        .hour(settings.hour_field()?)
        .size(settings.width, settings.height)
        .cbar(!settings.no_cbar)
        .dodge(!settings.no_dodge)
        .jitter(settings.jitter)
        .theme(Theme::from_name(&settings.theme));
    if let Some(title) = &settings.title {
        options = options.title(title.clone());
    }
    if let Some(hue) = settings.hue()? {
        options = options.hue(hue);
    }
    if let Some(style) = settings.style()? {
        options = options.style(style);
    }
    if let Some(size) = settings.point_size {
        options = options.point_size(size);
    }
    Ok(options)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
