//! `bo-project`: project a serialized campaign and print the typed record,
//! its progress figures, or its search facets as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bayes_record::render::render;
use bayes_record::{CampaignSignals, Projector, ProjectorConfig};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputArg {
    /// Typed record
    #[default]
    #[value(name = "record")]
    Record,
    /// Labeled plotly figures
    #[value(name = "figures")]
    Figures,
    /// Flat search facets
    #[value(name = "facets")]
    Facets,
}

#[derive(Parser)]
#[command(name = "bo-project", version, about = "Project a Bayesian optimization campaign record")]
struct Cli {
    /// Serialized campaign (JSON)
    campaign: PathBuf,

    /// Projector configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// The engine reports the campaign as finished
    #[arg(long)]
    finished: bool,

    /// What to print
    #[arg(long, value_enum, default_value_t = OutputArg::Record)]
    output: OutputArg,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let document = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ProjectorConfig::from_json_str(&document)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ProjectorConfig::default(),
    };

    let document = std::fs::read_to_string(&cli.campaign)
        .with_context(|| format!("reading campaign {}", cli.campaign.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&document)
        .with_context(|| format!("parsing campaign {}", cli.campaign.display()))?;

    let signals = CampaignSignals {
        finished: cli.finished,
        failed: false,
    };
    let record = Projector::new(config)
        .project_with(&raw, signals)
        .with_context(|| format!("projecting campaign {}", cli.campaign.display()))?;

    let value = match cli.output {
        OutputArg::Record => serde_json::to_value(&record)?,
        OutputArg::Figures => serde_json::to_value(render(&record).figures())?,
        OutputArg::Facets => serde_json::to_value(record.search_facets())?,
    };

    let text = if cli.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{text}");
    Ok(())
}
