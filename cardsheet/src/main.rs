//! `cardsheet`: lay out card artwork onto printable SVG sheets.

mod config;
mod export;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sheet_core::{ImageLibrary, Template, prepare};
use tracing::info;

use crate::config::{JobConfig, JobOverrides};

#[derive(Parser, Debug)]
#[command(name = "cardsheet")]
#[command(about = "Plan and fill printable card sheets from an SVG template")]
#[command(version)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill the template with every image set under ROOT
    Generate {
        /// Folder whose sub-folders are card sets
        root: PathBuf,

        /// SVG template with card slots
        template: PathBuf,

        /// JSON job file; flags override its values
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: JobOverrides,
    },
    /// Print the slot structure of a template as JSON
    Inspect {
        template: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match cli.command {
        Command::Generate {
            root,
            template,
            config,
            overrides,
        } => {
            let mut job = match &config {
                Some(path) => JobConfig::load(path)?,
                None => JobConfig::default(),
            };
            job.apply(&overrides);
            job.validate()?;
            generate(&root, &template, &job)
        }
        Command::Inspect { template } => {
            let template = Template::load(&template)?;
            println!("{}", serde_json::to_string_pretty(&template.structure())?);
            Ok(())
        }
    }
}

fn generate(root: &Path, template: &Path, job: &JobConfig) -> Result<()> {
    let template = Template::load(template)?;
    let library = ImageLibrary::discover(root)?;
    let sheets = prepare(&template, &library, &job.layout())?;
    let rendered = export::render_all(&sheets.pages, job.format, job.scale, job.font.as_deref())?;

    let written = sheets
        .write(&job.output_dir)
        .with_context(|| format!("failed to write sheets to {}", job.output_dir.display()))?;
    export::write_rendered(&written.pages, &rendered, job.format)?;
    info!(
        pages = written.pages.len(),
        metadata = %written.metadata.display(),
        "done"
    );
    Ok(())
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
