use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use deck_core::{LayoutConfig, LayoutMode};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
    Pdf,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
        }
    }
}

/// Job settings, read from an optional JSON file. Command line flags win.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    pub output_dir: PathBuf,
    pub parity: usize,
    pub mode: LayoutMode,
    pub copies: usize,
    pub format: OutputFormat,
    /// Pixels per SVG user unit for PNG export.
    pub scale: f32,
    pub font: Option<PathBuf>,
}

impl Default for JobConfig {
    fn default() -> Self {
        JobConfig {
            output_dir: PathBuf::from("dist"),
            parity: 1,
            mode: LayoutMode::Naive,
            copies: 1,
            format: OutputFormat::Svg,
            scale: 1.0,
            font: None,
        }
    }
}

/// Flags that override [`JobConfig`] fields.
#[derive(Args, Clone, Debug, Default)]
pub struct JobOverrides {
    /// Directory for pages and layout.json [default: dist]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of bands each sheet is cut into
    #[arg(short, long, value_name = "N")]
    pub parity: Option<usize>,

    /// Layout mode: naive or cell-stack
    #[arg(short, long)]
    pub mode: Option<LayoutMode>,

    /// Print every set this many times
    #[arg(short, long, value_name = "C")]
    pub copies: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Raster scale for PNG export
    #[arg(long)]
    pub scale: Option<f32>,

    /// Font file used as the sans-serif family when rendering
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,
}

impl JobConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)
            .with_context(|| format!("failed to read job config {}", path.display()))?;
        serde_json::from_str(&txt)
            .with_context(|| format!("invalid job config {}", path.display()))
    }

    pub fn apply(&mut self, o: &JobOverrides) {
        if let Some(v) = &o.output_dir {
            self.output_dir = v.clone();
        }
        if let Some(v) = o.parity {
            self.parity = v;
        }
        if let Some(v) = o.mode {
            self.mode = v;
        }
        if let Some(v) = o.copies {
            self.copies = v;
        }
        if let Some(v) = o.format {
            self.format = v;
        }
        if let Some(v) = o.scale {
            self.scale = v;
        }
        if let Some(v) = &o.font {
            self.font = Some(v.clone());
        }
    }

    /// Checks export settings; layout settings are checked by the planner.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            bail!("scale must be a positive number, got {}", self.scale);
        }
        if let Some(font) = &self.font
            && !font.is_file()
        {
            bail!("font file {} does not exist", font.display());
        }
        Ok(())
    }

    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            parity: self.parity,
            mode: self.mode,
            copies: self.copies,
        }
    }
}
