//! Template + image folders in, composed sheets out.
//!
//! Everything is planned and composed in memory first, so a bad template or
//! an invalid configuration never leaves a half-written output directory.

use std::path::{Path, PathBuf};

use deck_core::{LayoutConfig, LayoutMetadata, plan};
use tracing::info;

use crate::compose::PageComposer;
use crate::emit::{ensure_dir, write_metadata, write_page};
use crate::error::Result;
use crate::library::ImageLibrary;
use crate::template::Template;

#[derive(Clone, Debug)]
pub struct Sheets {
    /// Composed SVG documents, in print order.
    pub pages: Vec<String>,
    pub metadata: LayoutMetadata,
}

#[derive(Clone, Debug)]
pub struct WrittenSheets {
    pub pages: Vec<PathBuf>,
    pub metadata: PathBuf,
}

pub fn prepare(template: &Template, library: &ImageLibrary, config: &LayoutConfig) -> Result<Sheets> {
    let geometry = template.geometry()?;
    let catalog = library.catalog();
    let plan = plan(&geometry, &catalog, config)?;
    info!(
        sets = catalog.sets.len(),
        cards = catalog.card_count(),
        pages = plan.page_count(),
        "composing pages"
    );

    let mut composer = PageComposer::new(template, library)?;
    let pages = plan
        .pages
        .iter()
        .map(|page| composer.compose(page))
        .collect::<Result<Vec<_>>>()?;
    Ok(Sheets {
        pages,
        metadata: LayoutMetadata::from_plan(&plan, &catalog),
    })
}

impl Sheets {
    pub fn write(&self, dir: &Path) -> Result<WrittenSheets> {
        ensure_dir(dir)?;
        let pages = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, svg)| write_page(dir, i, svg))
            .collect::<Result<Vec<_>>>()?;
        let metadata = write_metadata(dir, &self.metadata)?;
        info!(dir = %dir.display(), pages = pages.len(), "sheets written");
        Ok(WrittenSheets { pages, metadata })
    }
}
