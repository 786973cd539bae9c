//! Card artwork discovery: one set per image folder under a root directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use deck_core::{CardSet, Catalog};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, SheetError};

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "gif"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageEntry {
    pub path: PathBuf,
    /// File stem, used as the card label.
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageSet {
    pub name: String,
    pub dir: PathBuf,
    pub images: Vec<ImageEntry>,
}

#[derive(Clone, Debug, Default)]
pub struct ImageLibrary {
    pub root: PathBuf,
    pub sets: Vec<ImageSet>,
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

impl ImageLibrary {
    pub fn discover(root: &Path) -> Result<Self> {
        let mut sets = Vec::new();
        let dirs = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();
        for entry in dirs {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let images = list_images(entry.path())?;
            if images.is_empty() {
                debug!(dir = %entry.path().display(), "no images, skipped");
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            sets.push(ImageSet {
                name,
                dir: entry.path().to_path_buf(),
                images,
            });
        }
        if sets.is_empty() {
            return Err(SheetError::NoImageSets(root.to_path_buf()));
        }
        disambiguate(root, &mut sets);
        info!(
            root = %root.display(),
            sets = sets.len(),
            images = sets.iter().map(|s| s.images.len()).sum::<usize>(),
            "image library discovered"
        );
        Ok(ImageLibrary {
            root: root.to_path_buf(),
            sets,
        })
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(
            self.sets
                .iter()
                .map(|s| CardSet::new(s.name.clone(), s.images.iter().map(|i| i.label.clone())))
                .collect(),
        )
    }

    pub fn image(&self, set: usize, card: usize) -> Option<&ImageEntry> {
        self.sets.get(set)?.images.get(card)
    }
}

fn list_images(dir: &Path) -> Result<Vec<ImageEntry>> {
    let mut images = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        let label = entry
            .path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        images.push(ImageEntry {
            path: entry.path().to_path_buf(),
            label,
        });
    }
    Ok(images)
}

/// Sets sharing a folder name are keyed by their path relative to the root.
fn disambiguate(root: &Path, sets: &mut [ImageSet]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for s in sets.iter() {
        *seen.entry(s.name.clone()).or_default() += 1;
    }
    for s in sets.iter_mut() {
        if seen.get(&s.name).copied().unwrap_or(0) < 2 {
            continue;
        }
        let rel = s.dir.strip_prefix(root).unwrap_or(&s.dir);
        let id = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        warn!(name = %s.name, id = %id, "duplicate set name, using relative path");
        s.name = id;
    }
}
