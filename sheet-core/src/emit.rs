//! Writes composed pages and the layout metadata to an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use deck_core::LayoutMetadata;
use tracing::debug;

use crate::error::{Result, SheetError};

pub const METADATA_FILE: &str = "layout.json";

/// `page_001.svg` for the first page.
pub fn page_file_name(index: usize) -> String {
    format!("page_{:03}.svg", index + 1)
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| SheetError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

fn write(path: PathBuf, contents: &[u8]) -> Result<PathBuf> {
    fs::write(&path, contents).map_err(|source| SheetError::Write {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "written");
    Ok(path)
}

pub fn write_page(dir: &Path, index: usize, svg: &str) -> Result<PathBuf> {
    write(dir.join(page_file_name(index)), svg.as_bytes())
}

pub fn write_metadata(dir: &Path, metadata: &LayoutMetadata) -> Result<PathBuf> {
    let mut json = serde_json::to_string_pretty(metadata)?;
    json.push('\n');
    write(dir.join(METADATA_FILE), json.as_bytes())
}

#[cfg(test)]
mod tests {
    use deck_core::{CardSet, Catalog, LayoutConfig, SlotGeometry, plan};

    use super::*;

    #[test]
    fn page_names_are_one_based_and_padded() {
        assert_eq!(page_file_name(0), "page_001.svg");
        assert_eq!(page_file_name(41), "page_042.svg");
        assert_eq!(page_file_name(1233), "page_1234.svg");
    }

    #[test]
    fn metadata_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        ensure_dir(&out).unwrap();

        let catalog = Catalog::new(vec![CardSet::new("xy", ["x", "y", "z"])]);
        let p = plan(
            &SlotGeometry::new(2, None),
            &catalog,
            &LayoutConfig::default(),
        )
        .unwrap();
        let meta = LayoutMetadata::from_plan(&p, &catalog);
        let path = write_metadata(&out, &meta).unwrap();
        assert_eq!(path, out.join("layout.json"));

        let back: LayoutMetadata =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, meta);
        assert_eq!(back.page_count, 2);
    }

    #[test]
    fn write_into_missing_dir_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_page(&missing, 0, "<svg/>").unwrap_err();
        assert!(matches!(err, SheetError::Write { ref path, .. } if path.ends_with("page_001.svg")));
    }
}
