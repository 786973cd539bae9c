//! SVG side of card sheets: template slots, image folders, page composition
//! and output files.

pub mod compose;
pub mod embed;
pub mod emit;
pub mod error;
pub mod library;
pub mod pipeline;
pub mod svg;
pub mod template;

pub use compose::PageComposer;
pub use emit::{METADATA_FILE, page_file_name, write_metadata, write_page};
pub use error::{Result, SheetError};
pub use library::{ImageEntry, ImageLibrary, ImageSet};
pub use pipeline::{Sheets, WrittenSheets, prepare};
pub use template::{Template, TemplateStructure};
