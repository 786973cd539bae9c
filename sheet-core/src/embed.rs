use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};

use crate::error::{Result, SheetError};

/// Encodes 8-bit RGBA pixels. Filter and compression are pinned so the same
/// pixels always produce the same file.
pub fn encode_rgba_to_png_bytes(
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, png::EncodingError> {
    let mut out = Vec::new();
    let mut encoder = Encoder::new(&mut out, width, height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_filter(FilterType::NoFilter);
    encoder.set_compression(Compression::Default);
    let mut stream = encoder.write_header()?;
    stream.write_image_data(rgba)?;
    stream.finish()?;
    Ok(out)
}

pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

pub fn image_data_url(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| SheetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(data_url(mime_for(path), &bytes))
}

/// A single transparent pixel, used for slots without a card.
pub fn placeholder_data_url() -> Result<String> {
    let png = encode_rgba_to_png_bytes(1, 1, &[0, 0, 0, 0])?;
    Ok(data_url("image/png", &png))
}
