//! Raster and PDF export of composed pages.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use sheet_core::embed::encode_rgba_to_png_bytes;
use tracing::{debug, info, warn};

use crate::config::OutputFormat;

/// Parser options with system fonts, plus `font` as the sans-serif family.
pub fn options(font: Option<&Path>) -> Result<usvg::Options<'static>> {
    let mut opt = usvg::Options::default();
    let mut fontdb = usvg::fontdb::Database::new();
    if let Some(path) = font {
        let data =
            fs::read(path).with_context(|| format!("failed to read font {}", path.display()))?;
        fontdb.load_font_data(data);
        // Map generic 'sans-serif' to the supplied font family
        let family_name = fontdb
            .faces()
            .next()
            .and_then(|face| face.families.first().map(|(n, _)| n.clone()));
        match family_name {
            Some(name) => {
                debug!(family = %name, "sans-serif family");
                fontdb.set_sans_serif_family(name);
            }
            None => warn!(font = %path.display(), "no usable face in font file"),
        }
    }
    fontdb.load_system_fonts();
    opt.fontdb = Arc::new(fontdb);
    Ok(opt)
}

fn parse(svg: &str, opt: &usvg::Options) -> Result<usvg::Tree> {
    usvg::Tree::from_str(svg, opt).map_err(|e| anyhow!("SVG parse error: {e:?}"))
}

/// Renders at `scale` pixels per user unit and encodes a deterministic PNG.
pub fn render_png(svg: &str, opt: &usvg::Options, scale: f32) -> Result<Vec<u8>> {
    let tree = parse(svg, opt)?;
    let size = tree.size();
    let w_px = (size.width() * scale).ceil().max(1.0) as u32;
    let h_px = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap =
        tiny_skia::Pixmap::new(w_px, h_px).ok_or_else(|| anyhow!("pixmap alloc failed"))?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pm);
    Ok(encode_rgba_to_png_bytes(w_px, h_px, pixmap.data())?)
}

/// One single-page PDF per SVG page.
pub fn render_pdf(svg: &str, opt: &usvg::Options) -> Result<Vec<u8>> {
    let tree = parse(svg, opt)?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|e| anyhow!("PDF conversion failed: {e:?}"))
}

/// Renders every page up front; nothing is written until all succeed.
pub fn render_all(
    pages: &[String],
    format: OutputFormat,
    scale: f32,
    font: Option<&Path>,
) -> Result<Vec<Vec<u8>>> {
    if format == OutputFormat::Svg {
        return Ok(Vec::new());
    }
    let opt = options(font)?;
    pages
        .iter()
        .enumerate()
        .map(|(i, svg)| {
            debug!(page = i + 1, ?format, "rendering");
            let bytes = match format {
                OutputFormat::Png => render_png(svg, &opt, scale),
                _ => render_pdf(svg, &opt),
            };
            bytes.with_context(|| format!("failed to render page {}", i + 1))
        })
        .collect()
}

/// Writes rendered pages next to their SVG sources.
pub fn write_rendered(
    svg_pages: &[PathBuf],
    rendered: &[Vec<u8>],
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    let mut out = Vec::with_capacity(rendered.len());
    for (svg, bytes) in svg_pages.iter().zip(rendered) {
        let path = svg.with_extension(format.extension());
        fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        out.push(path);
    }
    if !out.is_empty() {
        info!(pages = out.len(), format = format.extension(), "pages exported");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10" viewBox="0 0 20 10">
<rect width="20" height="10" fill="#ff0000"/>
</svg>"##;

    #[test]
    fn png_is_scaled_and_deterministic() {
        let opt = usvg::Options::default();
        let a = render_png(RECT, &opt, 2.0).unwrap();
        let b = render_png(RECT, &opt, 2.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..8], b"\x89PNG\r\n\x1a\n");
        // IHDR width and height, big-endian
        assert_eq!(u32::from_be_bytes([a[16], a[17], a[18], a[19]]), 40);
        assert_eq!(u32::from_be_bytes([a[20], a[21], a[22], a[23]]), 20);
    }

    #[test]
    fn pdf_has_header() {
        let pdf = render_pdf(RECT, &usvg::Options::default()).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[test]
    fn broken_svg_is_an_error() {
        assert!(render_png("<svg", &usvg::Options::default(), 1.0).is_err());
    }

    #[test]
    fn rendered_files_sit_next_to_svgs() {
        let dir = tempfile::tempdir().unwrap();
        let svg = dir.path().join("page_001.svg");
        let written =
            write_rendered(&[svg], &[b"%PDF-1.7".to_vec()], OutputFormat::Pdf).unwrap();
        assert_eq!(written, [dir.path().join("page_001.pdf")]);
        assert_eq!(fs::read(&written[0]).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn svg_format_renders_nothing() {
        let pages = vec![RECT.to_string()];
        assert!(render_all(&pages, OutputFormat::Svg, 1.0, None).unwrap().is_empty());
    }
}
