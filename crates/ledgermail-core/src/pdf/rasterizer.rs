//! First-page rasterization using lopdf.
//!
//! Scanned invoices carry each page as one image XObject. When the first page
//! is such a scan its image is decoded and re-encoded as JPEG for the OCR call.
//! Pages that draw text are handed to a full page renderer instead.

use std::fmt;
use std::sync::Arc;

use image::{DynamicImage, ImageBuffer, Luma, Rgb};
use image::codecs::jpeg::JpegEncoder;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PageRasterizer, PopplerRenderer, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Content stream operators that show text.
const TEXT_OPERATORS: [&str; 4] = ["Tj", "TJ", "'", "\""];

/// Rasterizer that lifts the page image out of scanned PDFs and renders the rest.
#[derive(Clone)]
pub struct PdfRasterizer {
    jpeg_quality: u8,
    renderer: Option<Arc<dyn PageRasterizer>>,
}

impl PdfRasterizer {
    /// Image extraction with `pdftoppm` rendering for everything else.
    pub fn new() -> Self {
        Self {
            jpeg_quality: 90,
            renderer: Some(Arc::new(PopplerRenderer::default())),
        }
    }

    /// Image extraction only; pages without an image fail with [`PdfError::NoImage`].
    pub fn image_only() -> Self {
        Self {
            jpeg_quality: 90,
            renderer: None,
        }
    }

    /// Build from configuration. An empty renderer path disables rendering.
    pub fn from_config(config: &PdfConfig) -> Self {
        let rasterizer = Self::image_only().with_quality(config.jpeg_quality);
        if config.renderer.as_os_str().is_empty() {
            return rasterizer;
        }
        rasterizer.with_renderer(
            PopplerRenderer::new(&config.renderer)
                .with_dpi(config.dpi)
                .with_quality(config.jpeg_quality),
        )
    }

    /// Set the JPEG quality (1-100).
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Set the renderer used for pages that are not a single scanned image.
    pub fn with_renderer(mut self, renderer: impl PageRasterizer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    fn load(&self, data: &[u8]) -> Result<Document> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        Ok(doc)
    }

    fn page_image(&self, doc: &Document, page_id: ObjectId) -> Option<DynamicImage> {
        let resources = page_resources(doc, page_id)?;
        let xobjects = resources.get(b"XObject").ok()?;
        let Ok((_, Object::Dictionary(xobjects))) = doc.dereference(xobjects) else {
            return None;
        };

        xobjects.iter().find_map(|(_, reference)| {
            let (_, object) = doc.dereference(reference).ok()?;
            decode_image(doc, object)
        })
    }

    fn any_image(&self, doc: &Document) -> Option<DynamicImage> {
        doc.objects.values().find_map(|object| decode_image(doc, object))
    }

    fn encode_jpeg(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        trace!(width = image.width(), height = image.height(), "Encoding page image");
        // JPEG has no alpha channel.
        let rgb = image.to_rgb8();
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.jpeg_quality)
            .encode_image(&rgb)
            .map_err(|e| PdfError::Encode(e.to_string()))?;
        Ok(out)
    }
}

impl Default for PdfRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PdfRasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfRasterizer")
            .field("jpeg_quality", &self.jpeg_quality)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

impl PageRasterizer for PdfRasterizer {
    fn first_page_jpeg(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        let doc = self.load(pdf)?;

        let pages = doc.get_pages();
        let (&number, &page_id) = pages.iter().next().ok_or(PdfError::NoPages)?;
        debug!(pages = pages.len(), "Loaded PDF");

        let has_text = page_has_text(&doc, page_id);
        let scan = if has_text {
            None
        } else {
            self.page_image(&doc, page_id)
        };

        match (scan, &self.renderer) {
            (Some(image), _) => self.encode_jpeg(&image),
            (None, Some(renderer)) => {
                debug!(has_text, "Page {} is not a scan, rendering it", number);
                renderer.first_page_jpeg(pdf)
            }
            (None, None) => {
                debug!("No renderer, scanning all objects for an image");
                let image = self
                    .page_image(&doc, page_id)
                    .or_else(|| self.any_image(&doc))
                    .ok_or(PdfError::NoImage(number))?;
                self.encode_jpeg(&image)
            }
        }
    }
}

/// Whether the page's content stream shows any text.
fn page_has_text(doc: &Document, page_id: ObjectId) -> bool {
    let Ok(content) = doc.get_page_content(page_id) else {
        return false;
    };
    let Ok(content) = Content::decode(&content) else {
        return false;
    };
    content
        .operations
        .iter()
        .any(|op| TEXT_OPERATORS.contains(&op.operator.as_str()))
}

/// Resources of a page, following `Parent` links for inherited resources.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(resources))) = doc.dereference(resources) {
            return Some(resources.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

fn decode_image(doc: &Document, object: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = object else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
    trace!("Found image object: {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|filter| match filter {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
        _ => None,
    });

    match filter {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Unsupported image filter");
            return None;
        }
        _ => {}
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    let pixels = (width as usize).checked_mul(height as usize)?;
    let rgb_len = pixels.checked_mul(3)?;
    match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= rgb_len => {
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, data[..rgb_len].to_vec())
                .map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            ImageBuffer::<Luma<u8>, _>::from_raw(width, height, data[..pixels].to_vec())
                .map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!("Could not decode raw image data of {} bytes", data.len());
            None
        }
    }
}
