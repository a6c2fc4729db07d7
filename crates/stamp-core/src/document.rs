//! PDF page dimensions
//!
//! The editor renders pages to pixels elsewhere; this module only reads the
//! point sizes the transform needs.

use crate::geometry::{PageGeometry, Size};
use crate::{Result, StampError};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, warn};

/// Maximum depth followed when a page inherits its MediaBox
const MAX_INHERITANCE_DEPTH: usize = 10;

/// Read-only view over a loaded PDF
pub struct StampDocument {
    inner: Document,
    /// Used when a page declares no usable box
    fallback: Size,
}

impl StampDocument {
    /// Open a PDF document from a file path
    ///
    /// # Example
    /// ```ignore
    /// let doc = StampDocument::open("contract.pdf", A4_POINTS)?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P, fallback: Size) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| StampError::OpenError(e.to_string()))?;
        Ok(Self { inner, fallback })
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8], fallback: Size) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| StampError::OpenError(e.to_string()))?;
        Ok(Self { inner, fallback })
    }

    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Size of a 1-based page in points
    pub fn page_size(&self, page: u32) -> Result<Size> {
        let pages = self.inner.get_pages();
        let page_id = *pages
            .get(&page)
            .ok_or(StampError::InvalidPage(page as usize, pages.len()))?;

        match self.inherited_media_box(page_id)? {
            Some(media_box) => size_from_media_box(&media_box),
            None => {
                warn!(page, "page has no MediaBox, using fallback size");
                Ok(self.fallback)
            }
        }
    }

    /// Sizes of all pages in points, in page order
    pub fn page_sizes(&self) -> Result<Vec<Size>> {
        let count = self.page_count() as u32;
        (1..=count).map(|page| self.page_size(page)).collect()
    }

    /// Pair a page's rendered pixel size with its point size
    pub fn page_geometry(&self, page: u32, pixels: Size) -> Result<PageGeometry> {
        Ok(PageGeometry::new(pixels, self.page_size(page)?))
    }

    /// MediaBox (or CropBox) of a page, following the Parent chain
    fn inherited_media_box(&self, page_id: ObjectId) -> Result<Option<Vec<Object>>> {
        let mut current_id = page_id;

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| StampError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(media_box) = dict.get(b"MediaBox").or_else(|_| dict.get(b"CropBox")) {
                let array = match media_box {
                    Object::Array(arr) => arr.clone(),
                    Object::Reference(ref_id) => self
                        .inner
                        .get_object(*ref_id)?
                        .as_array()
                        .map_err(|_| {
                            StampError::ParseError("MediaBox reference is not an array".to_string())
                        })?
                        .clone(),
                    _ => {
                        return Err(StampError::ParseError("MediaBox is not an array".to_string()))
                    }
                };
                return Ok(Some(array));
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        debug!(?page_id, "no MediaBox found in page tree");
        Ok(None)
    }
}

fn number(obj: &Object, name: &str) -> Result<f64> {
    obj.as_f32()
        .map(|v| v as f64)
        .ok()
        .or_else(|| obj.as_i64().ok().map(|v| v as f64))
        .ok_or_else(|| StampError::ParseError(format!("Invalid MediaBox {name}")))
}

/// Width and height of a `[x1 y1 x2 y2]` box
fn size_from_media_box(media_box: &[Object]) -> Result<Size> {
    if media_box.len() < 4 {
        return Err(StampError::ParseError("Invalid MediaBox format".to_string()));
    }

    let x1 = number(&media_box[0], "x1")?;
    let y1 = number(&media_box[1], "y1")?;
    let x2 = number(&media_box[2], "x2")?;
    let y2 = number(&media_box[3], "y2")?;

    Ok(Size::new((x2 - x1).abs(), (y2 - y1).abs()))
}

/// Point sizes of every page in a PDF
pub fn page_point_sizes(pdf: &[u8], fallback: Size) -> Result<Vec<Size>> {
    StampDocument::open_from_bytes(pdf, fallback)?.page_sizes()
}
