//! Page rendering contract and region capture.
//!
//! Rasterizing documents is left to a [`DocumentRenderer`] implementation;
//! this module only fixes the shapes passed across that boundary and turns a
//! dragged selection into a [`CapturedRegion`].

use std::fmt;

use crate::error::DocentError;
use crate::types::CapturedRegion;

/// Scale used for the main page view.
pub const VIEWER_SCALE: f32 = 1.2;
/// Scale used for the thumbnail strip.
pub const THUMBNAIL_SCALE: f32 = 0.18;

/// A rendered page (or a crop of one) as PNG bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct PageImage {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl fmt::Debug for PageImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageImage")
            .field("index", &self.index)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_len", &self.png.len())
            .finish()
    }
}

/// Rectangle in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Normalize a drag between two points, in any corner order.
    ///
    /// Fractional pointer positions are widened to whole pixels. Points left
    /// of or above the page are rejected; so are drags with no area.
    pub fn from_drag(start: (f64, f64), end: (f64, f64)) -> Result<Self, DocentError> {
        let (left, right) = (start.0.min(end.0), start.0.max(end.0));
        let (top, bottom) = (start.1.min(end.1), start.1.max(end.1));
        if !(left.is_finite() && top.is_finite() && right.is_finite() && bottom.is_finite()) {
            return Err(DocentError::Validation("Selection is not a finite rectangle".into()));
        }
        if left < 0.0 || top < 0.0 {
            return Err(DocentError::Validation("Selection starts outside the page".into()));
        }

        let x = left.floor() as u32;
        let y = top.floor() as u32;
        let rect = Self {
            x,
            y,
            width: (right.ceil() as u32).saturating_sub(x),
            height: (bottom.ceil() as u32).saturating_sub(y),
        };
        if right - left <= 0.0 || bottom - top <= 0.0 || rect.is_empty() {
            return Err(DocentError::Validation("Selection is empty".into()));
        }
        Ok(rect)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Ensure the rectangle has area and lies inside `page`.
    pub fn check_within(&self, page: &PageImage) -> Result<(), DocentError> {
        if self.is_empty() {
            return Err(DocentError::Validation("Selection is empty".into()));
        }
        let right = u64::from(self.x) + u64::from(self.width);
        let bottom = u64::from(self.y) + u64::from(self.height);
        if right > u64::from(page.width) || bottom > u64::from(page.height) {
            return Err(DocentError::Validation(format!(
                "Selection {}x{}+{}+{} exceeds page {} ({}x{})",
                self.width, self.height, self.x, self.y, page.index, page.width, page.height
            )));
        }
        Ok(())
    }
}

/// Turns document bytes into page images.
pub trait DocumentRenderer: Send + Sync {
    fn page_count(&self, document: &[u8]) -> Result<usize, DocentError>;

    /// Render page `index` (zero-based) at `scale`.
    fn render_page(&self, document: &[u8], index: usize, scale: f32)
        -> Result<PageImage, DocentError>;

    /// Cut `rect` out of an already rendered page.
    fn crop(&self, page: &PageImage, rect: CropRect) -> Result<PageImage, DocentError>;
}

/// Lazily renders every page of a document, one per `next()`.
///
/// Cloning yields an independent iterator from the same position; call
/// [`PageIter::restart`] to go back to the first page.
pub struct PageIter<'a, R: ?Sized> {
    renderer: &'a R,
    document: &'a [u8],
    scale: f32,
    next: usize,
    count: usize,
}

impl<R: ?Sized> Clone for PageIter<'_, R> {
    fn clone(&self) -> Self {
        Self {
            renderer: self.renderer,
            document: self.document,
            scale: self.scale,
            next: self.next,
            count: self.count,
        }
    }
}

impl<R: DocumentRenderer + ?Sized> PageIter<'_, R> {
    pub fn restart(&mut self) {
        self.next = 0;
    }

    pub fn page_count(&self) -> usize {
        self.count
    }
}

impl<R: DocumentRenderer + ?Sized> Iterator for PageIter<'_, R> {
    type Item = Result<PageImage, DocentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.renderer.render_page(self.document, index, self.scale))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

/// Iterate over all pages of `document` at `scale`.
pub fn pages<'a, R: DocumentRenderer + ?Sized>(
    renderer: &'a R,
    document: &'a [u8],
    scale: f32,
) -> Result<PageIter<'a, R>, DocentError> {
    let count = renderer.page_count(document)?;
    Ok(PageIter {
        renderer,
        document,
        scale,
        next: 0,
        count,
    })
}

/// Render `page`, cut `rect` out of it, and wrap the result as a PNG data URL.
pub fn capture_region<R: DocumentRenderer + ?Sized>(
    renderer: &R,
    document: &[u8],
    page: usize,
    scale: f32,
    rect: CropRect,
) -> Result<CapturedRegion, DocentError> {
    let count = renderer.page_count(document)?;
    if page >= count {
        return Err(DocentError::NotFound(format!(
            "Page {page} (document has {count} pages)"
        )));
    }
    let rendered = renderer.render_page(document, page, scale)?;
    rect.check_within(&rendered)?;
    let cropped = renderer.crop(&rendered, rect)?;
    tracing::debug!(page, width = cropped.width, height = cropped.height, "region captured");
    CapturedRegion::from_png(&cropped.png)
}
