//! Page geometry for the two-per-page report layout.
//!
//! All coordinates are in points with the origin at the top-left corner of
//! the page; the PDF writer flips them.
//!
//! ```text
//! +---------------------------+
//! |       header mask         |  header_height
//! +---------------------------+
//! |         margin_y          |
//! |  slot 0: title / meta /   |  slot_height
//! |          image            |
//! |         margin_y          |
//! |  slot 1                   |  slot_height
//! |         margin_y          |
//! +---------------------------+
//! |  footer mask + page no.   |  footer_height
//! +---------------------------+
//! ```

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};

/// Items per page.
pub const ITEMS_PER_PAGE: usize = 2;

/// Space between text lines and between the text block and the image.
const LINE_GAP: f64 = 4.0;

/// An axis-aligned box, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// On-page height of a mask scaled to the full page width.
///
/// A mask that failed to load, or has a degenerate size, takes no room.
pub fn mask_height(natural: Option<(u32, u32)>, page_width: f64) -> f64 {
    match natural {
        Some((width, height)) if width > 0 => f64::from(height) * page_width / f64::from(width),
        _ => 0.0,
    }
}

/// Fixed measurements shared by every page of a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    pub header_height: f64,
    pub footer_height: f64,
    pub slot_height: f64,
    pub title_size: f64,
    pub meta_size: f64,
    pub caption_size: f64,
}

impl PageGeometry {
    /// Derive the geometry from the config and the masks' natural sizes.
    pub fn new(
        config: &ReportConfig,
        header: Option<(u32, u32)>,
        footer: Option<(u32, u32)>,
    ) -> Result<Self> {
        let width = config.page_size.width_pt();
        let height = config.page_size.height_pt();
        let header_height = mask_height(header, width);
        let footer_height = mask_height(footer, width);
        let slot_height = (height - header_height - footer_height - 3.0 * config.margin_y) / 2.0;

        let geometry = Self {
            width,
            height,
            margin_x: config.margin_x,
            margin_y: config.margin_y,
            header_height,
            footer_height,
            slot_height,
            title_size: config.title_font_size,
            meta_size: config.meta_font_size,
            caption_size: config.caption_font_size,
        };
        if geometry.image_height() <= 0.0 {
            return Err(ReportError::JobFailure(format!(
                "masks ({:.1}pt + {:.1}pt) leave no room for items on the page",
                header_height, footer_height
            )));
        }
        Ok(geometry)
    }

    /// Height taken by the title and metadata lines.
    pub fn text_block_height(&self) -> f64 {
        self.title_size + LINE_GAP + self.meta_size + LINE_GAP
    }

    fn image_height(&self) -> f64 {
        self.slot_height - self.text_block_height()
    }

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin_x
    }

    /// Header band at the top of the page.
    pub fn header_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.header_height)
    }

    /// Footer band at the bottom of the page.
    pub fn footer_rect(&self) -> Rect {
        Rect::new(0.0, self.height - self.footer_height, self.width, self.footer_height)
    }

    /// Slot `index` (0 or 1) on a page.
    pub fn slot_rect(&self, index: usize) -> Rect {
        let top = self.header_height
            + self.margin_y
            + index as f64 * (self.slot_height + self.margin_y);
        Rect::new(self.margin_x, top, self.content_width(), self.slot_height)
    }

    /// Baseline of the page-number caption, centered in the footer band.
    ///
    /// Without a footer mask the caption sits in the bottom margin.
    pub fn caption_baseline(&self) -> f64 {
        let band = if self.footer_height > 0.0 {
            self.footer_height
        } else {
            self.margin_y
        };
        self.height - band / 2.0 + self.caption_size * 0.35
    }
}

/// Where one item lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPlan {
    /// Position of the item in the report's item list.
    pub item_index: usize,
    /// 0 for the upper slot, 1 for the lower one.
    pub slot: usize,
    pub title_baseline: f64,
    pub meta_baseline: f64,
    /// Region the image is fitted into.
    pub image_area: Rect,
}

/// One page of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    /// 1-based page number.
    pub number: usize,
    pub slots: Vec<SlotPlan>,
}

/// Number of pages for `items` items.
pub fn page_count(items: usize) -> usize {
    items.div_ceil(ITEMS_PER_PAGE)
}

/// Place `items` items, two per page, in order.
pub fn plan_pages(items: usize, geometry: &PageGeometry) -> Vec<PagePlan> {
    (0..page_count(items))
        .map(|page| {
            let slots = (0..ITEMS_PER_PAGE)
                .map(|slot| (page * ITEMS_PER_PAGE + slot, slot))
                .filter(|(item_index, _)| *item_index < items)
                .map(|(item_index, slot)| {
                    let rect = geometry.slot_rect(slot);
                    let title_baseline = rect.y + geometry.title_size;
                    let meta_baseline = title_baseline + LINE_GAP + geometry.meta_size;
                    let text_block = geometry.text_block_height();
                    SlotPlan {
                        item_index,
                        slot,
                        title_baseline,
                        meta_baseline,
                        image_area: Rect::new(rect.x, rect.y + text_block, rect.width, rect.height - text_block),
                    }
                })
                .collect();
            PagePlan {
                number: page + 1,
                slots,
            }
        })
        .collect()
}

/// Scale an image to fit `area`, keeping its aspect ratio, centered
/// horizontally and aligned to the top of the area.
pub fn fit_image(width: u32, height: u32, area: &Rect) -> Rect {
    if width == 0 || height == 0 {
        return Rect::new(area.center_x(), area.y, 0.0, 0.0);
    }
    let scale = (area.width / f64::from(width)).min(area.height / f64::from(height));
    let w = f64::from(width) * scale;
    let h = f64::from(height) * scale;
    Rect::new(area.x + (area.width - w) / 2.0, area.y, w, h)
}
