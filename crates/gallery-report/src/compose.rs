//! Report composition: preloaded items to a paginated PDF.
//!
//! Two items per page, each with a bold title, a metadata line and the
//! image fitted below. Header and footer masks repeat on every page and
//! carry no content of their own except the page-number caption, which is
//! centered in the footer band.
//!
//! The item ceiling is not checked here; callers validate it first.

use std::fmt::Write as _;
use std::io::Cursor;

use gallery_tags::{FullItem, TagCatalog};
use image::codecs::jpeg::JpegEncoder;
use image::{GenericImageView, Rgb, RgbImage};

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::layout::{fit_image, plan_pages, PageGeometry};
use crate::pdf::{jpeg_image_dict, truncate_to_width, ContentBuilder, Font, ObjectId, PdfWriter};
use crate::preload::Preloaded;
use crate::progress::{compose_progress, ProgressTracker};
use crate::source::{DecodedImage, ImageLoader};

/// Text drawn where an item's image could not be loaded.
pub const IMAGE_PLACEHOLDER: &str = "Image unavailable";

/// Longest side, in pixels, of an embedded image.
const MAX_EMBED_PX: u32 = 1600;

/// Header and footer graphics. A mask that failed to load is `None` and
/// takes no room on the page.
#[derive(Debug, Default, Clone)]
pub struct Masks {
    pub header: Option<DecodedImage>,
    pub footer: Option<DecodedImage>,
}

impl Masks {
    /// Load both masks. Failures are logged and leave that mask out.
    pub async fn load<L: ImageLoader>(loader: &L, header: Option<&str>, footer: Option<&str>) -> Self {
        Self {
            header: Self::load_one(loader, "header", header).await,
            footer: Self::load_one(loader, "footer", footer).await,
        }
    }

    async fn load_one<L: ImageLoader>(loader: &L, band: &str, url: Option<&str>) -> Option<DecodedImage> {
        let url = url?;
        match loader.load(url).await {
            Ok(image) => Some(image),
            Err(e) => {
                let err = ReportError::AssetLoad {
                    url: url.to_string(),
                    message: e.to_string(),
                };
                tracing::warn!(band, "{}; rendering without it", err);
                None
            }
        }
    }

    fn natural_size(mask: &Option<DecodedImage>) -> Option<(u32, u32)> {
        mask.as_ref().map(|m| m.dimensions())
    }
}

/// A finished document.
#[derive(Debug, Clone)]
pub struct ComposedReport {
    /// PDF bytes.
    pub document: Vec<u8>,
    pub page_count: usize,
    /// Items rendered with the placeholder instead of their image.
    pub placeholders: usize,
}

/// The metadata line under an item's title: tag names, then the author.
pub fn metadata_line(item: &FullItem, catalog: &TagCatalog) -> String {
    let mut line = catalog.tag_names(&item.tag_ids).join(", ");
    if let Some(author) = item.author_name.as_deref().filter(|a| !a.trim().is_empty()) {
        if !line.is_empty() {
            line.push_str(" · ");
        }
        let _ = write!(line, "registered by {}", author.trim());
    }
    line
}

/// Flatten onto white, cap the size and encode as baseline JPEG.
fn encode_jpeg(image: &DecodedImage, quality: u8) -> Result<(u32, u32, Vec<u8>)> {
    let image = if image.width().max(image.height()) > MAX_EMBED_PX {
        image.thumbnail(MAX_EMBED_PX, MAX_EMBED_PX)
    } else {
        image.clone()
    };

    let rgb: RgbImage = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            let blend = |c: u8| ((u16::from(c) * u16::from(a) + 255 * (255 - u16::from(a))) / 255) as u8;
            Rgb([blend(r), blend(g), blend(b)])
        })
    } else {
        image.to_rgb8()
    };

    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&rgb)
        .map_err(|e| ReportError::JobFailure(format!("JPEG encoding failed: {}", e)))?;
    Ok((rgb.width(), rgb.height(), buf.into_inner()))
}

struct EmbeddedImage {
    id: ObjectId,
    width: u32,
    height: u32,
}

fn embed(pdf: &mut PdfWriter, image: &DecodedImage, quality: u8) -> Result<EmbeddedImage> {
    let (width, height, data) = encode_jpeg(image, quality)?;
    let id = pdf.add_stream(&jpeg_image_dict(width, height), &data);
    Ok(EmbeddedImage { id, width, height })
}

/// Compose `preloaded` into a PDF, in item order.
pub fn compose(
    preloaded: &Preloaded,
    catalog: &TagCatalog,
    masks: &Masks,
    config: &ReportConfig,
    progress: &ProgressTracker,
) -> Result<ComposedReport> {
    let geometry = PageGeometry::new(
        config,
        Masks::natural_size(&masks.header),
        Masks::natural_size(&masks.footer),
    )?;
    let pages = plan_pages(preloaded.items.len(), &geometry);
    let page_count = pages.len();
    tracing::debug!(items = preloaded.items.len(), page_count, "composing report");

    let mut pdf = PdfWriter::new();
    let catalog_id = pdf.reserve();
    let pages_id = pdf.reserve();
    let regular = pdf.add(Font::Regular.dictionary());
    let bold = pdf.add(Font::Bold.dictionary());

    let header = masks
        .header
        .as_ref()
        .map(|m| embed(&mut pdf, m, config.jpeg_quality))
        .transpose()?;
    let footer = masks
        .footer
        .as_ref()
        .map(|m| embed(&mut pdf, m, config.jpeg_quality))
        .transpose()?;

    let mut kids = Vec::with_capacity(page_count);
    let mut placeholders = 0;

    for page in &pages {
        let mut content = ContentBuilder::new(geometry.height);
        let mut xobjects = String::new();

        if let Some(mask) = &header {
            content.image("Mh", &geometry.header_rect());
            let _ = write!(xobjects, " /Mh {}", mask.id.reference());
        }
        if let Some(mask) = &footer {
            content.image("Mf", &geometry.footer_rect());
            let _ = write!(xobjects, " /Mf {}", mask.id.reference());
        }

        for slot in &page.slots {
            let item = &preloaded.items[slot.item_index];
            let max_width = slot.image_area.width;

            let title = truncate_to_width(&item.name, Font::Bold, geometry.title_size, max_width);
            content.text(Font::Bold, geometry.title_size, slot.image_area.x, slot.title_baseline, &title);

            let meta = truncate_to_width(
                &metadata_line(item, catalog),
                Font::Regular,
                geometry.meta_size,
                max_width,
            );
            content.text(Font::Regular, geometry.meta_size, slot.image_area.x, slot.meta_baseline, &meta);

            match preloaded.image(&item.id) {
                Some(image) => {
                    let embedded = embed(&mut pdf, image, config.jpeg_quality)?;
                    let name = format!("Im{}", slot.item_index + 1);
                    let rect = fit_image(embedded.width, embedded.height, &slot.image_area);
                    content.image(&name, &rect);
                    let _ = write!(xobjects, " /{} {}", name, embedded.id.reference());
                }
                None => {
                    placeholders += 1;
                    let area = slot.image_area;
                    content.frame(&area);
                    content.centered_text(
                        Font::Regular,
                        geometry.meta_size,
                        area.center_x(),
                        area.y + area.height / 2.0,
                        IMAGE_PLACEHOLDER,
                    );
                }
            }
        }

        let caption = format!("Page {} of {}", page.number, page_count);
        content.centered_text(
            Font::Regular,
            geometry.caption_size,
            geometry.width / 2.0,
            geometry.caption_baseline(),
            &caption,
        );

        let contents = pdf.add_stream("", &content.finish());
        let page_id = pdf.add(format!(
            "<< /Type /Page /Parent {} /MediaBox [0 0 {:.2} {:.2}] /Contents {} /Resources << /Font << /F1 {} /F2 {} >> /XObject <<{} >> >> >>",
            pages_id.reference(),
            geometry.width,
            geometry.height,
            contents.reference(),
            regular.reference(),
            bold.reference(),
            xobjects
        ));
        kids.push(page_id.reference());
        progress.advance(compose_progress(page.number, page_count));
    }

    pdf.set(
        pages_id,
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), page_count),
    );
    pdf.set(catalog_id, format!("<< /Type /Catalog /Pages {} >>", pages_id.reference()));
    let document = pdf.finish(catalog_id)?;

    Ok(ComposedReport {
        document,
        page_count,
        placeholders,
    })
}
