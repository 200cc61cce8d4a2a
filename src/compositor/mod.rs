//! Lays generated marker images out on printable PDF sheets, one section per
//! suit.

mod grouping;
mod layout;
mod metrics;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::{info, warn};
use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, IndirectFontRef, Mm,
    PdfDocument, PdfLayerReference, Pt, Px,
};

use crate::error::{Error, Result};

pub use grouping::{
    group_cards_by_suit, parse_marker_file, MarkerFile, SuitGroup, UNKNOWN_RANK_ORDER,
};
pub use layout::{GridLayout, GridSpec, PageSize, A4};
pub use metrics::helvetica_width;

pub const OUTPUT_FILE: &str = "card_markers.pdf";

#[derive(Debug, Clone)]
pub struct SheetConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: String,
    pub page: PageSize,
    pub grid: GridSpec,
    pub caption_font_size: f32,
    /// Distance from a marker's bottom edge down to its caption baseline.
    pub caption_offset: f32,
    pub title_font_size: f32,
    /// Distance from the bottom margin down to the title baseline.
    pub title_offset: f32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("markers"),
            output_dir: PathBuf::from("print"),
            output_file: OUTPUT_FILE.to_string(),
            page: A4,
            grid: GridSpec::default(),
            caption_font_size: 12.0,
            caption_offset: 15.0,
            title_font_size: 24.0,
            title_offset: 30.0,
        }
    }
}

impl SheetConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub file_name: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub caption: TextPlacement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub suit: String,
    pub markers: Vec<PlacedMarker>,
    pub title: TextPlacement,
}

/// Splits every suit group into pages of at most one grid each.
pub fn plan_pages(groups: &[SuitGroup], config: &SheetConfig) -> Vec<PagePlan> {
    let layout = GridLayout::compute(config.page, &config.grid);
    let per_page = layout.slots().max(1);
    let mut pages = Vec::new();

    for group in groups {
        for chunk in group.cards.chunks(per_page) {
            let markers = chunk
                .iter()
                .enumerate()
                .map(|(index, card)| {
                    let (x, y) = layout.slot_origin(index);
                    let caption = card.stem().to_string();
                    let width = helvetica_width(&caption, config.caption_font_size);
                    PlacedMarker {
                        file_name: card.file_name.clone(),
                        x,
                        y,
                        size: layout.marker_size,
                        caption: TextPlacement {
                            x: x + layout.marker_size / 2.0 - width / 2.0,
                            y: y - config.caption_offset,
                            font_size: config.caption_font_size,
                            text: caption,
                        },
                    }
                })
                .collect();

            let title = group.suit.to_uppercase();
            let title_width = helvetica_width(&title, config.title_font_size);
            pages.push(PagePlan {
                suit: group.suit.clone(),
                markers,
                title: TextPlacement {
                    x: config.page.width - layout.margin - title_width,
                    y: layout.margin - config.title_offset,
                    font_size: config.title_font_size,
                    text: title,
                },
            });
        }
    }

    pages
}

/// PNG file names directly inside `dir`.
pub fn list_marker_files(dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".png"))
        .collect();
    names.sort();
    Ok(names)
}

fn load_marker_image(path: &Path) -> Result<(Image, u32, u32)> {
    let rgb = image::open(path)
        .map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    let (width, height) = rgb.dimensions();

    let image = Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: rgb.into_raw(),
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    });
    Ok((image, width, height))
}

fn pt(value: f32) -> Mm {
    Mm::from(Pt(value))
}

fn draw_text(layer: &PdfLayerReference, text: &TextPlacement, font: &IndirectFontRef) {
    layer.use_text(text.text.clone(), text.font_size, pt(text.x), pt(text.y), font);
}

fn draw_page(
    layer: &PdfLayerReference,
    page: &PagePlan,
    input_dir: &Path,
    font: &IndirectFontRef,
) -> Result<()> {
    // At 72 dpi one pixel maps to one point, so the scale is size / pixels.
    const DPI: f32 = 72.0;

    for marker in &page.markers {
        let path = input_dir.join(&marker.file_name);
        let (image, width, height) = load_marker_image(&path)?;
        let scale_x = marker.size / width as f32;
        let scale_y = marker.size / height as f32;
        image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(pt(marker.x)),
                translate_y: Some(pt(marker.y)),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(DPI),
                ..Default::default()
            },
        );
        draw_text(layer, &marker.caption, font);
    }
    draw_text(layer, &page.title, font);
    Ok(())
}

/// Renders planned pages into a single PDF at `path`.
pub fn write_pdf(pages: &[PagePlan], config: &SheetConfig, path: &Path) -> Result<()> {
    let width = pt(config.page.width);
    let height = pt(config.page.height);
    let (doc, first_page, first_layer) = PdfDocument::new("Card markers", width, height, "markers");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    if pages.is_empty() {
        warn!("No marker pages to render; writing a blank document");
    }

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(width, height, "markers");
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw_page(&layer, page, &config.input_dir, &font)?;
        info!("Laid out page {} ({}, {} markers)", index + 1, page.suit, page.markers.len());
    }

    doc.save(&mut BufWriter::new(File::create(path)?))?;
    Ok(())
}

/// Reads `config.input_dir`, groups the markers by suit and writes the
/// print-ready document. Returns the document path.
pub fn compose_sheets(config: &SheetConfig) -> Result<PathBuf> {
    let names = list_marker_files(&config.input_dir)?;
    let groups = group_cards_by_suit(&names);
    let pages = plan_pages(&groups, config);

    fs::create_dir_all(&config.output_dir)?;
    let path = config.output_path();
    write_pdf(&pages, config, &path)?;
    info!("Wrote {} ({} pages)", path.display(), pages.len());
    Ok(path)
}
