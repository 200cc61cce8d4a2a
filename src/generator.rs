use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use opencv::{
    core::{Mat, Vector},
    imgcodecs,
    imgproc::{cvt_color, COLOR_GRAY2BGR},
    objdetect::{self, Dictionary, PredefinedDictionaryType},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::card::{all_cards, Card};
use crate::error::Result;

pub const DEFAULT_MARKER_SIZE: i32 = 256;
pub const MANIFEST_FILE: &str = "manifest.json";

/// 6x6 cells, 250 symbols.
pub fn card_dictionary() -> Result<Dictionary> {
    Ok(objdetect::get_predefined_dictionary(
        PredefinedDictionaryType::DICT_6X6_250,
    )?)
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub output_dir: PathBuf,
    pub marker_size: i32,
    pub border_bits: i32,
    pub write_manifest: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("markers"),
            marker_size: DEFAULT_MARKER_SIZE,
            border_bits: 1,
            write_manifest: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: i32,
    pub suit: String,
    pub rank: String,
    pub file: String,
}

impl From<Card> for ManifestEntry {
    fn from(card: Card) -> Self {
        Self {
            id: card.id(),
            suit: card.suit_token().to_string(),
            rank: card.rank_token().to_string(),
            file: card.file_name(),
        }
    }
}

/// Renders one marker as a 3-channel square image.
pub fn render_marker(dictionary: &Dictionary, id: i32, size: i32, border_bits: i32) -> Result<Mat> {
    let mut marker = Mat::default();
    objdetect::generate_image_marker(dictionary, id, size, &mut marker, border_bits)?;

    let mut bgr = Mat::default();
    cvt_color(&marker, &mut bgr, COLOR_GRAY2BGR, 0)?;
    Ok(bgr)
}

fn write_png(path: &Path, image: &Mat) -> Result<()> {
    let written = imgcodecs::imwrite(&path.to_string_lossy(), image, &Vector::default())?;
    if !written {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("imwrite refused {}", path.display()),
        )
        .into());
    }
    Ok(())
}

/// Writes the full 54-marker deck into `config.output_dir`.
///
/// Returns the written image paths in id order. The first failure aborts the
/// run; files already written are left in place.
pub fn generate_deck(config: &GeneratorConfig) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.output_dir)?;
    let dictionary = card_dictionary()?;

    let mut written = Vec::new();
    for card in all_cards() {
        let marker = render_marker(&dictionary, card.id(), config.marker_size, config.border_bits)?;
        let path = config.output_dir.join(card.file_name());
        write_png(&path, &marker)?;
        info!("Generated marker {} ({})", path.display(), card);
        written.push(path);
    }

    if config.write_manifest {
        let entries: Vec<ManifestEntry> = all_cards().map(ManifestEntry::from).collect();
        let manifest_path = config.output_dir.join(MANIFEST_FILE);
        fs::write(&manifest_path, serde_json::to_string_pretty(&entries)?)?;
        info!("Wrote manifest {}", manifest_path.display());
    }

    Ok(written)
}

pub fn read_manifest(dir: &Path) -> Result<Vec<ManifestEntry>> {
    let raw = fs::read_to_string(dir.join(MANIFEST_FILE))?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_marker_is_square_bgr() {
        let dictionary = card_dictionary().unwrap();
        let marker = render_marker(&dictionary, 7, 128, 1).unwrap();
        assert_eq!(marker.rows(), 128);
        assert_eq!(marker.cols(), 128);
        assert_eq!(marker.channels(), 3);
    }

    #[test]
    fn manifest_entry_mirrors_file_name() {
        let entry = ManifestEntry::from(Card::from_id(52).unwrap());
        assert_eq!(entry.id, 52);
        assert_eq!(entry.suit, "joker");
        assert_eq!(entry.rank, "B");
        assert_eq!(entry.file, "52_joker_B.png");
    }
}
