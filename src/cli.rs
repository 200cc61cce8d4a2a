//! Command-line arguments shared by the `card_markers` umbrella binary and
//! the per-pipeline binaries. Every option can also come from the
//! environment (or a `.env` file).

use std::path::PathBuf;

use clap::Args;
use log::info;

use crate::compositor::{self, SheetConfig};
use crate::detection::{Camera, DetectionConfig, DetectionSession, HighGuiWindow};
use crate::generator::{self, GeneratorConfig, DEFAULT_MARKER_SIZE};

/// Loads `.env` and installs the logger.
pub fn init() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Directory the marker PNGs are written to.
    #[arg(long, env = "MARKER_DIR", default_value = "markers")]
    pub output_dir: PathBuf,

    /// Side length of each marker in pixels.
    #[arg(long, env = "MARKER_SIZE", default_value_t = DEFAULT_MARKER_SIZE)]
    pub size: i32,

    /// Skip writing manifest.json next to the images.
    #[arg(long)]
    pub no_manifest: bool,
}

impl GenerateArgs {
    pub fn run(self) -> anyhow::Result<()> {
        let config = GeneratorConfig {
            output_dir: self.output_dir,
            marker_size: self.size,
            write_manifest: !self.no_manifest,
            ..GeneratorConfig::default()
        };
        let written = generator::generate_deck(&config)?;
        info!("Generated {} markers in {}", written.len(), config.output_dir.display());
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct ComposeArgs {
    /// Directory holding the generated marker PNGs.
    #[arg(long, env = "MARKER_DIR", default_value = "markers")]
    pub input_dir: PathBuf,

    /// Directory the PDF is written to.
    #[arg(long, env = "PRINT_DIR", default_value = "print")]
    pub output_dir: PathBuf,
}

impl ComposeArgs {
    pub fn run(self) -> anyhow::Result<()> {
        let config = SheetConfig {
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            ..SheetConfig::default()
        };
        let path = compositor::compose_sheets(&config)?;
        info!("PDF ready: {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    #[arg(long, env = "CAMERA_INDEX", default_value_t = 0)]
    pub camera: i32,

    /// `tuned` or `default`.
    #[arg(long, env = "DETECTION_PRESET", default_value = "tuned")]
    pub preset: String,

    /// JSON detection config; overrides the preset.
    #[arg(long, env = "DETECTION_CONFIG")]
    pub config: Option<PathBuf>,
}

impl DetectArgs {
    pub fn detection_config(&self) -> anyhow::Result<DetectionConfig> {
        if let Some(path) = &self.config {
            return Ok(DetectionConfig::from_json_file(path)?);
        }
        DetectionConfig::preset(&self.preset)
            .ok_or_else(|| anyhow::anyhow!("unknown detection preset `{}`", self.preset))
    }

    pub fn run(self) -> anyhow::Result<()> {
        let config = self.detection_config()?;
        let camera = Camera::open(self.camera)?;
        let window = HighGuiWindow::open(&config.window_title)?;
        let mut session = DetectionSession::new(camera, window, &config)?;
        let stop = session.run()?;
        info!("Detection stopped: {:?}", stop);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        detect: DetectArgs,
    }

    #[test]
    fn preset_selection() {
        let args = Wrapper::parse_from(["detect", "--preset", "default"]).detect;
        assert_eq!(args.detection_config().unwrap(), DetectionConfig::library_default());

        let args = Wrapper::parse_from(["detect", "--preset", "bogus"]).detect;
        assert!(args.detection_config().is_err());
    }
}
