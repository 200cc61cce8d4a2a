use std::fs;
use std::path::Path;

use opencv::objdetect::{CornerRefineMethod, DetectorParameters};
use opencv::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMethod {
    Mean,
    Gaussian,
}

impl ThresholdMethod {
    pub fn as_opencv(self) -> i32 {
        match self {
            ThresholdMethod::Mean => opencv::imgproc::ADAPTIVE_THRESH_MEAN_C,
            ThresholdMethod::Gaussian => opencv::imgproc::ADAPTIVE_THRESH_GAUSSIAN_C,
        }
    }
}

/// Smoothing and binarisation applied before the frame reaches the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Odd Gaussian kernel side; 0 or 1 disables blurring.
    pub blur_kernel: i32,
    pub method: ThresholdMethod,
    pub invert: bool,
    /// Odd neighbourhood side for the adaptive threshold.
    pub block_size: i32,
    pub constant: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            method: ThresholdMethod::Gaussian,
            invert: true,
            block_size: 11,
            constant: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerRefinement {
    None,
    Subpix,
    Contour,
    Apriltag,
}

impl CornerRefinement {
    fn as_opencv(self) -> i32 {
        let method = match self {
            CornerRefinement::None => CornerRefineMethod::CORNER_REFINE_NONE,
            CornerRefinement::Subpix => CornerRefineMethod::CORNER_REFINE_SUBPIX,
            CornerRefinement::Contour => CornerRefineMethod::CORNER_REFINE_CONTOUR,
            CornerRefinement::Apriltag => CornerRefineMethod::CORNER_REFINE_APRILTAG,
        };
        method as i32
    }
}

/// Overrides for the ArUco detector. `None` keeps the library default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorTuning {
    pub adaptive_thresh_win_size_min: Option<i32>,
    pub adaptive_thresh_win_size_max: Option<i32>,
    pub adaptive_thresh_win_size_step: Option<i32>,
    pub adaptive_thresh_constant: Option<f64>,
    pub min_marker_perimeter_rate: Option<f64>,
    pub max_marker_perimeter_rate: Option<f64>,
    pub polygonal_approx_accuracy_rate: Option<f64>,
    pub min_corner_distance_rate: Option<f64>,
    pub min_distance_to_border: Option<i32>,
    pub corner_refinement: Option<CornerRefinement>,
    pub corner_refinement_win_size: Option<i32>,
    pub corner_refinement_max_iterations: Option<i32>,
    pub corner_refinement_min_accuracy: Option<f64>,
    pub error_correction_rate: Option<f64>,
    /// Also decode white-on-black markers.
    pub detect_inverted_marker: Option<bool>,
}

impl DetectorTuning {
    pub fn tuned() -> Self {
        Self {
            adaptive_thresh_win_size_min: Some(3),
            adaptive_thresh_win_size_max: Some(23),
            adaptive_thresh_win_size_step: Some(10),
            adaptive_thresh_constant: Some(7.0),
            min_marker_perimeter_rate: Some(0.1),
            max_marker_perimeter_rate: Some(0.8),
            polygonal_approx_accuracy_rate: Some(0.01),
            min_corner_distance_rate: Some(0.05),
            min_distance_to_border: Some(3),
            corner_refinement: Some(CornerRefinement::Subpix),
            corner_refinement_win_size: Some(5),
            corner_refinement_max_iterations: Some(30),
            corner_refinement_min_accuracy: Some(0.005),
            error_correction_rate: Some(1.0),
            // The inverted pre-threshold hands the detector white-bordered
            // markers; without this every candidate fails the border check.
            detect_inverted_marker: Some(true),
        }
    }

    pub fn to_parameters(&self) -> Result<DetectorParameters> {
        let mut params = DetectorParameters::default()?;
        if let Some(v) = self.adaptive_thresh_win_size_min {
            params.set_adaptive_thresh_win_size_min(v);
        }
        if let Some(v) = self.adaptive_thresh_win_size_max {
            params.set_adaptive_thresh_win_size_max(v);
        }
        if let Some(v) = self.adaptive_thresh_win_size_step {
            params.set_adaptive_thresh_win_size_step(v);
        }
        if let Some(v) = self.adaptive_thresh_constant {
            params.set_adaptive_thresh_constant(v);
        }
        if let Some(v) = self.min_marker_perimeter_rate {
            params.set_min_marker_perimeter_rate(v);
        }
        if let Some(v) = self.max_marker_perimeter_rate {
            params.set_max_marker_perimeter_rate(v);
        }
        if let Some(v) = self.polygonal_approx_accuracy_rate {
            params.set_polygonal_approx_accuracy_rate(v);
        }
        if let Some(v) = self.min_corner_distance_rate {
            params.set_min_corner_distance_rate(v);
        }
        if let Some(v) = self.min_distance_to_border {
            params.set_min_distance_to_border(v);
        }
        if let Some(v) = self.corner_refinement {
            params.set_corner_refinement_method(v.as_opencv());
        }
        if let Some(v) = self.corner_refinement_win_size {
            params.set_corner_refinement_win_size(v);
        }
        if let Some(v) = self.corner_refinement_max_iterations {
            params.set_corner_refinement_max_iterations(v);
        }
        if let Some(v) = self.corner_refinement_min_accuracy {
            params.set_corner_refinement_min_accuracy(v);
        }
        if let Some(v) = self.error_correction_rate {
            params.set_error_correction_rate(v);
        }
        if let Some(v) = self.detect_inverted_marker {
            params.set_detect_inverted_marker(v);
        }
        Ok(params)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub preprocess: Option<PreprocessConfig>,
    pub detector: DetectorTuning,
    /// Detections with a smaller polygon area (px²) are treated as noise.
    pub min_area: Option<f64>,
    /// Draw an arrow from the first to the second corner.
    pub draw_orientation: bool,
    pub quit_key: char,
    pub key_poll_ms: i32,
    pub window_title: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self::tuned()
    }
}

impl DetectionConfig {
    pub fn tuned() -> Self {
        Self {
            preprocess: Some(PreprocessConfig::default()),
            detector: DetectorTuning::tuned(),
            min_area: Some(1000.0),
            draw_orientation: true,
            quit_key: 'q',
            key_poll_ms: 1,
            window_title: "ArUco Marker Detection".to_string(),
        }
    }

    /// Grayscale input, stock detector parameters, no area filter or arrow.
    pub fn library_default() -> Self {
        Self {
            preprocess: None,
            detector: DetectorTuning::default(),
            min_area: None,
            draw_orientation: false,
            ..Self::tuned()
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "tuned" => Some(Self::tuned()),
            "default" | "library_default" => Some(Self::library_default()),
            _ => None,
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_where_documented() {
        let tuned = DetectionConfig::tuned();
        let plain = DetectionConfig::library_default();
        assert_eq!(tuned.min_area, Some(1000.0));
        assert!(tuned.draw_orientation);
        assert!(plain.min_area.is_none());
        assert!(!plain.draw_orientation);
        assert!(plain.preprocess.is_none());
        assert_eq!(plain.detector, DetectorTuning::default());
        assert_eq!(plain.quit_key, tuned.quit_key);
    }

    #[test]
    fn partial_json_falls_back_to_tuned_defaults() {
        let raw = r#"{ "min_area": 250.0, "detector": { "min_distance_to_border": 5 } }"#;
        let config: DetectionConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.min_area, Some(250.0));
        assert_eq!(config.detector.min_distance_to_border, Some(5));
        assert_eq!(config.detector.adaptive_thresh_win_size_min, None);
        assert_eq!(config.preprocess, Some(PreprocessConfig::default()));
        assert_eq!(config.quit_key, 'q');
    }

    #[test]
    fn tuning_is_applied_to_parameters() {
        let params = DetectorTuning::tuned().to_parameters().unwrap();
        assert_eq!(params.adaptive_thresh_win_size_min(), 3);
        assert_eq!(params.adaptive_thresh_win_size_max(), 23);
        assert_eq!(params.min_distance_to_border(), 3);
        assert_eq!(params.corner_refinement_max_iterations(), 30);
        assert!(params.detect_inverted_marker());
        assert_eq!(
            params.corner_refinement_method(),
            CornerRefineMethod::CORNER_REFINE_SUBPIX as i32
        );
    }

    #[test]
    fn unknown_preset_is_none() {
        assert!(DetectionConfig::preset("fast").is_none());
        assert_eq!(DetectionConfig::preset("default"), Some(DetectionConfig::library_default()));
    }
}
