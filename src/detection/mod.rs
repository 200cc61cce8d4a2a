//! Live ArUco detection: frame preprocessing, marker detection, area
//! filtering and overlay drawing.

mod config;
mod session;

use std::io;
use std::path::Path;

use log::debug;
use opencv::{
    core::{
        copy_make_border, Mat, Point, Point2f, Scalar, Size, Vector, BORDER_CONSTANT,
        BORDER_DEFAULT,
    },
    imgcodecs,
    imgproc::{
        self, adaptive_threshold, cvt_color, gaussian_blur, COLOR_BGR2GRAY, FONT_HERSHEY_SIMPLEX,
        LINE_8, THRESH_BINARY, THRESH_BINARY_INV,
    },
    objdetect::{ArucoDetector, RefineParameters},
    prelude::*,
};

use crate::error::Result;
use crate::generator::card_dictionary;

pub use config::{
    CornerRefinement, DetectionConfig, DetectorTuning, PreprocessConfig, ThresholdMethod,
};
pub use session::{Camera, DetectionSession, FrameSink, FrameSource, HighGuiWindow, StopReason};

const LABEL_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
const OUTLINE_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
const ARROW_COLOR: (f64, f64, f64) = (0.0, 0.0, 255.0);
const LABEL_OFFSET: i32 = 20;

fn bgr((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

/// One decoded marker in one frame. Nothing carries over between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub id: i32,
    pub corners: [Point2f; 4],
}

impl Detection {
    /// Unsigned polygon area in px², same as `contourArea` without orientation.
    pub fn area(&self) -> f64 {
        let twice: f64 = (0..4)
            .map(|i| {
                let a = self.corners[i];
                let b = self.corners[(i + 1) % 4];
                f64::from(a.x) * f64::from(b.y) - f64::from(b.x) * f64::from(a.y)
            })
            .sum();
        twice.abs() / 2.0
    }

    /// Mean of the four corners.
    pub fn centroid(&self) -> Point2f {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point2f::new(sx / 4.0, sy / 4.0)
    }

    fn integer_corners(&self) -> [Point; 4] {
        self.corners.map(|p| Point::new(p.x as i32, p.y as i32))
    }
}

/// Keeps detections at or above `min_area`; `None` keeps everything.
pub fn filter_by_area(detections: Vec<Detection>, min_area: Option<f64>) -> Vec<Detection> {
    match min_area {
        Some(min_area) => detections
            .into_iter()
            .filter(|detection| detection.area() >= min_area)
            .collect(),
        None => detections,
    }
}

fn preprocess(frame: &Mat, config: Option<&PreprocessConfig>) -> Result<Mat> {
    let gray = if frame.channels() == 1 {
        frame.try_clone()?
    } else {
        let mut gray = Mat::default();
        cvt_color(frame, &mut gray, COLOR_BGR2GRAY, 0)?;
        gray
    };

    let Some(config) = config else {
        return Ok(gray);
    };

    let smoothed = if config.blur_kernel > 1 {
        let mut blurred = Mat::default();
        gaussian_blur(
            &gray,
            &mut blurred,
            Size::new(config.blur_kernel, config.blur_kernel),
            0.0,
            0.0,
            BORDER_DEFAULT,
        )?;
        blurred
    } else {
        gray
    };

    let mut binary = Mat::default();
    adaptive_threshold(
        &smoothed,
        &mut binary,
        255.0,
        config.method.as_opencv(),
        if config.invert { THRESH_BINARY_INV } else { THRESH_BINARY },
        config.block_size,
        config.constant,
    )?;
    Ok(binary)
}

pub struct MarkerDetector {
    detector: ArucoDetector,
    preprocess: Option<PreprocessConfig>,
    min_area: Option<f64>,
    draw_orientation: bool,
}

impl MarkerDetector {
    pub fn new(config: &DetectionConfig) -> Result<Self> {
        let dictionary = card_dictionary()?;
        let params = config.detector.to_parameters()?;
        let refine = RefineParameters::new(10.0, 3.0, true)?;
        let detector = ArucoDetector::new(&dictionary, &params, refine)?;
        Ok(Self {
            detector,
            preprocess: config.preprocess.clone(),
            min_area: config.min_area,
            draw_orientation: config.draw_orientation,
        })
    }

    /// All decoded markers in `frame`. Rejected candidates are discarded.
    pub fn detect(&self, frame: &Mat) -> Result<Vec<Detection>> {
        let input = preprocess(frame, self.preprocess.as_ref())?;

        let mut corners = Vector::<Vector<Point2f>>::new();
        let mut ids = Vector::<i32>::new();
        let mut rejected = Vector::<Vector<Point2f>>::new();
        self.detector
            .detect_markers(&input, &mut corners, &mut ids, &mut rejected)?;

        let detections = ids
            .iter()
            .zip(corners.iter())
            .filter_map(|(id, quad)| {
                let corners: [Point2f; 4] = quad.to_vec().try_into().ok()?;
                Some(Detection { id, corners })
            })
            .collect::<Vec<_>>();
        debug!(
            "Detected {} markers ({} rejected candidates)",
            detections.len(),
            rejected.len()
        );
        Ok(detections)
    }

    /// Detects, drops detections under the area threshold and draws the rest
    /// onto `frame`. Returns the accepted detections.
    pub fn process_frame(&self, frame: &mut Mat) -> Result<Vec<Detection>> {
        let accepted = filter_by_area(self.detect(frame)?, self.min_area);
        for detection in &accepted {
            annotate(frame, detection, self.draw_orientation)?;
        }
        Ok(accepted)
    }
}

/// Draws the id label, outline and optional orientation arrow.
pub fn annotate(frame: &mut Mat, detection: &Detection, draw_orientation: bool) -> Result<()> {
    let centroid = detection.centroid();
    let (cx, cy) = (centroid.x as i32, centroid.y as i32);
    imgproc::put_text(
        frame,
        &format!("ID: {}", detection.id),
        Point::new(cx - LABEL_OFFSET, cy - LABEL_OFFSET),
        FONT_HERSHEY_SIMPLEX,
        0.5,
        bgr(LABEL_COLOR),
        2,
        LINE_8,
        false,
    )?;

    let corners = detection.integer_corners();
    let mut outline = Vector::<Vector<Point>>::new();
    outline.push(Vector::from_slice(&corners));
    imgproc::polylines(frame, &outline, true, bgr(OUTLINE_COLOR), 2, LINE_8, 0)?;

    if draw_orientation {
        imgproc::arrowed_line(frame, corners[0], corners[1], bgr(ARROW_COLOR), 2, LINE_8, 0, 0.1)?;
    }
    Ok(())
}

/// Decodes marker ids from an image file, e.g. a freshly generated marker.
///
/// Generated markers have no quiet zone, so a white margin is added before
/// running the detector with stock parameters.
pub fn decode_marker_image(path: &Path) -> Result<Vec<i32>> {
    let image = imgcodecs::imread(&path.to_string_lossy(), imgcodecs::IMREAD_GRAYSCALE)?;
    if image.empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no readable image at {}", path.display()),
        )
        .into());
    }
    let pad = (image.cols().max(image.rows()) / 4).max(8);
    let mut padded = Mat::default();
    copy_make_border(&image, &mut padded, pad, pad, pad, pad, BORDER_CONSTANT, Scalar::all(255.0))?;

    let detector = MarkerDetector::new(&DetectionConfig::library_default())?;
    Ok(detector.detect(&padded)?.into_iter().map(|d| d.id).collect())
}
