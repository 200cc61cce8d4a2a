use log::{info, warn};
use opencv::{
    core::Mat,
    highgui,
    prelude::*,
    videoio::{self, VideoCapture},
};

use super::{DetectionConfig, MarkerDetector};
use crate::error::{Error, Result};

/// Where frames come from. Returning `false` means no frame is available and
/// ends the session.
pub trait FrameSource {
    fn read_frame(&mut self, frame: &mut Mat) -> Result<bool>;
}

/// Where annotated frames go, and where key presses come from.
pub trait FrameSink {
    fn show(&mut self, frame: &Mat) -> Result<()>;

    /// Waits up to `timeout_ms` for a key press.
    fn poll_key(&mut self, timeout_ms: i32) -> Result<Option<char>>;
}

/// Exclusively owned capture device, released when dropped.
pub struct Camera {
    index: i32,
    capture: VideoCapture,
}

impl Camera {
    pub fn open(index: i32) -> Result<Self> {
        let capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::CameraUnavailable(index));
        }
        info!("Opened camera {}", index);
        Ok(Self { index, capture })
    }
}

impl FrameSource for Camera {
    fn read_frame(&mut self, frame: &mut Mat) -> Result<bool> {
        Ok(self.capture.read(frame)? && !frame.empty())
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        match self.capture.release() {
            Ok(()) => info!("Released camera {}", self.index),
            Err(e) => warn!("Failed to release camera {}: {}", self.index, e),
        }
    }
}

/// HighGUI window; all windows are torn down when dropped.
pub struct HighGuiWindow {
    title: String,
}

impl HighGuiWindow {
    pub fn open(title: &str) -> Result<Self> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self {
            title: title.to_string(),
        })
    }
}

impl FrameSink for HighGuiWindow {
    fn show(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.title, frame)?;
        Ok(())
    }

    fn poll_key(&mut self, timeout_ms: i32) -> Result<Option<char>> {
        let key = highgui::wait_key(timeout_ms)?;
        if key < 0 {
            return Ok(None);
        }
        Ok(char::from_u32((key & 0xFF) as u32))
    }
}

impl Drop for HighGuiWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            warn!("Failed to close windows: {}", e);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FrameUnavailable,
    QuitKey,
}

/// Owns everything the live loop touches. Dropping the session releases the
/// frame source and the display.
pub struct DetectionSession<S: FrameSource, D: FrameSink> {
    source: S,
    sink: D,
    detector: MarkerDetector,
    quit_key: char,
    key_poll_ms: i32,
}

impl<S: FrameSource, D: FrameSink> DetectionSession<S, D> {
    pub fn new(source: S, sink: D, config: &DetectionConfig) -> Result<Self> {
        Ok(Self {
            source,
            sink,
            detector: MarkerDetector::new(config)?,
            quit_key: config.quit_key,
            key_poll_ms: config.key_poll_ms,
        })
    }

    /// Runs until the source dries up or the quit key is pressed. Any error
    /// ends the loop immediately.
    pub fn run(&mut self) -> Result<StopReason> {
        let mut frame = Mat::default();
        let mut frames: u64 = 0;
        loop {
            if !self.source.read_frame(&mut frame)? {
                info!("No frame after {} frames, stopping", frames);
                return Ok(StopReason::FrameUnavailable);
            }
            frames += 1;

            self.detector.process_frame(&mut frame)?;
            self.sink.show(&frame)?;

            if self.sink.poll_key(self.key_poll_ms)? == Some(self.quit_key) {
                info!("Quit key pressed after {} frames", frames);
                return Ok(StopReason::QuitKey);
            }
        }
    }

    pub fn into_parts(self) -> (S, D) {
        (self.source, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};
    use std::collections::VecDeque;

    struct Frames(VecDeque<Mat>);

    impl FrameSource for Frames {
        fn read_frame(&mut self, frame: &mut Mat) -> Result<bool> {
            match self.0.pop_front() {
                Some(next) => {
                    *frame = next;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        shown: usize,
        keys: VecDeque<Option<char>>,
    }

    impl FrameSink for Recorder {
        fn show(&mut self, _frame: &Mat) -> Result<()> {
            self.shown += 1;
            Ok(())
        }

        fn poll_key(&mut self, _timeout_ms: i32) -> Result<Option<char>> {
            Ok(self.keys.pop_front().flatten())
        }
    }

    fn blank_frames(n: usize) -> Frames {
        Frames(
            (0..n)
                .map(|_| {
                    Mat::new_rows_cols_with_default(120, 160, CV_8UC3, Scalar::all(255.0)).unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn stops_when_frames_run_out() {
        let config = DetectionConfig::tuned();
        let mut session =
            DetectionSession::new(blank_frames(3), Recorder::default(), &config).unwrap();
        assert_eq!(session.run().unwrap(), StopReason::FrameUnavailable);
        let (_, sink) = session.into_parts();
        assert_eq!(sink.shown, 3);
    }

    #[test]
    fn stops_on_quit_key() {
        let sink = Recorder {
            shown: 0,
            keys: VecDeque::from([None, Some('x'), Some('q')]),
        };
        let config = DetectionConfig::tuned();
        let mut session = DetectionSession::new(blank_frames(10), sink, &config).unwrap();
        assert_eq!(session.run().unwrap(), StopReason::QuitKey);
        let (source, sink) = session.into_parts();
        assert_eq!(sink.shown, 3);
        assert_eq!(source.0.len(), 7);
    }
}
