//! OpenCV backend: file decode/encode, imgproc drawing and a highgui preview.

use opencv::{
    core::{Mat, Point, Scalar, Size, Vector},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use rally_core::{
    Canvas, DrawCommand, FrameSink, FrameSource, HersheyMetrics, Overlay, OverlayError, Preview,
    PreviewControl, Rgb, TextMeasure, VideoInfo,
};
use std::path::Path;

const FONT: i32 = imgproc::FONT_HERSHEY_SIMPLEX;

fn cv(err: opencv::Error) -> OverlayError {
    OverlayError::Video(err.to_string())
}

fn path_str(path: &Path) -> rally_core::Result<&str> {
    path.to_str()
        .ok_or_else(|| OverlayError::Video(format!("non UTF-8 path: {}", path.display())))
}

/// OpenCV stores pixels as BGR.
fn scalar(color: Rgb) -> Scalar {
    Scalar::new(color.2 as f64, color.1 as f64, color.0 as f64, 0.0)
}

// ========== Source ==========

pub struct VideoFileSource {
    cap: VideoCapture,
    info: VideoInfo,
}

impl VideoFileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> rally_core::Result<Self> {
        let path = path.as_ref();
        let cap = VideoCapture::from_file(path_str(path)?, videoio::CAP_ANY).map_err(cv)?;
        if !cap.is_opened().map_err(cv)? {
            return Err(OverlayError::Video(format!("cannot open video {}", path.display())));
        }

        let fps = cap.get(videoio::CAP_PROP_FPS).map_err(cv)?;
        let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH).map_err(cv)? as u32;
        let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT).map_err(cv)? as u32;
        let count = cap.get(videoio::CAP_PROP_FRAME_COUNT).map_err(cv)?;
        let frame_count = (count > 0.0).then_some(count as u64);

        log::info!("Opened {}: {}x{} @ {:.2} fps", path.display(), width, height, fps);
        Ok(Self { cap, info: VideoInfo { fps, width, height, frame_count } })
    }
}

impl FrameSource for VideoFileSource {
    type Frame = Mat;

    fn info(&self) -> VideoInfo {
        self.info
    }

    fn read_frame(&mut self) -> rally_core::Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.cap.read(&mut frame).map_err(cv)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

// ========== Drawing ==========

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvCanvas;

impl Canvas<Mat> for OpenCvCanvas {
    fn draw(&mut self, frame: &mut Mat, overlay: &Overlay) -> rally_core::Result<()> {
        for command in &overlay.commands {
            match command {
                DrawCommand::Text { text, origin, scale, color, thickness } => {
                    imgproc::put_text(
                        frame,
                        text,
                        Point::new(origin.x, origin.y),
                        FONT,
                        *scale,
                        scalar(*color),
                        *thickness,
                        imgproc::LINE_AA,
                        false,
                    )
                    .map_err(cv)?;
                }
                DrawCommand::Polygon { points, color } => {
                    let outline: Vector<Point> = points.iter().map(|p| Point::new(p.x, p.y)).collect();
                    let mut polygons: Vector<Vector<Point>> = Vector::new();
                    polygons.push(outline);
                    imgproc::fill_poly(
                        frame,
                        &polygons,
                        scalar(*color),
                        imgproc::LINE_8,
                        0,
                        Point::default(),
                    )
                    .map_err(cv)?;
                }
            }
        }
        Ok(())
    }
}

/// Exact text extents from `getTextSize`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvMetrics;

impl TextMeasure for OpenCvMetrics {
    fn text_size(&self, text: &str, scale: f64, thickness: i32) -> (i32, i32) {
        let mut baseline = 0;
        match imgproc::get_text_size(text, FONT, scale, thickness, &mut baseline) {
            Ok(size) => (size.width, size.height),
            Err(e) => {
                log::warn!("getTextSize failed ({}), using approximate metrics", e);
                HersheyMetrics.text_size(text, scale, thickness)
            }
        }
    }
}

// ========== Preview ==========

pub struct WindowPreview {
    window: String,
}

impl WindowPreview {
    pub fn new(window: &str) -> Self {
        Self { window: window.to_string() }
    }
}

impl Preview<Mat> for WindowPreview {
    fn show(&mut self, frame: &Mat) -> rally_core::Result<PreviewControl> {
        highgui::imshow(&self.window, frame).map_err(cv)?;
        let key = highgui::wait_key(1).map_err(cv)?;
        if key & 0xFF == 'q' as i32 {
            return Ok(PreviewControl::Abort);
        }
        Ok(PreviewControl::Continue)
    }
}

impl Drop for WindowPreview {
    fn drop(&mut self) {
        let _ = highgui::destroy_all_windows();
    }
}

// ========== Sink ==========

/// MPEG-4 Part 2 (`mp4v`) writer.
pub struct VideoFileSink {
    writer: VideoWriter,
}

impl VideoFileSink {
    pub fn create<P: AsRef<Path>>(path: P, info: &VideoInfo) -> rally_core::Result<Self> {
        let path = path.as_ref();
        let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v').map_err(cv)?;
        let size = Size::new(info.width as i32, info.height as i32);
        let writer = VideoWriter::new(path_str(path)?, fourcc, info.fps, size, true).map_err(cv)?;
        if !writer.is_opened().map_err(cv)? {
            return Err(OverlayError::Video(format!("cannot create video {}", path.display())));
        }
        Ok(Self { writer })
    }
}

impl FrameSink<Mat> for VideoFileSink {
    fn write_frame(&mut self, frame: &Mat) -> rally_core::Result<()> {
        self.writer.write(frame).map_err(cv)
    }

    fn finish(&mut self) -> rally_core::Result<()> {
        self.writer.release().map_err(cv)
    }
}
