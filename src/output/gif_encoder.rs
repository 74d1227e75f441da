//! Animated GIF output.

use super::{remove_if_exists, FrameEncoder};
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// NeuQuant sampling speed (1 = best, 30 = fastest).
const QUANTIZE_SPEED: i32 = 10;

/// Streams frames into one animated GIF.
///
/// The file is created on the first frame, so an export with no frames
/// leaves nothing on disk.
pub struct GifWriter {
    path: PathBuf,
    width: u16,
    height: u16,
    delay: u16,
    looping: bool,
    encoder: Option<gif::Encoder<BufWriter<File>>>,
    frames: usize,
    written: Vec<PathBuf>,
}

impl std::fmt::Debug for GifWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifWriter")
            .field("path", &self.path)
            .field("size", &(self.width, self.height))
            .field("delay", &self.delay)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl GifWriter {
    /// Prepare a writer for `canvas_size` frames played at `frame_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the canvas does not fit the
    /// 16-bit GIF size fields.
    pub fn new(path: impl AsRef<Path>, canvas_size: (u32, u32), frame_rate: f32, looping: bool) -> Result<Self> {
        let (w, h) = canvas_size;
        let (Ok(width), Ok(height)) = (u16::try_from(w), u16::try_from(h)) else {
            return Err(Error::InvalidDimensions { width: w, height: h });
        };
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width: w, height: h });
        }

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            width,
            height,
            delay: frame_delay(frame_rate),
            looping,
            encoder: None,
            frames: 0,
            written: Vec::new(),
        })
    }

    /// Per-frame delay in hundredths of a second.
    #[must_use]
    pub const fn delay(&self) -> u16 {
        self.delay
    }

    fn encoder(&mut self) -> Result<&mut gif::Encoder<BufWriter<File>>> {
        if self.encoder.is_none() {
            let file = File::create(&self.path)?;
            self.written.push(self.path.clone());
            let mut encoder = gif::Encoder::new(BufWriter::new(file), self.width, self.height, &[])?;
            let repeat = if self.looping { gif::Repeat::Infinite } else { gif::Repeat::Finite(0) };
            encoder.set_repeat(repeat)?;
            self.encoder = Some(encoder);
        }
        self.encoder
            .as_mut()
            .ok_or_else(|| Error::encoder_at(self.frames, "gif encoder unavailable"))
    }
}

/// Convert a frame rate to a GIF delay, clamped to at least one centisecond.
fn frame_delay(frame_rate: f32) -> u16 {
    if !frame_rate.is_finite() || frame_rate <= 0.0 {
        return u16::MAX;
    }
    (100.0 / frame_rate).round().clamp(1.0, f32::from(u16::MAX)) as u16
}

impl FrameEncoder for GifWriter {
    fn encode(&mut self, fb: &Framebuffer) -> Result<()> {
        if (fb.width(), fb.height()) != (u32::from(self.width), u32::from(self.height)) {
            return Err(Error::encoder_at(
                self.frames,
                format!(
                    "frame is {}x{}, animation is {}x{}",
                    fb.width(),
                    fb.height(),
                    self.width,
                    self.height
                ),
            ));
        }

        let mut pixels = fb.pixels().to_vec();
        let mut frame = gif::Frame::from_rgba_speed(self.width, self.height, &mut pixels, QUANTIZE_SPEED);
        frame.delay = self.delay;

        self.encoder()?.write_frame(&frame)?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(encoder) = self.encoder.take() {
            let mut writer = encoder.into_inner()?;
            writer.flush()?;
        }
        Ok(())
    }

    fn discard(&mut self) -> Result<()> {
        drop(self.encoder.take());
        for path in self.written.drain(..) {
            remove_if_exists(&path)?;
        }
        self.frames = 0;
        Ok(())
    }

    fn outputs(&self) -> &[PathBuf] {
        &self.written
    }

    fn frames_encoded(&self) -> usize {
        self.frames
    }
}
