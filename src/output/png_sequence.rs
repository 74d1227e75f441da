//! PNG file writers: one still image, or a numbered sequence.

use super::{remove_if_exists, FrameEncoder, PngEncoder};
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Create `path` and write `fb` into it.
///
/// The path is recorded in `written` only once the file exists, so a
/// failed create never marks someone else's file for removal.
fn write_frame(fb: &Framebuffer, path: &Path, written: &mut Vec<PathBuf>) -> Result<()> {
    let file = File::create(path)?;
    written.push(path.to_path_buf());
    PngEncoder::write_to(fb, file)
}

/// Writes exactly one frame to a PNG file.
#[derive(Debug)]
pub struct StillWriter {
    path: PathBuf,
    written: Vec<PathBuf>,
}

impl StillWriter {
    /// Writer targeting `path`. Nothing is created until a frame arrives.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: Vec::new(),
        }
    }
}

impl FrameEncoder for StillWriter {
    fn encode(&mut self, fb: &Framebuffer) -> Result<()> {
        if !self.written.is_empty() {
            return Err(Error::Encoder {
                frame_index: Some(1),
                message: "a still image holds a single frame".to_string(),
            });
        }
        write_frame(fb, &self.path, &mut self.written)
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    fn discard(&mut self) -> Result<()> {
        for path in self.written.drain(..) {
            remove_if_exists(&path)?;
        }
        Ok(())
    }

    fn outputs(&self) -> &[PathBuf] {
        &self.written
    }

    fn frames_encoded(&self) -> usize {
        self.written.len()
    }
}

/// Writes each frame to `{dir}/{prefix}{index:05}.png`.
#[derive(Debug)]
pub struct PngSequenceWriter {
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
}

impl PngSequenceWriter {
    /// Prepare the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(dir: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: prefix.to_string(),
            written: Vec::new(),
        })
    }

    /// Path the frame at `index` is written to.
    #[must_use]
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}{index:05}.png", self.prefix))
    }
}

impl FrameEncoder for PngSequenceWriter {
    fn encode(&mut self, fb: &Framebuffer) -> Result<()> {
        let path = self.frame_path(self.written.len());
        write_frame(fb, &path, &mut self.written)
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    fn discard(&mut self) -> Result<()> {
        for path in self.written.drain(..) {
            remove_if_exists(&path)?;
        }
        Ok(())
    }

    fn outputs(&self) -> &[PathBuf] {
        &self.written
    }

    fn frames_encoded(&self) -> usize {
        self.written.len()
    }
}
