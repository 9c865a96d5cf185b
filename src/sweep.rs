use anyhow::{ensure, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::{Config, MAX_LED_COUNT};
use crate::output::Link;
use crate::pixel_format::{PixelFormat, Rgb};
use crate::protocol::{adalight_header, build_adalight_frame, HeaderMode, HEADER_LEN};

/// Builds single-dot frames for a strip of fixed length
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    pixel_count: usize,
    header: [u8; HEADER_LEN],
    highlight: [u8; 3],
    background: [u8; 3],
}

impl FrameEncoder {
    /// Encoder with the stock colors, GRB order and the literal header
    #[cfg(test)]
    pub fn new(pixel_count: usize) -> Result<Self> {
        let defaults = Config::default();
        Self::with_colors(
            pixel_count,
            HeaderMode::Literal,
            PixelFormat::default(),
            defaults.highlight,
            defaults.background,
        )
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_colors(
            config.led_count,
            config.header,
            config.format()?,
            config.highlight,
            config.background,
        )
    }

    pub fn with_colors(
        pixel_count: usize,
        header: HeaderMode,
        format: PixelFormat,
        highlight: Rgb,
        background: Rgb,
    ) -> Result<Self> {
        ensure!(pixel_count > 0, "pixel count must be at least 1");
        ensure!(
            pixel_count <= MAX_LED_COUNT,
            "pixel count {} exceeds the maximum of {}",
            pixel_count,
            MAX_LED_COUNT
        );
        Ok(FrameEncoder {
            pixel_count,
            header: adalight_header(header, pixel_count)?,
            highlight: format.to_wire(highlight),
            background: format.to_wire(background),
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Frame with `highlight_index` lit and every other pixel in the background color
    pub fn encode(&self, highlight_index: usize) -> Result<Vec<u8>> {
        ensure!(
            highlight_index < self.pixel_count,
            "highlight index {} out of range for {} pixels",
            highlight_index,
            self.pixel_count
        );

        let mut pixel_data = Vec::with_capacity(self.pixel_count * 3);
        for i in 0..self.pixel_count {
            let triple = if i == highlight_index { self.highlight } else { self.background };
            pixel_data.extend_from_slice(&triple);
        }

        Ok(build_adalight_frame(self.header, &pixel_data))
    }

    /// Frame with every pixel black, sent on the way out
    pub fn encode_blank(&self) -> Vec<u8> {
        let pixel_data = vec![0u8; self.pixel_count * 3];
        build_adalight_frame(self.header, &pixel_data)
    }
}

/// Encode one frame with the stock colors and header
#[cfg(test)]
pub fn encode(pixel_count: usize, highlight_index: usize) -> Result<Vec<u8>> {
    FrameEncoder::new(pixel_count)?.encode(highlight_index)
}

/// Position of the lit pixel, always in `[0, len)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
    len: usize,
}

impl Cursor {
    pub fn new(len: usize) -> Result<Self> {
        ensure!(len > 0, "cursor needs at least one position");
        Ok(Cursor { position: 0, len })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn advance(&mut self) {
        self.position = (self.position + 1) % self.len;
    }
}

/// The sweep animation loop
pub struct Sweep {
    encoder: FrameEncoder,
    cursor: Cursor,
    frame_delay: Duration,
    running: Arc<AtomicBool>,
    ddebug: bool,
}

impl Sweep {
    pub fn new(encoder: FrameEncoder, frame_delay: Duration, ddebug: bool) -> Result<Self> {
        let cursor = Cursor::new(encoder.pixel_count())?;
        Ok(Sweep {
            encoder,
            cursor,
            frame_delay,
            running: Arc::new(AtomicBool::new(true)),
            ddebug,
        })
    }

    /// Get a clone of the running flag for signal handlers
    pub fn get_running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    #[cfg(test)]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Stream frames until the running flag is cleared or `max_frames` have been sent.
    /// `Some(0)` runs until interrupted, like `None`.
    ///
    /// Returns the number of frames written. Any open or write failure ends the
    /// loop with that error.
    pub fn run(&mut self, link: &mut dyn Link, max_frames: Option<u64>) -> Result<u64> {
        let mut frames_sent = 0u64;

        while self.running.load(Ordering::Relaxed) {
            if max_frames.is_some_and(|max| max > 0 && frames_sent >= max) {
                break;
            }

            link.ensure_open()?;

            let position = self.cursor.position();
            let frame = self.encoder.encode(position)?;

            if self.ddebug {
                eprintln!("[DEBUG] Sending frame: {} bytes ({} pixels)",
                          frame.len(), self.encoder.pixel_count());
                let hex: String = frame.iter()
                    .map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ");
                eprintln!("[DEBUG] Complete serial frame: {}", hex);
            }

            link.send(&frame)?;
            frames_sent += 1;

            println!("Frame sent for {} LEDs, position: {}", self.encoder.pixel_count(), position);

            if !self.frame_delay.is_zero() {
                thread::sleep(self.frame_delay);
            }

            self.cursor.advance();
        }

        Ok(frames_sent)
    }

    /// Turn the strip off (best effort)
    pub fn blank(&self, link: &mut dyn Link) -> Result<()> {
        link.ensure_open()?;
        link.send(&self.encoder.encode_blank())
    }
}
