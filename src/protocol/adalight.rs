use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Header length in bytes: 'Ada' + two count bytes + checksum
pub const HEADER_LEN: usize = 6;

/// Fixed preamble the receiver firmware expects, whatever the strip length
pub const LITERAL_HEADER: [u8; HEADER_LEN] = [0x41, 0x64, 0x61, 0x00, 0x00, 0x36];

/// Largest LED count the two count bytes can describe
pub const MAX_COUNTED_LEDS: usize = 0x1_0000;

/// How the 6-byte header is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Always `LITERAL_HEADER`
    #[default]
    Literal,
    /// Standard Adalight: count - 1 split into hi/lo, then hi ^ lo ^ 0x55
    Counted,
}

/// Build the header for a strip of `led_count` LEDs
pub fn adalight_header(mode: HeaderMode, led_count: usize) -> Result<[u8; HEADER_LEN]> {
    match mode {
        HeaderMode::Literal => Ok(LITERAL_HEADER),
        HeaderMode::Counted => {
            ensure!(
                (1..=MAX_COUNTED_LEDS).contains(&led_count),
                "Counted Adalight header needs 1..={} LEDs, got {}",
                MAX_COUNTED_LEDS,
                led_count
            );

            let count = led_count - 1;
            let count_hi = (count >> 8) as u8;
            let count_lo = (count & 0xFF) as u8;
            let checksum = count_hi ^ count_lo ^ 0x55;

            Ok([0x41, 0x64, 0x61, count_hi, count_lo, checksum])
        }
    }
}

/// Build Adalight protocol frame
pub fn build_adalight_frame(header: [u8; HEADER_LEN], pixel_data: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + pixel_data.len());

    frame.extend_from_slice(&header);
    frame.extend_from_slice(pixel_data);

    frame
}
