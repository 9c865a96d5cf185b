use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Logical color, independent of the order the strip expects on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[cfg(test)]
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Rgb { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        [color.r, color.g, color.b]
    }
}

/// Channel order of one pixel triple on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    Rgb,
    #[default]
    Grb,
    Bgr,
}

impl PixelFormat {
    /// Parse a format name as written in the config file
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "RGB" => Ok(PixelFormat::Rgb),
            "GRB" => Ok(PixelFormat::Grb),
            "BGR" => Ok(PixelFormat::Bgr),
            other => bail!("Unknown pixel format: {} (expected RGB, GRB or BGR)", other),
        }
    }

    /// Arrange a color's channels in wire order
    pub fn to_wire(self, color: Rgb) -> [u8; 3] {
        let Rgb { r, g, b } = color;
        match self {
            PixelFormat::Rgb => [r, g, b],
            PixelFormat::Grb => [g, r, b], // Swap R and G
            PixelFormat::Bgr => [b, g, r], // Swap R and B
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_passthrough() {
        let color = Rgb::new(255, 0, 0);
        assert_eq!(PixelFormat::Rgb.to_wire(color), [255, 0, 0]);
    }

    #[test]
    fn test_grb_transform() {
        let color = Rgb::new(255, 0, 0); // Red
        assert_eq!(PixelFormat::Grb.to_wire(color), [0, 255, 0]);
    }

    #[test]
    fn test_bgr_transform() {
        let color = Rgb::new(255, 0, 0); // Red
        assert_eq!(PixelFormat::Bgr.to_wire(color), [0, 0, 255]);
    }

    #[test]
    fn test_default_background_is_green_first_on_wire() {
        // (200, 0, 0) on the wire in GRB order
        let background = Rgb::new(0, 200, 0);
        assert_eq!(PixelFormat::default().to_wire(background), [200, 0, 0]);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(PixelFormat::parse("RGB").unwrap(), PixelFormat::Rgb);
        assert_eq!(PixelFormat::parse("GRB").unwrap(), PixelFormat::Grb);
        assert_eq!(PixelFormat::parse("BGR").unwrap(), PixelFormat::Bgr);
        assert!(PixelFormat::parse("RGBW").is_err());
        assert!(PixelFormat::parse("grb").is_err());
    }

    #[test]
    fn test_rgb_from_array() {
        let color: Rgb = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(color, Rgb::new(1, 2, 3));
        assert_eq!(serde_json::to_string(&color).unwrap(), "[1,2,3]");
    }
}
