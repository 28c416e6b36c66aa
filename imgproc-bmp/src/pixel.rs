//! Pixel types storable in a BMP file.

use std::fmt;
use std::str::FromStr;

use crate::error::BmpError;

/// A pixel type with a fixed on-disk encoding.
///
/// Implemented for `u8` (8-bit indexed grayscale) and [`Bgr`] (24-bit color).
pub trait BmpPixel: Copy + Default + PartialEq + fmt::Debug {
    /// Bits per pixel stored in the info header.
    const BITS_PER_PIXEL: u16;

    /// Bytes one pixel occupies in a row.
    const BYTES_PER_PIXEL: usize = Self::BITS_PER_PIXEL as usize / 8;

    /// Decode one pixel from exactly `BYTES_PER_PIXEL` bytes.
    fn from_bytes(bytes: &[u8]) -> Self;

    /// Append the on-disk bytes of this pixel.
    fn extend_bytes(self, out: &mut Vec<u8>);
}

impl BmpPixel for u8 {
    const BITS_PER_PIXEL: u16 = 8;

    fn from_bytes(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn extend_bytes(self, out: &mut Vec<u8>) {
        out.push(self);
    }
}

/// 24-bit color pixel in on-disk channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bgr {
    /// Blue channel.
    pub blue: u8,
    /// Green channel.
    pub green: u8,
    /// Red channel.
    pub red: u8,
}

impl Bgr {
    /// Create a pixel from blue, green and red values.
    pub const fn new(blue: u8, green: u8, red: u8) -> Self {
        Self { blue, green, red }
    }

    /// Same value on all three channels.
    pub const fn splat(value: u8) -> Self {
        Self::new(value, value, value)
    }

    /// Value of one channel.
    pub fn channel(self, channel: Channel) -> u8 {
        match channel {
            Channel::Blue => self.blue,
            Channel::Green => self.green,
            Channel::Red => self.red,
        }
    }
}

impl BmpPixel for Bgr {
    const BITS_PER_PIXEL: u16 = 24;

    fn from_bytes(bytes: &[u8]) -> Self {
        Bgr::new(bytes[0], bytes[1], bytes[2])
    }

    fn extend_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[self.blue, self.green, self.red]);
    }
}

/// Color channel of a [`Bgr`] pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Red.
    Red,
}

impl Channel {
    /// All channels in on-disk order.
    pub const ALL: [Channel; 3] = [Channel::Blue, Channel::Green, Channel::Red];

    /// Lowercase channel name.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Blue => "blue",
            Channel::Green => "green",
            Channel::Red => "red",
        }
    }
}

/// Color to grayscale reduction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GrayMethod {
    /// Truncated mean of the three channels, `(R + G + B) / 3`.
    ///
    /// Parsed from "hsi" as well as "average". This is a plain average, not
    /// the intensity of a true HSI conversion.
    #[default]
    Average,
    /// Truncated luma, `0.299 R + 0.587 G + 0.114 B`.
    ///
    /// Parsed from "ycc" as well as "luma".
    Luma,
}

impl GrayMethod {
    /// Gray value of one pixel.
    pub fn apply(self, pixel: Bgr) -> u8 {
        match self {
            GrayMethod::Average => {
                let sum = pixel.red as u32 + pixel.green as u32 + pixel.blue as u32;
                (sum / 3) as u8
            }
            GrayMethod::Luma => {
                let luma = 0.299 * pixel.red as f64
                    + 0.587 * pixel.green as f64
                    + 0.114 * pixel.blue as f64;
                luma as u8
            }
        }
    }
}

impl FromStr for GrayMethod {
    type Err = BmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hsi" | "average" => Ok(GrayMethod::Average),
            "ycc" | "luma" => Ok(GrayMethod::Luma),
            _ => Err(BmpError::InvalidArgument(format!(
                "unknown grayscale method '{s}', supported methods are hsi and ycc"
            ))),
        }
    }
}

impl fmt::Display for GrayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrayMethod::Average => write!(f, "hsi"),
            GrayMethod::Luma => write!(f, "ycc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_sizes() {
        assert_eq!(<u8 as BmpPixel>::BYTES_PER_PIXEL, 1);
        assert_eq!(<Bgr as BmpPixel>::BYTES_PER_PIXEL, 3);
    }

    #[test]
    fn test_bgr_byte_order() {
        let mut out = Vec::new();
        Bgr::new(1, 2, 3).extend_bytes(&mut out);
        assert_eq!(out, vec![1, 2, 3]);
        assert_eq!(Bgr::from_bytes(&[9, 8, 7]), Bgr::new(9, 8, 7));
    }

    #[test]
    fn test_gray_pure_red() {
        let red = Bgr::new(0, 0, 255);
        assert_eq!(GrayMethod::Average.apply(red), 85);
        assert_eq!(GrayMethod::Luma.apply(red), 76);
    }

    #[test]
    fn test_gray_average_does_not_overflow() {
        assert_eq!(GrayMethod::Average.apply(Bgr::splat(255)), 255);
        assert_eq!(GrayMethod::Average.apply(Bgr::new(1, 1, 0)), 0);
    }

    #[test]
    fn test_gray_method_parse() {
        assert_eq!("HSI".parse::<GrayMethod>().unwrap(), GrayMethod::Average);
        assert_eq!("average".parse::<GrayMethod>().unwrap(), GrayMethod::Average);
        assert_eq!("ycc".parse::<GrayMethod>().unwrap(), GrayMethod::Luma);
        assert_eq!("Luma".parse::<GrayMethod>().unwrap(), GrayMethod::Luma);

        let err = "rgb".parse::<GrayMethod>().unwrap_err();
        assert!(matches!(err, BmpError::InvalidArgument(ref msg) if msg.contains("rgb")));
    }

    #[test]
    fn test_channel_access() {
        let p = Bgr::new(10, 20, 30);
        let values: Vec<u8> = Channel::ALL.iter().map(|&c| p.channel(c)).collect();
        assert_eq!(values, vec![10, 20, 30]);
        assert_eq!(Channel::Green.name(), "green");
    }
}
