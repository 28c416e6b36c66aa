//! Color to grayscale conversion command.

use anyhow::Context;
use clap::Args;
use imgproc_bmp::{DynamicBitmap, GrayMethod};
use std::path::PathBuf;
use tracing::{info, warn};

/// Convert a color image to 8-bit grayscale.
#[derive(Args, Debug)]
pub struct CmdGray {
    /// Input BMP file.
    pub input: PathBuf,

    /// Output BMP file.
    pub output: PathBuf,

    /// Reduction method: hsi (channel average) or ycc (luma).
    #[arg(long, default_value = "hsi")]
    pub method: GrayMethod,
}

impl CmdGray {
    /// Execute the gray command.
    pub fn run(&self) -> anyhow::Result<()> {
        let image = DynamicBitmap::open(&self.input)
            .with_context(|| format!("Failed to read {}", self.input.display()))?;

        let gray = match image {
            DynamicBitmap::Gray(gray) => {
                warn!(input = %self.input.display(), "input is already grayscale");
                gray
            }
            DynamicBitmap::Color(color) => color.to_gray(self.method),
        };

        gray.save(&self.output)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        info!(
            method = %self.method,
            output = %self.output.display(),
            "wrote {}x{} grayscale image",
            gray.width(),
            gray.height()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgproc_bmp::{Bgr, GrayImage, RgbImage};

    #[test]
    fn test_gray_luma() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("color.bmp");
        let output = dir.path().join("out").join("gray.bmp");

        let mut image = RgbImage::new(1, 2);
        image[(0, 0)] = Bgr::new(0, 0, 255);
        image.save(&input).unwrap();

        let cmd = CmdGray {
            input,
            output: output.clone(),
            method: GrayMethod::Luma,
        };
        cmd.run().unwrap();

        let gray = GrayImage::open(&output).unwrap();
        assert_eq!(gray.pixels(), &[76, 0]);
    }

    #[test]
    fn test_gray_input_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("gray.bmp");
        let output = dir.path().join("copy.bmp");
        GrayImage::from_pixels(1, 3, vec![1, 2, 3]).unwrap().save(&input).unwrap();

        let cmd = CmdGray {
            input,
            output: output.clone(),
            method: GrayMethod::Average,
        };
        cmd.run().unwrap();
        assert_eq!(GrayImage::open(&output).unwrap().pixels(), &[1, 2, 3]);
    }
}
