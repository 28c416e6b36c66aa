//! Channel split command.

use anyhow::Context;
use clap::Args;
use imgproc_bmp::{Channel, DynamicBitmap};
use std::path::PathBuf;
use tracing::info;

/// Write each color channel as its own grayscale image.
///
/// Files are named `<stem>_blue.bmp`, `<stem>_green.bmp` and `<stem>_red.bmp`.
#[derive(Args, Debug)]
pub struct CmdSplit {
    /// Input BMP file.
    pub input: PathBuf,

    /// Output directory, created if missing.
    pub out_dir: PathBuf,
}

impl CmdSplit {
    /// Execute the split command.
    pub fn run(&self) -> anyhow::Result<()> {
        let image = DynamicBitmap::open(&self.input)
            .with_context(|| format!("Failed to read {}", self.input.display()))?
            .to_rgb();

        let stem = self
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");

        for channel in Channel::ALL {
            let path = self.out_dir.join(format!("{}_{}.bmp", stem, channel.name()));
            image
                .channel(channel)
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(channel = channel.name(), output = %path.display(), "wrote channel");
        }

        Ok(())
    }
}
