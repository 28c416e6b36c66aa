//! BMP header inspection command.

use anyhow::Context;
use clap::Args;
use console::style;
use imgproc_bmp::{BmpDecoder, FileHeader, InfoHeader};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Image information for display.
#[derive(Debug, Clone, Serialize)]
pub struct BmpInfo {
    /// File path.
    pub file: String,
    /// File size on disk in bytes.
    pub size_bytes: u64,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Bits per pixel.
    pub bits_per_pixel: u16,
    /// Whether rows are stored top row first.
    pub top_down: bool,
    /// Raw file header.
    pub file_header: FileHeader,
    /// Raw info header.
    pub info_header: InfoHeader,
}

/// Inspect a BMP file.
#[derive(Args, Debug)]
pub struct CmdInfo {
    /// Path to the BMP file.
    pub file: PathBuf,

    /// Output in JSON format.
    #[arg(long)]
    pub json: bool,
}

impl CmdInfo {
    /// Execute the info command.
    pub fn run(&self) -> anyhow::Result<()> {
        let info = self.analyze()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            print_bmp_info(&info);
        }

        Ok(())
    }

    fn analyze(&self) -> anyhow::Result<BmpInfo> {
        let file = File::open(&self.file)
            .with_context(|| format!("File not found: {}", self.file.display()))?;
        let size_bytes = file.metadata()?.len();

        let mut reader = BufReader::new(file);
        let (file_header, info_header) = BmpDecoder::new()
            .read_headers(&mut reader)
            .with_context(|| format!("Failed to read headers of {}", self.file.display()))?;

        Ok(BmpInfo {
            file: self.file.display().to_string(),
            size_bytes,
            width: info_header.width.unsigned_abs(),
            height: info_header.height.unsigned_abs(),
            bits_per_pixel: info_header.bit_count,
            top_down: info_header.is_top_down(),
            file_header,
            info_header,
        })
    }
}

fn print_bmp_info(info: &BmpInfo) {
    println!();
    println!("{}", style("Image Information").cyan().bold());
    println!();

    println!("  {:<16} {}", style("File:").white(), info.file);
    println!("  {:<16} {}", style("Size:").white(), format_size(info.size_bytes));
    println!(
        "  {:<16} {}x{}",
        style("Resolution:").white(),
        info.width,
        info.height
    );
    println!(
        "  {:<16} {} ({})",
        style("Depth:").white(),
        info.bits_per_pixel,
        if info.bits_per_pixel == 8 { "grayscale" } else { "color" }
    );
    println!(
        "  {:<16} {}",
        style("Row order:").white(),
        if info.top_down { "top-down" } else { "bottom-up" }
    );

    let file = &info.file_header;
    println!();
    println!("{}", style("File header:").cyan().bold());
    println!("    {:<18} {}", style("File size:").dim(), file.file_size);
    println!("    {:<18} {}", style("Pixel offset:").dim(), file.pixel_offset);
    println!(
        "    {:<18} {}, {}",
        style("Reserved:").dim(),
        file.reserved1,
        file.reserved2
    );

    let header = &info.info_header;
    println!();
    println!("{}", style("Info header:").cyan().bold());
    println!("    {:<18} {}", style("Header size:").dim(), header.header_size);
    println!("    {:<18} {}", style("Planes:").dim(), header.planes);
    println!("    {:<18} {}", style("Compression:").dim(), header.compression);
    println!("    {:<18} {}", style("Image size:").dim(), header.image_size);
    println!(
        "    {:<18} {}x{}",
        style("Pixels/meter:").dim(),
        header.x_pixels_per_meter,
        header.y_pixels_per_meter
    );
    println!("    {:<18} {}", style("Colors used:").dim(), header.colors_used);
    println!(
        "    {:<18} {}",
        style("Colors important:").dim(),
        header.colors_important
    );

    println!();
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
