//! Shape outline command.

use anyhow::Context;
use clap::{ArgGroup, Args};
use imgproc_bmp::{Bgr, DynamicBitmap};
use imgproc_draw::{OutlineRenderer, Shape};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Draw a rectangle or circle outline onto an image.
///
/// Gray input is promoted to color before drawing.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("shape").required(true).args(["rect", "circle"])))]
pub struct CmdOutline {
    /// Input BMP file.
    pub input: PathBuf,

    /// Output BMP file.
    pub output: PathBuf,

    /// Hollow rectangle as TOP,LEFT,HEIGHT,WIDTH.
    #[arg(long, value_parser = parse_rect)]
    pub rect: Option<Shape>,

    /// Ring as ROW,COL,RADIUS; the center may lie outside the image.
    #[arg(long, value_parser = parse_circle, allow_hyphen_values = true)]
    pub circle: Option<Shape>,

    /// Line color as B,G,R.
    #[arg(long, value_parser = parse_color, default_value = "0,0,0")]
    pub color: Bgr,

    /// Line thickness in pixels.
    #[arg(long, default_value_t = 1)]
    pub thickness: u32,
}

impl CmdOutline {
    /// Execute the outline command.
    pub fn run(&self) -> anyhow::Result<()> {
        let shape = self
            .rect
            .or(self.circle)
            .context("Either --rect or --circle is required")?;

        let image = DynamicBitmap::open(&self.input)
            .with_context(|| format!("Failed to read {}", self.input.display()))?;
        let renderer = match &image {
            DynamicBitmap::Gray(gray) => OutlineRenderer::from_gray(gray),
            DynamicBitmap::Color(color) => OutlineRenderer::new(color.clone()),
        };

        let mut renderer = renderer.color(self.color).thickness(self.thickness);
        renderer
            .render(&shape)
            .with_context(|| format!("Cannot draw {:?}", shape))?;

        renderer
            .into_image()
            .save(&self.output)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        info!(output = %self.output.display(), "wrote outlined image");
        Ok(())
    }
}

/// Split a comma-separated list of exactly `N` values.
fn parse_list<T: FromStr, const N: usize>(s: &str) -> Result<[T; N], String> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<T>()
                .map_err(|_| format!("invalid value '{}'", part.trim()))
        })
        .collect::<Result<Vec<T>, String>>()?;
    let found = values.len();
    values
        .try_into()
        .map_err(|_| format!("expected {N} comma-separated values, found {found}"))
}

fn parse_rect(s: &str) -> Result<Shape, String> {
    let [top, left, height, width] = parse_list::<usize, 4>(s)?;
    Ok(Shape::Rectangle {
        top,
        left,
        height,
        width,
    })
}

fn parse_circle(s: &str) -> Result<Shape, String> {
    let [row, col, radius] = parse_list::<i64, 3>(s)?;
    let radius = u32::try_from(radius).map_err(|_| format!("invalid radius {radius}"))?;
    Ok(Shape::Circle {
        center_row: row,
        center_col: col,
        radius,
    })
}

fn parse_color(s: &str) -> Result<Bgr, String> {
    let [blue, green, red] = parse_list::<u8, 3>(s)?;
    Ok(Bgr::new(blue, green, red))
}
