//! # imgproc core
//!
//! Core types shared by the imgproc crates:
//! - The error taxonomy every crate converts into
//! - [`Matrix`], a dense 2-D `f64` grid used to move pixel data into and out
//!   of numeric code (filters, transforms)

pub mod error;
pub mod matrix;

pub use error::{Dims, Error, Result};
pub use matrix::Matrix;
