#![allow(clippy::must_use_candidate)]

mod image_ref;

pub use image_ref::{ImageRef, ImageRefError};
