//! Minimal plotting surface for image previews.
//!
//! [`Plotter`] is the three-call subset of a plotting API the preview
//! helpers need. [`Figure`] records those calls and rasterizes the image to
//! a PNG with the `image` crate; float pixels are clipped to `[0, 1]`.

use crate::error::{Result, VitError};
use image::{Rgb, RgbImage};
use ndarray::{Array3, ArrayView3};
use std::path::Path;

/// Receives an image to display, its title and the axis visibility.
pub trait Plotter {
    /// Shows an image laid out as `[height, width, channels]`.
    fn imshow(&mut self, image: ArrayView3<'_, f32>) -> Result<()>;

    fn title(&mut self, title: &str);

    fn axis(&mut self, visible: bool);
}

/// A single-image figure.
#[derive(Debug, Clone)]
pub struct Figure {
    image: Option<Array3<f32>>,
    title: Option<String>,
    axis_visible: bool,
}

impl Default for Figure {
    fn default() -> Self {
        Self {
            image: None,
            title: None,
            axis_visible: true,
        }
    }
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&Array3<f32>> {
        self.image.as_ref()
    }

    pub fn get_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn axis_visible(&self) -> bool {
        self.axis_visible
    }

    /// Rasterizes the figure. Visible axes are drawn as a one-pixel black
    /// frame. Returns `None` before [`imshow`](Plotter::imshow).
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        let image = self.image.as_ref()?;
        let (height, width, channels) = image.dim();
        let frame = self.axis_visible;

        Some(RgbImage::from_fn(width as u32, height as u32, |x, y| {
            let (x, y) = (x as usize, y as usize);
            if frame && (x == 0 || y == 0 || x + 1 == width || y + 1 == height) {
                return Rgb([0, 0, 0]);
            }
            let px = |c: usize| to_u8(image[[y, x, c.min(channels - 1)]]);
            if channels == 1 {
                let v = px(0);
                Rgb([v, v, v])
            } else {
                Rgb([px(0), px(1), px(2)])
            }
        }))
    }

    /// Writes the figure as a PNG (format chosen from the extension).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let rendered = self.to_rgb_image().ok_or(VitError::EmptyFigure)?;
        rendered.save(path.as_ref())?;
        log::info!(
            "figure '{}' written to {}",
            self.title.as_deref().unwrap_or(""),
            path.as_ref().display()
        );
        Ok(())
    }
}

impl Plotter for Figure {
    /// Accepts 1 (grayscale), 3 (RGB) or 4 (RGBA, alpha ignored) channels.
    fn imshow(&mut self, image: ArrayView3<'_, f32>) -> Result<()> {
        let (height, width, channels) = image.dim();
        if !matches!(channels, 1 | 3 | 4) || height == 0 || width == 0 {
            return Err(VitError::ShapeMismatch {
                expected: vec![height, width, 3],
                actual: image.shape().to_vec(),
            });
        }
        self.image = Some(image.to_owned());
        Ok(())
    }

    fn title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn axis(&mut self, visible: bool) {
        self.axis_visible = visible;
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
