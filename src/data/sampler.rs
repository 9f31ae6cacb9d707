use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Channel read by the samplers.
///
/// `Gray` is the unweighted mean of the available channels, not perceptual
/// luma. Existing fixtures depend on that exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Gray,
    #[serde(alias = "R")]
    R,
    #[serde(alias = "G")]
    G,
    #[serde(alias = "B")]
    B,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Gray, Channel::R, Channel::G, Channel::B];

    fn rgb_index(self) -> Option<usize> {
        match self {
            Channel::Gray => None,
            Channel::R => Some(0),
            Channel::G => Some(1),
            Channel::B => Some(2),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Gray => "gray",
            Channel::R => "R",
            Channel::G => "G",
            Channel::B => "B",
        };
        f.write_str(name)
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gray" | "grey" => Ok(Channel::Gray),
            "r" => Ok(Channel::R),
            "g" => Ok(Channel::G),
            "b" => Ok(Channel::B),
            other => Err(format!("unknown channel '{other}', expected gray, R, G or B")),
        }
    }
}

#[derive(Debug, Clone)]
enum Raster {
    Luma(GrayImage),
    Rgb(RgbImage),
}

/// Immutable decoded image with one or three channels.
///
/// Alpha is discarded at construction time.
#[derive(Debug, Clone)]
pub struct Image {
    raster: Raster,
}

impl Image {
    pub fn from_gray(image: GrayImage) -> Self {
        Self {
            raster: Raster::Luma(image),
        }
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        Self {
            raster: Raster::Rgb(image),
        }
    }

    /// Keep grayscale sources single-channel and convert everything else to RGB.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(gray) => Self::from_gray(gray),
            other if other.color().has_color() => Self::from_rgb(other.to_rgb8()),
            other => Self::from_gray(other.to_luma8()),
        }
    }

    pub fn width(&self) -> u32 {
        match &self.raster {
            Raster::Luma(img) => img.width(),
            Raster::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match &self.raster {
            Raster::Luma(img) => img.height(),
            Raster::Rgb(img) => img.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn channels(&self) -> u8 {
        match &self.raster {
            Raster::Luma(_) => 1,
            Raster::Rgb(_) => 3,
        }
    }

    /// Default circle center: integer half of each dimension.
    pub fn center(&self) -> (f64, f64) {
        ((self.width() / 2) as f64, (self.height() / 2) as f64)
    }

    /// Read one channel at integer coordinates.
    ///
    /// Coordinates outside `[0, width) x [0, height)` read as `0`.
    pub fn get_pixel(&self, x: i64, y: i64, channel: Channel) -> f64 {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return 0.0;
        }
        let (x, y) = (x as u32, y as u32);

        match &self.raster {
            Raster::Luma(img) => img.get_pixel(x, y)[0] as f64,
            Raster::Rgb(img) => {
                let px = img.get_pixel(x, y);
                match channel.rgb_index() {
                    Some(idx) => px[idx] as f64,
                    None => (px[0] as f64 + px[1] as f64 + px[2] as f64) / 3.0,
                }
            }
        }
    }

    /// Raw samples of the pixel at `(x, y)`, one entry per channel.
    pub(crate) fn raw_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        match &self.raster {
            Raster::Luma(img) => {
                let v = img.get_pixel(x, y)[0];
                [v, v, v]
            }
            Raster::Rgb(img) => img.get_pixel(x, y).0,
        }
    }

    /// Build an image of the same channel layout from a per-pixel function.
    pub(crate) fn map_pixels<F>(&self, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        let (width, height) = self.dimensions();
        match &self.raster {
            Raster::Luma(_) => Self::from_gray(GrayImage::from_fn(width, height, |x, y| {
                image::Luma([f(x, y)[0]])
            })),
            Raster::Rgb(_) => Self::from_rgb(RgbImage::from_fn(width, height, |x, y| {
                image::Rgb(f(x, y))
            })),
        }
    }

    /// Encode the image; the format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let result = match &self.raster {
            Raster::Luma(img) => img.save(path),
            Raster::Rgb(img) => img.save(path),
        };
        result.map_err(|source| crate::AlignError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }
}
