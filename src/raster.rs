//! Owned pixel buffers with a known shape.

use crate::PixelFormat;
use crate::error::{Result, TurboJpegError};

/// Number of bytes a tightly packed `width` x `height` image needs in
/// `pixel_format`.
pub fn required_len(width: u32, height: u32, pixel_format: PixelFormat) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(pixel_format.bytes_per_pixel()))
        .ok_or(TurboJpegError::InvalidDimensions {
            width: width.into(),
            height: height.into(),
        })
}

/// Decoded image: rows of `width` pixels, `height` rows, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    data: Vec<u8>,
}

impl Raster {
    /// Wraps `data`, which must be exactly `width * height * bytes_per_pixel` long.
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let expected = required_len(width, height, pixel_format)?;
        if data.len() != expected {
            return Err(TurboJpegError::InvalidRaster {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixel_format,
            data,
        })
    }

    pub fn zeroed(width: u32, height: u32, pixel_format: PixelFormat) -> Result<Self> {
        let len = required_len(width, height, pixel_format)?;
        Self::new(width, height, pixel_format, vec![0u8; len])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn channels(&self) -> usize {
        self.pixel_format.bytes_per_pixel()
    }

    /// `(height, width, channels)`, row-major.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, self.channels())
    }

    /// Bytes in one row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Channel values of the pixel at (`x`, `y`), or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = y as usize * self.stride() + x as usize * self.channels();
        self.data.get(start..start + self.channels())
    }
}
