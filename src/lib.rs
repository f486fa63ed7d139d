//! Run-time binding to the libjpeg-turbo TurboJPEG API.
//!
//! The shared library is loaded with `libloading` when a [`TurboJpeg`] is
//! constructed; every entry point the crate needs is resolved once and kept
//! in that instance. All pixel work happens inside the native codec, this
//! crate only marshals buffers and translates status codes.
//!
//! ```no_run
//! use turbojpeg_rs::{PixelFormat, Subsampling, TurboJpeg};
//!
//! let tj = TurboJpeg::new()?;
//! let jpeg = std::fs::read("input.jpg")?;
//! let raster = tj.decode(&jpeg, PixelFormat::Bgr)?;
//! let (height, width, channels) = raster.shape();
//! println!("{width}x{height}, {channels} channels");
//! let encoded = tj.encode(&raster, 85, Subsampling::S422)?;
//! std::fs::write("output.jpg", encoded)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Each decode or encode call creates its own codec handle and destroys it
//! before returning, on success and on failure. A `TurboJpeg` can be shared
//! between threads; handles never are.

pub mod constants;
mod decoder;
mod encoder;
pub mod error;
mod ffi;
mod handle;
pub mod library;
pub mod raster;

#[cfg(test)]
mod mock;

pub use error::{Result, TurboJpegError};
pub use library::TurboJpeg;
pub use raster::Raster;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Pixel layout of a raster, using the TJPF_* values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum PixelFormat {
    Rgb = 0,
    #[default]
    Bgr = 1,
    Rgbx = 2,
    Bgrx = 3,
    Xbgr = 4,
    Xrgb = 5,
    Gray = 6,
    Rgba = 7,
    Bgra = 8,
    Abgr = 9,
    Argb = 10,
    Cmyk = 11,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 12] = [
        Self::Rgb,
        Self::Bgr,
        Self::Rgbx,
        Self::Bgrx,
        Self::Xbgr,
        Self::Xrgb,
        Self::Gray,
        Self::Rgba,
        Self::Bgra,
        Self::Abgr,
        Self::Argb,
        Self::Cmyk,
    ];

    pub fn bytes_per_pixel(self) -> usize {
        constants::PIXEL_SIZE[self as usize]
    }
}

/// Chrominance subsampling, using the TJSAMP_* values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum Subsampling {
    /// Sampling factors with no TJSAMP_* equivalent. libjpeg-turbo 3.0 and
    /// later report these from header parsing instead of failing; they
    /// cannot be decoded to YUV planes or used for compression.
    Unknown = -1,
    /// 4:4:4, no chroma subsampling.
    S444 = 0,
    /// 4:2:2, chroma halved horizontally.
    #[default]
    S422 = 1,
    /// 4:2:0, chroma halved in both directions.
    S420 = 2,
    /// Luminance only.
    Gray = 3,
    /// 4:4:0, chroma halved vertically.
    S440 = 4,
    /// 4:1:1, chroma quartered horizontally. Reported by libjpeg-turbo 2.1 and later.
    S411 = 5,
    /// 4:4:1, chroma quartered vertically. Reported by libjpeg-turbo 3.0 and later.
    S441 = 6,
}

/// JPEG colorspace reported by header parsing, using the TJCS_* values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum Colorspace {
    Rgb = 0,
    YCbCr = 1,
    Gray = 2,
    Cmyk = 3,
    Ycck = 4,
}

/// Image properties read from a JPEG header without decompressing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderInfo {
    pub width: u32,
    pub height: u32,
    pub subsampling: Subsampling,
    pub colorspace: Colorspace,
}
