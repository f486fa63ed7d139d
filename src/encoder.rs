//! JPEG compression from packed rasters.

use std::os::raw::c_int;

use tracing::debug;

use crate::constants::{NO_FLAGS, TIGHT_PITCH};
use crate::error::{Result, TurboJpegError};
use crate::handle::{CompressHandle, NativeBuffer};
use crate::raster::{Raster, required_len};
use crate::{PixelFormat, Subsampling, TurboJpeg};

fn native_dimensions(width: u32, height: u32) -> Result<(c_int, c_int)> {
    match (c_int::try_from(width), c_int::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(TurboJpegError::InvalidDimensions {
            width: width.into(),
            height: height.into(),
        }),
    }
}

impl<'lib> CompressHandle<'lib> {
    /// Compresses `pixels` into a buffer the codec allocates.
    ///
    /// The returned buffer, and any buffer the codec allocated before failing,
    /// is released through `tjFree` when dropped.
    fn compress(
        &self,
        pixels: &[u8],
        width: c_int,
        height: c_int,
        pixel_format: PixelFormat,
        quality: i32,
        subsampling: Subsampling,
    ) -> Result<NativeBuffer<'lib>> {
        let mut output = NativeBuffer::empty(self.lib());
        let (jpeg_buf, jpeg_size) = output.out_params();
        let status = unsafe {
            (self.symbols().compress)(
                self.as_raw(),
                pixels.as_ptr(),
                width,
                TIGHT_PITCH,
                height,
                pixel_format.into(),
                jpeg_buf,
                jpeg_size,
                subsampling.into(),
                quality,
                NO_FLAGS,
            )
        };
        if status != 0 {
            return Err(self.error());
        }
        Ok(output)
    }
}

impl TurboJpeg {
    /// Encodes a raster as JPEG.
    ///
    /// `quality` is handed to the codec unchanged; libjpeg-turbo accepts
    /// 0..=100 and reports anything else as a codec error.
    pub fn encode(&self, raster: &Raster, quality: i32, subsampling: Subsampling) -> Result<Vec<u8>> {
        self.encode_raw(
            raster.data(),
            raster.width(),
            raster.height(),
            raster.pixel_format(),
            quality,
            subsampling,
        )
    }

    /// Encodes tightly packed pixels without wrapping them in a [`Raster`].
    ///
    /// `pixels` must be exactly `width * height * bytes_per_pixel` long.
    pub fn encode_raw(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        quality: i32,
        subsampling: Subsampling,
    ) -> Result<Vec<u8>> {
        let expected = required_len(width, height, pixel_format)?;
        if pixels.len() != expected {
            return Err(TurboJpegError::InvalidRaster {
                expected,
                actual: pixels.len(),
            });
        }
        let (native_width, native_height) = native_dimensions(width, height)?;

        let handle = CompressHandle::acquire(self)?;
        let output = handle.compress(
            pixels,
            native_width,
            native_height,
            pixel_format,
            quality,
            subsampling,
        )?;
        let jpeg = output.as_slice().to_vec();

        debug!(
            width,
            height,
            ?pixel_format,
            ?subsampling,
            quality,
            jpeg_bytes = jpeg.len(),
            "encoded JPEG"
        );
        Ok(jpeg)
    }
}
