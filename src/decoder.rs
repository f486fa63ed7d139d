//! JPEG header parsing and decompression.

use std::os::raw::{c_int, c_ulong};

use tracing::debug;

use crate::constants::{NO_FLAGS, TIGHT_PITCH};
use crate::error::{Result, TurboJpegError};
use crate::handle::DecompressHandle;
use crate::raster::{Raster, required_len};
use crate::{Colorspace, HeaderInfo, PixelFormat, Subsampling, TurboJpeg};

/// Header fields exactly as `tjDecompressHeader3` reports them.
#[derive(Debug, Clone, Copy)]
struct RawHeader {
    width: c_int,
    height: c_int,
    subsampling: c_int,
    colorspace: c_int,
}

impl RawHeader {
    fn dimensions(&self) -> Result<(u32, u32)> {
        match (u32::try_from(self.width), u32::try_from(self.height)) {
            (Ok(width), Ok(height)) => Ok((width, height)),
            _ => Err(TurboJpegError::InvalidDimensions {
                width: self.width.into(),
                height: self.height.into(),
            }),
        }
    }

    fn into_info(self) -> Result<HeaderInfo> {
        let (width, height) = self.dimensions()?;
        let subsampling = Subsampling::try_from(self.subsampling).map_err(|_| {
            TurboJpegError::UnknownEnumValue {
                kind: "subsampling",
                value: self.subsampling,
            }
        })?;
        let colorspace = Colorspace::try_from(self.colorspace).map_err(|_| {
            TurboJpegError::UnknownEnumValue {
                kind: "colorspace",
                value: self.colorspace,
            }
        })?;
        Ok(HeaderInfo {
            width,
            height,
            subsampling,
            colorspace,
        })
    }
}

fn native_len(jpeg: &[u8]) -> Result<c_ulong> {
    c_ulong::try_from(jpeg.len()).map_err(|_| TurboJpegError::InputTooLarge(jpeg.len()))
}

impl DecompressHandle<'_> {
    fn read_header(&self, jpeg: &[u8]) -> Result<RawHeader> {
        let jpeg_size = native_len(jpeg)?;
        let mut header = RawHeader {
            width: 0,
            height: 0,
            subsampling: 0,
            colorspace: 0,
        };
        let status = unsafe {
            (self.symbols().decompress_header)(
                self.as_raw(),
                jpeg.as_ptr(),
                jpeg_size,
                &mut header.width,
                &mut header.height,
                &mut header.subsampling,
                &mut header.colorspace,
            )
        };
        if status != 0 {
            return Err(self.error());
        }
        Ok(header)
    }

    /// Decompresses into `dst`, which must hold exactly `width * height * bytes_per_pixel`.
    fn decompress(
        &self,
        jpeg: &[u8],
        dst: &mut [u8],
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
    ) -> Result<()> {
        debug_assert_eq!(
            dst.len(),
            width as usize * height as usize * pixel_format.bytes_per_pixel()
        );
        let jpeg_size = native_len(jpeg)?;
        // Both came from a c_int header field.
        let (width, height) = (width as c_int, height as c_int);
        let status = unsafe {
            (self.symbols().decompress)(
                self.as_raw(),
                jpeg.as_ptr(),
                jpeg_size,
                dst.as_mut_ptr(),
                width,
                TIGHT_PITCH,
                height,
                pixel_format.into(),
                NO_FLAGS,
            )
        };
        if status != 0 {
            return Err(self.error());
        }
        Ok(())
    }
}

impl TurboJpeg {
    /// Reads width, height, subsampling and colorspace without decompressing.
    pub fn decode_header(&self, jpeg: &[u8]) -> Result<HeaderInfo> {
        let handle = DecompressHandle::acquire(self)?;
        handle.read_header(jpeg)?.into_info()
    }

    /// Decodes a JPEG stream into a newly allocated raster of `pixel_format`.
    ///
    /// On failure no buffer is returned, partially written or otherwise.
    pub fn decode(&self, jpeg: &[u8], pixel_format: PixelFormat) -> Result<Raster> {
        let handle = DecompressHandle::acquire(self)?;
        let (width, height) = handle.read_header(jpeg)?.dimensions()?;

        let mut data = vec![0u8; required_len(width, height, pixel_format)?];
        handle.decompress(jpeg, &mut data, width, height, pixel_format)?;

        debug!(
            width,
            height,
            ?pixel_format,
            jpeg_bytes = jpeg.len(),
            "decoded JPEG"
        );
        Raster::new(width, height, pixel_format, data)
    }

    /// Decodes into a caller-provided buffer and returns `(width, height)`.
    ///
    /// `dst` must be exactly `width * height * bytes_per_pixel` long; use
    /// [`TurboJpeg::decode_header`] to size it.
    pub fn decode_into(
        &self,
        jpeg: &[u8],
        pixel_format: PixelFormat,
        dst: &mut [u8],
    ) -> Result<(u32, u32)> {
        let handle = DecompressHandle::acquire(self)?;
        let (width, height) = handle.read_header(jpeg)?.dimensions()?;

        let expected = required_len(width, height, pixel_format)?;
        if dst.len() != expected {
            return Err(TurboJpegError::BufferSize {
                expected,
                actual: dst.len(),
            });
        }
        handle.decompress(jpeg, dst, width, height, pixel_format)?;

        debug!(width, height, ?pixel_format, "decoded JPEG into caller buffer");
        Ok((width, height))
    }
}
