//! Python bindings for turbojpeg-rs using PyO3.

use pyo3::exceptions::{PyIOError, PyOSError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;
use std::path::PathBuf;
use turbojpeg_rs::{PixelFormat, Subsampling, TurboJpeg, TurboJpegError};

fn to_py_err(err: TurboJpegError) -> PyErr {
    match err {
        TurboJpegError::Codec(message) => PyIOError::new_err(message),
        TurboJpegError::Load { .. } => PyOSError::new_err(err.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn pixel_format(value: i32) -> PyResult<PixelFormat> {
    PixelFormat::try_from(value)
        .map_err(|_| PyValueError::new_err(format!("Unknown pixel format {}", value)))
}

fn subsampling(value: i32) -> PyResult<Subsampling> {
    Subsampling::try_from(value)
        .map_err(|_| PyValueError::new_err(format!("Unknown subsampling {}", value)))
}

/// Wrapper of libjpeg-turbo for decoding and encoding JPEG memory buffers.
#[pyclass(name = "TurboJPEG")]
struct PyTurboJpeg {
    inner: TurboJpeg,
}

#[pymethods]
impl PyTurboJpeg {
    /// Load the TurboJPEG library from `lib_path`, or the platform default.
    #[new]
    #[pyo3(signature = (lib_path=None))]
    fn new(lib_path: Option<PathBuf>) -> PyResult<Self> {
        let inner = match lib_path {
            Some(path) => TurboJpeg::with_library(path),
            None => TurboJpeg::new(),
        }
        .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Decode a JPEG memory buffer.
    ///
    /// Returns:
    ///     (pixels, (height, width, channels))
    #[pyo3(signature = (jpeg_buf, pixel_format=1))]
    fn decode(
        &self,
        py: Python<'_>,
        jpeg_buf: &[u8],
        pixel_format: i32,
    ) -> PyResult<(Py<PyBytes>, (usize, usize, usize))> {
        let format = self::pixel_format(pixel_format)?;
        let raster = py
            .allow_threads(|| self.inner.decode(jpeg_buf, format))
            .map_err(to_py_err)?;
        Ok((PyBytes::new(py, raster.data()).into(), raster.shape()))
    }

    /// Read a JPEG header.
    ///
    /// Returns:
    ///     (width, height, jpeg_subsample, jpeg_colorspace)
    fn decode_header(&self, py: Python<'_>, jpeg_buf: &[u8]) -> PyResult<(u32, u32, i32, i32)> {
        let info = py
            .allow_threads(|| self.inner.decode_header(jpeg_buf))
            .map_err(to_py_err)?;
        Ok((
            info.width,
            info.height,
            info.subsampling.into(),
            info.colorspace.into(),
        ))
    }

    /// Encode tightly packed pixels to a JPEG memory buffer.
    #[pyo3(signature = (pixels, width, height, quality=85, pixel_format=1, jpeg_subsample=1))]
    #[allow(clippy::too_many_arguments)]
    fn encode(
        &self,
        py: Python<'_>,
        pixels: &[u8],
        width: u32,
        height: u32,
        quality: i32,
        pixel_format: i32,
        jpeg_subsample: i32,
    ) -> PyResult<Py<PyBytes>> {
        let format = self::pixel_format(pixel_format)?;
        let sampling = subsampling(jpeg_subsample)?;
        let jpeg = py
            .allow_threads(|| {
                self.inner
                    .encode_raw(pixels, width, height, format, quality, sampling)
            })
            .map_err(to_py_err)?;
        Ok(PyBytes::new(py, &jpeg).into())
    }

    fn __repr__(&self) -> String {
        format!("TurboJPEG(lib_path={:?})", self.inner.library_path())
    }
}

/// turbojpeg Python module.
#[pymodule]
fn turbojpeg(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyTurboJpeg>()?;

    for (name, format) in [
        ("TJPF_RGB", PixelFormat::Rgb),
        ("TJPF_BGR", PixelFormat::Bgr),
        ("TJPF_RGBX", PixelFormat::Rgbx),
        ("TJPF_BGRX", PixelFormat::Bgrx),
        ("TJPF_XBGR", PixelFormat::Xbgr),
        ("TJPF_XRGB", PixelFormat::Xrgb),
        ("TJPF_GRAY", PixelFormat::Gray),
        ("TJPF_RGBA", PixelFormat::Rgba),
        ("TJPF_BGRA", PixelFormat::Bgra),
        ("TJPF_ABGR", PixelFormat::Abgr),
        ("TJPF_ARGB", PixelFormat::Argb),
        ("TJPF_CMYK", PixelFormat::Cmyk),
    ] {
        m.add(name, i32::from(format))?;
    }

    for (name, sampling) in [
        ("TJSAMP_444", Subsampling::S444),
        ("TJSAMP_422", Subsampling::S422),
        ("TJSAMP_420", Subsampling::S420),
        ("TJSAMP_GRAY", Subsampling::Gray),
        ("TJSAMP_440", Subsampling::S440),
        ("TJSAMP_411", Subsampling::S411),
        ("TJSAMP_441", Subsampling::S441),
        ("TJSAMP_UNKNOWN", Subsampling::Unknown),
    ] {
        m.add(name, i32::from(sampling))?;
    }

    Ok(())
}
