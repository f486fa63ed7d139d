//! Loading the shared library and owning its function table.

use std::ffi::CStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::ptr;

use libloading::Library;
use tracing::debug;

use crate::constants::DEFAULT_LIB_PATH;
use crate::error::{Result, TurboJpegError};
use crate::ffi::{Symbols, TjHandle};

/// A loaded TurboJPEG library.
///
/// Entry points are resolved once at construction. The instance is immutable
/// afterwards and is `Send + Sync`; every decode or encode call acquires and
/// releases its own codec handle.
pub struct TurboJpeg {
    symbols: Symbols,
    path: PathBuf,
    // Keeps the pointers in `symbols` valid. `None` only for in-process tables.
    _library: Option<Library>,
}

impl TurboJpeg {
    /// Loads the library from the platform default path.
    pub fn new() -> Result<Self> {
        Self::with_library(DEFAULT_LIB_PATH)
    }

    /// Loads the library from an explicit path.
    pub fn with_library(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // SAFETY: libjpeg-turbo has no load-time initialisers beyond its own
        // static state; the symbols are checked against the declared ABI below.
        let library = unsafe { Library::new(&path) }.map_err(|source| TurboJpegError::Load {
            path: path.clone(),
            source,
        })?;
        let symbols = unsafe { Symbols::resolve(&library) }.map_err(|source| {
            TurboJpegError::Load {
                path: path.clone(),
                source,
            }
        })?;

        debug!(
            path = %path.display(),
            per_handle_errors = symbols.get_error_str2.is_some(),
            "loaded TurboJPEG library"
        );

        Ok(Self {
            symbols,
            path,
            _library: Some(library),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_symbols(symbols: Symbols) -> Self {
        Self {
            symbols,
            path: PathBuf::from("<in-process>"),
            _library: None,
        }
    }

    /// Path the library was loaded from.
    pub fn library_path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    /// Error string for `handle`, or the library's global error string when
    /// the handle is null or the per-handle accessor is unavailable.
    pub(crate) fn error_message(&self, handle: TjHandle) -> String {
        let raw = unsafe {
            match self.symbols.get_error_str2 {
                Some(get_error_str2) if !handle.is_null() => get_error_str2(handle),
                _ => (self.symbols.get_error_str)(),
            }
        };
        if raw.is_null() {
            return "Unknown TurboJPEG error".to_string();
        }
        // SAFETY: the library returns a NUL-terminated string it owns; it is
        // copied before any further call can overwrite it.
        unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
    }

    pub(crate) fn codec_error(&self, handle: TjHandle) -> TurboJpegError {
        TurboJpegError::Codec(self.error_message(handle))
    }

    pub(crate) fn global_error(&self) -> TurboJpegError {
        self.codec_error(ptr::null_mut())
    }
}

impl fmt::Debug for TurboJpeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurboJpeg")
            .field("path", &self.path)
            .field("per_handle_errors", &self.symbols.get_error_str2.is_some())
            .finish()
    }
}
