//! Scoped codec handles and native output buffers.
//!
//! A handle is created at the start of one decode or encode call and
//! destroyed when it goes out of scope, whichever way the call exits.
//! Decompression and compression handles are distinct types, so the native
//! entry points can only ever receive the kind they expect.

use std::marker::PhantomData;
use std::os::raw::{c_uchar, c_ulong, c_void};
use std::ptr::{self, NonNull};
use std::slice;

use tracing::{trace, warn};

use crate::TurboJpeg;
use crate::error::Result;
use crate::ffi::{InitFn, Symbols, TjHandle};

pub(crate) trait HandleKind {
    const NAME: &'static str;
    fn init(symbols: &Symbols) -> InitFn;
}

pub(crate) enum Decompress {}
pub(crate) enum Compress {}

impl HandleKind for Decompress {
    const NAME: &'static str = "decompress";
    fn init(symbols: &Symbols) -> InitFn {
        symbols.init_decompress
    }
}

impl HandleKind for Compress {
    const NAME: &'static str = "compress";
    fn init(symbols: &Symbols) -> InitFn {
        symbols.init_compress
    }
}

/// Owned `tjhandle`. Not `Send`: a handle never leaves the call that made it.
pub(crate) struct Handle<'lib, K: HandleKind> {
    raw: NonNull<c_void>,
    lib: &'lib TurboJpeg,
    _kind: PhantomData<K>,
}

pub(crate) type DecompressHandle<'lib> = Handle<'lib, Decompress>;
pub(crate) type CompressHandle<'lib> = Handle<'lib, Compress>;

impl<'lib, K: HandleKind> Handle<'lib, K> {
    pub(crate) fn acquire(lib: &'lib TurboJpeg) -> Result<Self> {
        let raw = unsafe { (K::init(lib.symbols()))() };
        match NonNull::new(raw) {
            Some(raw) => {
                trace!(kind = K::NAME, "created codec handle");
                Ok(Self {
                    raw,
                    lib,
                    _kind: PhantomData,
                })
            }
            // No handle to ask, so the global error string describes the failure.
            None => Err(lib.global_error()),
        }
    }

    pub(crate) fn as_raw(&self) -> TjHandle {
        self.raw.as_ptr()
    }

    pub(crate) fn lib(&self) -> &'lib TurboJpeg {
        self.lib
    }

    pub(crate) fn symbols(&self) -> &'lib Symbols {
        self.lib.symbols()
    }

    /// Codec error carrying the message recorded against this handle.
    pub(crate) fn error(&self) -> crate::TurboJpegError {
        self.lib.codec_error(self.as_raw())
    }
}

impl<K: HandleKind> Drop for Handle<'_, K> {
    fn drop(&mut self) {
        let status = unsafe { (self.lib.symbols().destroy)(self.as_raw()) };
        if status != 0 {
            warn!(
                kind = K::NAME,
                error = %self.lib.error_message(ptr::null_mut()),
                "tjDestroy failed"
            );
        } else {
            trace!(kind = K::NAME, "destroyed codec handle");
        }
    }
}

/// Buffer allocated by the codec during compression.
///
/// Released with `tjFree` on drop; the codec's allocator is never mixed with
/// Rust's.
pub(crate) struct NativeBuffer<'lib> {
    ptr: *mut c_uchar,
    len: c_ulong,
    lib: &'lib TurboJpeg,
}

impl<'lib> NativeBuffer<'lib> {
    /// Empty slot for the codec to allocate into.
    pub(crate) fn empty(lib: &'lib TurboJpeg) -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
            lib,
        }
    }

    /// Out-parameters for `tjCompress2`.
    pub(crate) fn out_params(&mut self) -> (*mut *mut c_uchar, *mut c_ulong) {
        (&raw mut self.ptr, &raw mut self.len)
    }

    pub(crate) fn len(&self) -> usize {
        if self.ptr.is_null() {
            0
        } else {
            // c_ulong is never wider than usize on the targets libjpeg-turbo ships for.
            self.len as usize
        }
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        if self.ptr.is_null() {
            return &[];
        }
        // SAFETY: the codec reported `len` initialised bytes at `ptr`, which
        // stay alive until `tjFree` in `drop`.
        unsafe { slice::from_raw_parts(self.ptr, self.len()) }
    }
}

impl Drop for NativeBuffer<'_> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe { (self.lib.symbols().free)(self.ptr) };
            trace!(bytes = self.len(), "freed native buffer");
        }
    }
}
