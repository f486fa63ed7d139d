//! C signatures of the TurboJPEG entry points and the table they are
//! resolved into.
//!
//! Only the classic (libjpeg-turbo 1.4+) API is used, so both 2.x and 3.x
//! builds of the library work.

use std::os::raw::{c_char, c_int, c_uchar, c_ulong, c_void};

use libloading::Library;

use crate::constants::*;

/// Opaque `tjhandle`.
pub type TjHandle = *mut c_void;

pub type InitFn = unsafe extern "C" fn() -> TjHandle;
pub type DestroyFn = unsafe extern "C" fn(handle: TjHandle) -> c_int;

pub type DecompressHeaderFn = unsafe extern "C" fn(
    handle: TjHandle,
    jpeg_buf: *const c_uchar,
    jpeg_size: c_ulong,
    width: *mut c_int,
    height: *mut c_int,
    jpeg_subsamp: *mut c_int,
    jpeg_colorspace: *mut c_int,
) -> c_int;

pub type DecompressFn = unsafe extern "C" fn(
    handle: TjHandle,
    jpeg_buf: *const c_uchar,
    jpeg_size: c_ulong,
    dst_buf: *mut c_uchar,
    width: c_int,
    pitch: c_int,
    height: c_int,
    pixel_format: c_int,
    flags: c_int,
) -> c_int;

pub type CompressFn = unsafe extern "C" fn(
    handle: TjHandle,
    src_buf: *const c_uchar,
    width: c_int,
    pitch: c_int,
    height: c_int,
    pixel_format: c_int,
    jpeg_buf: *mut *mut c_uchar,
    jpeg_size: *mut c_ulong,
    jpeg_subsamp: c_int,
    jpeg_qual: c_int,
    flags: c_int,
) -> c_int;

pub type FreeFn = unsafe extern "C" fn(buffer: *mut c_uchar);
pub type GetErrorStrFn = unsafe extern "C" fn() -> *mut c_char;
pub type GetErrorStr2Fn = unsafe extern "C" fn(handle: TjHandle) -> *mut c_char;

/// Typed function pointers resolved from one loaded library.
///
/// The pointers are only valid while the `Library` they came from stays
/// loaded; `TurboJpeg` owns both together.
#[derive(Clone, Copy)]
pub struct Symbols {
    pub init_decompress: InitFn,
    pub init_compress: InitFn,
    pub destroy: DestroyFn,
    pub decompress_header: DecompressHeaderFn,
    pub decompress: DecompressFn,
    pub compress: CompressFn,
    pub free: FreeFn,
    pub get_error_str: GetErrorStrFn,
    pub get_error_str2: Option<GetErrorStr2Fn>,
}

impl Symbols {
    /// Resolves every entry point from `library`.
    ///
    /// # Safety
    /// `library` must be a TurboJPEG build whose exports match the signatures
    /// declared in this module.
    pub unsafe fn resolve(library: &Library) -> Result<Self, libloading::Error> {
        unsafe {
            Ok(Self {
                init_decompress: *library.get::<InitFn>(SYM_INIT_DECOMPRESS)?,
                init_compress: *library.get::<InitFn>(SYM_INIT_COMPRESS)?,
                destroy: *library.get::<DestroyFn>(SYM_DESTROY)?,
                decompress_header: *library.get::<DecompressHeaderFn>(SYM_DECOMPRESS_HEADER)?,
                decompress: *library.get::<DecompressFn>(SYM_DECOMPRESS)?,
                compress: *library.get::<CompressFn>(SYM_COMPRESS)?,
                free: *library.get::<FreeFn>(SYM_FREE)?,
                get_error_str: *library.get::<GetErrorStrFn>(SYM_GET_ERROR_STR)?,
                get_error_str2: library
                    .get::<GetErrorStr2Fn>(SYM_GET_ERROR_STR2)
                    .ok()
                    .map(|symbol| *symbol),
            })
        }
    }
}
