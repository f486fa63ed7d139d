//! In-process stand-in for the TurboJPEG function table.
//!
//! Implements the C signatures in Rust so the session logic can be tested
//! without the shared library. Streams use a small private layout:
//! `MOCK`, width and height as u16 LE, subsampling, colorspace and pixel
//! format bytes, then tightly packed pixels. Counters are per thread.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_uchar, c_ulong};
use std::ptr;
use std::slice;

use crate::ffi::{GetErrorStr2Fn, Symbols, TjHandle};
use crate::{Colorspace, PixelFormat, Subsampling, TurboJpeg};

pub const MAGIC: &[u8] = b"MOCK";
pub const SUBSAMPLING_OFFSET: usize = 8;
const HEADER_LEN: usize = 11;

pub const NOT_A_STREAM: &str = "mock: not a JPEG stream";
pub const PREMATURE_END: &str = "mock: premature end of data segment";
pub const OUT_OF_HANDLES: &str = "mock: could not allocate handle";
pub const INVALID_ARGUMENT: &str = "mock: invalid argument";
pub const WRITE_FAILED: &str = "mock: output write failed";
const WRONG_KIND: &str = "mock: handle is of the wrong kind";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub decompress_inits: usize,
    pub compress_inits: usize,
    pub destroys: usize,
    pub allocations: usize,
    pub frees: usize,
    pub unknown_frees: usize,
}

impl Counters {
    pub fn live_handles(&self) -> isize {
        (self.decompress_inits + self.compress_inits) as isize - self.destroys as isize
    }

    pub fn live_buffers(&self) -> isize {
        self.allocations as isize - self.frees as isize
    }
}

thread_local! {
    static COUNTERS: Cell<Counters> = Cell::new(Counters::default());
    static FAIL_INIT: Cell<bool> = const { Cell::new(false) };
    static FAIL_AFTER_ALLOC: Cell<bool> = const { Cell::new(false) };
    static GLOBAL_ERROR: RefCell<CString> = RefCell::new(CString::default());
    static ALLOCATIONS: RefCell<HashMap<usize, usize>> = RefCell::new(HashMap::new());
}

pub fn reset() {
    COUNTERS.with(|c| c.set(Counters::default()));
    FAIL_INIT.with(|f| f.set(false));
    FAIL_AFTER_ALLOC.with(|f| f.set(false));
    GLOBAL_ERROR.with(|e| *e.borrow_mut() = CString::default());
    ALLOCATIONS.with(|a| a.borrow_mut().clear());
}

pub fn counters() -> Counters {
    COUNTERS.with(Cell::get)
}

pub fn set_fail_init(fail: bool) {
    FAIL_INIT.with(|f| f.set(fail));
}

pub fn set_fail_after_alloc(fail: bool) {
    FAIL_AFTER_ALLOC.with(|f| f.set(fail));
}

pub fn set_global_error(message: &str) {
    let message = CString::new(message).unwrap();
    GLOBAL_ERROR.with(|e| *e.borrow_mut() = message);
}

pub fn symbols(per_handle_errors: bool) -> Symbols {
    Symbols {
        init_decompress,
        init_compress,
        destroy,
        decompress_header,
        decompress,
        compress,
        free,
        get_error_str,
        get_error_str2: per_handle_errors.then_some(get_error_str2 as GetErrorStr2Fn),
    }
}

pub fn turbojpeg() -> TurboJpeg {
    TurboJpeg::from_symbols(symbols(true))
}

/// Builds a stream the mock decoder accepts.
pub fn stream(
    width: u16,
    height: u16,
    subsampling: Subsampling,
    colorspace: Colorspace,
    pixel_format: PixelFormat,
    pixels: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + pixels.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.push(i32::from(subsampling) as u8);
    out.push(i32::from(colorspace) as u8);
    out.push(i32::from(pixel_format) as u8);
    out.extend_from_slice(pixels);
    out
}

fn bump(update: impl FnOnce(&mut Counters)) {
    COUNTERS.with(|c| {
        let mut counters = c.get();
        update(&mut counters);
        c.set(counters);
    });
}

#[derive(PartialEq, Eq)]
enum Kind {
    Decompress,
    Compress,
}

struct MockHandle {
    kind: Kind,
    error: CString,
}

fn fail(handle: TjHandle, message: &str) -> c_int {
    let message = CString::new(message).unwrap();
    if !handle.is_null() {
        unsafe { (*(handle as *mut MockHandle)).error = message.clone() };
    }
    GLOBAL_ERROR.with(|e| *e.borrow_mut() = message);
    -1
}

fn kind_of(handle: TjHandle) -> Option<&'static Kind> {
    if handle.is_null() {
        return None;
    }
    Some(unsafe { &(*(handle as *const MockHandle)).kind })
}

struct Header {
    width: usize,
    height: usize,
    subsampling: u8,
    colorspace: u8,
    pixel_format: u8,
}

fn parse(jpeg: &[u8]) -> Option<Header> {
    if jpeg.len() < HEADER_LEN || !jpeg.starts_with(MAGIC) {
        return None;
    }
    Some(Header {
        width: u16::from_le_bytes([jpeg[4], jpeg[5]]) as usize,
        height: u16::from_le_bytes([jpeg[6], jpeg[7]]) as usize,
        subsampling: jpeg[SUBSAMPLING_OFFSET],
        colorspace: jpeg[9],
        pixel_format: jpeg[10],
    })
}

fn init(kind: Kind) -> TjHandle {
    if FAIL_INIT.with(Cell::get) {
        fail(ptr::null_mut(), OUT_OF_HANDLES);
        return ptr::null_mut();
    }
    match kind {
        Kind::Decompress => bump(|c| c.decompress_inits += 1),
        Kind::Compress => bump(|c| c.compress_inits += 1),
    }
    Box::into_raw(Box::new(MockHandle {
        kind,
        error: CString::default(),
    })) as TjHandle
}

unsafe extern "C" fn init_decompress() -> TjHandle {
    init(Kind::Decompress)
}

unsafe extern "C" fn init_compress() -> TjHandle {
    init(Kind::Compress)
}

unsafe extern "C" fn destroy(handle: TjHandle) -> c_int {
    if handle.is_null() {
        return fail(handle, INVALID_ARGUMENT);
    }
    drop(unsafe { Box::from_raw(handle as *mut MockHandle) });
    bump(|c| c.destroys += 1);
    0
}

unsafe extern "C" fn decompress_header(
    handle: TjHandle,
    jpeg_buf: *const c_uchar,
    jpeg_size: c_ulong,
    width: *mut c_int,
    height: *mut c_int,
    jpeg_subsamp: *mut c_int,
    jpeg_colorspace: *mut c_int,
) -> c_int {
    if kind_of(handle) != Some(&Kind::Decompress) {
        return fail(handle, WRONG_KIND);
    }
    let jpeg = unsafe { slice::from_raw_parts(jpeg_buf, jpeg_size as usize) };
    let Some(header) = parse(jpeg) else {
        return fail(handle, NOT_A_STREAM);
    };
    unsafe {
        *width = header.width as c_int;
        *height = header.height as c_int;
        // Stored as a signed byte so TJSAMP_UNKNOWN survives the trip.
        *jpeg_subsamp = header.subsampling as i8 as c_int;
        *jpeg_colorspace = header.colorspace as c_int;
    }
    0
}

unsafe extern "C" fn decompress(
    handle: TjHandle,
    jpeg_buf: *const c_uchar,
    jpeg_size: c_ulong,
    dst_buf: *mut c_uchar,
    width: c_int,
    pitch: c_int,
    height: c_int,
    pixel_format: c_int,
    _flags: c_int,
) -> c_int {
    if kind_of(handle) != Some(&Kind::Decompress) {
        return fail(handle, WRONG_KIND);
    }
    let jpeg = unsafe { slice::from_raw_parts(jpeg_buf, jpeg_size as usize) };
    let Some(header) = parse(jpeg) else {
        return fail(handle, NOT_A_STREAM);
    };
    let (Ok(requested), Ok(stored)) = (
        PixelFormat::try_from(pixel_format),
        PixelFormat::try_from(header.pixel_format as i32),
    ) else {
        return fail(handle, INVALID_ARGUMENT);
    };
    if pitch != 0 || width as usize != header.width || height as usize != header.height {
        return fail(handle, INVALID_ARGUMENT);
    }

    let payload = &jpeg[HEADER_LEN..];
    if payload.len() != header.width * header.height * stored.bytes_per_pixel() {
        return fail(handle, PREMATURE_END);
    }

    let dst_len = header.width * header.height * requested.bytes_per_pixel();
    let dst = unsafe { slice::from_raw_parts_mut(dst_buf, dst_len) };
    if requested == stored {
        dst.copy_from_slice(payload);
    } else {
        dst.fill(0x80);
    }
    0
}

unsafe extern "C" fn compress(
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
    _flags: c_int,
) -> c_int {
    if kind_of(handle) != Some(&Kind::Compress) {
        return fail(handle, WRONG_KIND);
    }
    let (Ok(format), Ok(subsampling)) = (
        PixelFormat::try_from(pixel_format),
        Subsampling::try_from(jpeg_subsamp),
    ) else {
        return fail(handle, INVALID_ARGUMENT);
    };
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return fail(handle, INVALID_ARGUMENT);
    };
    if w == 0
        || h == 0
        || pitch != 0
        || subsampling == Subsampling::Unknown
        || !(0..=100).contains(&jpeg_qual)
    {
        return fail(handle, INVALID_ARGUMENT);
    }

    let src_len = w as usize * h as usize * format.bytes_per_pixel();
    let pixels = unsafe { slice::from_raw_parts(src_buf, src_len) };
    let colorspace = match (format, subsampling) {
        (PixelFormat::Gray, _) | (_, Subsampling::Gray) => Colorspace::Gray,
        (PixelFormat::Cmyk, _) => Colorspace::Ycck,
        _ => Colorspace::YCbCr,
    };

    let encoded = stream(w, h, subsampling, colorspace, format, pixels).into_boxed_slice();
    let len = encoded.len();
    let out = Box::into_raw(encoded) as *mut c_uchar;
    ALLOCATIONS.with(|a| a.borrow_mut().insert(out as usize, len));
    bump(|c| c.allocations += 1);
    unsafe {
        *jpeg_buf = out;
        *jpeg_size = len as c_ulong;
    }

    if FAIL_AFTER_ALLOC.with(Cell::get) {
        return fail(handle, WRITE_FAILED);
    }
    0
}

unsafe extern "C" fn free(buffer: *mut c_uchar) {
    if buffer.is_null() {
        return;
    }
    match ALLOCATIONS.with(|a| a.borrow_mut().remove(&(buffer as usize))) {
        Some(len) => {
            drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(buffer, len)) });
            bump(|c| c.frees += 1);
        }
        None => bump(|c| c.unknown_frees += 1),
    }
}

unsafe extern "C" fn get_error_str() -> *mut c_char {
    GLOBAL_ERROR.with(|e| e.borrow().as_ptr() as *mut c_char)
}

unsafe extern "C" fn get_error_str2(handle: TjHandle) -> *mut c_char {
    if handle.is_null() {
        return unsafe { get_error_str() };
    }
    unsafe { (*(handle as *const MockHandle)).error.as_ptr() as *mut c_char }
}
