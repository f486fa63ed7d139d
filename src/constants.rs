// Bytes per pixel for each TurboJPEG pixel format, indexed by the TJPF_* value.
pub const PIXEL_SIZE: [usize; 12] = [3, 3, 4, 4, 4, 4, 1, 4, 4, 4, 4, 4];

// Row pitch passed to the codec. Zero means rows are tightly packed (width * pixel size).
pub const TIGHT_PITCH: i32 = 0;

// No TJFLAG_* options are passed to decompress or compress.
pub const NO_FLAGS: i32 = 0;

pub const DEFAULT_QUALITY: i32 = 85;

#[cfg(target_os = "macos")]
pub const DEFAULT_LIB_PATH: &str = "/usr/local/opt/jpeg-turbo/lib/libturbojpeg.dylib";

#[cfg(target_os = "linux")]
pub const DEFAULT_LIB_PATH: &str = "/opt/libjpeg-turbo/lib64/libturbojpeg.so";

#[cfg(target_os = "windows")]
pub const DEFAULT_LIB_PATH: &str = "C:/libjpeg-turbo64/bin/turbojpeg.dll";

// Left to the dynamic loader's search path.
#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
pub const DEFAULT_LIB_PATH: &str = "libturbojpeg.so";

// Exported symbol names, NUL-terminated for libloading.
pub const SYM_INIT_DECOMPRESS: &[u8] = b"tjInitDecompress\0";
pub const SYM_INIT_COMPRESS: &[u8] = b"tjInitCompress\0";
pub const SYM_DESTROY: &[u8] = b"tjDestroy\0";
pub const SYM_DECOMPRESS_HEADER: &[u8] = b"tjDecompressHeader3\0";
pub const SYM_DECOMPRESS: &[u8] = b"tjDecompress2\0";
pub const SYM_COMPRESS: &[u8] = b"tjCompress2\0";
pub const SYM_FREE: &[u8] = b"tjFree\0";
pub const SYM_GET_ERROR_STR: &[u8] = b"tjGetErrorStr\0";
// Available since libjpeg-turbo 2.0; older builds only have the global accessor.
pub const SYM_GET_ERROR_STR2: &[u8] = b"tjGetErrorStr2\0";
