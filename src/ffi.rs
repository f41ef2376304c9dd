//! C-compatible façade: opaque context handles, boolean
//! `0`/`1` returns, caller-owned output buffers paired with
//! [`chromaflow_dealloc`], and `catch_unwind` at every entry point so a
//! panic inside never unwinds across the FFI boundary.

use std::ffi::{c_char, CStr};
use std::os::raw::{c_int, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;

use crate::codec::compress;
use crate::config::Algorithm;
use crate::fingerprinter::Fingerprinter;
use crate::matcher::{match_fingerprints, Segment};

const CHROMAFLOW_OK: c_int = 1;
const CHROMAFLOW_ERROR: c_int = 0;

/// Opaque fingerprinter handle returned by [`chromaflow_new`].
pub struct ChromaflowContext {
    inner: Fingerprinter,
}

fn guard<F: FnOnce() -> c_int>(f: F) -> c_int {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or(CHROMAFLOW_ERROR)
}

/// Creates a new fingerprinter context for `algorithm` (`0..=4`). Returns
/// null on an unknown algorithm id.
#[no_mangle]
pub extern "C" fn chromaflow_new(algorithm: c_int) -> *mut ChromaflowContext {
    let result = panic::catch_unwind(|| {
        let algorithm = Algorithm::from_id(algorithm as u8).ok()?;
        Some(Box::into_raw(Box::new(ChromaflowContext {
            inner: Fingerprinter::new(algorithm),
        })))
    });
    match result {
        Ok(Some(ptr)) => ptr,
        _ => ptr::null_mut(),
    }
}

/// Frees a context created by [`chromaflow_new`]. `ctx` may be null.
///
/// # Safety
/// `ctx` must either be null or a pointer previously returned by
/// [`chromaflow_new`] and not yet freed.
#[no_mangle]
pub unsafe extern "C" fn chromaflow_free(ctx: *mut ChromaflowContext) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
}

/// Sets the RMS silence threshold option. Must be called before
/// [`chromaflow_start`].
///
/// # Safety
/// `ctx` must be a valid, non-null pointer from [`chromaflow_new`].
#[no_mangle]
pub unsafe extern "C" fn chromaflow_set_silence_threshold(
    ctx: *mut ChromaflowContext,
    threshold: c_int,
) -> c_int {
    guard(|| {
        if ctx.is_null() || threshold < 0 {
            return CHROMAFLOW_ERROR;
        }
        let ctx = &mut *ctx;
        match ctx.inner.set_silence_threshold(threshold as u32) {
            Ok(()) => CHROMAFLOW_OK,
            Err(_) => CHROMAFLOW_ERROR,
        }
    })
}

/// Sets an option by name. The only name currently recognized is
/// `"silence_threshold"`; any other name, or an out-of-range value,
/// fails the call.
///
/// # Safety
/// `ctx` must be a valid, non-null pointer from [`chromaflow_new`]; `name`
/// must be a valid, non-null, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn chromaflow_set_option(
    ctx: *mut ChromaflowContext,
    name: *const c_char,
    value: i64,
) -> c_int {
    guard(|| {
        if ctx.is_null() || name.is_null() {
            return CHROMAFLOW_ERROR;
        }
        let Ok(name) = CStr::from_ptr(name).to_str() else {
            return CHROMAFLOW_ERROR;
        };
        let ctx = &mut *ctx;
        match ctx.inner.set_option(name, value) {
            Ok(()) => CHROMAFLOW_OK,
            Err(_) => CHROMAFLOW_ERROR,
        }
    })
}

/// Starts a fingerprinting session.
///
/// # Safety
/// `ctx` must be a valid, non-null pointer from [`chromaflow_new`].
#[no_mangle]
pub unsafe extern "C" fn chromaflow_start(
    ctx: *mut ChromaflowContext,
    sample_rate: c_int,
    num_channels: c_int,
) -> c_int {
    guard(|| {
        if ctx.is_null() || sample_rate <= 0 || num_channels <= 0 {
            return CHROMAFLOW_ERROR;
        }
        let ctx = &mut *ctx;
        match ctx.inner.start(sample_rate as u32, num_channels as u32) {
            Ok(()) => CHROMAFLOW_OK,
            Err(_) => CHROMAFLOW_ERROR,
        }
    })
}

/// Feeds `size` interleaved 16-bit PCM samples.
///
/// # Safety
/// `ctx` must be valid and non-null; `data` must point to at least `size`
/// readable `i16` values when `size > 0`.
#[no_mangle]
pub unsafe extern "C" fn chromaflow_feed(
    ctx: *mut ChromaflowContext,
    data: *const i16,
    size: c_int,
) -> c_int {
    guard(|| {
        if ctx.is_null() || size < 0 || (data.is_null() && size > 0) {
            return CHROMAFLOW_ERROR;
        }
        let ctx = &mut *ctx;
        let samples = if size == 0 {
            &[][..]
        } else {
            slice::from_raw_parts(data, size as usize)
        };
        match ctx.inner.feed(samples) {
            Ok(()) => CHROMAFLOW_OK,
            Err(_) => CHROMAFLOW_ERROR,
        }
    })
}

/// Flushes any buffered audio and finalizes the fingerprint.
///
/// # Safety
/// `ctx` must be a valid, non-null pointer from [`chromaflow_new`].
#[no_mangle]
pub unsafe extern "C" fn chromaflow_finish(ctx: *mut ChromaflowContext) -> c_int {
    guard(|| {
        if ctx.is_null() {
            return CHROMAFLOW_ERROR;
        }
        let ctx = &mut *ctx;
        match ctx.inner.finish() {
            Ok(()) => CHROMAFLOW_OK,
            Err(_) => CHROMAFLOW_ERROR,
        }
    })
}

/// Discards the accumulated fingerprint items so the context can start a
/// new session via [`chromaflow_start`].
///
/// # Safety
/// `ctx` must be a valid, non-null pointer from [`chromaflow_new`].
#[no_mangle]
pub unsafe extern "C" fn chromaflow_clear_fingerprint(ctx: *mut ChromaflowContext) {
    if !ctx.is_null() {
        let ctx = &mut *ctx;
        ctx.inner.clear();
    }
}

/// Writes the raw 32-bit subfingerprint items to a freshly allocated
/// buffer, owned by the caller until passed to [`chromaflow_dealloc`].
///
/// # Safety
/// `ctx`, `out_items`, and `out_size` must all be valid, non-null
/// pointers; `ctx` must come from [`chromaflow_new`].
#[no_mangle]
pub unsafe extern "C" fn chromaflow_get_fingerprint(
    ctx: *mut ChromaflowContext,
    out_items: *mut *mut u32,
    out_size: *mut c_int,
) -> c_int {
    guard(|| {
        if ctx.is_null() || out_items.is_null() || out_size.is_null() {
            return CHROMAFLOW_ERROR;
        }
        let ctx = &*ctx;
        let fp = ctx.inner.fingerprint();
        let mut boxed = fp.items.into_boxed_slice();
        *out_size = boxed.len() as c_int;
        *out_items = boxed.as_mut_ptr();
        std::mem::forget(boxed);
        CHROMAFLOW_OK
    })
}

/// Writes the compressed fingerprint to a freshly
/// allocated byte buffer, owned by the caller until passed to
/// [`chromaflow_dealloc`].
///
/// # Safety
/// `ctx`, `out_bytes`, and `out_size` must all be valid, non-null
/// pointers; `ctx` must come from [`chromaflow_new`].
#[no_mangle]
pub unsafe extern "C" fn chromaflow_get_fingerprint_compressed(
    ctx: *mut ChromaflowContext,
    out_bytes: *mut *mut u8,
    out_size: *mut c_int,
) -> c_int {
    guard(|| {
        if ctx.is_null() || out_bytes.is_null() || out_size.is_null() {
            return CHROMAFLOW_ERROR;
        }
        let ctx = &*ctx;
        let compressed = compress(&ctx.inner.fingerprint());
        let mut boxed = compressed.into_boxed_slice();
        *out_size = boxed.len() as c_int;
        *out_bytes = boxed.as_mut_ptr();
        std::mem::forget(boxed);
        CHROMAFLOW_OK
    })
}

/// Frees a buffer previously returned by [`chromaflow_get_fingerprint`] or
/// [`chromaflow_get_fingerprint_compressed`]. `len` must match the
/// `out_size` that accompanied it; `elem_size` is `4` for the raw-item
/// buffer and `1` for the compressed buffer. `ptr` may be null.
///
/// # Safety
/// `ptr` must either be null or a pointer most recently returned by one
/// of those two functions, with matching `len`/`elem_size`, not yet
/// freed.
#[no_mangle]
pub unsafe extern "C" fn chromaflow_dealloc(ptr: *mut c_void, len: c_int, elem_size: c_int) {
    if ptr.is_null() || len < 0 {
        return;
    }
    let len = len as usize;
    match elem_size {
        4 => drop(Box::from_raw(slice::from_raw_parts_mut(ptr as *mut u32, len))),
        1 => drop(Box::from_raw(slice::from_raw_parts_mut(ptr as *mut u8, len))),
        8 => drop(Box::from_raw(slice::from_raw_parts_mut(
            ptr as *mut FfiSegment,
            len,
        ))),
        _ => {}
    }
}

/// C-layout mirror of [`Segment`].
#[repr(C)]
pub struct FfiSegment {
    pub pos1: u32,
    pub pos2: u32,
    pub duration: u32,
    pub score: u8,
}

impl From<Segment> for FfiSegment {
    fn from(s: Segment) -> Self {
        FfiSegment {
            pos1: s.pos1 as u32,
            pos2: s.pos2 as u32,
            duration: s.duration as u32,
            score: s.score,
        }
    }
}

/// Matches two raw subfingerprint item arrays and writes the resulting
/// segments to a freshly allocated buffer, owned by the caller until
/// passed to `chromaflow_dealloc(ptr, out_size, 8)`.
///
/// # Safety
/// `items1`/`items2` must point to at least `len1`/`len2` readable `u32`
/// values; `out_segments` and `out_size` must be valid, non-null
/// pointers.
#[no_mangle]
pub unsafe extern "C" fn chromaflow_match(
    algorithm: c_int,
    items1: *const u32,
    len1: c_int,
    items2: *const u32,
    len2: c_int,
    out_segments: *mut *mut FfiSegment,
    out_size: *mut c_int,
) -> c_int {
    guard(|| {
        if out_segments.is_null() || out_size.is_null() || len1 < 0 || len2 < 0 {
            return CHROMAFLOW_ERROR;
        }
        let Ok(algorithm) = Algorithm::from_id(algorithm as u8) else {
            return CHROMAFLOW_ERROR;
        };
        if (items1.is_null() && len1 > 0) || (items2.is_null() && len2 > 0) {
            return CHROMAFLOW_ERROR;
        }
        let a_items = if len1 == 0 { &[][..] } else { slice::from_raw_parts(items1, len1 as usize) };
        let b_items = if len2 == 0 { &[][..] } else { slice::from_raw_parts(items2, len2 as usize) };
        let a = crate::fingerprint::Fingerprint::new(algorithm, a_items.to_vec());
        let b = crate::fingerprint::Fingerprint::new(algorithm, b_items.to_vec());

        let Ok(raw_segments) = match_fingerprints(&a, &b) else {
            return CHROMAFLOW_ERROR;
        };
        let segments: Vec<FfiSegment> = raw_segments.into_iter().map(FfiSegment::from).collect();
        let mut boxed = segments.into_boxed_slice();
        *out_size = boxed.len() as c_int;
        *out_segments = boxed.as_mut_ptr();
        std::mem::forget(boxed);
        CHROMAFLOW_OK
    })
}

/// Returns the duration, in milliseconds, represented by `num_items`
/// fingerprint items under `algorithm`.
///
/// # Safety
/// No pointers are dereferenced; safe to call with any `algorithm`.
#[no_mangle]
pub extern "C" fn chromaflow_hash_time_ms(algorithm: c_int, num_items: c_int) -> i64 {
    match Algorithm::from_id(algorithm as u8) {
        Ok(algorithm) if num_items >= 0 => algorithm.hash_time_ms(num_items as usize) as i64,
        _ => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_free_round_trip() {
        unsafe {
            let ctx = chromaflow_new(1);
            assert!(!ctx.is_null());
            chromaflow_free(ctx);
        }
    }

    #[test]
    fn unknown_algorithm_returns_null() {
        unsafe {
            assert!(chromaflow_new(99).is_null());
        }
    }

    #[test]
    fn full_lifecycle_yields_a_fingerprint() {
        unsafe {
            let ctx = chromaflow_new(1);
            assert_eq!(chromaflow_start(ctx, 11025, 1), CHROMAFLOW_OK);
            let samples = vec![12000i16; 11025 * 2];
            assert_eq!(chromaflow_feed(ctx, samples.as_ptr(), samples.len() as c_int), CHROMAFLOW_OK);
            assert_eq!(chromaflow_finish(ctx), CHROMAFLOW_OK);

            let mut items: *mut u32 = ptr::null_mut();
            let mut size: c_int = 0;
            assert_eq!(chromaflow_get_fingerprint(ctx, &mut items, &mut size), CHROMAFLOW_OK);
            assert!(size > 0);
            chromaflow_dealloc(items as *mut c_void, size, 4);
            chromaflow_free(ctx);
        }
    }

    #[test]
    fn set_option_round_trips_silence_threshold() {
        unsafe {
            let ctx = chromaflow_new(1);
            let name = std::ffi::CString::new("silence_threshold").unwrap();
            assert_eq!(chromaflow_set_option(ctx, name.as_ptr(), 100), CHROMAFLOW_OK);
            chromaflow_free(ctx);
        }
    }

    #[test]
    fn set_option_rejects_unknown_name() {
        unsafe {
            let ctx = chromaflow_new(1);
            let name = std::ffi::CString::new("bogus").unwrap();
            assert_eq!(chromaflow_set_option(ctx, name.as_ptr(), 1), CHROMAFLOW_ERROR);
            chromaflow_free(ctx);
        }
    }

    #[test]
    fn feed_before_start_fails() {
        unsafe {
            let ctx = chromaflow_new(1);
            let samples = [0i16; 4];
            assert_eq!(chromaflow_feed(ctx, samples.as_ptr(), 4), CHROMAFLOW_ERROR);
            chromaflow_free(ctx);
        }
    }

    #[test]
    fn hash_time_matches_algorithm_formula() {
        assert_eq!(
            chromaflow_hash_time_ms(1, 1000),
            Algorithm::Algorithm1.hash_time_ms(1000) as i64
        );
    }

    #[test]
    fn match_both_empty_inputs_is_an_error() {
        unsafe {
            let mut out: *mut FfiSegment = ptr::null_mut();
            let mut size: c_int = 0;
            let rc = chromaflow_match(1, ptr::null(), 0, ptr::null(), 0, &mut out, &mut size);
            assert_eq!(rc, CHROMAFLOW_ERROR);
        }
    }

    #[test]
    fn match_one_sided_empty_input_yields_zero_segments() {
        unsafe {
            let items = vec![1u32, 2, 3, 4, 5];
            let mut out: *mut FfiSegment = ptr::null_mut();
            let mut size: c_int = 0;
            let rc = chromaflow_match(
                1,
                items.as_ptr(),
                items.len() as c_int,
                ptr::null(),
                0,
                &mut out,
                &mut size,
            );
            assert_eq!(rc, CHROMAFLOW_OK);
            assert_eq!(size, 0);
        }
    }
}
