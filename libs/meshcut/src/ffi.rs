//! # C ABI
//!
//! `extern "C"` surface over a single, lazily created [`ContextRegistry`].
//!
//! Conventions shared by every function:
//!
//! - the return value is a status code from [`crate::status`]
//! - out parameters are written only on success
//! - handles are non-zero `u64`; `0` is always [`status::INVALID_HANDLE`]
//! - a null pointer paired with a non-zero count is [`status::INVALID_VALUE`]
//! - no panic crosses the boundary
//!
//! Failures detected after the context handle resolves are also reported
//! through that context's debug callback.

use crate::debug::{DebugMessage, DebugSink};
use crate::dispatch::{MeshInput, VertexData};
use crate::error::{status, Error, Result};
use crate::flags::DispatchFlags;
use crate::handle::{ComponentHandle, ContextHandle};
use crate::registry::ContextRegistry;
use config::constants::COORDS_PER_VERTEX;
use std::ffi::c_void;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::slice;
use std::sync::{Arc, OnceLock};
use tracing::error;

/// Raw context handle.
pub type McContext = u64;
/// Raw connected-component handle.
pub type McConnectedComponent = u64;

/// Client debug callback.
///
/// `message` points at `length` bytes of UTF-8 followed by a NUL byte and
/// is valid only for the duration of the call.
pub type McDebugCallback = unsafe extern "C" fn(
    source: u32,
    kind: u32,
    id: u32,
    severity: u32,
    length: usize,
    message: *const c_char,
    user_data: *mut c_void,
);

static REGISTRY: OnceLock<ContextRegistry> = OnceLock::new();

fn registry() -> &'static ContextRegistry {
    REGISTRY.get_or_init(ContextRegistry::new)
}

/// Runs `body`, converting its result (or a panic) into a status code.
fn guard(name: &str, body: impl FnOnce() -> Result<()>) -> i32 {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => status::SUCCESS,
        Ok(Err(err)) => err.status(),
        Err(_) => {
            error!(function = name, "panic caught at the C boundary");
            status::KERNEL_FAILURE
        }
    }
}

/// Borrows `len` elements at `data`. A null pointer is allowed only for an
/// empty slice.
///
/// # Safety
///
/// A non-null `data` must point at `len` initialized elements that outlive
/// `'a`.
unsafe fn borrow<'a, T>(data: *const T, len: usize, name: &str) -> Result<&'a [T]> {
    if len == 0 {
        return Ok(&[]);
    }
    if data.is_null() {
        return Err(Error::invalid_value(format!(
            "{name} is null but {len} elements were declared"
        )));
    }
    Ok(slice::from_raw_parts(data, len))
}

/// Mutable counterpart of [`borrow`]; `None` for a null pointer.
///
/// # Safety
///
/// A non-null `data` must point at `len` writable elements.
unsafe fn borrow_out<'a, T>(data: *mut T, len: usize, name: &str) -> Result<Option<&'a mut [T]>> {
    if data.is_null() {
        if len != 0 {
            return Err(Error::invalid_value(format!(
                "{name} is null but has capacity {len}"
            )));
        }
        return Ok(None);
    }
    Ok(Some(slice::from_raw_parts_mut(data, len)))
}

fn null_out(name: &str) -> Error {
    Error::invalid_value(format!("{name} is null"))
}

// =============================================================================
// DEBUG CALLBACK
// =============================================================================

struct CallbackSink {
    callback: McDebugCallback,
    user_data: *mut c_void,
}

// The client owns `user_data` and promises it may be used from any thread
// that raises a message.
unsafe impl Send for CallbackSink {}
unsafe impl Sync for CallbackSink {}

impl DebugSink for CallbackSink {
    fn deliver(&self, message: &DebugMessage<'_>) {
        let mut text = Vec::with_capacity(message.text.len() + 1);
        text.extend_from_slice(message.text.as_bytes());
        text.push(0);
        unsafe {
            (self.callback)(
                message.source.bits(),
                message.kind.bits(),
                message.id,
                message.severity.bits(),
                message.text.len(),
                text.as_ptr().cast(),
                self.user_data,
            );
        }
    }
}

// =============================================================================
// CONTEXTS
// =============================================================================

/// Creates a context and writes its handle to `out_context`.
///
/// # Safety
///
/// `out_context` must be null or valid for a `u64` write.
#[no_mangle]
pub unsafe extern "C" fn mc_create_context(out_context: *mut McContext, flags: u32) -> i32 {
    guard("mc_create_context", || {
        if out_context.is_null() {
            return Err(null_out("out_context"));
        }
        let handle = registry().create_context(flags)?;
        *out_context = handle.raw();
        Ok(())
    })
}

/// Releases a context and all of its components.
#[no_mangle]
pub extern "C" fn mc_release_context(context: McContext) -> i32 {
    guard("mc_release_context", || {
        registry().release_context(ContextHandle::from_raw(context))
    })
}

/// Installs a debug callback, or clears it when `callback` is null.
///
/// # Safety
///
/// `callback` must remain callable, and `user_data` usable from any thread,
/// until the callback is replaced or the context released.
#[no_mangle]
pub unsafe extern "C" fn mc_debug_message_callback(
    context: McContext,
    callback: Option<McDebugCallback>,
    user_data: *mut c_void,
) -> i32 {
    guard("mc_debug_message_callback", || {
        let sink = callback.map(|callback| {
            Arc::new(CallbackSink {
                callback,
                user_data,
            }) as Arc<dyn DebugSink>
        });
        registry().set_debug_callback(ContextHandle::from_raw(context), sink)
    })
}

/// Enables (`enabled != 0`) or disables the given message categories.
#[no_mangle]
pub extern "C" fn mc_debug_message_control(
    context: McContext,
    sources: u32,
    types: u32,
    severities: u32,
    enabled: u32,
) -> i32 {
    guard("mc_debug_message_control", || {
        registry().set_debug_filter(
            ContextHandle::from_raw(context),
            sources,
            types,
            severities,
            enabled != 0,
        )
    })
}

/// Queries a context property.
///
/// With `capacity == 0` and a null `out_buffer` only the required size is
/// written to `out_bytes`.
///
/// # Safety
///
/// `out_buffer` must be null or valid for `capacity` byte writes;
/// `out_bytes` must be null or valid for a `usize` write.
#[no_mangle]
pub unsafe extern "C" fn mc_get_info(
    context: McContext,
    query: u32,
    capacity: usize,
    out_buffer: *mut c_void,
    out_bytes: *mut usize,
) -> i32 {
    guard("mc_get_info", || {
        let handle = ContextHandle::from_raw(context);
        let ctx = registry().context(handle)?;
        let dst = ctx.report(borrow_out(out_buffer.cast::<u8>(), capacity, "out_buffer"))?;
        if dst.is_none() && out_bytes.is_null() {
            return ctx.report(Err(null_out("out_bytes")));
        }
        let required = registry().info(handle, query, dst)?;
        if !out_bytes.is_null() {
            *out_bytes = required;
        }
        Ok(())
    })
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Reads one mesh from raw arrays. The face-index count is the sum of the
/// face sizes.
///
/// # Safety
///
/// Each non-null pointer must reference as many elements as its count
/// implies.
unsafe fn read_mesh<'a>(
    double: Option<bool>,
    vertices: *const c_void,
    face_indices: *const u32,
    face_sizes: *const u32,
    vertex_count: u32,
    face_count: u32,
) -> Result<MeshInput<'a>> {
    let coords = vertex_count as usize * COORDS_PER_VERTEX;
    let vertices = match double {
        Some(true) => VertexData::F64(borrow(vertices.cast::<f64>(), coords, "vertices")?),
        Some(false) => VertexData::F32(borrow(vertices.cast::<f32>(), coords, "vertices")?),
        // Precision is ambiguous; flag validation rejects the call
        None => VertexData::F64(&[]),
    };
    let face_sizes = borrow(face_sizes, face_count as usize, "face_sizes")?;
    let index_count = face_sizes
        .iter()
        .try_fold(0usize, |total, &size| total.checked_add(size as usize))
        .ok_or_else(|| Error::invalid_value("face sizes overflow"))?;
    let face_indices = borrow(face_indices, index_count, "face_indices")?;
    Ok(MeshInput {
        vertices,
        face_indices,
        face_sizes,
    })
}

/// Cuts the source mesh with the cut mesh.
///
/// Vertex arrays hold `3 * num_*_vertices` coordinates of the precision
/// named by `flags`.
///
/// # Safety
///
/// Every pointer must be null (with a zero count) or reference as many
/// elements as its count implies, and must stay valid for the call.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn mc_dispatch(
    context: McContext,
    flags: u32,
    src_vertices: *const c_void,
    src_face_indices: *const u32,
    src_face_sizes: *const u32,
    num_src_vertices: u32,
    num_src_faces: u32,
    cut_vertices: *const c_void,
    cut_face_indices: *const u32,
    cut_face_sizes: *const u32,
    num_cut_vertices: u32,
    num_cut_faces: u32,
) -> i32 {
    guard("mc_dispatch", || {
        let handle = ContextHandle::from_raw(context);
        let ctx = registry().context(handle)?;

        let precision = DispatchFlags::from_bits_retain(flags)
            & (DispatchFlags::VERTEX_ARRAY_FLOAT | DispatchFlags::VERTEX_ARRAY_DOUBLE);
        let double = if precision == DispatchFlags::VERTEX_ARRAY_DOUBLE {
            Some(true)
        } else if precision == DispatchFlags::VERTEX_ARRAY_FLOAT {
            Some(false)
        } else {
            None
        };

        let source = ctx.report(read_mesh(
            double,
            src_vertices,
            src_face_indices,
            src_face_sizes,
            num_src_vertices,
            num_src_faces,
        ))?;
        let cut = ctx.report(read_mesh(
            double,
            cut_vertices,
            cut_face_indices,
            cut_face_sizes,
            num_cut_vertices,
            num_cut_faces,
        ))?;
        registry().dispatch(handle, flags, &source, &cut)
    })
}

// =============================================================================
// CONNECTED COMPONENTS
// =============================================================================

/// Lists components of the types in `filter`.
///
/// Up to `capacity` handles are written to `out_handles`; the total number
/// of matches goes to `out_count`.
///
/// # Safety
///
/// `out_handles` must be null or valid for `capacity` writes; `out_count`
/// must be null or valid for a `u32` write.
#[no_mangle]
pub unsafe extern "C" fn mc_get_connected_components(
    context: McContext,
    filter: u32,
    capacity: u32,
    out_handles: *mut McConnectedComponent,
    out_count: *mut u32,
) -> i32 {
    guard("mc_get_connected_components", || {
        let handle = ContextHandle::from_raw(context);
        let ctx = registry().context(handle)?;
        let dst = ctx.report(borrow_out(out_handles, capacity as usize, "out_handles"))?;
        if dst.is_none() && out_count.is_null() {
            return ctx.report(Err(null_out("out_count")));
        }
        let handles = registry().list_components(handle, filter)?;
        if let Some(dst) = dst {
            for (slot, component) in dst.iter_mut().zip(&handles) {
                *slot = component.raw();
            }
        }
        if !out_count.is_null() {
            *out_count = handles.len() as u32;
        }
        Ok(())
    })
}

/// Copies one field of a component.
///
/// With a null `out_buffer` (and `capacity == 0`) only the required size
/// is written to `out_bytes`. Otherwise the leading
/// `min(required, capacity)` bytes are copied.
///
/// # Safety
///
/// `out_buffer` must be null or valid for `capacity` byte writes;
/// `out_bytes` must be null or valid for a `usize` write.
#[no_mangle]
pub unsafe extern "C" fn mc_get_connected_component_data(
    context: McContext,
    component: McConnectedComponent,
    field: u32,
    capacity: usize,
    out_buffer: *mut c_void,
    out_bytes: *mut usize,
) -> i32 {
    guard("mc_get_connected_component_data", || {
        let handle = ContextHandle::from_raw(context);
        let ctx = registry().context(handle)?;
        let dst = ctx.report(borrow_out(out_buffer.cast::<u8>(), capacity, "out_buffer"))?;
        if dst.is_none() && out_bytes.is_null() {
            return ctx.report(Err(null_out("out_bytes")));
        }
        let required = registry().component_data(
            handle,
            ComponentHandle::from_raw(component),
            field,
            dst,
        )?;
        if !out_bytes.is_null() {
            *out_bytes = required;
        }
        Ok(())
    })
}

/// Releases `count` components, or all of the context's components when
/// `count` is zero.
///
/// # Safety
///
/// `components` must be null (with a zero count) or reference `count`
/// handles.
#[no_mangle]
pub unsafe extern "C" fn mc_release_connected_components(
    context: McContext,
    count: u32,
    components: *const McConnectedComponent,
) -> i32 {
    guard("mc_release_connected_components", || {
        let handle = ContextHandle::from_raw(context);
        let ctx = registry().context(handle)?;
        let raw = ctx.report(borrow(components, count as usize, "components"))?;
        let handles: Vec<ComponentHandle> =
            raw.iter().copied().map(ComponentHandle::from_raw).collect();
        registry().release_components(handle, &handles).map(|_| ())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_zero_handle_is_invalid() {
        assert_eq!(mc_release_context(0), status::INVALID_HANDLE);
        assert_eq!(
            mc_debug_message_control(0, u32::MAX, u32::MAX, u32::MAX, 1),
            status::INVALID_HANDLE
        );
    }

    #[test]
    fn test_create_requires_out_pointer() {
        let code = unsafe { mc_create_context(ptr::null_mut(), 0) };
        assert_eq!(code, status::INVALID_VALUE);
    }

    #[test]
    fn test_out_params_untouched_on_failure() {
        let mut out: McContext = 77;
        let code = unsafe { mc_create_context(&mut out, 1 << 3 | 1 << 4) };
        assert_eq!(code, status::INVALID_VALUE);
        assert_eq!(out, 77);
    }

    #[test]
    fn test_borrow_rejects_null_with_count() {
        let err = unsafe { borrow::<u32>(ptr::null(), 3, "face_sizes") }.unwrap_err();
        assert_eq!(err.status(), status::INVALID_VALUE);
        let empty = unsafe { borrow::<u32>(ptr::null(), 0, "face_sizes") }.unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_read_mesh_sums_face_sizes() {
        let vertices = [0.0f32; 9];
        let indices = [0u32, 1, 2];
        let sizes = [3u32];
        let mesh = unsafe {
            read_mesh(
                Some(false),
                vertices.as_ptr().cast(),
                indices.as_ptr(),
                sizes.as_ptr(),
                3,
                1,
            )
        }
        .unwrap();
        assert_eq!(mesh.face_indices, &indices);
        assert_eq!(mesh.vertex_count(), 3);
    }
}
