//! The exported C functions, driven the way a C client would.

mod common;

use common::*;
use meshcut::ffi::*;
use meshcut::{message_id, status, ComponentTypeFlags, ContextFlags, DataField};
use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::ptr;
use std::sync::Mutex;

type Received = Mutex<Vec<(u32, u32, String)>>;

unsafe extern "C" fn collect(
    source: u32,
    _kind: u32,
    id: u32,
    _severity: u32,
    length: usize,
    message: *const c_char,
    user_data: *mut c_void,
) {
    let received = &*(user_data as *const Received);
    let text = CStr::from_ptr(message).to_string_lossy().into_owned();
    assert_eq!(text.len(), length);
    received.lock().unwrap().push((source, id, text));
}

fn create(flags: u32) -> McContext {
    let mut ctx: McContext = 0;
    assert_eq!(unsafe { mc_create_context(&mut ctx, flags) }, status::SUCCESS);
    assert_ne!(ctx, 0);
    ctx
}

unsafe fn dispatch_cubes(ctx: McContext, flags: u32, offset: [f64; 3]) -> i32 {
    let source = cube([0.0; 3]);
    let cut = cube(offset);
    mc_dispatch(
        ctx,
        flags,
        source.as_ptr().cast(),
        CUBE_FACES.as_ptr(),
        CUBE_SIZES.as_ptr(),
        8,
        6,
        cut.as_ptr().cast(),
        CUBE_FACES.as_ptr(),
        CUBE_SIZES.as_ptr(),
        8,
        6,
    )
}

fn components(ctx: McContext, filter: u32) -> Vec<McConnectedComponent> {
    let mut total = 0u32;
    let code = unsafe { mc_get_connected_components(ctx, filter, 0, ptr::null_mut(), &mut total) };
    assert_eq!(code, status::SUCCESS);

    let mut handles = vec![0; total as usize];
    let code = unsafe {
        mc_get_connected_components(ctx, filter, total, handles.as_mut_ptr(), &mut total)
    };
    assert_eq!(code, status::SUCCESS);
    assert_eq!(total as usize, handles.len());
    handles
}

#[test]
fn test_full_session() {
    let ctx = create(ContextFlags::SCHEDULE_POOL.bits());
    assert_eq!(unsafe { dispatch_cubes(ctx, DOUBLE, [0.5; 3]) }, status::SUCCESS);

    let fragments = components(ctx, ComponentTypeFlags::FRAGMENT.bits());
    assert_eq!(fragments.len(), 6);
    assert_eq!(components(ctx, ComponentTypeFlags::ALL.bits()).len(), 12);

    let mut bytes = 0usize;
    let code = unsafe {
        mc_get_connected_component_data(
            ctx,
            fragments[0],
            DataField::VertexDouble as u32,
            0,
            ptr::null_mut(),
            &mut bytes,
        )
    };
    assert_eq!(code, status::SUCCESS);
    assert_eq!(bytes % 24, 0);

    let mut vertices = vec![0f64; bytes / 8];
    let code = unsafe {
        mc_get_connected_component_data(
            ctx,
            fragments[0],
            DataField::VertexDouble as u32,
            bytes,
            vertices.as_mut_ptr().cast(),
            ptr::null_mut(),
        )
    };
    assert_eq!(code, status::SUCCESS);
    assert!(vertices.iter().all(|c| (-0.5..=1.5).contains(c)));

    let code = unsafe { mc_release_connected_components(ctx, 1, fragments.as_ptr()) };
    assert_eq!(code, status::SUCCESS);
    assert_eq!(components(ctx, ComponentTypeFlags::ALL.bits()).len(), 11);

    let code = unsafe { mc_release_connected_components(ctx, 0, ptr::null()) };
    assert_eq!(code, status::SUCCESS);
    assert!(components(ctx, ComponentTypeFlags::ALL.bits()).is_empty());

    assert_eq!(mc_release_context(ctx), status::SUCCESS);
    assert_eq!(mc_release_context(ctx), status::INVALID_HANDLE);
}

#[test]
fn test_count_reports_total_beyond_capacity() {
    let ctx = create(INLINE);
    assert_eq!(unsafe { dispatch_cubes(ctx, DOUBLE, [0.5; 3]) }, status::SUCCESS);

    let mut handles = [0u64; 3];
    let mut total = 0u32;
    let code = unsafe {
        mc_get_connected_components(
            ctx,
            ComponentTypeFlags::ALL.bits(),
            3,
            handles.as_mut_ptr(),
            &mut total,
        )
    };
    assert_eq!(code, status::SUCCESS);
    assert_eq!(total, 12);
    assert!(handles.iter().all(|&h| h != 0));
    mc_release_context(ctx);
}

#[test]
fn test_null_arrays_are_invalid_values() {
    let ctx = create(INLINE);
    let cut = cube([0.5; 3]);
    let code = unsafe {
        mc_dispatch(
            ctx,
            DOUBLE,
            ptr::null(),
            CUBE_FACES.as_ptr(),
            CUBE_SIZES.as_ptr(),
            8,
            6,
            cut.as_ptr().cast(),
            CUBE_FACES.as_ptr(),
            CUBE_SIZES.as_ptr(),
            8,
            6,
        )
    };
    assert_eq!(code, status::INVALID_VALUE);

    let mut bytes = 0usize;
    let code = unsafe {
        mc_get_connected_component_data(
            ctx,
            1,
            DataField::Face as u32,
            16,
            ptr::null_mut(),
            &mut bytes,
        )
    };
    assert_eq!(code, status::INVALID_VALUE);
    assert_eq!(bytes, 0);
    mc_release_context(ctx);
}

#[test]
fn test_status_codes_by_failure() {
    let ctx = create(INLINE);

    assert_eq!(unsafe { dispatch_cubes(ctx, 0, [0.5; 3]) }, status::INVALID_VALUE);
    assert_eq!(
        unsafe { dispatch_cubes(ctx, DOUBLE, [0.5, 0.5, 0.0]) },
        status::KERNEL_FAILURE
    );
    assert_eq!(unsafe { dispatch_cubes(0, DOUBLE, [0.5; 3]) }, status::INVALID_HANDLE);

    let mut bytes = 0usize;
    let code = unsafe {
        mc_get_connected_component_data(
            ctx,
            999_999,
            DataField::Face as u32,
            0,
            ptr::null_mut(),
            &mut bytes,
        )
    };
    assert_eq!(code, status::INVALID_HANDLE);
    mc_release_context(ctx);
}

#[test]
fn test_info_size_then_value() {
    let ctx = create(INLINE | ContextFlags::DEBUG.bits());

    let mut bytes = 0usize;
    let code = unsafe { mc_get_info(ctx, 1, 0, ptr::null_mut(), &mut bytes) };
    assert_eq!(code, status::SUCCESS);
    assert_eq!(bytes, 4);

    let mut value = 0u32;
    let code = unsafe {
        mc_get_info(ctx, 1, 4, (&mut value as *mut u32).cast(), ptr::null_mut())
    };
    assert_eq!(code, status::SUCCESS);
    assert_eq!(value, INLINE | ContextFlags::DEBUG.bits());
    mc_release_context(ctx);
}

#[test]
fn test_debug_callback_receives_messages() {
    let ctx = create(INLINE | ContextFlags::DEBUG.bits());
    let received: Received = Mutex::new(Vec::new());
    let user_data = &received as *const Received as *mut c_void;

    let code = unsafe { mc_debug_message_callback(ctx, Some(collect), user_data) };
    assert_eq!(code, status::SUCCESS);

    assert_eq!(unsafe { dispatch_cubes(ctx, FLOAT | DOUBLE, [0.5; 3]) }, status::INVALID_VALUE);
    assert_eq!(unsafe { dispatch_cubes(ctx, DOUBLE, [0.5; 3]) }, status::SUCCESS);

    // Silence kernel messages, then detach
    assert_eq!(mc_debug_message_control(ctx, 1 << 1, u32::MAX, u32::MAX, 0), status::SUCCESS);
    assert_eq!(mc_release_context(ctx), status::SUCCESS);

    let received = received.into_inner().unwrap();
    assert_eq!(received[0].1, message_id::INVALID_INPUT);
    assert!(received.iter().any(|(_, id, _)| *id == message_id::DISPATCH_SUMMARY));
    assert!(received.iter().any(|(source, ..)| *source == 1 << 1));
}
