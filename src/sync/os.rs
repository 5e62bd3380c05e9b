//! Bindings to the RTOS mutex objects of the vendor OS shim.
//!
//! Off target there is no RTOS: creation fails and nothing can be taken.

/// Opaque RTOS mutex handle.
pub type OsHandle = usize;

#[cfg(target_os = "none")]
mod shim {
    use super::OsHandle;

    extern "C" {
        fn os_mutex_create(pp_handle: *mut *mut core::ffi::c_void) -> bool;
        fn os_mutex_take(p_handle: *mut core::ffi::c_void, wait_ms: u32) -> bool;
        fn os_mutex_give(p_handle: *mut core::ffi::c_void) -> bool;
    }

    pub fn create() -> Option<OsHandle> {
        let mut handle: *mut core::ffi::c_void = core::ptr::null_mut();
        if unsafe { os_mutex_create(&mut handle) } && !handle.is_null() {
            Some(handle as OsHandle)
        } else {
            None
        }
    }

    pub fn take(handle: OsHandle, wait_ms: u32) -> bool {
        unsafe { os_mutex_take(handle as *mut core::ffi::c_void, wait_ms) }
    }

    pub fn give(handle: OsHandle) -> bool {
        unsafe { os_mutex_give(handle as *mut core::ffi::c_void) }
    }
}

#[cfg(not(target_os = "none"))]
mod shim {
    use super::OsHandle;

    pub fn create() -> Option<OsHandle> {
        None
    }

    pub fn take(_handle: OsHandle, _wait_ms: u32) -> bool {
        false
    }

    pub fn give(_handle: OsHandle) -> bool {
        false
    }
}

/// Creates an RTOS mutex. `None` if the OS is out of mutex objects.
#[cfg_attr(test, mry::mry)]
pub fn os_mutex_create() -> Option<OsHandle> {
    shim::create()
}

/// Takes the mutex, blocking the calling task for at most `wait_ms`
/// milliseconds. `0xFFFF_FFFF` waits forever.
#[cfg_attr(test, mry::mry)]
pub fn os_mutex_take(handle: OsHandle, wait_ms: u32) -> bool {
    shim::take(handle, wait_ms)
}

#[cfg_attr(test, mry::mry)]
pub fn os_mutex_give(handle: OsHandle) -> bool {
    shim::give(handle)
}
