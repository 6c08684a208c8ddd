//! Reclamation triggers for shedding retained memory.

/// Pushes the allocator to give memory back.
///
/// Both triggers are best-effort: they return nothing and the allocator
/// is free to ignore them.
pub trait Reclaimer: Send + Sync + 'static {
    /// Forces a collection pass over the allocator's retained memory.
    fn force_collection(&self);

    /// Asks the allocator to return unused pages to the operating
    /// system.
    fn return_os_memory(&self);
}

/// Drives the global allocator's own reclamation facilities.
///
/// With the `jemalloc` feature this flushes decay-based reclamation
/// across all arenas, then purges dirty pages. Without it the
/// collection trigger is a no-op and page return falls back to glibc's
/// `malloc_trim` where available.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllocatorReclaimer;

impl AllocatorReclaimer {
    /// Creates a new reclaimer for the global allocator.
    pub fn new() -> Self {
        Self
    }
}

impl Reclaimer for AllocatorReclaimer {
    fn force_collection(&self) {
        // 4096 is jemalloc's MALLCTL_ARENAS_ALL.
        #[cfg(all(unix, feature = "jemalloc"))]
        mallctl_trigger(c"arena.4096.decay");
    }

    fn return_os_memory(&self) {
        #[cfg(all(unix, feature = "jemalloc"))]
        mallctl_trigger(c"arena.4096.purge");

        #[cfg(all(target_os = "linux", target_env = "gnu", not(feature = "jemalloc")))]
        unsafe {
            libc::malloc_trim(0);
        }
    }
}

/// Invokes a void jemalloc control, neither reading nor writing a value.
#[cfg(all(unix, feature = "jemalloc"))]
fn mallctl_trigger(name: &std::ffi::CStr) {
    unsafe {
        let _ = tikv_jemalloc_sys::mallctl(
            name.as_ptr().cast(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_never_panic() {
        let reclaimer = AllocatorReclaimer::new();
        reclaimer.force_collection();
        reclaimer.return_os_memory();
    }
}
