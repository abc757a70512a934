use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Allocation figures for one measured closure.
#[derive(Clone, Copy, Debug)]
pub struct Usage {
    pub peak_bytes: usize,
    pub alloc_count: usize,
}

impl Usage {
    pub fn peak_kib(&self) -> f64 {
        self.peak_bytes as f64 / 1024.0
    }
}

/// Counting wrapper around the system allocator.
pub struct BudgetAlloc {
    current: AtomicUsize,
    peak: AtomicUsize,
    count: AtomicUsize,
}

impl BudgetAlloc {
    pub const fn new() -> Self {
        Self {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
        }
    }

    pub fn reset(&self) {
        self.current.store(0, Ordering::SeqCst);
        self.peak.store(0, Ordering::SeqCst);
        self.count.store(0, Ordering::SeqCst);
    }

    /// Run `f` from a fresh baseline and report what it allocated.
    pub fn measure<T>(&self, f: impl FnOnce() -> T) -> (T, Usage) {
        self.reset();
        let value = f();
        let usage = Usage {
            peak_bytes: self.peak.load(Ordering::SeqCst),
            alloc_count: self.count.load(Ordering::SeqCst),
        };
        (value, usage)
    }

    fn track_alloc(&self, bytes: usize) {
        self.count.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(bytes, Ordering::SeqCst) + bytes;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn track_free(&self, bytes: usize) {
        // Frees of blocks allocated before the last reset must not wrap.
        let _ = self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
                Some(cur.saturating_sub(bytes))
            });
    }
}

unsafe impl GlobalAlloc for BudgetAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            self.track_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        self.track_free(layout.size());
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            self.track_alloc(layout.size());
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            self.track_free(layout.size());
            self.track_alloc(new_size);
        }
        new_ptr
    }
}
