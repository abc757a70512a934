use std::alloc::{GlobalAlloc, Layout, System};
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use unistyle::{
    apply_style, has_formatting, normalize, style_tables, transcode_html, transcode_markdown,
    transcode_pasted_content, Style,
};

const HTML_FIXTURES: &[(&str, &str)] = &[
    ("google-docs", "tests/fixtures/google-docs.html"),
    ("word", "tests/fixtures/word.html"),
];

const MARKDOWN_FIXTURE: (&str, &str) = ("chatgpt", "tests/fixtures/chatgpt.md");

/// Fixture payloads are tiny; repeat them so timings rise above clock noise.
const REPEAT: usize = 64;

struct TrackingAllocator;

static CURRENT_ALLOC_BYTES: AtomicUsize = AtomicUsize::new(0);
static PEAK_ALLOC_BYTES: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL_ALLOCATOR: TrackingAllocator = TrackingAllocator;

fn current_alloc_bytes() -> usize {
    CURRENT_ALLOC_BYTES.load(Ordering::Relaxed)
}

fn peak_alloc_bytes() -> usize {
    PEAK_ALLOC_BYTES.load(Ordering::Relaxed)
}

fn reset_peak_alloc_bytes() {
    PEAK_ALLOC_BYTES.store(current_alloc_bytes(), Ordering::Relaxed);
}

fn add_current_alloc_bytes(delta: usize) {
    let current = CURRENT_ALLOC_BYTES.fetch_add(delta, Ordering::Relaxed) + delta;
    PEAK_ALLOC_BYTES.fetch_max(current, Ordering::Relaxed);
}

fn sub_current_alloc_bytes(delta: usize) {
    CURRENT_ALLOC_BYTES.fetch_sub(delta, Ordering::Relaxed);
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            add_current_alloc_bytes(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        sub_current_alloc_bytes(layout.size());
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            add_current_alloc_bytes(layout.size());
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            if new_size >= layout.size() {
                add_current_alloc_bytes(new_size - layout.size());
            } else {
                sub_current_alloc_bytes(layout.size() - new_size);
            }
        }
        new_ptr
    }
}

#[derive(Clone, Debug)]
struct CaseResult {
    fixture: &'static str,
    case: &'static str,
    input_bytes: usize,
    iterations: usize,
    min_ns: u128,
    median_ns: u128,
    max_ns: u128,
    median_peak_heap_bytes: usize,
    max_peak_heap_bytes: usize,
}

fn median<T: Copy>(sorted: &[T]) -> T {
    sorted[sorted.len() / 2]
}

fn run_case<F>(
    fixture: &'static str,
    case: &'static str,
    input_bytes: usize,
    iters: (usize, usize),
    mut op: F,
) -> CaseResult
where
    F: FnMut() -> usize,
{
    let (warmup_iters, measure_iters) = iters;
    for _ in 0..warmup_iters {
        black_box(op());
    }

    let mut time_samples = Vec::with_capacity(measure_iters);
    let mut mem_samples = Vec::with_capacity(measure_iters);
    for _ in 0..measure_iters {
        let baseline_alloc = current_alloc_bytes();
        reset_peak_alloc_bytes();
        let start = Instant::now();
        black_box(op());
        time_samples.push(start.elapsed().as_nanos());
        mem_samples.push(peak_alloc_bytes().saturating_sub(baseline_alloc));
    }

    time_samples.sort_unstable();
    mem_samples.sort_unstable();

    CaseResult {
        fixture,
        case,
        input_bytes,
        iterations: measure_iters,
        min_ns: time_samples[0],
        median_ns: median(&time_samples),
        max_ns: time_samples[time_samples.len() - 1],
        median_peak_heap_bytes: median(&mem_samples),
        max_peak_heap_bytes: mem_samples[mem_samples.len() - 1],
    }
}

fn read(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {}", path, e))
}

fn main() {
    let quick = std::env::args().any(|arg| arg == "--quick");
    let iters = if quick { (1, 5) } else { (3, 25) };

    println!("# unistyle benchmark");
    println!(
        "# mode={} warmup_iters={} measure_iters={} repeat={}",
        if quick { "quick" } else { "full" },
        iters.0,
        iters.1,
        REPEAT
    );
    println!(
        "fixture,case,input_bytes,iterations,min_ns,median_ns,max_ns,median_peak_heap_bytes,max_peak_heap_bytes"
    );

    // Table construction is a one-time cost; keep it out of every case.
    black_box(style_tables());

    let mut results = Vec::new();
    for &(key, path) in HTML_FIXTURES {
        let html = read(path).repeat(REPEAT);
        let len = html.len();

        results.push(run_case(key, "has_formatting", len, iters, || {
            usize::from(has_formatting(&html))
        }));
        results.push(run_case(key, "transcode_html", len, iters, || {
            transcode_html(&html)
                .unwrap_or_else(|e| panic!("transcode failed: {}", e))
                .len()
        }));
        results.push(run_case(key, "paste_dispatch", len, iters, || {
            transcode_pasted_content(&html, "").len()
        }));
    }

    let (key, path) = MARKDOWN_FIXTURE;
    let plain = read(path).repeat(REPEAT);
    let len = plain.len();
    results.push(run_case(key, "transcode_markdown", len, iters, || {
        transcode_markdown(&plain).len()
    }));
    results.push(run_case(key, "paste_dispatch", len, iters, || {
        transcode_pasted_content("", &plain).len()
    }));
    results.push(run_case(key, "apply_bold", len, iters, || {
        apply_style(&plain, Style::Bold).len()
    }));
    let styled = apply_style(&plain, Style::DoubleStruck);
    results.push(run_case(key, "normalize", styled.len(), iters, || {
        normalize(&styled).len()
    }));

    for result in &results {
        println!(
            "{},{},{},{},{},{},{},{},{}",
            result.fixture,
            result.case,
            result.input_bytes,
            result.iterations,
            result.min_ns,
            result.median_ns,
            result.max_ns,
            result.median_peak_heap_bytes,
            result.max_peak_heap_bytes
        );
    }
}
