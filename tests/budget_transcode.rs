mod common;

use std::time::{Duration, Instant};

use common::budget_alloc::BudgetAlloc;
use common::fixtures::{read_fixture, CHATGPT_FIXTURE, HTML_FIXTURES};
use unistyle::{normalize, style_tables, transcode_html, transcode_markdown};

// Fixture transcodes peak well under 64KiB today.
const HTML_BUDGET_BYTES: usize = 256 * 1024;
const MARKDOWN_BUDGET_BYTES: usize = 128 * 1024;
// Unoptimized builds included; a quadratic scan takes tens of seconds here.
const UNCLOSED_MARKERS_BUDGET: Duration = Duration::from_secs(2);

#[global_allocator]
static ALLOC: BudgetAlloc = BudgetAlloc::new();

// The allocator is process-global, so all measurements run from one test.
#[test]
fn transcode_paths_stay_under_budget() {
    // Build the tables first so their one-time setup is not measured.
    let _ = style_tables();
    html_fixtures_under_budget();
    markdown_fixture_under_budget();
    normalize_allocates_once();
    unclosed_markers_stay_linear();
}

fn html_fixtures_under_budget() {
    for path in HTML_FIXTURES {
        let html = read_fixture(path);
        let (out, usage) = ALLOC.measure(|| transcode_html(&html));
        let out = out.unwrap_or_else(|e| panic!("transcode {}: {}", path, e));
        assert!(!out.is_empty(), "fixture {} produced no text", path);
        assert!(
            usage.peak_bytes <= HTML_BUDGET_BYTES,
            "html transcode peak over budget for {}: {} bytes ({:.1}KB), budget: {}KB, allocs: {}",
            path,
            usage.peak_bytes,
            usage.peak_kib(),
            HTML_BUDGET_BYTES / 1024,
            usage.alloc_count
        );
    }
}

fn markdown_fixture_under_budget() {
    let plain = read_fixture(CHATGPT_FIXTURE).repeat(16);
    let (out, usage) = ALLOC.measure(|| transcode_markdown(&plain));
    assert!(out.len() >= plain.len() / 2);
    assert!(
        usage.peak_bytes <= MARKDOWN_BUDGET_BYTES,
        "markdown transcode peak over budget: {} bytes ({:.1}KB), budget: {}KB",
        usage.peak_bytes,
        usage.peak_kib(),
        MARKDOWN_BUDGET_BYTES / 1024
    );
}

fn normalize_allocates_once() {
    let text = "plain ascii that needs no mapping at all".repeat(8);
    let (out, usage) = ALLOC.measure(|| normalize(&text));
    assert_eq!(out, text);
    assert!(
        usage.alloc_count <= 2,
        "normalize made {} allocations",
        usage.alloc_count
    );
}

fn unclosed_markers_stay_linear() {
    let plain = "*a ".repeat(80_000);
    let started = Instant::now();
    let out = transcode_markdown(&plain);
    let elapsed = started.elapsed();
    assert_eq!(out, plain);
    assert!(
        elapsed <= UNCLOSED_MARKERS_BUDGET,
        "markdown transcode of {} unclosed markers took {:?}, budget: {:?}",
        80_000,
        elapsed,
        UNCLOSED_MARKERS_BUDGET
    );
}
