use std::alloc::{GlobalAlloc, Layout, System};
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use page_cloud::{extract_fragments_with, CloudOptions, ExtractLimits, WordCloud};

const WARMUP_ITERS: usize = 3;
const MEASURE_ITERS: usize = 20;

const WORD_BANK: &[&str] = &[
    "harbor", "lantern", "granite", "thistle", "meadow", "cobble", "pebble", "quay",
    "drift", "saline", "mooring", "beacon", "charts", "tide", "anchor", "foghorn",
];

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

fn update_peak_alloc_bytes(current: usize) {
    let mut peak = PEAK_ALLOC_BYTES.load(Ordering::Relaxed);
    while current > peak {
        match PEAK_ALLOC_BYTES.compare_exchange_weak(
            peak,
            current,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break,
            Err(next) => peak = next,
        }
    }
}

fn add_current_alloc_bytes(delta: usize) {
    let current = CURRENT_ALLOC_BYTES.fetch_add(delta, Ordering::Relaxed) + delta;
    update_peak_alloc_bytes(current);
}

fn sub_current_alloc_bytes(delta: usize) {
    let mut current = CURRENT_ALLOC_BYTES.load(Ordering::Relaxed);
    loop {
        let next = current.saturating_sub(delta);
        match CURRENT_ALLOC_BYTES.compare_exchange_weak(
            current,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break,
            Err(observed) => current = observed,
        }
    }
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

/// Deterministic synthetic page: repeated paragraphs drawn from the word
/// bank, salted with markup the extractor has to skip.
fn synthetic_page(paragraphs: usize) -> String {
    let mut html = String::with_capacity(paragraphs * 96);
    html.push_str("<html><head><title>bench page</title><style>p { margin: 0 }</style></head><body>");
    for i in 0..paragraphs {
        html.push_str("<p>");
        for j in 0..12 {
            let word = WORD_BANK[(i * 7 + j * 3) % WORD_BANK.len()];
            html.push_str(word);
            html.push(' ');
        }
        html.push_str("</p>");
        if i % 16 == 0 {
            html.push_str("<script>var skipped = 'not words';</script>");
        }
    }
    html.push_str("</body></html>");
    html
}

struct CaseResult {
    case: &'static str,
    median_ns: u128,
    median_peak_bytes: usize,
}

fn run_case<F>(case: &'static str, mut op: F) -> CaseResult
where
    F: FnMut() -> usize,
{
    for _ in 0..WARMUP_ITERS {
        black_box(op());
    }

    let mut time_samples = Vec::with_capacity(MEASURE_ITERS);
    let mut mem_samples = Vec::with_capacity(MEASURE_ITERS);
    for _ in 0..MEASURE_ITERS {
        let baseline = current_alloc_bytes();
        reset_peak_alloc_bytes();
        let start = Instant::now();
        black_box(op());
        time_samples.push(start.elapsed().as_nanos());
        mem_samples.push(peak_alloc_bytes().saturating_sub(baseline));
    }

    time_samples.sort_unstable();
    mem_samples.sort_unstable();
    CaseResult {
        case,
        median_ns: time_samples[time_samples.len() / 2],
        median_peak_bytes: mem_samples[mem_samples.len() / 2],
    }
}

fn main() {
    let page = synthetic_page(400);
    let html = page.as_bytes();
    let limits = ExtractLimits::default();
    let options = CloudOptions::default();

    let results = [
        run_case("extract", || {
            let mut fragments = 0usize;
            extract_fragments_with(html, &limits, true, |_fragment| fragments += 1)
                .unwrap_or_else(|e| panic!("extract failed: {}", e));
            fragments
        }),
        run_case("full-pipeline", || {
            let cloud = WordCloud::from_html_bytes(html, options)
                .unwrap_or_else(|e| panic!("pipeline failed: {}", e));
            cloud.len()
        }),
    ];

    println!(
        "{:<16} {:>14} {:>16}",
        "case", "median_us", "median_peak_kib"
    );
    for result in results {
        println!(
            "{:<16} {:>14.1} {:>16.1}",
            result.case,
            result.median_ns as f64 / 1_000.0,
            result.median_peak_bytes as f64 / 1024.0
        );
    }
}
