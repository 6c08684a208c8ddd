//! Example demonstrating memory tracking under allocation pressure.
//!
//! Retains roughly 1 GB of heap in 1 MiB steps while the tracking
//! tasks sample and report once a second, with a 512 MB soft ceiling
//! on resident memory. All output goes through the `log` facade:
//!
//! ```text
//! RUST_LOG=debug cargo run --example alloc-demo --features jemalloc
//! ```
//!
//! Without the `jemalloc` feature the heap figures read as zero and
//! only the resident set size moves.

use std::thread;
use std::time::Duration;

#[cfg(all(unix, feature = "jemalloc"))]
#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const CHUNK_BYTES: usize = 1_048_576;
const CHUNK_COUNT: usize = 1_000;

fn main() {
    pretty_env_logger::init();

    memtrack::track_and_limit(
        Duration::from_secs(1),
        Duration::from_secs(1),
        Duration::from_secs(1),
        512_000_000,
    );

    log::info!("filling memory");
    let mut retained: Vec<Vec<u8>> = Vec::with_capacity(CHUNK_COUNT);
    for _ in 0..CHUNK_COUNT {
        let mut chunk = vec![0u8; CHUNK_BYTES];
        // Touch every page so the chunk counts toward resident memory.
        for page in chunk.chunks_mut(4096) {
            page[0] = 1;
        }
        retained.push(chunk);
        thread::sleep(Duration::from_millis(10));
    }
    log::info!("filled memory with {} chunks, waiting for reports", retained.len());

    thread::sleep(Duration::from_secs(3));
}
