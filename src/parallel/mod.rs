//! Worker-pool configuration for the data-parallel loops.
//!
//! The solvers never own a thread pool; sparse products, reductions and block solves
//! run on rayon's global pool. Call [`init_thread_pool`] once at program start to fix
//! the worker count; otherwise rayon's own defaults apply.

/// Environment variable read by [`init_thread_pool`] when no count is given.
pub const THREADS_ENV: &str = "FESOLVE_NUM_THREADS";

/// Worker count: `requested`, else `FESOLVE_NUM_THREADS`, else the number of CPUs.
pub fn worker_count(requested: Option<usize>) -> usize {
    requested
        .filter(|&n| n > 0)
        .or_else(|| {
            std::env::var(THREADS_ENV)
                .ok()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
        })
        .unwrap_or_else(default_workers)
}

#[cfg(feature = "rayon")]
fn default_workers() -> usize {
    num_cpus::get()
}

#[cfg(not(feature = "rayon"))]
fn default_workers() -> usize {
    1
}

/// Configure the global pool. Returns the worker count actually in effect;
/// when the pool was already initialized the existing size is kept.
#[cfg(feature = "rayon")]
pub fn init_thread_pool(requested: Option<usize>) -> usize {
    let n = worker_count(requested);
    if rayon::ThreadPoolBuilder::new().num_threads(n).build_global().is_err() {
        log::debug!("rayon global pool already initialized");
    }
    rayon::current_num_threads()
}

#[cfg(not(feature = "rayon"))]
pub fn init_thread_pool(_requested: Option<usize>) -> usize {
    1
}
