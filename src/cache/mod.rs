//! # Loader Caches
//!
//! In-memory state written while resources load.
//!
//! ## Architecture
//!
//! ```text
//! PromiseCache       <- key (reference name or URL) -> Task, at most one per key
//! LoadTimeRecorder   <- URL -> elapsed time of the successful fetch
//! ```
//!
//! Both are backed by `DashMap` so that the reserve step is a single atomic
//! insert-if-absent even on a multi-threaded runtime.

pub mod load_times;
pub mod promise_cache;

pub use load_times::LoadTimeRecorder;
pub use promise_cache::{CacheSlot, PromiseCache};
