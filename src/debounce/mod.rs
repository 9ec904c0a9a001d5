//! Keyed debounce engine.
//!
//! A debounce delays an action by a fixed quiet period. Every new trigger
//! for a key cancels that key's pending run and schedules a fresh one, so
//! a burst of triggers produces a single run, one quiet period after the
//! last trigger. A key that keeps receiving triggers faster than the quiet
//! period never fires until the burst stops.
//!
//! | Variant | Key | Action receives |
//! |---------|-----|-----------------|
//! | [`Singleton`] | none | nothing |
//! | [`Simple`] | `K` | the key |
//! | [`Parameterized`] | `K` | the key and the value of the last call |
//!
//! Actions run on the scheduler's worker, not on the caller's thread.
//! Panics inside an action are left to the scheduler; the engine neither
//! retries nor logs them.

mod builder;
mod handle;
mod state;


pub use builder::DebounceBuilder;
pub use handle::{Parameterized, Simple, Singleton};
