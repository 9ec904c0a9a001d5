//! Keyed throttle engine.
//!
//! A throttle gates an action by a fixed window. The first call for a key
//! runs the action immediately, on the caller's thread, and opens a window;
//! calls arriving before the window elapses are dropped without touching
//! any state.
//!
//! The window is measured from admission time, so a slow action does not
//! extend it. Throttles own no scheduler: [`shutdown`](crate::engine::ManagedEngine::shutdown)
//! only forgets the recorded admissions.

mod builder;
mod handle;
mod state;


pub use builder::ThrottleBuilder;
pub use handle::{Parameterized, Simple, Singleton};
