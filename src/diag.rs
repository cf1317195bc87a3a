//! Diagnostic events.
//!
//! With the `tracing` feature the macros are `tracing`'s own; without it they
//! expand to nothing.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
mod noop {
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    pub(crate) use {debug, trace};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop::{debug, trace};
