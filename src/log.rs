//! No-op stand-ins for the `log` macros, used when the `log` feature is off.
//!
//! With the feature on, `crate::log` is the `log` crate itself and these are
//! never compiled. The `__` names keep the macros clear of the built-in
//! `warn` attribute; the re-exports below give them their usual names.

macro_rules! __trace {
    ($($arg:tt)+) => {};
}

macro_rules! __debug {
    ($($arg:tt)+) => {};
}

macro_rules! __warn {
    ($($arg:tt)+) => {};
}

pub(crate) use {__debug as debug, __trace as trace, __warn as warn};
