//! `STRIDED_TRACE=1` diagnostics for the checked entry points.

use std::sync::OnceLock;

static TRACE: OnceLock<bool> = OnceLock::new();

#[inline]
pub(crate) fn trace_enabled() -> bool {
    *TRACE.get_or_init(|| matches!(std::env::var("STRIDED_TRACE"), Ok(ref v) if v == "1"))
}

/// Print a path-selection line to stderr when tracing is enabled.
macro_rules! trace_path {
    ($($arg:tt)*) => {
        if $crate::trace::trace_enabled() {
            eprintln!($($arg)*);
        }
    };
}

pub(crate) use trace_path;
