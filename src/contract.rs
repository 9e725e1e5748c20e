//! Debug-only contract checks.
//!
//! Caller mistakes that the type system cannot rule out (an empty key, asking
//! for statistics of an empty table) are programmer errors rather than runtime
//! conditions. In debug builds they panic at the call site; in release builds,
//! or with the `no-assert` feature, the checks compile to nothing.

/// Assert a caller-facing precondition.
///
/// Active only when `debug_assertions` is on and the `no-assert` feature is
/// off. The condition is not evaluated otherwise, so it must be free of side
/// effects.
macro_rules! contract {
    ($cond:expr, $($msg:tt)+) => {
        #[cfg(all(debug_assertions, not(feature = "no-assert")))]
        {
            assert!($cond, $($msg)+);
        }
    };
}

pub(crate) use contract;
