//! Per-module switchable logging macros.
//!
//! A module opts in by defining `const ENABLE_LOGS: bool` and then using
//! the crate-root macros:
//!
//! ```rust,ignore
//! const ENABLE_LOGS: bool = true;
//! use crate::log_info;
//!
//! log_info!("extracted {} messages", 3);
//! ```
//!
//! The flag is a plain const, so a module set to `false` compiles its
//! log calls away entirely.

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
