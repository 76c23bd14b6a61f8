//! Logging macros for the timeline compiler with verbosity level control.
//!
//! Zero-cost when disabled (verbosity=0). Levels:
//! - 0: SILENT
//! - 1: BLOCKS (one line per compiled block and per workout)
//! - 2: STEPS (every emitted step and the rest policy that produced it)
//! - 3: DEBUG (protocol anchors, offset splicing)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_BLOCKS: u8 = 1;
pub const VERBOSITY_STEPS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at BLOCKS level (verbosity >= 1).
///
/// Used for: block summaries, skipped block types, workout totals.
#[macro_export]
macro_rules! log_blocks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_BLOCKS {
            eprintln!("[timeline] {}", format_args!($($arg)*));
        }
    };
}

/// Log at STEPS level (verbosity >= 2).
///
/// Used for: emitted work steps, the rest policy chosen after each one.
#[macro_export]
macro_rules! log_steps {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_STEPS {
            eprintln!("[timeline]   {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
///
/// Used for: ritual anchors, block placement, splice offsets.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[timeline]     {}", format_args!($($arg)*));
        }
    };
}
