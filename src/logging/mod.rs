//! # Logging Module
//!
//! Two channels exist. Diagnostics from the library go through `tracing` and
//! are filtered by `RUST_LOG` or the `-v` count (see [`init_tracing`]). Messages
//! meant for the person running `lhm` go through the [`verbose_log!`] and
//! [`info_log!`] macros, which follow the global output mode.
//!
//! With `-q`, stdout only carries changed paths and can be piped on.
//!
//! ## Example
//!
//! ```rust
//! use lhm::logging::{ColorMode, set_verbose};
//! use lhm::{info_log, verbose_log};
//!
//! set_verbose();
//! ColorMode::Never.apply();
//!
//! verbose_log!("Processing file: {}", "example.rs");
//! info_log!("Header replaced: {}", "example.rs");
//! ```

mod modes;

pub use modes::{ColorMode, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// `eprintln!` that only prints with `-v`.
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// `println!` that is silenced by `-q`, colored yellow when supported.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

#[doc(hidden)]
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}

/// Prints `message` to stderr in red. Not affected by `-q`.
pub fn print_error_log(message: &str) {
  eprintln!("{}", message.if_supports_color(Stream::Stderr, |m| m.red()));
}
