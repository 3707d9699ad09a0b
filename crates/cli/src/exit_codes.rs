//! CLI Exit Code Registry
//!
//! Single source of truth for the exit codes the `rollcall` binary can
//! produce. Exit codes are part of the shell contract; wrapper scripts
//! gate on them, so changing a value is a breaking change.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad args; clap also produces this)    |
//! | 3    | Malformed input table                              |
//! | 4    | Invalid match settings                             |
//! | 5    | File read/write failure                            |
//! | 6    | Review incomplete: names still unresolved          |

/// Success. The command completed and any gates passed.
pub const EXIT_SUCCESS: u8 = 0;

/// General error. Prefer a specific code where one exists.
pub const EXIT_ERROR: u8 = 1;

/// Usage error: bad arguments or the wrong invocation order.
/// clap exits with this code on its own for unparseable command lines.
pub const EXIT_USAGE: u8 = 2;

/// An input table could not be used at all: CSV syntax errors, a header
/// too narrow for the expected layout, or required columns missing.
pub const EXIT_MALFORMED_INPUT: u8 = 3;

/// The match settings failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// A file could not be read or written.
pub const EXIT_IO: u8 = 5;

/// `apply` ran and wrote its outputs, but some names are still
/// unresolved. Totals are not final until review finishes.
pub const EXIT_REVIEW_INCOMPLETE: u8 = 6;
