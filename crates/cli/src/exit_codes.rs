//! CLI exit code registry.
//!
//! Exit codes are part of the shell contract; batch scripts rely on them.
//! Per-workbook problems (missing files, unreadable sheets, unmatched rows)
//! never change the exit code. They surface as diagnostics and NaN cells.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | Usage error (bad arguments, bad year range)      |
//! | 3    | Configuration file unreadable or invalid         |
//! | 4    | Input directory missing or not listable          |
//! | 5    | Output (workbook, csv directory, summary) failed |

/// Command completed. Diagnostics may still have been reported.
pub const EXIT_SUCCESS: u8 = 0;

/// Unspecified failure. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Bad arguments, unknown country group, inverted year range.
pub const EXIT_USAGE: u8 = 2;

/// `--config` file could not be read, parsed or validated.
pub const EXIT_CONFIG: u8 = 3;

/// `--directory` does not exist, is not a directory, or cannot be listed.
pub const EXIT_INPUT: u8 = 4;

/// Output file or directory could not be written.
pub const EXIT_WRITE: u8 = 5;
