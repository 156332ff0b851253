// crates/splicer-ui/src/helpers/log.rs
//
// Logger setup for the binary.
//
// In release builds with `windows_subsystem = "windows"` (double-click launch)
// there is no console attached, so stderr output is silently discarded.
// Release builds therefore log to a temp file instead, visible regardless of
// launch mode:
//
//   <temp>/splicer.log  (append-only, shared across sessions)
//
// Debug builds log to stderr. `RUST_LOG` overrides the default `info` filter
// either way.

use std::path::PathBuf;

use env_logger::{Builder, Env, Target};

pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("splicer.log")
}

/// Install the global logger. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();

    if cfg!(not(debug_assertions)) {
        match std::fs::OpenOptions::new().create(true).append(true).open(log_path()) {
            Ok(file) => { builder.target(Target::Pipe(Box::new(file))); }
            // Falling back to stderr is the best we can do without a log file.
            Err(_)   => { builder.target(Target::Stderr); }
        }
    }

    let _ = builder.try_init();
}
