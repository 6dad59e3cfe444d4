//! Process-wide logging for the library and the `fitdata` binary.
//!
//! The logger is installed once and lets through whatever `FITDATA_LOG`
//! allows (same directive syntax as `RUST_LOG`, e.g. `fitdata::db=trace`).
//! The global max level is the runtime knob: [`set_log_level`] can raise or
//! lower it after installation.

use log::LevelFilter;
use std::io::Write;

pub const LOG_ENV: &str = "FITDATA_LOG";

/// Installs the stderr logger if it is not installed yet, then caps output
/// at `level`.
pub fn init_logger(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(LevelFilter::Trace)
        .parse_env(env_logger::Env::new().filter(LOG_ENV))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {} - {}",
                buf.timestamp_seconds(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr);

    // Already installed by an earlier call or by the embedding program.
    let _ = builder.try_init();

    log::set_max_level(level);
}

/// Level for a `-v` count: warnings by default, then info, debug, trace.
pub fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Case-insensitive level name; `warning` is accepted for `warn`.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    if level.eq_ignore_ascii_case("warning") {
        return Some(LevelFilter::Warn);
    }
    level.parse().ok()
}

/// Returns false, leaving logging untouched, when `level` is not a known
/// level name.
pub fn set_log_level(level: &str) -> bool {
    match parse_level(level) {
        Some(lvl) => {
            init_logger(lvl);
            true
        }
        None => false,
    }
}
