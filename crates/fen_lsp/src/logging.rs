//! stderr logging; stdout carries the protocol stream.

use log::LevelFilter;

pub const LOG_ENV: &str = "FEN_LOG";

pub fn parse_level(text: &str) -> Option<LevelFilter> {
    match text.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// `FEN_LOG`, falling back to `info` when unset or unreadable.
pub fn level_from_env() -> LevelFilter {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|value| parse_level(&value))
        .unwrap_or(LevelFilter::Info)
}

/// The dispatcher passes everything through; the active level is the global
/// `log` maximum so it can be changed after installation.
pub fn dispatch() -> fern::Dispatch {
    fern::Dispatch::new()
        .level(LevelFilter::Trace)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}: [{}] {}",
                record.level().to_string().to_lowercase(),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr())
}

pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    dispatch().apply()?;
    set_level(level);
    Ok(())
}

pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}
