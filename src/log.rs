// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Log module provides the log backend setup, reference
//! https://docs.rs/log4rs
//!
//! Drawing code only uses the `log` macros; a file or console appender is
//! installed here, or wasm-logger on wasm32.

use log::LevelFilter;

#[cfg(file_log)]
use log4rs::{
    append::{console::ConsoleAppender, file::FileAppender},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

#[cfg(file_log)]
const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} {m}{n}";

/// init logs system, to `file_path` when given, otherwise to stderr
#[allow(unused)]
pub fn init_log(level: LevelFilter, file_path: Option<&str>) -> Result<(), String> {
    #[cfg(wasm)]
    {
        wasm_logger::init(wasm_logger::Config::new(level.to_level().unwrap_or(log::Level::Info)));
        Ok(())
    }
    #[cfg(file_log)]
    {
        let encoder = Box::new(PatternEncoder::new(LOG_PATTERN));
        let appender = match file_path {
            Some(path) => {
                let logfile = FileAppender::builder()
                    .encoder(encoder)
                    .build(path)
                    .map_err(|e| format!("Failed to open log file '{}': {}", path, e))?;
                Appender::builder()
                    .filter(Box::new(ThresholdFilter::new(level)))
                    .build("logfile", Box::new(logfile))
            }
            None => {
                let console = ConsoleAppender::builder().encoder(encoder).build();
                Appender::builder()
                    .filter(Box::new(ThresholdFilter::new(level)))
                    .build("logfile", Box::new(console))
            }
        };
        let config = Config::builder()
            .appender(appender)
            .build(Root::builder().appender("logfile").build(level))
            .map_err(|e| e.to_string())?;
        log4rs::init_config(config).map_err(|e| e.to_string())?;
        Ok(())
    }
    #[cfg(not(any(wasm, file_log)))]
    {
        log::set_max_level(level);
        Ok(())
    }
}
