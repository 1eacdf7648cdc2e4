//! Terminal logger of the binary.
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;
use std::path::Path;

/// Installs the global logger: terminal records go to stderr, so stdout stays free for
/// the generated document. With `log_file` set the records are also written there.
///
/// Returns `false` if a logger was already installed.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> bool {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
            Err(err) => eprintln!("log file {} not created: {}", path.display(), err),
        }
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => true,
        Err(_) => false,
    }
}
