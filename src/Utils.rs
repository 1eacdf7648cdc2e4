//! utility modules of the binary
/// stderr (and optional file) logger set up
pub mod logger;
