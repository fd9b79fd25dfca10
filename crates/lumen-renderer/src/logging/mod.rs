//! Logger setup for binaries and tests.
//!
//! The renderer only talks to the `log` facade. `env_logger` is wired here:
//! - `info`: setup and teardown
//! - `debug`: vertex-array builds, evictions, resource releases
//! - `trace`: per-draw traffic

mod init;

pub use init::{init_logging, LoggingConfig};

#[cfg(test)]
pub(crate) use init::init_test_logging;
