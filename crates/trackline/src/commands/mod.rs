//! Command implementations shared by the CLI and tests.

pub mod import;
pub mod init;
