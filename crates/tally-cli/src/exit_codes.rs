//! Process exit codes.

pub const EXIT_SUCCESS: i32 = 0;
/// Configuration, ingest, or export failure; also clap's own usage-error
/// code, so every fatal path looks the same to callers.
pub const CONFIG_ERROR: i32 = 2;
