//! Run output: CSV rendering, console progress/summary, summary sidecar.

pub mod console;
pub mod csv;
pub mod progress;
pub mod summary;
