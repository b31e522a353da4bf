pub mod audit;
pub mod dispatch;

pub use dispatch::dispatch;
