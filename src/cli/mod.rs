//! CLI command handling

pub mod notify;
pub mod serve;
pub mod targets;

pub use notify::*;
pub use serve::*;
pub use targets::*;
