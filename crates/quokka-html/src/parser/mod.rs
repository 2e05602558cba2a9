//! Tree construction from token streams.

mod core;
pub mod tags;

pub use self::core::TreeBuilder;
