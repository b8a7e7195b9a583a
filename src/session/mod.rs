//! The two execution contexts sharing the rendering engine.

pub mod batch;
pub mod preview;
pub mod worker;
