//! # Draw Module
//!
//! Weighted selection, the draw engine, and treasure value rolling.

pub mod engine;
pub mod value;
pub mod weighted;

pub use engine::*;
pub use value::*;
pub use weighted::*;
