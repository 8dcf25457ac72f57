//! Transformation module.
//!
//! - Normalize: raw CSV row to candidate customer
//! - Pipeline: the import run (read, classify, persist, report)

pub mod normalize;
pub mod pipeline;

pub use normalize::{coerce_age, normalize};
pub use pipeline::*;
