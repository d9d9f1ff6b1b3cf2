//! # Ergo-Pipeline
//!
//! Streaming assessment of recorded pose data.
//!
//! ## Pipeline Stages
//!
//! 1. **Source**: read raw frames lazily from a tabular CSV export or a
//!    detector JSON-lines export
//! 2. **Adaptation**: normalize each raw frame into a canonical
//!    [`ergo_core::PoseFrame`], marking missing joints absent
//! 3. **Scoring**: compute the aggregate risk score and action level
//! 4. **Persistence**: append one `Frame, Ergonomic Risk Score, Action Level`
//!    row per frame
//!
//! Frames are processed strictly in input order. A malformed input unit is
//! skipped with a warning; a persistence failure aborts the run.

pub mod adapter;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod summary;

pub use adapter::*;
pub use pipeline::*;
pub use sink::*;
pub use source::*;
pub use summary::*;
