//! # drift-detect
//!
//! Cheap, local topic drift detection. No network, no LLM.
//!
//! ## Features
//! - Text normalization into lowercase word tokens
//! - Jaccard similarity over normalized word sets
//! - Drift verdict for a topic title against a recent message window
//!
//! Everything here is pure and total: any input produces a result.

pub mod detector;
pub mod normalize;
pub mod similarity;

pub use detector::{detect_drift, DriftAssessment, DriftDetector};
pub use drift_types::DriftConfig;
pub use normalize::{normalize, token_set};
pub use similarity::{jaccard, similarity};
