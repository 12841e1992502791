//! Heuristic signal classifiers.
//!
//! Four independent detectors over the latest message and the trailing turn
//! window. All of them are pure keyword/phrase matchers: a non-match is a
//! normal outcome (`CrisisLevel::None`, `stage: None`, `detected: false`),
//! never an error, and none of them can panic on arbitrary text.

pub mod attention;
pub mod crisis;
pub mod rsd;
pub mod rupture;
