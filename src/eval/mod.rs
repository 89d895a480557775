//! Per-frame evaluation data: poses, results, contexts and directors.

pub mod context;
pub mod director;
pub mod pose;
pub mod result;
