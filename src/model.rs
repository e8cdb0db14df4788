//! Landmark data as produced by the sequence service.

/// Landmarks, frames and sequences.
pub mod landmark;
/// Fixed skeletal connection tables.
pub mod topology;
