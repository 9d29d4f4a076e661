//! Observation data: raw dataset records turned into validated samples.

pub mod sample;

pub use sample::*;
