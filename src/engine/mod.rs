// src/engine/mod.rs

//! Pure computations over data loaded by the handlers.

pub mod analytics;
pub mod progress;
pub mod quiz;
