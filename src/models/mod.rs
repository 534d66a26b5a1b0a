// src/models/mod.rs

pub mod alert;
pub mod drill;
pub mod message;
pub mod progress;
pub mod quiz;
pub mod resource;
pub mod submission;
pub mod tenant;
pub mod user;
