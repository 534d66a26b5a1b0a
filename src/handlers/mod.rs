// src/handlers/mod.rs

pub mod alert;
pub mod auth;
pub mod director;
pub mod drill;
pub mod health;
pub mod message;
pub mod parent;
pub mod progress;
pub mod quiz;
pub mod resource;
pub mod student;
pub mod teacher;
pub mod tenant;
pub mod user;
