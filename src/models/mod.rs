// src/models/mod.rs

pub mod attempt;
pub mod course;
pub mod feedback;
pub mod quiz;
pub mod user;
