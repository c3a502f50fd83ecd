// src/services/mod.rs

pub mod lockout;
pub mod mailer;
