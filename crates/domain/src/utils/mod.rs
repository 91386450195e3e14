//! Domain utilities

pub mod phone;
