// lib.rs
pub mod app;
pub mod utils;
