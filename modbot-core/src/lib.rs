// src/lib.rs

pub mod cache;
pub mod filtering;

pub use modbot_common::Error;
pub use modbot_common::models;
