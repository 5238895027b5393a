// src/lib.rs

//! Course Monitor Library
//!
//! Watches university course sections and alerts when one becomes open or
//! gains waitlist seats.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
