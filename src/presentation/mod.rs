//! HTML produced by the crate itself rather than by bundle content.

pub mod views;
