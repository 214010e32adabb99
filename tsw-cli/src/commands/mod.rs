//! Command implementations for the TSW CLI

pub mod align;
