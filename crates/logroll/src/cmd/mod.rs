//! Command implementations for the logroll CLI

pub mod check;
pub mod pipe;
