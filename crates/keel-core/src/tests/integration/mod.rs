#![cfg(test)]

pub mod common;
pub mod lifecycle_tests;
pub mod config_file_tests;
