//! Shared test utilities

#![allow(dead_code)]

pub mod registry;
pub mod scheduler;

pub use registry::MockRegistry;
pub use scheduler::{MockScheduler, instance};
