#![allow(dead_code)]

pub mod provider;
pub mod tracing;
