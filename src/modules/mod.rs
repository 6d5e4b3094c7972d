//! Modules layer - Infrastructure components
//!
//! Contains adapters for the host environment, currently file storage.

pub mod storage;
