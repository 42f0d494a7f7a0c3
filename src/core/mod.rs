//! Core types: build types, host platforms and CMake generators.

pub mod build_type;
pub mod generator;
pub mod platform;

pub use build_type::BuildType;
pub use generator::Generator;
pub use platform::HostOs;
