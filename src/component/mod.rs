//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod fingerprint_builder;
pub mod header_trimmer;

pub use fingerprint_builder::FingerprintBuilder;
pub use header_trimmer::HeaderTrimmer;
