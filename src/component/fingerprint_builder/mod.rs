//! 特徵資料庫建立元件
//!
//! 逐幀解碼片頭樣本影片，將每張畫面的感知雜湊併入資料庫

mod batch_builder;
mod main;

pub use batch_builder::{BatchFingerprintBuilder, BuildReport};
pub use main::{BuildSummary, FingerprintBuilder, print_summary};
