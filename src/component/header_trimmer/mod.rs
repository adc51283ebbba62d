//! 片頭剪除元件
//!
//! 以已知片頭畫面的特徵資料庫逐秒比對影片開頭，
//! 找到第一張陌生畫面後以 ffmpeg 無損剪掉之前的內容

mod cut_point_scanner;
mod main;

pub use cut_point_scanner::{CutPointScanner, ScanResult, ScanState};
pub use main::{HeaderTrimmer, TrimSummary, print_summary};
