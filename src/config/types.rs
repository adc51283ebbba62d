use crate::tools::ExtensionFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_DATABASE: &str = "clips.db";
pub const DEFAULT_SOURCE: &str = "in";
pub const DEFAULT_DESTINATION: &str = "out";
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// 完整解碼樣本影片並寫入特徵資料庫
    Build,
    /// 只取樣本影片前 N 秒加入特徵資料庫
    Append,
    /// 偵測片頭並剪掉
    Cut,
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => write!(f, "build"),
            Self::Append => write!(f, "append"),
            Self::Cut => write!(f, "cut"),
        }
    }
}

/// 偵測參數，可由 settings.json 覆寫
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// 兩張畫面被視為相同所需的相似度 (0.0 - 1.0)
    pub similarity_ratio: f64,
    /// 推導門檻用的位元寬度；比較本身永遠使用完整 64 位元
    pub threshold_bit_width: u32,
    /// 片頭必須在此時間內結束
    pub max_header_ms: u64,
    pub sample_interval_ms: u64,
    /// 切點小於等於此值視為沒有片頭
    pub min_cut_ms: u64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            similarity_ratio: 0.8,
            threshold_bit_width: 32,
            max_header_ms: 5 * 60 * 1000,
            sample_interval_ms: 1000,
            min_cut_ms: 3000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: OperationMode,
    pub database: PathBuf,
    pub sources: Vec<PathBuf>,
    pub destination: PathBuf,
    pub extensions: ExtensionFilter,
    pub move_after_cut: bool,
    /// append 模式的取樣秒數
    pub append_seconds: Option<u64>,
    pub detection: DetectionSettings,
}

impl RunConfig {
    /// 以預設值建立，主要供測試與程式化呼叫使用
    #[must_use]
    pub fn new(mode: OperationMode) -> Self {
        Self {
            mode,
            database: PathBuf::from(DEFAULT_DATABASE),
            sources: vec![PathBuf::from(DEFAULT_SOURCE)],
            destination: PathBuf::from(DEFAULT_DESTINATION),
            extensions: ExtensionFilter::allow_all(),
            move_after_cut: false,
            append_seconds: None,
            detection: DetectionSettings::default(),
        }
    }
}
