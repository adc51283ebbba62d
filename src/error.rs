use std::path::PathBuf;
use thiserror::Error;

/// 執行期錯誤分類
///
/// 設定錯誤與資料庫缺失在處理任何檔案前即中止；其餘錯誤以單一檔案為範圍隔離
#[derive(Debug, Error)]
pub enum TrimError {
    #[error("設定錯誤: {0}")]
    Config(String),

    #[error("找不到特徵資料庫: {}", .0.display())]
    DatabaseMissing(PathBuf),

    #[error("路徑不存在: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("解碼失敗 {}: {reason}", .path.display())]
    DecodeFailure { path: PathBuf, reason: String },

    #[error("擷取失敗 {}: {reason}", .path.display())]
    ExtractionFailure { path: PathBuf, reason: String },
}

impl TrimError {
    /// 程式結束碼：設定錯誤為 2，其餘致命錯誤為 1
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            _ => 1,
        }
    }
}
