use super::batch_builder::{BatchFingerprintBuilder, BuildReport};
use crate::config::{OperationMode, RunConfig, seconds_to_ms};
use crate::error::TrimError;
use crate::signal::CancellationToken;
use crate::tools::{FingerprintStore, FrameDecoder, FrameHasher, resolve_sources};
use anyhow::Result;
use console::style;
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub report: BuildReport,
    /// 寫回後資料庫中的特徵值總數
    pub database_size: usize,
}

/// build / append 模式：載入既有資料庫、併入樣本影片的特徵值後整份重寫
pub struct FingerprintBuilder<'a> {
    config: &'a RunConfig,
    decoder: &'a dyn FrameDecoder,
    hasher: &'a dyn FrameHasher,
    cancel: CancellationToken,
}

impl<'a> FingerprintBuilder<'a> {
    pub const fn new(
        config: &'a RunConfig,
        decoder: &'a dyn FrameDecoder,
        hasher: &'a dyn FrameHasher,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            decoder,
            hasher,
            cancel,
        }
    }

    fn bound_ms(&self) -> Result<Option<u64>, TrimError> {
        match self.config.mode {
            OperationMode::Append => match self.config.append_seconds {
                Some(seconds) if seconds > 0 => seconds_to_ms(seconds).map(Some),
                _ => Err(TrimError::Config("-t 必須大於零".to_string())),
            },
            OperationMode::Build => Ok(None),
            OperationMode::Cut => Err(TrimError::Config(
                "cut 模式不能用來建立特徵資料庫".to_string(),
            )),
        }
    }

    pub fn run(&self) -> Result<BuildSummary> {
        let bound_ms = self.bound_ms()?;

        let store = FingerprintStore::new(&self.config.database);
        let mut set = store.load()?;
        if !set.is_empty() {
            info!("已載入 {} 個特徵值: {}", set.len(), store.path().display());
        }

        let files = resolve_sources(&self.config.sources, &self.config.extensions);
        info!("共 {} 個樣本影片", files.len());

        let builder = BatchFingerprintBuilder::new(self.decoder, self.hasher, &self.cancel);
        let report = builder.build(&mut set, &files, bound_ms);
        info!("total new hashes: {}", report.added);

        info!("寫入 {} 個特徵值: {}", set.len(), store.path().display());
        store.rewrite_all(&set)?;

        Ok(BuildSummary {
            report,
            database_size: set.len(),
        })
    }
}

pub fn print_summary(summary: &BuildSummary) {
    let report = &summary.report;
    println!();
    println!("{}", style("=== 特徵資料庫摘要 ===").cyan().bold());
    println!("  處理檔案: {} 個", report.files_processed);
    println!("  讀取畫面: {} 張", report.frames_read);
    println!("  新增特徵值: {} 個", style(report.added).green());
    println!("  資料庫總數: {} 個", summary.database_size);
    if report.files_failed > 0 {
        println!("  失敗: {} 個", style(report.files_failed).red());
    }
    if report.cancelled {
        println!("{}", style("已中斷，已處理的部分仍已寫入").yellow());
    }
}
