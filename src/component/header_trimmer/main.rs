use super::cut_point_scanner::{CutPointScanner, ScanResult};
use crate::config::RunConfig;
use crate::error::TrimError;
use crate::signal::CancellationToken;
use crate::tools::{
    FingerprintSet, FingerprintStore, FrameDecoder, FrameHasher, SegmentExtractor,
    SimilarityThreshold, resolve_sources,
};
use anyhow::{Context, Result, anyhow};
use console::style;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimSummary {
    pub total: usize,
    pub success: usize,
    /// 未偵測到片頭而原樣保留
    pub passed: usize,
    pub failed: usize,
    pub cancelled: bool,
}

impl TrimSummary {
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.passed + self.failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Trimmed,
    Passed,
    Cancelled,
}

pub struct HeaderTrimmer<'a> {
    config: &'a RunConfig,
    decoder: &'a dyn FrameDecoder,
    hasher: &'a dyn FrameHasher,
    extractor: &'a dyn SegmentExtractor,
    cancel: CancellationToken,
}

impl<'a> HeaderTrimmer<'a> {
    pub const fn new(
        config: &'a RunConfig,
        decoder: &'a dyn FrameDecoder,
        hasher: &'a dyn FrameHasher,
        extractor: &'a dyn SegmentExtractor,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            decoder,
            hasher,
            extractor,
            cancel,
        }
    }

    pub fn run(&self) -> Result<TrimSummary> {
        let store = FingerprintStore::new(&self.config.database);
        if !store.exists() {
            return Err(TrimError::DatabaseMissing(self.config.database.clone()).into());
        }

        info!("載入特徵資料庫: {}", store.path().display());
        let known = store.load()?;
        info!("已載入 {} 個特徵值", known.len());

        let detection = &self.config.detection;
        let threshold = SimilarityThreshold::from_ratio(
            detection.similarity_ratio,
            detection.threshold_bit_width,
        )?;

        let files = resolve_sources(&self.config.sources, &self.config.extensions);
        info!("共 {} 個影片檔案待處理", files.len());

        let mut summary = TrimSummary::default();
        for file in &files {
            if self.cancel.is_cancelled() {
                info!("收到中斷信號，不再處理新檔案");
                summary.cancelled = true;
                break;
            }

            info!("分析檔案: {}", file.display());
            match self.process_file(&known, threshold, file) {
                Ok(FileOutcome::Trimmed) => {
                    info!("結果: 成功");
                    summary.success += 1;
                }
                Ok(FileOutcome::Passed) => {
                    info!("略過: 未偵測到片頭");
                    summary.passed += 1;
                }
                Ok(FileOutcome::Cancelled) => {
                    info!("收到中斷信號，放棄目前檔案: {}", file.display());
                    summary.cancelled = true;
                    break;
                }
                Err(e) => {
                    error!("處理檔案失敗 {}: {e:#}", file.display());
                    summary.failed += 1;
                }
            }
        }

        summary.total = summary.success + summary.skipped();
        info!(
            "total: {} success: {} skip: {}",
            summary.total,
            summary.success,
            summary.skipped()
        );

        Ok(summary)
    }

    /// 單一檔案的錯誤只影響該檔案，解碼資源在離開時釋放
    fn process_file(
        &self,
        known: &FingerprintSet,
        threshold: SimilarityThreshold,
        file: &Path,
    ) -> Result<FileOutcome> {
        let detection = &self.config.detection;
        let scanner = CutPointScanner::new(
            known,
            threshold,
            detection.max_header_ms,
            detection.sample_interval_ms,
            &self.cancel,
        );

        let result = {
            let mut source = self.decoder.open(file)?;
            scanner.scan(source.as_mut(), self.hasher)?
        };

        if result == ScanResult::Cancelled {
            return Ok(FileOutcome::Cancelled);
        }

        let Some(cut_ms) = result.cut_point_ms(detection.min_cut_ms) else {
            return Ok(FileOutcome::Passed);
        };

        self.cut(file, cut_ms)?;
        Ok(FileOutcome::Trimmed)
    }

    fn cut(&self, file: &Path, cut_ms: u64) -> Result<()> {
        let destination = self.destination_for(file)?;
        let seconds = cut_ms as f64 / 1000.0;

        info!("剪切於: {seconds} 秒");
        self.extractor.extract(file, seconds, &destination)?;

        if self.config.move_after_cut {
            info!("移動: {} -> {}", destination.display(), file.display());
            move_file(&destination, file)?;
        }
        Ok(())
    }

    fn destination_for(&self, file: &Path) -> Result<PathBuf> {
        let file_name = file
            .file_name()
            .ok_or_else(|| anyhow!("無法取得檔案名稱: {}", file.display()))?;
        Ok(self.config.destination.join(file_name))
    }
}

/// 同一檔案系統直接改名，跨裝置則複製後刪除
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    warn!("無法直接改名，改以複製方式移動: {}", from.display());
    copy_then_remove(from, to)
}

fn copy_then_remove(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .with_context(|| format!("無法移動檔案: {} -> {}", from.display(), to.display()))?;
    fs::remove_file(from).with_context(|| format!("無法刪除暫存檔: {}", from.display()))?;
    Ok(())
}

pub fn print_summary(summary: &TrimSummary) {
    println!();
    println!("{}", style("=== 片頭剪除摘要 ===").cyan().bold());
    println!("  總計: {} 個檔案", summary.total);
    println!("  成功: {} 個", style(summary.success).green());
    println!("  略過: {} 個", style(summary.passed).yellow());
    if summary.failed > 0 {
        println!("  失敗: {} 個", style(summary.failed).red());
    }
    if summary.cancelled {
        println!("{}", style("已中斷，剩餘檔案未處理").yellow());
    }
}
