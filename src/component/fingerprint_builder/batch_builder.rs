use crate::signal::CancellationToken;
use crate::tools::{FingerprintSet, FrameDecoder, FrameHasher};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub files_processed: usize,
    pub files_failed: usize,
    pub frames_read: u64,
    /// 新加入集合的特徵值數量
    pub added: usize,
    pub cancelled: bool,
}

/// 逐幀解碼樣本影片，把沒見過的特徵值併入集合
pub struct BatchFingerprintBuilder<'a> {
    decoder: &'a dyn FrameDecoder,
    hasher: &'a dyn FrameHasher,
    cancel: &'a CancellationToken,
}

impl<'a> BatchFingerprintBuilder<'a> {
    pub const fn new(
        decoder: &'a dyn FrameDecoder,
        hasher: &'a dyn FrameHasher,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            decoder,
            hasher,
            cancel,
        }
    }

    /// `bound_ms` 為 `None` 時解碼整部影片
    pub fn build(
        &self,
        set: &mut FingerprintSet,
        files: &[PathBuf],
        bound_ms: Option<u64>,
    ) -> BuildReport {
        let mut report = BuildReport::default();

        for file in files {
            if self.cancel.is_cancelled() {
                info!("收到中斷信號，不再處理新檔案");
                report.cancelled = true;
                break;
            }

            info!("分析檔案: {}", file.display());
            match self.fold_file(set, file, bound_ms, &mut report) {
                Ok(fresh) => {
                    info!("新增 {} 個特徵值", fresh.len());
                    report.added += fresh.len();
                    set.extend(fresh.iter());
                    // 中途取消的檔案只保留已收集的特徵值，不計入完成數
                    if !report.cancelled {
                        report.files_processed += 1;
                    }
                }
                Err(e) => {
                    error!("處理檔案失敗 {}: {e:#}", file.display());
                    report.files_failed += 1;
                }
            }

            if report.cancelled {
                break;
            }
        }

        report
    }

    /// 回傳此檔案新發現的特徵值，成功讀完才併入資料庫
    fn fold_file(
        &self,
        known: &FingerprintSet,
        file: &Path,
        bound_ms: Option<u64>,
        report: &mut BuildReport,
    ) -> Result<FingerprintSet> {
        let mut source = self.decoder.open(file)?;
        let progress = progress_bar(bound_ms.or(source.duration_ms()));

        let mut fresh = FingerprintSet::new();
        let mut frame_count = 0u64;
        while let Some(frame) = source.next_frame()? {
            if self.cancel.is_cancelled() {
                info!("收到中斷信號，停止解碼: {}", file.display());
                report.cancelled = true;
                break;
            }

            let ms = frame.timestamp_ms;
            if bound_ms.is_some_and(|bound| ms > bound) {
                break;
            }

            frame_count += 1;
            report.frames_read += 1;
            progress.set_position(ms);

            let fingerprint = self.hasher.fingerprint(&frame)?;
            if !known.contains(fingerprint) && fresh.insert(fingerprint) {
                progress.suspend(|| {
                    info!(
                        "資料庫大小: {} 畫面: {frame_count} 特徵值: {fingerprint} 於 {ms} ms",
                        known.len() + fresh.len()
                    );
                });
            }
        }

        progress.finish_and_clear();
        Ok(fresh)
    }
}

fn progress_bar(length_ms: Option<u64>) -> ProgressBar {
    let Some(length_ms) = length_ms else {
        return ProgressBar::hidden();
    };

    let progress = ProgressBar::new(length_ms);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} ms {msg}") {
        progress.set_style(style);
    }
    progress
}
