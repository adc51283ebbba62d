use crate::error::TrimError;
use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 無損擷取：從指定秒數到檔尾寫成新檔
pub trait SegmentExtractor {
    fn extract(&self, source: &Path, start_seconds: f64, destination: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegExtractor;

impl FfmpegExtractor {
    #[must_use]
    pub fn build_command(source: &Path, start_seconds: f64, destination: &Path) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-i"])
            .arg(source)
            .args(["-c:v", "copy", "-c:a", "copy", "-ss"])
            .arg(format!("{start_seconds}"))
            .arg("-y")
            .arg(destination);
        cmd
    }
}

impl SegmentExtractor for FfmpegExtractor {
    fn extract(&self, source: &Path, start_seconds: f64, destination: &Path) -> Result<()> {
        if same_file(source, destination) {
            return Err(TrimError::ExtractionFailure {
                path: source.to_path_buf(),
                reason: "輸出路徑與來源相同".to_string(),
            }
            .into());
        }

        let mut cmd = Self::build_command(source, start_seconds, destination);
        debug!("exec: {cmd:?}");

        let status = cmd
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("無法執行 ffmpeg 擷取: {}", source.display()))?;

        if !status.success() {
            return Err(TrimError::ExtractionFailure {
                path: source.to_path_buf(),
                reason: format!("ffmpeg 結束狀態 {status}"),
            }
            .into());
        }

        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    let canonical = |p: &Path| -> Option<PathBuf> { p.canonicalize().ok() };
    match (canonical(a), canonical(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
