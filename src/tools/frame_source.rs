use super::ffprobe_info::get_video_info;
use crate::error::TrimError;
use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

/// 送進感知雜湊前的畫面邊長
pub const HASH_INPUT_SIZE: u32 = 32;

/// 已解碼的灰階畫面
#[derive(Debug, Clone)]
pub struct Frame {
    pub timestamp_ms: u64,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// 依時間戳嚴格遞增輸出畫面
pub trait FrameSource {
    /// `Ok(None)` 表示串流結束
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    fn duration_ms(&self) -> Option<u64> {
        None
    }
}

pub trait FrameDecoder {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>>;
}

/// 透過 ffmpeg 將影片解碼成固定大小的灰階原始畫面
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegDecoder;

impl FrameDecoder for FfmpegDecoder {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>> {
        Ok(Box::new(FfmpegFrameSource::spawn(path)?))
    }
}

pub struct FfmpegFrameSource {
    path: PathBuf,
    child: Child,
    reader: BufReader<ChildStdout>,
    frame_rate: f64,
    duration_ms: Option<u64>,
    frame_index: u64,
    finished: bool,
}

impl FfmpegFrameSource {
    pub fn spawn(path: &Path) -> Result<Self> {
        let info = get_video_info(path).map_err(|e| TrimError::DecodeFailure {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        })?;

        // fps 濾鏡強制輸出固定幀率，時間戳即可由幀序號推得
        let filter = format!(
            "fps={},scale={HASH_INPUT_SIZE}:{HASH_INPUT_SIZE}:flags=area,format=gray",
            info.frame_rate_expr
        );

        let mut child = Command::new("ffmpeg")
            .args(["-hide_banner", "-nostdin", "-loglevel", "error", "-i"])
            .arg(path)
            .args(["-an", "-sn", "-dn", "-vf", &filter])
            .args(["-f", "rawvideo", "-pix_fmt", "gray", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("無法執行 ffmpeg 解碼: {}", path.display()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("無法取得 ffmpeg 輸出: {}", path.display()))?;

        debug!(
            "開始解碼: {} (幀率 {}, 長度 {:?}s)",
            path.display(),
            info.frame_rate_expr,
            info.duration_seconds
        );

        Ok(Self {
            path: path.to_path_buf(),
            child,
            reader: BufReader::new(stdout),
            frame_rate: info.frame_rate,
            duration_ms: info.duration_seconds.map(|s| (s * 1000.0).round() as u64),
            frame_index: 0,
            finished: false,
        })
    }

    fn timestamp_of(&self, index: u64) -> u64 {
        (index as f64 * 1000.0 / self.frame_rate).floor() as u64
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        let status = self
            .child
            .wait()
            .with_context(|| format!("等待 ffmpeg 結束失敗: {}", self.path.display()))?;

        if !status.success() {
            return Err(TrimError::DecodeFailure {
                path: self.path.clone(),
                reason: format!("ffmpeg 結束狀態 {status}"),
            }
            .into());
        }
        Ok(())
    }
}

impl FrameSource for FfmpegFrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }

        let frame_len = (HASH_INPUT_SIZE * HASH_INPUT_SIZE) as usize;
        let mut pixels = vec![0u8; frame_len];

        match self.reader.read_exact(&mut pixels) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.finish()?;
                return Ok(None);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("讀取 ffmpeg 輸出失敗: {}", self.path.display()));
            }
        }

        let timestamp_ms = self.timestamp_of(self.frame_index);
        self.frame_index += 1;

        Ok(Some(Frame {
            timestamp_ms,
            width: HASH_INPUT_SIZE,
            height: HASH_INPUT_SIZE,
            pixels,
        }))
    }

    fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // 提早停止掃描時 ffmpeg 仍在輸出，直接終止並回收
        if let Err(e) = self.child.kill() {
            warn!("無法終止 ffmpeg: {e}");
        }
        let _ = self.child.wait();
    }
}

