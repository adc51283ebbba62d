use crate::component::{FingerprintBuilder, HeaderTrimmer, fingerprint_builder, header_trimmer};
use crate::config::{OperationMode, RunConfig};
use crate::signal::CancellationToken;
use crate::tools::{
    DctHasher, FfmpegDecoder, FfmpegExtractor, FrameDecoder, FrameHasher, SegmentExtractor,
};
use anyhow::Result;
use log::debug;

/// 依模式分派到對應元件
pub fn run_operation(
    config: &RunConfig,
    decoder: &dyn FrameDecoder,
    hasher: &dyn FrameHasher,
    extractor: &dyn SegmentExtractor,
    cancel: &CancellationToken,
) -> Result<()> {
    debug!("{} 模式設定: {config:?}", config.mode);

    match config.mode {
        OperationMode::Cut => {
            let trimmer = HeaderTrimmer::new(config, decoder, hasher, extractor, cancel.clone());
            let summary = trimmer.run()?;
            header_trimmer::print_summary(&summary);
        }
        OperationMode::Build | OperationMode::Append => {
            let builder = FingerprintBuilder::new(config, decoder, hasher, cancel.clone());
            let summary = builder.run()?;
            fingerprint_builder::print_summary(&summary);
        }
    }

    Ok(())
}

/// 使用 ffmpeg / ffprobe 與 DCT 感知雜湊執行
pub fn run_with_ffmpeg(config: &RunConfig, cancel: &CancellationToken) -> Result<()> {
    let hasher = DctHasher::new();
    run_operation(config, &FfmpegDecoder, &hasher, &FfmpegExtractor, cancel)
}
