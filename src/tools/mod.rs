mod ffprobe_info;
mod fingerprint_store;
mod frame_source;
mod path_validator;
mod perceptual_hasher;
mod segment_extractor;
mod similarity;
mod video_scanner;

pub use ffprobe_info::{VideoInfo, get_video_info};
pub use fingerprint_store::FingerprintStore;
pub use frame_source::{
    FfmpegDecoder, FfmpegFrameSource, Frame, FrameDecoder, FrameSource, HASH_INPUT_SIZE,
};
pub use path_validator::{validate_directory_exists, validate_path_exists};
pub use perceptual_hasher::{DctHasher, FrameHasher};
pub use segment_extractor::{FfmpegExtractor, SegmentExtractor};
pub use similarity::{Fingerprint, FingerprintSet, SimilarityThreshold};
pub use video_scanner::{ExtensionFilter, resolve_sources};
