pub mod load;
pub mod types;

pub use load::{load_detection_settings, seconds_to_ms, validate_detection_settings};
pub use types::{
    DEFAULT_DATABASE, DEFAULT_DESTINATION, DEFAULT_SETTINGS_FILE, DEFAULT_SOURCE,
    DetectionSettings, OperationMode, RunConfig,
};
