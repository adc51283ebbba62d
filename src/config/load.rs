use crate::cli::Cli;
use crate::config::types::{
    DEFAULT_SETTINGS_FILE, DEFAULT_SOURCE, DetectionSettings, OperationMode, RunConfig,
};
use crate::error::TrimError;
use crate::tools::{
    ExtensionFilter, SimilarityThreshold, validate_directory_exists, validate_path_exists,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

impl RunConfig {
    /// 由命令列參數建立設定，所有檢查都在處理任何檔案前完成
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let mode = if cli.cut {
            OperationMode::Cut
        } else if cli.add {
            OperationMode::Append
        } else {
            OperationMode::Build
        };

        let sources = if cli.inputs.is_empty() {
            vec![PathBuf::from(DEFAULT_SOURCE)]
        } else {
            for input in &cli.inputs {
                validate_path_exists(input)?;
            }
            cli.inputs
        };

        if mode == OperationMode::Cut {
            validate_directory_exists(&cli.output)?;
        }

        let append_seconds = match (mode, cli.time) {
            (OperationMode::Append, Some(seconds)) if seconds > 0 => Some(seconds.unsigned_abs()),
            (OperationMode::Append, _) => {
                return Err(TrimError::Config("-t 必須大於零".to_string()).into());
            }
            (_, Some(seconds)) if seconds > 0 => Some(seconds.unsigned_abs()),
            _ => None,
        };
        if let Some(seconds) = append_seconds {
            seconds_to_ms(seconds)?;
        }

        let extensions = match cli.extensions.as_deref() {
            Some(spec) => ExtensionFilter::parse(spec)?,
            None => ExtensionFilter::allow_all(),
        };

        let mut detection = load_detection_settings(cli.settings.as_deref())?;
        if let Some(ratio) = cli.similarity {
            detection.similarity_ratio = ratio;
        }
        if let Some(seconds) = cli.max_header_secs {
            detection.max_header_ms = seconds_to_ms(seconds)?;
        }
        validate_detection_settings(&detection)?;

        Ok(Self {
            mode,
            database: cli.database,
            sources,
            destination: cli.output,
            extensions,
            move_after_cut: cli.move_after_cut,
            append_seconds,
            detection,
        })
    }
}

/// 指定的設定檔必須存在；未指定時讀取工作目錄下的 settings.json（若有）
pub fn load_detection_settings(path: Option<&Path>) -> Result<DetectionSettings> {
    let path = match path {
        Some(path) => {
            validate_path_exists(path)?;
            path
        }
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if !default_path.exists() {
                return Ok(DetectionSettings::default());
            }
            default_path
        }
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings from {}", path.display()))
}

/// 秒轉毫秒，溢位視為設定錯誤
pub fn seconds_to_ms(seconds: u64) -> Result<u64, TrimError> {
    seconds
        .checked_mul(1000)
        .ok_or_else(|| TrimError::Config(format!("秒數過大: {seconds}")))
}

pub fn validate_detection_settings(settings: &DetectionSettings) -> Result<(), TrimError> {
    SimilarityThreshold::from_ratio(settings.similarity_ratio, settings.threshold_bit_width)?;

    if settings.sample_interval_ms == 0 {
        return Err(TrimError::Config("取樣間隔必須大於零".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<RunConfig> {
        let cli = Cli::try_parse_from(std::iter::once("intro_trimmer").chain(args.iter().copied()))?;
        RunConfig::from_cli(cli)
    }

    fn config_error(result: Result<RunConfig>) -> bool {
        matches!(
            result.unwrap_err().downcast_ref::<TrimError>(),
            Some(TrimError::Config(_))
        )
    }

    #[test]
    fn test_append_requires_positive_time() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().to_str().unwrap();

        assert!(config_error(parse(&["-a", "-i", input])));
        assert!(config_error(parse(&["-a", "-i", input, "-t", "0"])));
        assert!(config_error(parse(&["-a", "-i", input, "-t", "-3"])));

        let config = parse(&["-a", "-i", input, "-t", "30"]).unwrap();
        assert_eq!(config.mode, OperationMode::Append);
        assert_eq!(config.append_seconds, Some(30));
    }

    #[test]
    fn test_missing_input_is_config_error() {
        assert!(config_error(parse(&["-b", "-i", "/nonexistent/video/dir"])));
    }

    #[test]
    fn test_cut_requires_existing_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().to_str().unwrap();
        let missing = temp_dir.path().join("missing");

        assert!(config_error(parse(&[
            "-c",
            "-i",
            input,
            "-o",
            missing.to_str().unwrap()
        ])));

        let config = parse(&["-c", "-i", input, "-o", input, "-e", "mp4"]).unwrap();
        assert_eq!(config.mode, OperationMode::Cut);
        assert!(config.extensions.accepts(Path::new("a.mp4")));
        assert!(!config.extensions.accepts(Path::new("a.mkv")));
    }

    #[test]
    fn test_settings_file_and_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().to_str().unwrap();
        let settings_path = temp_dir.path().join("detect.json");
        fs::write(
            &settings_path,
            r#"{"similarity_ratio": 0.9, "max_header_ms": 60000}"#,
        )
        .unwrap();

        let config = parse(&[
            "-b",
            "-i",
            input,
            "--settings",
            settings_path.to_str().unwrap(),
            "--max-header-secs",
            "90",
        ])
        .unwrap();

        assert!((config.detection.similarity_ratio - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.detection.max_header_ms, 90_000);
        assert_eq!(config.detection.sample_interval_ms, 1000);
    }

    #[test]
    fn test_oversized_seconds_are_config_errors() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().to_str().unwrap();

        assert!(config_error(parse(&[
            "-b",
            "-i",
            input,
            "--max-header-secs",
            "18446744073709552",
        ])));
        assert!(config_error(parse(&[
            "-a",
            "-i",
            input,
            "-t",
            "9223372036854775807",
        ])));

        let config = parse(&["-b", "-i", input, "--max-header-secs", "600"]).unwrap();
        assert_eq!(config.detection.max_header_ms, 600_000);
        assert_eq!(seconds_to_ms(u64::MAX / 1000).unwrap(), u64::MAX / 1000 * 1000);
    }

    #[test]
    fn test_invalid_similarity_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().to_str().unwrap();
        assert!(config_error(parse(&["-b", "-i", input, "--similarity", "1.5"])));
    }
}
