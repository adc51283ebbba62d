use crate::error::TrimError;
use std::path::Path;

pub fn validate_path_exists(path: &Path) -> Result<(), TrimError> {
    if !path.exists() {
        return Err(TrimError::Config(format!("路徑不存在: {}", path.display())));
    }
    Ok(())
}

pub fn validate_directory_exists(path: &Path) -> Result<(), TrimError> {
    validate_path_exists(path)?;
    if !path.is_dir() {
        return Err(TrimError::Config(format!(
            "路徑不是資料夾: {}",
            path.display()
        )));
    }
    Ok(())
}
