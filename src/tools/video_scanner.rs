use crate::error::TrimError;
use anyhow::Result;
use log::warn;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 副檔名白名單；未設定時接受所有檔案
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Option<BTreeSet<String>>,
}

impl ExtensionFilter {
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// 解析 "mp4 mkv,.avi" 這類清單，以空白、逗號或句點分隔
    pub fn parse(spec: &str) -> Result<Self> {
        let separator = Regex::new(r"[ ,.]")?;
        let extensions: BTreeSet<String> = separator
            .split(&spec.to_lowercase())
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{ext}"))
            .collect();

        if extensions.is_empty() {
            return Err(TrimError::Config(format!("副檔名清單為空: \"{spec}\"")).into());
        }

        Ok(Self {
            extensions: Some(extensions),
        })
    }

    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(extensions) = &self.extensions else {
            return true;
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

/// 將來源路徑展開成有序的檔案清單
///
/// 檔案直接套用白名單；資料夾遞迴展開並依檔名排序；不存在的路徑記錄警告後略過
pub fn resolve_sources(sources: &[PathBuf], filter: &ExtensionFilter) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for source in sources {
        if source.is_file() {
            if filter.accepts(source) {
                files.push(source.clone());
            }
            continue;
        }

        if !source.is_dir() {
            warn!("{}", TrimError::SourceNotFound(source.clone()));
            continue;
        }

        files.extend(
            WalkDir::new(source)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .filter(|entry| filter.accepts(entry.path()))
                .map(walkdir::DirEntry::into_path),
        );
    }

    files
}
