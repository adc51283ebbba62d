use super::similarity::{Fingerprint, FingerprintSet};
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// 特徵資料庫：純文字，每行一個十進位特徵值，無標頭、無順序
///
/// 單一程序、循序存取，不做任何鎖定
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    path: PathBuf,
}

impl FingerprintStore {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// 檔案不存在時回傳空集合（首次執行）
    pub fn load(&self) -> Result<FingerprintSet> {
        if !self.path.exists() {
            return Ok(FingerprintSet::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("無法讀取特徵資料庫: {}", self.path.display()))?;

        let mut set = FingerprintSet::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line
                .with_context(|| format!("讀取特徵資料庫失敗: {}", self.path.display()))?;
            if line.trim().is_empty() {
                continue;
            }

            let fingerprint: Fingerprint = line.parse().with_context(|| {
                format!(
                    "無法解析特徵資料庫 {} 第 {} 行: {line}",
                    self.path.display(),
                    index + 1
                )
            })?;
            set.insert(fingerprint);
        }

        Ok(set)
    }

    pub fn append(&self, fingerprint: Fingerprint) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("無法開啟特徵資料庫: {}", self.path.display()))?;

        writeln!(file, "{fingerprint}")
            .with_context(|| format!("無法寫入特徵資料庫: {}", self.path.display()))
    }

    /// 清空後重寫整個集合
    pub fn rewrite_all(&self, set: &FingerprintSet) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("無法建立目錄: {}", parent.display()))?;
        }

        let file = File::create(&self.path)
            .with_context(|| format!("無法建立特徵資料庫: {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);

        for fingerprint in set.iter() {
            writeln!(writer, "{fingerprint}")?;
        }

        writer
            .flush()
            .with_context(|| format!("無法寫入特徵資料庫: {}", self.path.display()))
    }
}
