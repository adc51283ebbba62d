use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// 同時寫到標準輸出與日誌檔
struct TeeWriter {
    file: Option<File>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// 初始化日誌，預設等級 info，可用 `RUST_LOG` 覆寫
///
/// 格式: `2024-01-01T12:00:00.000000Z [INFO] 訊息`
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let file = log_file
        .map(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("無法開啟日誌檔: {}", path.display()))
        })
        .transpose()?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let timestamp = buf.timestamp_micros();
            writeln!(buf, "{timestamp} [{}] {}", record.level(), record.args())
        })
        .target(Target::Pipe(Box::new(TeeWriter { file })))
        .try_init()
        .context("日誌系統已初始化")?;

    Ok(())
}
