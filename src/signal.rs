use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 全域協作式中斷旗標
///
/// 信號處理器只負責翻轉旗標，各元件在檔案邊界與逐幀迴圈中輪詢
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

pub fn setup_shutdown_signal() -> Result<CancellationToken> {
    let token = CancellationToken::new();
    let handler_token = token.clone();

    // 處理器內不做任何 I/O
    ctrlc::set_handler(move || handler_token.cancel()).context("無法設定 Ctrl-C 處理器")?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }
}
