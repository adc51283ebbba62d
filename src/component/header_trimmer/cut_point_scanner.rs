use crate::signal::CancellationToken;
use crate::tools::{FingerprintSet, Frame, FrameHasher, FrameSource, SimilarityThreshold};
use anyhow::Result;
use log::debug;

/// 單一檔案掃描的終止狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    /// 第一個不屬於已知片頭的取樣畫面，即切點
    FrameNovel { at_ms: u64 },
    /// 超過片頭時間上限仍未找到陌生畫面
    WindowExceeded { at_ms: u64 },
    /// 串流結束，帶最後讀到的時間戳（未讀到任何畫面為 0）
    StreamEnded { last_ms: u64 },
    /// 使用者中斷，結果作廢
    Cancelled,
}

impl ScanResult {
    #[must_use]
    pub const fn timestamp_ms(&self) -> Option<u64> {
        match *self {
            Self::FrameNovel { at_ms } | Self::WindowExceeded { at_ms } => Some(at_ms),
            Self::StreamEnded { last_ms } => Some(last_ms),
            Self::Cancelled => None,
        }
    }

    /// 時間戳嚴格大於 `min_cut_ms` 才值得剪；其餘視為沒有片頭
    #[must_use]
    pub fn cut_point_ms(&self, min_cut_ms: u64) -> Option<u64> {
        self.timestamp_ms().filter(|&ms| ms > min_cut_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    Stopped(ScanResult),
}

/// 每秒取樣一張畫面，遇到第一張陌生畫面或邊界即停止
pub struct CutPointScanner<'a> {
    known: &'a FingerprintSet,
    threshold: SimilarityThreshold,
    max_header_ms: u64,
    sample_interval_ms: u64,
    cancel: &'a CancellationToken,
}

impl<'a> CutPointScanner<'a> {
    #[must_use]
    pub const fn new(
        known: &'a FingerprintSet,
        threshold: SimilarityThreshold,
        max_header_ms: u64,
        sample_interval_ms: u64,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            known,
            threshold,
            max_header_ms,
            sample_interval_ms,
            cancel,
        }
    }

    pub fn scan(&self, source: &mut dyn FrameSource, hasher: &dyn FrameHasher) -> Result<ScanResult> {
        let mut cursor = ScanCursor::new(self.sample_interval_ms);

        loop {
            if self.cancel.is_cancelled() {
                return Ok(ScanResult::Cancelled);
            }

            let frame = source.next_frame()?;
            if let ScanState::Stopped(result) = self.step(&mut cursor, frame.as_ref(), hasher)? {
                return Ok(result);
            }
        }
    }

    fn step(
        &self,
        cursor: &mut ScanCursor,
        frame: Option<&Frame>,
        hasher: &dyn FrameHasher,
    ) -> Result<ScanState> {
        let Some(frame) = frame else {
            return Ok(ScanState::Stopped(ScanResult::StreamEnded {
                last_ms: cursor.last_ms,
            }));
        };

        let ms = frame.timestamp_ms;
        cursor.last_ms = ms;
        cursor.frame_count += 1;

        if ms > self.max_header_ms {
            return Ok(ScanState::Stopped(ScanResult::WindowExceeded { at_ms: ms }));
        }

        debug!("讀取畫面: {} 於 {ms} ms", cursor.frame_count);
        if ms < cursor.next_sample_at {
            return Ok(ScanState::Scanning);
        }

        cursor.next_sample_at += self.sample_interval_ms;
        debug!("比對畫面: {} 於 {ms} ms", cursor.frame_count);

        let fingerprint = hasher.fingerprint(frame)?;
        if self.known.is_known(fingerprint, self.threshold) {
            Ok(ScanState::Scanning)
        } else {
            Ok(ScanState::Stopped(ScanResult::FrameNovel { at_ms: ms }))
        }
    }
}

struct ScanCursor {
    next_sample_at: u64,
    last_ms: u64,
    frame_count: u64,
}

impl ScanCursor {
    const fn new(sample_interval_ms: u64) -> Self {
        Self {
            next_sample_at: sample_interval_ms,
            last_ms: 0,
            frame_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Fingerprint;
    use anyhow::bail;
    use std::cell::Cell;

    /// 以畫面第一個像素作為特徵值索引
    struct TableHasher {
        table: Vec<u64>,
        calls: Cell<usize>,
    }

    impl FrameHasher for TableHasher {
        fn fingerprint(&self, frame: &Frame) -> Result<Fingerprint> {
            self.calls.set(self.calls.get() + 1);
            Ok(Fingerprint(self.table[frame.pixels[0] as usize]))
        }
    }

    struct VecSource {
        frames: std::vec::IntoIter<Frame>,
        fail_at_end: bool,
    }

    impl FrameSource for VecSource {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            match self.frames.next() {
                Some(frame) => Ok(Some(frame)),
                None if self.fail_at_end => bail!("corrupt stream"),
                None => Ok(None),
            }
        }
    }

    /// 每 `step_ms` 一張畫面，`index_of(ms)` 決定使用哪個特徵值
    fn source(duration_ms: u64, step_ms: u64, index_of: impl Fn(u64) -> u8) -> VecSource {
        let frames: Vec<Frame> = (0..=duration_ms)
            .step_by(step_ms as usize)
            .map(|ms| Frame {
                timestamp_ms: ms,
                width: 1,
                height: 1,
                pixels: vec![index_of(ms)],
            })
            .collect();
        VecSource {
            frames: frames.into_iter(),
            fail_at_end: false,
        }
    }

    fn hasher(table: &[u64]) -> TableHasher {
        TableHasher {
            table: table.to_vec(),
            calls: Cell::new(0),
        }
    }

    const H: u64 = 0xF0F0_F0F0_0000_0000;

    #[test]
    fn test_empty_database_stops_at_first_sample() {
        let known = FingerprintSet::new();
        let cancel = CancellationToken::new();
        let scanner = CutPointScanner::new(&known, SimilarityThreshold(7), 300_000, 1000, &cancel);

        let result = scanner
            .scan(&mut source(10_000, 250, |_| 0), &hasher(&[H]))
            .unwrap();
        assert_eq!(result, ScanResult::FrameNovel { at_ms: 1000 });
    }

    #[test]
    fn test_novel_frame_after_known_header() {
        let known: FingerprintSet = [Fingerprint(H)].into_iter().collect();
        let cancel = CancellationToken::new();
        let scanner = CutPointScanner::new(&known, SimilarityThreshold(7), 300_000, 1000, &cancel);

        // 距離 10 的畫面從第 5 秒開始
        let table = [H, H ^ 0b11_1111_1111];
        let result = scanner
            .scan(&mut source(20_000, 500, |ms| u8::from(ms >= 5000)), &hasher(&table))
            .unwrap();

        assert_eq!(result, ScanResult::FrameNovel { at_ms: 5000 });
        assert_eq!(result.cut_point_ms(3000), Some(5000));
    }

    #[test]
    fn test_similar_frame_within_threshold_is_known() {
        let known: FingerprintSet = [Fingerprint(H)].into_iter().collect();
        let cancel = CancellationToken::new();
        let scanner = CutPointScanner::new(&known, SimilarityThreshold(7), 8000, 1000, &cancel);

        // 距離 6 < 7，整段都算片頭
        let table = [H ^ 0b11_1111];
        let result = scanner
            .scan(&mut source(20_000, 500, |_| 0), &hasher(&table))
            .unwrap();
        assert_eq!(result, ScanResult::WindowExceeded { at_ms: 8500 });
    }

    #[test]
    fn test_samples_once_per_interval() {
        let known: FingerprintSet = [Fingerprint(H)].into_iter().collect();
        let cancel = CancellationToken::new();
        let scanner = CutPointScanner::new(&known, SimilarityThreshold(7), 300_000, 1000, &cancel);

        let hasher = hasher(&[H]);
        let result = scanner
            .scan(&mut source(10_000, 100, |_| 0), &hasher)
            .unwrap();

        assert_eq!(result, ScanResult::StreamEnded { last_ms: 10_000 });
        assert_eq!(hasher.calls.get(), 10);
    }

    #[test]
    fn test_empty_stream() {
        let known = FingerprintSet::new();
        let cancel = CancellationToken::new();
        let scanner = CutPointScanner::new(&known, SimilarityThreshold(7), 300_000, 1000, &cancel);

        let mut empty = VecSource {
            frames: Vec::new().into_iter(),
            fail_at_end: false,
        };
        let result = scanner.scan(&mut empty, &hasher(&[H])).unwrap();
        assert_eq!(result, ScanResult::StreamEnded { last_ms: 0 });
        assert_eq!(result.cut_point_ms(3000), None);
    }

    #[test]
    fn test_cancelled_before_first_frame() {
        let known = FingerprintSet::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let scanner = CutPointScanner::new(&known, SimilarityThreshold(7), 300_000, 1000, &cancel);

        let result = scanner
            .scan(&mut source(10_000, 500, |_| 0), &hasher(&[H]))
            .unwrap();
        assert_eq!(result, ScanResult::Cancelled);
        assert_eq!(result.timestamp_ms(), None);
        assert_eq!(result.cut_point_ms(0), None);
    }

    #[test]
    fn test_decode_error_propagates() {
        let known: FingerprintSet = [Fingerprint(H)].into_iter().collect();
        let cancel = CancellationToken::new();
        let scanner = CutPointScanner::new(&known, SimilarityThreshold(7), 300_000, 1000, &cancel);

        let mut broken = source(2000, 500, |_| 0);
        broken.fail_at_end = true;
        assert!(scanner.scan(&mut broken, &hasher(&[H])).is_err());
    }

    #[test]
    fn test_cut_point_policy() {
        assert_eq!(ScanResult::FrameNovel { at_ms: 3000 }.cut_point_ms(3000), None);
        assert_eq!(ScanResult::FrameNovel { at_ms: 3001 }.cut_point_ms(3000), Some(3001));
        assert_eq!(
            ScanResult::WindowExceeded { at_ms: 300_033 }.cut_point_ms(3000),
            Some(300_033)
        );
        assert_eq!(ScanResult::StreamEnded { last_ms: 8000 }.cut_point_ms(3000), Some(8000));
    }
}
