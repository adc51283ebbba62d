use super::frame_source::{Frame, HASH_INPUT_SIZE};
use super::similarity::Fingerprint;
use anyhow::{Result, bail};
use rustdct::{Dct2, DctPlanner, TransformType2And3};
use std::sync::Arc;

const SIZE: usize = HASH_INPUT_SIZE as usize;
/// 只取低頻區塊 8x8
const BLOCK: usize = 8;

pub trait FrameHasher {
    fn fingerprint(&self, frame: &Frame) -> Result<Fingerprint>;
}

/// DCT 感知雜湊 (pHash)
///
/// 32x32 灰階 → 二維正規化 DCT-II → 左上 8x8 係數 → 大於平均值者設為 1，
/// 以 8 bytes big-endian 的方式排列成 64 位元整數
pub struct DctHasher {
    dct: Arc<dyn TransformType2And3<f32>>,
}

impl DctHasher {
    #[must_use]
    pub fn new() -> Self {
        let mut planner = DctPlanner::new();
        Self {
            dct: planner.plan_dct2(SIZE),
        }
    }

    /// 以區塊平均縮放到 32x32
    fn resample(frame: &Frame) -> Result<Vec<f32>> {
        let width = frame.width as usize;
        let height = frame.height as usize;
        if width == 0 || height == 0 || frame.pixels.len() < width * height {
            bail!(
                "畫面資料不完整: {}x{}，共 {} bytes",
                frame.width,
                frame.height,
                frame.pixels.len()
            );
        }

        if width == SIZE && height == SIZE {
            return Ok(frame.pixels[..SIZE * SIZE].iter().map(|&p| f32::from(p)).collect());
        }

        let mut samples = vec![0f32; SIZE * SIZE];
        for oy in 0..SIZE {
            let y_start = oy * height / SIZE;
            let y_end = ((oy + 1) * height / SIZE).max(y_start + 1).min(height);
            for ox in 0..SIZE {
                let x_start = ox * width / SIZE;
                let x_end = ((ox + 1) * width / SIZE).max(x_start + 1).min(width);

                let mut sum = 0u32;
                let mut count = 0u32;
                for py in y_start..y_end {
                    let row = &frame.pixels[py * width..(py + 1) * width];
                    for &pixel in &row[x_start..x_end] {
                        sum += u32::from(pixel);
                        count += 1;
                    }
                }
                samples[oy * SIZE + ox] = sum as f32 / count.max(1) as f32;
            }
        }
        Ok(samples)
    }

    /// 每列做一次 DCT 後轉置，做兩次即為二維 DCT
    fn dct_2d(&self, samples: &mut [f32]) {
        let mut transposed = vec![0f32; SIZE * SIZE];
        for _ in 0..2 {
            for row in samples.chunks_exact_mut(SIZE) {
                self.dct.process_dct2(row);
                normalize(row);
            }
            for y in 0..SIZE {
                for x in 0..SIZE {
                    transposed[x * SIZE + y] = samples[y * SIZE + x];
                }
            }
            samples.copy_from_slice(&transposed);
        }
    }
}

impl Default for DctHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// rustdct 的 DCT-II 未正規化，換算成正交版本
fn normalize(row: &mut [f32]) {
    let scale = (2.0 / SIZE as f32).sqrt();
    for value in row.iter_mut() {
        *value *= scale;
    }
    row[0] *= std::f32::consts::FRAC_1_SQRT_2;
}

impl FrameHasher for DctHasher {
    fn fingerprint(&self, frame: &Frame) -> Result<Fingerprint> {
        let mut samples = Self::resample(frame)?;
        self.dct_2d(&mut samples);

        let block: Vec<f32> = (0..BLOCK)
            .flat_map(|v| samples[v * SIZE..v * SIZE + BLOCK].iter().copied())
            .collect();
        let mean = block.iter().sum::<f32>() / block.len() as f32;

        let mut hash = 0u64;
        for (k, &coefficient) in block.iter().enumerate() {
            if coefficient > mean {
                let byte = k / 8;
                let bit = k % 8;
                hash |= 1 << ((7 - byte) * 8 + bit);
            }
        }

        Ok(Fingerprint(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32, pixel: impl Fn(u32, u32) -> u8) -> Frame {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| pixel(x, y))
            .collect();
        Frame {
            timestamp_ms: 0,
            width,
            height,
            pixels,
        }
    }

    #[test]
    fn test_black_frame_hashes_to_zero() {
        let hasher = DctHasher::new();
        let hash = hasher.fingerprint(&frame(32, 32, |_, _| 0)).unwrap();
        assert_eq!(hash, Fingerprint(0));
    }

    #[test]
    fn test_uniform_frame_sets_only_dc_bit() {
        let hasher = DctHasher::new();
        let hash = hasher.fingerprint(&frame(32, 32, |_, _| 128)).unwrap();
        assert_eq!(hash, Fingerprint(1 << 56));
    }

    #[test]
    fn test_resampled_frame_matches_native_size() {
        let hasher = DctHasher::new();
        let native = hasher
            .fingerprint(&frame(32, 32, |x, _| if x < 16 { 20 } else { 220 }))
            .unwrap();
        let larger = hasher
            .fingerprint(&frame(64, 64, |x, _| if x < 32 { 20 } else { 220 }))
            .unwrap();
        assert_eq!(native, larger);
    }

    #[test]
    fn test_different_content_different_hash() {
        let hasher = DctHasher::new();
        let left_dark = hasher
            .fingerprint(&frame(32, 32, |x, _| if x < 16 { 20 } else { 220 }))
            .unwrap();
        let top_dark = hasher
            .fingerprint(&frame(32, 32, |_, y| if y < 16 { 20 } else { 220 }))
            .unwrap();
        assert_ne!(left_dark, top_dark);
    }

    #[test]
    fn test_truncated_frame_is_error() {
        let hasher = DctHasher::new();
        let mut broken = frame(32, 32, |_, _| 0);
        broken.pixels.truncate(10);
        assert!(hasher.fingerprint(&broken).is_err());
    }
}
