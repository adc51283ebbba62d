use crate::error::TrimError;
use log::debug;
use std::collections::HashSet;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// 單一畫面的 64 位元感知特徵值
///
/// 所有互相比較的特徵值必須來自同一條 縮放 → 灰階 → 雜湊 流程
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// 兩個特徵值之間不同位元的數量
    #[must_use]
    pub const fn hamming_distance(self, other: Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

impl From<u64> for Fingerprint {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// 相似度門檻：漢明距離嚴格小於此值即視為同一畫面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityThreshold(pub u32);

impl SimilarityThreshold {
    /// `ceil(bit_width * (1 - ratio))`
    pub fn from_ratio(ratio: f64, bit_width: u32) -> Result<Self, TrimError> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(TrimError::Config(format!(
                "相似度必須介於 0 與 1 之間: {ratio}"
            )));
        }
        if bit_width == 0 || bit_width > 64 {
            return Err(TrimError::Config(format!(
                "門檻位元寬度必須介於 1 與 64 之間: {bit_width}"
            )));
        }

        let threshold = (f64::from(bit_width) * (1.0 - ratio)).ceil() as u32;
        Ok(Self(threshold))
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// 已知特徵值集合，持久化的最小單位
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintSet {
    entries: HashSet<Fingerprint>,
}

impl FingerprintSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 新增特徵值，回傳是否為新成員
    pub fn insert(&mut self, fingerprint: Fingerprint) -> bool {
        self.entries.insert(fingerprint)
    }

    #[must_use]
    pub fn contains(&self, fingerprint: Fingerprint) -> bool {
        self.entries.contains(&fingerprint)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Fingerprint> + '_ {
        self.entries.iter().copied()
    }

    /// 完全相同直接命中；否則逐一比對，任一成員距離小於門檻即視為已知
    #[must_use]
    pub fn is_known(&self, candidate: Fingerprint, threshold: SimilarityThreshold) -> bool {
        if self.contains(candidate) {
            debug!("命中特徵值: {candidate}");
            return true;
        }

        let similar = self
            .entries
            .iter()
            .map(|&member| (member, member.hamming_distance(candidate)))
            .find(|&(_, distance)| distance < threshold.value());

        match similar {
            Some((member, distance)) => {
                debug!("相似於: {member} 距離: {distance}");
                true
            }
            None => {
                debug!("新特徵值: {candidate}");
                false
            }
        }
    }
}

impl FromIterator<Fingerprint> for FingerprintSet {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<Fingerprint> for FingerprintSet {
    fn extend<I: IntoIterator<Item = Fingerprint>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
