//! 波形数据模型与导入
//!
//! 波形是固定长度的逐bin聚合测量（均值、均值误差、样本数）。
//! `count == 0` 的bin不含数据，不参与任何统计，但仍占据自己的索引位置
//! （索引即时间坐标）。
//!
//! 数据来源通过 [`ProfileSource`] trait 抽象，对应 profile 直方图的逐bin读取接口。

use serde::{Deserialize, Serialize};

/// 单个bin的聚合测量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveformSample {
    /// bin内的聚合测量值
    pub value: f64,

    /// 聚合测量值的标准误差（算法不使用，仅随数据携带）
    #[serde(default)]
    pub error: f64,

    /// 贡献到该bin的原始样本数量
    pub count: u32,
}

impl WaveformSample {
    pub fn new(value: f64, error: f64, count: u32) -> Self {
        Self {
            value,
            error,
            count,
        }
    }

    /// bin是否携带有效数据
    ///
    /// 非有限值（NaN/inf）的bin同样视为空bin
    #[inline]
    pub fn is_populated(&self) -> bool {
        self.count > 0 && self.value.is_finite()
    }
}

/// 逐bin统计数据源
///
/// 索引从0开始；超出 `bin_count()` 的请求返回0。
pub trait ProfileSource {
    /// 声明的bin数量
    fn bin_count(&self) -> usize;

    /// bin的聚合测量值
    fn bin_content(&self, index: usize) -> f64;

    /// bin的均值误差
    fn bin_error(&self, index: usize) -> f64;

    /// bin的样本数量
    fn bin_entries(&self, index: usize) -> f64;
}

impl ProfileSource for [WaveformSample] {
    fn bin_count(&self) -> usize {
        self.len()
    }

    fn bin_content(&self, index: usize) -> f64 {
        self.get(index).map_or(0.0, |s| s.value)
    }

    fn bin_error(&self, index: usize) -> f64 {
        self.get(index).map_or(0.0, |s| s.error)
    }

    fn bin_entries(&self, index: usize) -> f64 {
        self.get(index).map_or(0.0, |s| s.count as f64)
    }
}

impl ProfileSource for Vec<WaveformSample> {
    fn bin_count(&self) -> usize {
        self.as_slice().bin_count()
    }

    fn bin_content(&self, index: usize) -> f64 {
        self.as_slice().bin_content(index)
    }

    fn bin_error(&self, index: usize) -> f64 {
        self.as_slice().bin_error(index)
    }

    fn bin_entries(&self, index: usize) -> f64 {
        self.as_slice().bin_entries(index)
    }
}

/// 已导入的只读波形
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<WaveformSample>,
    populated_bins: usize,
}

/// 有数据bin上的全局极值
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalExtrema {
    pub max: f64,
    pub min: f64,
}

impl SignalExtrema {
    /// 幅度范围 max - min
    #[inline]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// 分类阈值：min + range / 2
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.min + self.range() / 2.0
    }
}

impl Waveform {
    /// 从数据源导入波形
    ///
    /// 按声明的bin数量逐bin读取；样本数向上取整，任何正的样本数都算作有数据。
    pub fn from_profile<P: ProfileSource + ?Sized>(profile: &P) -> Self {
        let nbins = profile.bin_count();
        let samples = (0..nbins)
            .map(|ibin| {
                let entries = profile.bin_entries(ibin);
                let count = if entries.is_finite() && entries > 0.0 {
                    entries.ceil().min(u32::MAX as f64) as u32
                } else {
                    0
                };
                WaveformSample::new(profile.bin_content(ibin), profile.bin_error(ibin), count)
            })
            .collect();
        Self::from_samples(samples)
    }

    /// 直接从样本数组构建波形
    pub fn from_samples(samples: Vec<WaveformSample>) -> Self {
        let populated_bins = samples.iter().filter(|s| s.is_populated()).count();
        Self {
            samples,
            populated_bins,
        }
    }

    /// 按声明的bin数量补齐或截断（补齐的bin为空bin）
    pub fn with_bin_count(mut self, nbins: usize) -> Self {
        self.samples.resize(nbins, WaveformSample::default());
        self.populated_bins = self.samples.iter().filter(|s| s.is_populated()).count();
        self
    }

    /// bin总数（含空bin）
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 有数据的bin数量
    #[inline]
    pub fn populated_bins(&self) -> usize {
        self.populated_bins
    }

    pub fn samples(&self) -> &[WaveformSample] {
        &self.samples
    }

    /// 指定bin是否有数据；越界索引视为空bin
    #[inline]
    pub fn is_populated(&self, index: usize) -> bool {
        self.samples.get(index).is_some_and(WaveformSample::is_populated)
    }

    /// 指定bin的测量值；越界索引返回None
    #[inline]
    pub fn value(&self, index: usize) -> Option<f64> {
        self.samples.get(index).map(|s| s.value)
    }

    /// 遍历所有有数据bin的测量值（按索引顺序）
    pub fn populated_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples
            .iter()
            .filter(|s| s.is_populated())
            .map(|s| s.value)
    }

    /// 有数据bin上的 max/min；没有任何有数据bin时返回None
    pub fn extrema(&self) -> Option<SignalExtrema> {
        self.populated_values().fold(None, |acc, value| {
            Some(match acc {
                None => SignalExtrema {
                    max: value,
                    min: value,
                },
                Some(e) => SignalExtrema {
                    max: e.max.max(value),
                    min: e.min.min(value),
                },
            })
        })
    }
}
