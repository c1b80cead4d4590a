//! baseline / tick mark 平台统计
//!
//! 按阈值把有数据的bin分成两个互斥的多重集，并计算：
//! - 中位数电平（排序后取 `len / 2` 处元素，偶数长度取上中位，不取平均）
//! - baseline 的RMS离散度（根号下为负时钳位到0）

use super::waveform::Waveform;
use serde::Serialize;

/// 按阈值分类后的两个平台样本集
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlateauSets {
    /// 低于阈值的样本
    pub baseline: Vec<f64>,

    /// 大于等于阈值的样本
    pub tick: Vec<f64>,
}

impl PlateauSets {
    /// 按阈值分类所有有数据的bin
    ///
    /// 不限制两侧的相对大小，全部落在一侧也允许，空的一侧电平为0。
    pub fn classify(waveform: &Waveform, threshold: f64) -> Self {
        let (baseline, tick): (Vec<f64>, Vec<f64>) = waveform
            .populated_values()
            .partition(|&value| value < threshold);
        Self { baseline, tick }
    }

    /// 计算两侧中位数电平和baseline离散度（会对样本集排序）
    pub fn levels(&mut self, threshold: f64) -> PlateauLevels {
        let baseline = median_level(&mut self.baseline);
        let tick = median_level(&mut self.tick);
        PlateauLevels {
            threshold,
            baseline,
            tick,
            baseline_rms: baseline_rms(&self.baseline),
            baseline_samples: self.baseline.len(),
            tick_samples: self.tick.len(),
        }
    }
}

/// 平台电平统计结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlateauLevels {
    /// 分类阈值
    pub threshold: f64,

    /// baseline 中位数电平
    pub baseline: f64,

    /// tick mark 中位数电平
    pub tick: f64,

    /// baseline 样本的RMS离散度
    pub baseline_rms: f64,

    /// baseline 样本数量
    pub baseline_samples: usize,

    /// tick mark 样本数量
    pub tick_samples: usize,
}

impl PlateauLevels {
    /// tick mark 高度（tick - baseline）
    #[inline]
    pub fn separation(&self) -> f64 {
        self.tick - self.baseline
    }
}

/// 中位数电平：升序排序后取 `len / 2` 处元素，空集返回0
pub fn median_level(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values[values.len() / 2]
}

/// baseline 样本的RMS离散度：sqrt(E[x²] - E[x]²)，空集返回0
pub fn baseline_rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let (sum, sum_sq) = values
        .iter()
        .fold((0.0, 0.0), |(s, sq), &x| (s + x, sq + x * x));
    rms_from_moments(sum / n, sum_sq / n)
}

/// 由一阶矩和二阶矩计算RMS
///
/// 浮点误差可能使 E[x²] < E[x]²，此时返回0而不是NaN
#[inline]
pub fn rms_from_moments(mean: f64, mean_sq: f64) -> f64 {
    let variance = mean_sq - mean * mean;
    if variance > 0.0 { variance.sqrt() } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::waveform::WaveformSample;

    #[test]
    fn test_median_upper_middle_on_even_length() {
        let mut values = vec![40.0, 10.0, 30.0, 20.0];
        // 偶数长度取索引2（上中位），而不是 (20 + 30) / 2
        assert_eq!(median_level(&mut values), 30.0);
    }

    #[test]
    fn test_median_odd_length() {
        let mut values = vec![5.0, 1.0, 3.0];
        assert_eq!(median_level(&mut values), 3.0);
    }

    #[test]
    fn test_median_empty_is_zero() {
        let mut values: Vec<f64> = Vec::new();
        assert_eq!(median_level(&mut values), 0.0);
    }

    #[test]
    fn test_rms_of_alternating_values() {
        let values: Vec<f64> = (0..100)
            .map(|i| if i % 2 == 0 { 102.0 } else { 98.0 })
            .collect();
        let rms = baseline_rms(&values);
        assert!((rms - 2.0).abs() < 1e-9, "rms = {rms}");
    }

    #[test]
    fn test_rms_negative_radicand_clamped() {
        assert_eq!(rms_from_moments(2.0, 3.9999), 0.0);
        assert_eq!(rms_from_moments(2.0, 4.0), 0.0);
        assert_eq!(baseline_rms(&[]), 0.0);
    }

    #[test]
    fn test_classify_partitions_populated_bins_only() {
        let waveform = Waveform::from_samples(vec![
            WaveformSample::new(100.0, 0.0, 4),
            WaveformSample::new(900.0, 0.0, 0), // 空bin
            WaveformSample::new(500.0, 0.0, 4),
            WaveformSample::new(300.0, 0.0, 4), // 等于阈值 → tick
        ]);

        let sets = PlateauSets::classify(&waveform, 300.0);
        assert_eq!(sets.baseline, vec![100.0]);
        assert_eq!(sets.tick, vec![500.0, 300.0]);
    }

    #[test]
    fn test_levels_from_sets() {
        let mut sets = PlateauSets {
            baseline: vec![12.0, 10.0, 11.0],
            tick: vec![80.0, 90.0],
        };
        let levels = sets.levels(50.0);
        assert_eq!(levels.baseline, 11.0);
        assert_eq!(levels.tick, 90.0);
        assert_eq!(levels.separation(), 79.0);
        assert_eq!(levels.baseline_samples, 3);
        assert_eq!(levels.tick_samples, 2);
        assert!(levels.baseline_rms > 0.0);
    }
}
