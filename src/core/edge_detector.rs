//! 上升沿检测与验证
//!
//! 检测：对内部bin `i`，若左右相邻bin都有数据，取中心差分
//! `d = value[i+1] - value[i-1]`，`d > k × rms` 即记为候选边沿。
//!
//! 验证：候选边沿之后固定偏移窗口内（默认 +10..+40）的有数据bin
//! 必须全部不低于 `baseline + k × rms`，否则该边沿被拒绝。
//! 被拒绝的索引先收集、后统一删除，不在遍历中修改映射。

use super::waveform::Waveform;
use std::collections::BTreeMap;
use std::ops::Range;

/// 边沿映射：bin索引 → 导数，按索引升序
pub type EdgeMap = BTreeMap<usize, f64>;

/// 边沿检测器
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    /// 检测阈值的噪声倍数
    noise_multiplier: f64,

    /// 验证下限的噪声倍数
    validation_multiplier: f64,

    /// 边沿后验证窗口（相对偏移，左闭右开）
    window: Range<usize>,
}

/// 边沿验证结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeValidation {
    /// 通过验证的边沿
    pub accepted: EdgeMap,

    /// 被拒绝的边沿索引（升序）
    pub rejected: Vec<usize>,
}

impl EdgeValidation {
    /// 最早的有效边沿
    #[inline]
    pub fn first_edge(&self) -> Option<usize> {
        self.accepted.keys().next().copied()
    }
}

impl EdgeDetector {
    pub fn new(noise_multiplier: f64, validation_multiplier: f64, window: Range<usize>) -> Self {
        Self {
            noise_multiplier,
            validation_multiplier,
            window,
        }
    }

    /// 扫描所有内部bin，返回导数超过 `noise_multiplier × rms` 的候选边沿
    pub fn detect(&self, waveform: &Waveform, baseline_rms: f64) -> EdgeMap {
        let threshold = self.noise_multiplier * baseline_rms;
        let samples = waveform.samples();
        let mut edges = EdgeMap::new();

        for ibin in 1..samples.len().saturating_sub(1) {
            let (prev, next) = (&samples[ibin - 1], &samples[ibin + 1]);
            if !(next.is_populated() && prev.is_populated()) {
                continue;
            }
            let derivative = next.value - prev.value;
            if derivative > threshold {
                tracing::trace!(bin = ibin, derivative, "found candidate edge");
                edges.insert(ibin, derivative);
            }
        }

        edges
    }

    /// 验证候选边沿：窗口内任一有数据bin低于下限则拒绝
    ///
    /// 超出波形末尾的窗口bin视为空bin，不参与判断。
    pub fn validate(
        &self,
        waveform: &Waveform,
        mut candidates: EdgeMap,
        baseline: f64,
        baseline_rms: f64,
    ) -> EdgeValidation {
        let floor = baseline + self.validation_multiplier * baseline_rms;

        let rejected: Vec<usize> = candidates
            .keys()
            .copied()
            .filter(|&edge| !self.window_stays_high(waveform, edge, floor))
            .collect();

        for edge in &rejected {
            candidates.remove(edge);
        }

        EdgeValidation {
            accepted: candidates,
            rejected,
        }
    }

    /// 窗口超出波形末端的部分视为空bin，不参与判断
    fn window_stays_high(&self, waveform: &Waveform, edge: usize, floor: f64) -> bool {
        let start = edge.saturating_add(self.window.start);
        let end = edge.saturating_add(self.window.end).min(waveform.len());
        (start..end).all(|ibin| {
            !waveform.is_populated(ibin) || waveform.value(ibin).is_some_and(|v| v >= floor)
        })
    }
}
