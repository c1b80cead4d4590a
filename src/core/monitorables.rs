//! APV时序监控量
//!
//! 一次成功分析产生的输出记录，以及其固定格式的文本渲染。

use super::plateau::PlateauLevels;
use serde::Serialize;
use std::fmt;

/// APV时序监控量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Monitorables {
    /// PLL coarse 设置：edge / 24
    pub pll_coarse: u16,

    /// PLL fine 设置：edge % 24
    pub pll_fine: u16,

    /// 时序延迟（bin索引，单位ns）
    pub delay: u32,

    /// 延迟误差（ns），当前固定为0
    pub error: f64,

    /// baseline 中位数（ADC计数）
    pub base: f64,

    /// tick mark 中位数（ADC计数）
    pub peak: f64,

    /// tick mark 高度 peak - base（ADC计数）
    pub height: f64,
}

impl Monitorables {
    /// 由最早的有效边沿和平台电平组装完整监控量
    pub fn from_edge(edge: usize, levels: &PlateauLevels, fine_steps: u16) -> Self {
        let mut mons = Self::default();
        mons.set_timing(edge, fine_steps);
        mons.set_levels(levels);
        mons
    }

    /// 写入 coarse/fine/delay/error
    pub fn set_timing(&mut self, edge: usize, fine_steps: u16) {
        let steps = fine_steps.max(1) as usize;
        self.pll_coarse = (edge / steps).min(u16::MAX as usize) as u16;
        self.pll_fine = (edge % steps) as u16;
        self.delay = edge.min(u32::MAX as usize) as u32;
        self.error = 0.0;
    }

    /// 只写入 base/peak/height（未找到边沿时的部分结果）
    pub fn set_levels(&mut self, levels: &PlateauLevels) {
        self.base = levels.baseline;
        self.peak = levels.tick;
        self.height = levels.separation();
    }

    /// 旧接口投影：[coarse, fine]
    #[inline]
    pub fn pll_settings(&self) -> [u16; 2] {
        [self.pll_coarse, self.pll_fine]
    }
}

impl fmt::Display for Monitorables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "APV TIMING Monitorables:")?;
        writeln!(f, " PLL coarse setting : {}", self.pll_coarse)?;
        writeln!(f, " PLL fine setting   : {}", self.pll_fine)?;
        writeln!(f, " Timing delay   [ns]: {}", self.delay)?;
        writeln!(f, " Error on delay [ns]: {}", self.error)?;
        writeln!(f, " Baseline      [adc]: {}", self.base)?;
        writeln!(f, " Tick peak     [adc]: {}", self.peak)?;
        writeln!(f, " Tick height   [adc]: {}", self.height)
    }
}
