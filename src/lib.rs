//! APV Timing Tool
//!
//! 从探测器读出波形（逐bin聚合的均值、误差、样本数）中定位 tick mark 上升沿，
//! 推导 PLL coarse/fine 延迟设置和信号质量监控量。
//!
//! ## 核心流程
//! - 有数据bin上的 max/min，阈值 = min + range/2
//! - baseline / tick mark 分类与中位数电平（上中位规则）
//! - baseline RMS 噪声估计
//! - 中心差分边沿检测（导数 > 5 × rms）
//! - 边沿后 +10..+40 窗口验证
//! - 最早有效边沿 → coarse = edge / 24, fine = edge % 24

pub mod core;
pub mod error;
pub mod tools;

// 重新导出核心类型
pub use core::{
    AnalysisConfig, Monitorables, ProfileSource, TimingAnalyzer, TimingReport, Waveform,
    WaveformSample,
};
pub use error::{DiagnosticKind, TimingError, TimingResult};
