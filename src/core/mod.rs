//! 核心算法模块
//!
//! 包含APV时序分析的核心数据结构和算法实现。

pub mod edge_detector;
pub mod monitorables;
pub mod plateau;
pub mod timing_analyzer;
pub mod waveform;

// 重新导出公共接口
pub use edge_detector::{EdgeDetector, EdgeMap, EdgeValidation};
pub use monitorables::Monitorables;
pub use plateau::{PlateauLevels, PlateauSets, baseline_rms, median_level, rms_from_moments};
pub use timing_analyzer::{AnalysisConfig, Diagnostic, TimingAnalyzer, TimingReport};
pub use waveform::{ProfileSource, SignalExtrema, Waveform, WaveformSample};
