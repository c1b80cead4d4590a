//! APV时序分析引擎
//!
//! 线性流水线，每一步都可能提前终止：
//! 1. 导入逐bin统计，计算有数据bin上的 max/min
//! 2. 校验bin数量和信号范围
//! 3. 按 min + range/2 分类 baseline / tick mark
//! 4. 中位数电平 + 间隔校验
//! 5. baseline RMS
//! 6. 中心差分边沿检测
//! 7. 边沿后窗口验证
//! 8. 由最早的有效边沿组装监控量
//!
//! 引擎无状态，可在多个线程中对不同波形并发调用。

use super::edge_detector::{EdgeDetector, EdgeMap};
use super::monitorables::Monitorables;
use super::plateau::{PlateauLevels, PlateauSets};
use super::waveform::{ProfileSource, SignalExtrema, Waveform};
use crate::error::{DiagnosticKind, TimingError, TimingResult, invalid_config};
use crate::tools::constants::timing_analysis;
use serde::Serialize;

/// 分析参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisConfig {
    /// 最少bin数量
    pub min_bins: usize,

    /// 最小全局幅度范围
    pub min_range: f64,

    /// tick/baseline 最小间隔
    pub min_separation: f64,

    /// 边沿检测噪声倍数
    pub edge_noise_multiplier: f64,

    /// 边沿验证噪声倍数
    pub validation_noise_multiplier: f64,

    /// 验证窗口起点偏移（含）
    pub window_start: usize,

    /// 验证窗口终点偏移（不含）
    pub window_end: usize,

    /// PLL fine 步数
    pub pll_fine_steps: u16,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_bins: timing_analysis::MIN_BIN_COUNT,
            min_range: timing_analysis::MIN_SIGNAL_RANGE,
            min_separation: timing_analysis::MIN_TICK_SEPARATION,
            edge_noise_multiplier: timing_analysis::EDGE_NOISE_MULTIPLIER,
            validation_noise_multiplier: timing_analysis::VALIDATION_NOISE_MULTIPLIER,
            window_start: timing_analysis::POST_EDGE_WINDOW_START,
            window_end: timing_analysis::POST_EDGE_WINDOW_END,
            pll_fine_steps: timing_analysis::PLL_FINE_STEPS,
        }
    }
}

impl AnalysisConfig {
    /// 校验参数组合
    pub fn validate(&self) -> TimingResult<()> {
        if self.window_start >= self.window_end {
            return Err(invalid_config(format!(
                "验证窗口为空 / empty validation window: {}..{}",
                self.window_start, self.window_end
            )));
        }
        if self.window_end > timing_analysis::MAX_BIN_COUNT {
            return Err(invalid_config(format!(
                "验证窗口超出最大bin数 / validation window exceeds {} bins: {}..{}",
                timing_analysis::MAX_BIN_COUNT,
                self.window_start,
                self.window_end
            )));
        }
        if self.pll_fine_steps == 0 {
            return Err(invalid_config("PLL fine 步数必须大于0 / pll_fine_steps must be > 0"));
        }
        let non_negative = [
            ("min_range", self.min_range),
            ("min_separation", self.min_separation),
            ("edge_noise_multiplier", self.edge_noise_multiplier),
            ("validation_noise_multiplier", self.validation_noise_multiplier),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid_config(format!(
                    "{name} 必须为非负有限值 / {name} must be finite and non-negative: {value}"
                )));
            }
        }
        Ok(())
    }
}

/// 分析过程中记录的非终止诊断
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    fn emit(kind: DiagnosticKind, message: String) -> Self {
        tracing::warn!(check = kind.check_name(), "{message}");
        Self { kind, message }
    }
}

/// 单次分析报告
#[derive(Debug, Clone, PartialEq)]
pub struct TimingReport {
    /// 监控量；未找到边沿时只有 base/peak/height 有效
    pub monitorables: Monitorables,

    /// 最早的有效边沿
    pub first_edge: Option<usize>,

    /// bin总数
    pub total_bins: usize,

    /// 有数据的bin数量
    pub populated_bins: usize,

    /// 全局极值
    pub extrema: SignalExtrema,

    /// 平台电平统计
    pub levels: PlateauLevels,

    /// 所有候选边沿（验证前）
    pub candidates: EdgeMap,

    /// 通过验证的边沿
    pub edges: EdgeMap,

    /// 被拒绝的边沿索引
    pub rejected_edges: Vec<usize>,

    /// 非终止诊断
    pub diagnostics: Vec<Diagnostic>,
}

impl TimingReport {
    /// 是否找到有效边沿（监控量完整）
    #[inline]
    pub fn edge_found(&self) -> bool {
        self.first_edge.is_some()
    }

    /// 是否包含指定类别的诊断
    pub fn has_diagnostic(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }
}

/// APV时序分析器
#[derive(Debug, Clone, Default)]
pub struct TimingAnalyzer {
    config: AnalysisConfig,
}

impl TimingAnalyzer {
    /// 创建分析器（校验配置）
    pub fn new(config: AnalysisConfig) -> TimingResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 分析一个波形
    ///
    /// bin数量不足、信号范围过小、平台间隔过小时返回错误；
    /// 其余情况返回报告，未找到边沿时报告中带 `NoEdgesFound` 诊断。
    pub fn analyze<P: ProfileSource + ?Sized>(&self, profile: &P) -> TimingResult<TimingReport> {
        let waveform = Waveform::from_profile(profile);
        self.analyze_waveform(&waveform)
    }

    /// 分析并写入调用方的监控量记录
    ///
    /// 终止性失败时记录保持不变；未找到边沿时只写入 base/peak/height。
    pub fn analyze_into<P: ProfileSource + ?Sized>(
        &self,
        profile: &P,
        mons: &mut Monitorables,
    ) -> TimingResult<TimingReport> {
        let report = self.analyze(profile)?;
        if report.edge_found() {
            *mons = report.monitorables;
        } else {
            mons.set_levels(&report.levels);
        }
        Ok(report)
    }

    /// 旧接口：只分析第一个波形，返回 [pll_coarse, pll_fine]
    pub fn analyze_legacy<P: ProfileSource>(&self, profiles: &[P]) -> Vec<u16> {
        let mut mons = Monitorables::default();
        if let Some(first) = profiles.first() {
            // 失败已通过日志报告，旧接口只返回默认值
            let _ = self.analyze_into(first, &mut mons);
        }
        mons.pll_settings().to_vec()
    }

    /// 分析已导入的波形
    pub fn analyze_waveform(&self, waveform: &Waveform) -> TimingResult<TimingReport> {
        let cfg = &self.config;
        let nbins = waveform.len();
        tracing::debug!(
            bins = nbins,
            populated = waveform.populated_bins(),
            "waveform ingested"
        );

        if nbins < cfg.min_bins {
            return Err(fail(TimingError::InsufficientBins {
                bins: nbins,
                minimum: cfg.min_bins,
            }));
        }

        let extrema = waveform
            .extrema()
            .unwrap_or(SignalExtrema { max: 0.0, min: 0.0 });
        let range = extrema.range();
        if range < cfg.min_range {
            return Err(fail(TimingError::RangeTooSmall {
                range,
                minimum: cfg.min_range,
            }));
        }
        let threshold = extrema.threshold();
        tracing::debug!(
            max = extrema.max,
            min = extrema.min,
            range,
            threshold,
            "signal range"
        );

        let mut sets = PlateauSets::classify(waveform, threshold);
        let levels = sets.levels(threshold);
        tracing::debug!(
            tick = levels.tick,
            baseline = levels.baseline,
            tick_samples = levels.tick_samples,
            baseline_samples = levels.baseline_samples,
            rms = levels.baseline_rms,
            "plateau levels"
        );

        if levels.separation() < cfg.min_separation {
            return Err(fail(TimingError::PlateauSeparationTooSmall {
                tick: levels.tick,
                baseline: levels.baseline,
                separation: levels.separation(),
                minimum: cfg.min_separation,
            }));
        }

        let detector = EdgeDetector::new(
            cfg.edge_noise_multiplier,
            cfg.validation_noise_multiplier,
            cfg.window_start..cfg.window_end,
        );
        let candidates = detector.detect(waveform, levels.baseline_rms);
        let validation = detector.validate(
            waveform,
            candidates.clone(),
            levels.baseline,
            levels.baseline_rms,
        );
        tracing::debug!(
            candidates = candidates.len(),
            accepted = validation.accepted.len(),
            rejected = validation.rejected.len(),
            "edge scan"
        );

        let mut diagnostics: Vec<Diagnostic> = validation
            .rejected
            .iter()
            .map(|&edge| {
                Diagnostic::emit(
                    DiagnosticKind::InvalidEdgeRejected,
                    format!(
                        "边沿后存在低于阈值的样本 / Found samples below threshold following a rising edge at bin {edge}"
                    ),
                )
            })
            .collect();

        let first_edge = validation.first_edge();
        let monitorables = match first_edge {
            Some(edge) => Monitorables::from_edge(edge, &levels, cfg.pll_fine_steps),
            None => {
                diagnostics.push(Diagnostic::emit(
                    DiagnosticKind::NoEdgesFound,
                    "未找到tick mark / No tick marks found".to_string(),
                ));
                let mut mons = Monitorables::default();
                mons.set_levels(&levels);
                mons
            }
        };

        Ok(TimingReport {
            monitorables,
            first_edge,
            total_bins: nbins,
            populated_bins: waveform.populated_bins(),
            extrema,
            levels,
            candidates,
            edges: validation.accepted,
            rejected_edges: validation.rejected,
            diagnostics,
        })
    }
}

/// 在诊断通道上报告终止性错误
fn fail(err: TimingError) -> TimingError {
    let check = DiagnosticKind::from_error(&err).map_or("analysis", |k| k.check_name());
    tracing::warn!(check, "{err}");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::waveform::WaveformSample;

    fn step_samples(nbins: usize, step: usize) -> Vec<WaveformSample> {
        (0..nbins)
            .map(|i| {
                let level = if i < step { 100.0 } else { 500.0 };
                let jitter = if i % 2 == 0 { 2.0 } else { -2.0 };
                WaveformSample::new(level + jitter, 0.6, 10)
            })
            .collect()
    }

    #[test]
    fn test_default_config_matches_constants() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.min_bins, 100);
        assert_eq!(cfg.min_range, 50.0);
        assert_eq!(cfg.min_separation, 50.0);
        assert_eq!(cfg.edge_noise_multiplier, 5.0);
        assert_eq!(cfg.window_start..cfg.window_end, 10..40);
        assert_eq!(cfg.pll_fine_steps, 24);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = AnalysisConfig {
            window_start: 40,
            window_end: 10,
            ..Default::default()
        };
        assert!(matches!(
            TimingAnalyzer::new(cfg),
            Err(TimingError::InvalidConfig(_))
        ));

        let cfg = AnalysisConfig {
            edge_noise_multiplier: f64::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AnalysisConfig {
            pll_fine_steps: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_oversized_window_rejected() {
        let cfg = AnalysisConfig {
            window_start: usize::MAX - 1,
            window_end: usize::MAX,
            ..Default::default()
        };
        assert!(matches!(
            TimingAnalyzer::new(cfg),
            Err(TimingError::InvalidConfig(msg)) if msg.contains("exceeds")
        ));

        let cfg = AnalysisConfig {
            window_end: timing_analysis::MAX_BIN_COUNT,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_step_waveform_report() {
        let analyzer = TimingAnalyzer::default();
        let report = analyzer.analyze(&step_samples(200, 100)).unwrap();

        assert_eq!(report.first_edge, Some(99));
        assert_eq!(report.monitorables.pll_coarse, 4);
        assert_eq!(report.monitorables.pll_fine, 3);
        assert_eq!(report.monitorables.base, 102.0);
        assert_eq!(report.monitorables.peak, 502.0);
        assert_eq!(report.total_bins, 200);
        assert_eq!(report.populated_bins, 200);
        assert!(report.diagnostics.is_empty());
        assert!(report.edge_found());
    }

    #[test]
    fn test_no_edges_partial_result() {
        // 边沿窗口被人为设置为必然失败：floor 高于 tick 电平
        let cfg = AnalysisConfig {
            validation_noise_multiplier: 1000.0,
            ..Default::default()
        };
        let analyzer = TimingAnalyzer::new(cfg).unwrap();
        let report = analyzer.analyze(&step_samples(200, 100)).unwrap();

        assert!(!report.edge_found());
        assert!(report.has_diagnostic(DiagnosticKind::NoEdgesFound));
        assert!(report.has_diagnostic(DiagnosticKind::InvalidEdgeRejected));
        assert_eq!(report.monitorables.pll_coarse, 0);
        assert_eq!(report.monitorables.delay, 0);
        assert_eq!(report.monitorables.height, 400.0);
    }

    #[test]
    fn test_analyze_into_untouched_on_failure() {
        let analyzer = TimingAnalyzer::default();
        let mut mons = Monitorables {
            pll_coarse: 9,
            base: 1.5,
            ..Default::default()
        };
        let before = mons;
        let result = analyzer.analyze_into(&step_samples(50, 25), &mut mons);
        assert!(matches!(result, Err(TimingError::InsufficientBins { .. })));
        assert_eq!(mons, before);
    }

    #[test]
    fn test_legacy_adapter() {
        let analyzer = TimingAnalyzer::default();
        assert_eq!(analyzer.analyze_legacy(&[step_samples(200, 100)]), vec![4, 3]);

        let empty: [Vec<WaveformSample>; 0] = [];
        assert_eq!(analyzer.analyze_legacy(&empty), vec![0, 0]);

        // 只分析第一个波形
        let profiles = vec![step_samples(10, 5), step_samples(200, 100)];
        assert_eq!(analyzer.analyze_legacy(&profiles), vec![0, 0]);
    }
}
