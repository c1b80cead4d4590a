//! 输出格式化模块
//!
//! 负责时序分析结果的文本/JSON格式化输出。

use super::cli::AppConfig;
use super::constants::app_info;
use crate::core::{AnalysisConfig, Diagnostic, Monitorables, PlateauLevels, TimingReport};
use crate::error::{TimingError, TimingResult};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::borrow::Cow;
use std::path::Path;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");

const SEPARATOR: &str =
    "--------------------------------------------------------------------------------\n";

/// 报告和进度行中显示的波形文件名
pub fn waveform_label(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map_or(Cow::Borrowed("Unknown"), |name| name.to_string_lossy())
}

/// 创建输出头部信息
pub fn create_output_header(config: &AppConfig, report: &TimingReport) -> String {
    let mut output = String::new();

    output.push_str(&app_info::format_output_header(VERSION));
    output.push('\n');
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    output.push_str(&format!("log date: {now}\n\n"));

    output.push_str(SEPARATOR);
    output.push_str(&format!(
        "Statistics for: {}\n",
        waveform_label(&config.input_path)
    ));
    output.push_str(&format!(
        "Number of bins: {} (populated: {})\n",
        report.total_bins, report.populated_bins
    ));
    output.push_str(SEPARATOR);
    output.push('\n');

    output
}

/// 格式化平台电平统计
pub fn format_levels(report: &TimingReport) -> String {
    let levels: &PlateauLevels = &report.levels;
    let mut output = String::new();
    output.push_str("Signal levels / 信号电平:\n");
    output.push_str(&format!(
        " Max / Min          [adc]: {:.2} / {:.2}\n",
        report.extrema.max, report.extrema.min
    ));
    output.push_str(&format!(" Threshold          [adc]: {:.2}\n", levels.threshold));
    output.push_str(&format!(
        " Baseline samples        : {}\n",
        levels.baseline_samples
    ));
    output.push_str(&format!(" Tick samples            : {}\n", levels.tick_samples));
    output.push_str(&format!(" Baseline rms       [adc]: {:.3}\n", levels.baseline_rms));
    output
}

/// 格式化边沿表（候选边沿及验证状态）
pub fn format_edge_table(report: &TimingReport) -> String {
    if report.candidates.is_empty() {
        return "Edges / 边沿: none\n".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Bin / 索引", "Derivative / 导数", "Status / 状态"]);

    for (&bin, &derivative) in &report.candidates {
        let status = if Some(bin) == report.first_edge {
            "first valid / 首个有效"
        } else if report.edges.contains_key(&bin) {
            "valid / 有效"
        } else {
            "rejected / 已拒绝"
        };
        table.add_row(vec![
            Cell::new(bin).set_alignment(CellAlignment::Right),
            Cell::new(format!("{derivative:.2}")).set_alignment(CellAlignment::Right),
            Cell::new(status),
        ]);
    }

    format!("{table}\n")
}

/// 格式化诊断信息
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut output = String::new();
    for diagnostic in diagnostics {
        output.push_str(&format!(
            "[WARNING] [{}] {}\n",
            diagnostic.kind.display_name(),
            diagnostic.message
        ));
    }
    output
}

/// 组装完整文本报告
pub fn format_text_report(config: &AppConfig, report: &TimingReport) -> String {
    let mut output = create_output_header(config, report);

    output.push_str(&report.monitorables.to_string());
    output.push('\n');

    if config.verbose {
        output.push_str(&format_levels(report));
        output.push('\n');
        output.push_str(&format_edge_table(report));
        output.push('\n');
    }

    if !report.diagnostics.is_empty() {
        output.push_str(&format_diagnostics(&report.diagnostics));
        output.push('\n');
    }

    output.push_str(SEPARATOR);
    output
}

/// JSON报告
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub input: String,
    pub edge_found: bool,
    pub first_edge: Option<usize>,
    pub monitorables: &'a Monitorables,
    pub levels: &'a PlateauLevels,
    pub total_bins: usize,
    pub populated_bins: usize,
    pub edges: Vec<EdgeEntry>,
    pub rejected_edges: &'a [usize],
    pub diagnostics: &'a [Diagnostic],
    pub config: &'a AnalysisConfig,
}

/// JSON报告中的边沿条目
#[derive(Debug, Serialize)]
pub struct EdgeEntry {
    pub bin: usize,
    pub derivative: f64,
}

/// 组装JSON报告
pub fn format_json_report(config: &AppConfig, report: &TimingReport) -> TimingResult<String> {
    let summary = ReportSummary {
        input: config.input_path.display().to_string(),
        edge_found: report.edge_found(),
        first_edge: report.first_edge,
        monitorables: &report.monitorables,
        levels: &report.levels,
        total_bins: report.total_bins,
        populated_bins: report.populated_bins,
        edges: report
            .edges
            .iter()
            .map(|(&bin, &derivative)| EdgeEntry { bin, derivative })
            .collect(),
        rejected_edges: &report.rejected_edges,
        diagnostics: &report.diagnostics,
        config: &config.analysis,
    };
    let mut json = serde_json::to_string_pretty(&summary)?;
    json.push('\n');
    Ok(json)
}

/// 写入输出内容到文件或stdout
pub fn write_output(content: &str, output_path: Option<&Path>) -> TimingResult<()> {
    match output_path {
        Some(path) => std::fs::write(path, content).map_err(TimingError::Io),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TimingAnalyzer, WaveformSample};
    use std::path::PathBuf;

    fn test_config(verbose: bool) -> AppConfig {
        AppConfig {
            input_path: PathBuf::from("/data/apv_timing.json"),
            verbose,
            output_path: None,
            json: false,
            analysis: AnalysisConfig::default(),
        }
    }

    fn step_report() -> TimingReport {
        let samples: Vec<WaveformSample> = (0..200)
            .map(|i| {
                let level = if i < 100 { 100.0 } else { 500.0 };
                let jitter = if i % 2 == 0 { 2.0 } else { -2.0 };
                WaveformSample::new(level + jitter, 0.5, 10)
            })
            .collect();
        TimingAnalyzer::default().analyze(&samples).unwrap()
    }

    #[test]
    fn test_waveform_label() {
        assert_eq!(waveform_label(Path::new("/tmp/run_42/apv.json")), "apv.json");
        assert_eq!(waveform_label(Path::new("/")), "Unknown");
    }

    #[test]
    fn test_text_report_contains_monitorables() {
        let report = step_report();
        let text = format_text_report(&test_config(false), &report);
        assert!(text.contains("Statistics for: apv_timing.json"));
        assert!(text.contains("Number of bins: 200 (populated: 200)"));
        assert!(text.contains(" PLL coarse setting : 4"));
        assert!(!text.contains("Signal levels"));
    }

    #[test]
    fn test_verbose_report_has_edge_table() {
        let report = step_report();
        let text = format_text_report(&test_config(true), &report);
        assert!(text.contains("Signal levels"));
        assert!(text.contains("first valid"));
        assert!(text.contains("400.00"));
    }

    #[test]
    fn test_json_report_fields() {
        let report = step_report();
        let json = format_json_report(&test_config(false), &report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["edge_found"], true);
        assert_eq!(value["first_edge"], 99);
        assert_eq!(value["monitorables"]["pll_coarse"], 4);
        assert_eq!(value["monitorables"]["pll_fine"], 3);
        assert_eq!(value["edges"][0]["bin"], 99);
        assert_eq!(value["config"]["min_bins"], 100);
    }

    #[test]
    fn test_diagnostics_format() {
        let diagnostics = vec![Diagnostic {
            kind: crate::error::DiagnosticKind::NoEdgesFound,
            message: "No tick marks found".to_string(),
        }];
        let text = format_diagnostics(&diagnostics);
        assert_eq!(text, "[WARNING] [未找到tick mark] No tick marks found\n");
    }
}
