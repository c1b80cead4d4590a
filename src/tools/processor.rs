//! 波形处理模块
//!
//! 负责波形文件的加载、时序分析和结果输出。

use super::cli::AppConfig;
use super::{formatter, loader};
use crate::core::{TimingAnalyzer, TimingReport};
use crate::error::TimingResult;
use std::path::Path;

/// 加载并分析单个波形文件
pub fn process_waveform_file(path: &Path, config: &AppConfig) -> TimingResult<TimingReport> {
    let analyzer = TimingAnalyzer::new(config.analysis)?;

    if config.verbose && !config.json {
        println!("加载波形文件 / Loading waveform file: {}", path.display());
    }

    let waveform = loader::load_waveform(path)?;

    if config.verbose && !config.json {
        println!(
            "   bin数 / Bins: {}  有数据bin / Populated: {}",
            waveform.len(),
            waveform.populated_bins()
        );
    }

    let report = analyzer.analyze_waveform(&waveform)?;

    if config.verbose && !config.json {
        match report.first_edge {
            Some(edge) => println!(
                "   [OK] {}: 首个有效边沿 / first valid edge at bin {edge}",
                formatter::waveform_label(path)
            ),
            None => println!(
                "   [WARNING] {}: 未找到有效边沿 / no valid edge",
                formatter::waveform_label(path)
            ),
        }
    }

    Ok(report)
}

/// 渲染并输出分析结果
pub fn output_results(report: &TimingReport, config: &AppConfig) -> TimingResult<()> {
    let content = if config.json {
        formatter::format_json_report(config, report)?
    } else {
        formatter::format_text_report(config, report)
    };

    formatter::write_output(&content, config.output_path.as_deref())?;

    if let Some(path) = &config.output_path
        && !config.json
    {
        println!("📄 结果已保存 / Results saved to: {}", path.display());
    }

    Ok(())
}
