//! 命令行接口模块
//!
//! 负责命令行参数解析、配置管理和程序信息展示。

use crate::core::AnalysisConfig;
use clap::{Arg, ArgMatches, Command, value_parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// 应用程序配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 输入波形文件路径（JSON）
    pub input_path: PathBuf,

    /// 是否显示详细信息
    pub verbose: bool,

    /// 输出文件路径（可选，缺省输出到stdout）
    pub output_path: Option<PathBuf>,

    /// 以JSON格式输出报告
    pub json: bool,

    /// 分析参数
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// 日志过滤级别（未设置 RUST_LOG 时使用）
    pub fn log_level(&self) -> &'static str {
        use super::constants::defaults;
        if self.verbose {
            defaults::VERBOSE_LOG_LEVEL
        } else {
            defaults::LOG_LEVEL
        }
    }
}

fn build_command() -> Command {
    Command::new("apv-timing")
        .version(VERSION)
        .about(DESCRIPTION)
        .author("APV Timing Team")
        .arg(
            Arg::new("INPUT")
                .help("波形文件路径（JSON：样本列表或profile导出）")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("显示详细处理信息")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("输出结果到文件")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("以JSON格式输出分析报告")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("min-bins")
                .long("min-bins")
                .help("最少bin数量")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("min-range")
                .long("min-range")
                .help("最小信号范围 max - min（ADC）")
                .value_name("ADC")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("min-separation")
                .long("min-separation")
                .help("tick mark 与 baseline 最小间隔（ADC）")
                .value_name("ADC")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("edge-sigma")
                .long("edge-sigma")
                .help("边沿检测与验证的噪声倍数（× baseline rms）")
                .value_name("K")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("window-start")
                .long("window-start")
                .help("边沿后验证窗口起点偏移（bin）")
                .value_name("BINS")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("window-end")
                .long("window-end")
                .help("边沿后验证窗口终点偏移（bin，不含）")
                .value_name("BINS")
                .value_parser(value_parser!(usize)),
        )
}

fn config_from_matches(matches: &ArgMatches) -> AppConfig {
    let mut analysis = AnalysisConfig::default();
    if let Some(&n) = matches.get_one::<usize>("min-bins") {
        analysis.min_bins = n;
    }
    if let Some(&range) = matches.get_one::<f64>("min-range") {
        analysis.min_range = range;
    }
    if let Some(&sep) = matches.get_one::<f64>("min-separation") {
        analysis.min_separation = sep;
    }
    if let Some(&k) = matches.get_one::<f64>("edge-sigma") {
        analysis.edge_noise_multiplier = k;
        analysis.validation_noise_multiplier = k;
    }
    if let Some(&start) = matches.get_one::<usize>("window-start") {
        analysis.window_start = start;
    }
    if let Some(&end) = matches.get_one::<usize>("window-end") {
        analysis.window_end = end;
    }

    AppConfig {
        // INPUT 为必填参数
        input_path: matches
            .get_one::<String>("INPUT")
            .map(PathBuf::from)
            .unwrap_or_default(),
        verbose: matches.get_flag("verbose"),
        output_path: matches.get_one::<String>("output").map(PathBuf::from),
        json: matches.get_flag("json"),
        analysis,
    }
}

/// 解析命令行参数并创建配置
pub fn parse_args() -> AppConfig {
    config_from_matches(&build_command().get_matches())
}

/// 从给定参数列表解析配置（便于测试）
pub fn parse_args_from<I, T>(args: I) -> Result<AppConfig, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command().try_get_matches_from(args)?;
    Ok(config_from_matches(&matches))
}

/// 显示程序启动信息
pub fn show_startup_info(config: &AppConfig) {
    if config.json {
        return;
    }
    println!("🚀 APV Timing Tool v{VERSION} 启动");
    println!("📝 {DESCRIPTION}");
    if config.verbose {
        let cfg = &config.analysis;
        println!(
            "⚙️  阈值 / Thresholds: min_bins={} min_range={} min_separation={} edge_sigma={} window={}..{}",
            cfg.min_bins,
            cfg.min_range,
            cfg.min_separation,
            cfg.edge_noise_multiplier,
            cfg.window_start,
            cfg.window_end
        );
    }
    println!();
}

/// 显示程序完成信息
pub fn show_completion_info(config: &AppConfig) {
    if config.verbose && !config.json {
        println!("✅ 分析完成！");
    }
}
