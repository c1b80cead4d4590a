//! APV Timing Tool - 主程序入口
//!
//! 纯流程控制器，负责协调各个工具模块完成时序分析任务。

use apv_timing_tool::{
    error::{DiagnosticKind, TimingError},
    tools::{self, AppConfig},
};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

/// 错误退出码定义
mod exit_codes {
    /// 通用错误（I/O等）
    pub const GENERAL_ERROR: i32 = 1;
    /// 格式/输入错误
    pub const FORMAT_ERROR: i32 = 2;
    /// 波形未通过合理性检查
    pub const ANALYSIS_REJECTED: i32 = 3;
    /// 配置错误
    pub const CONFIG_ERROR: i32 = 4;
}

/// 获取错误建议文本
fn get_error_suggestion(error: &TimingError) -> &'static str {
    match error {
        TimingError::InvalidConfig(_) => {
            "检查阈值参数是否正确，使用 --help 查看完整用法 / Check threshold arguments, use --help to see full usage"
        }
        TimingError::Io(_) => {
            "检查文件路径是否正确，文件是否存在且可读 / Check if file path is correct, file exists and is readable"
        }
        TimingError::Format(_) => {
            "确保输入为样本列表或profile导出的JSON / Ensure input is a sample-list or profile-dump JSON"
        }
        _ => match DiagnosticKind::from_error(error) {
            Some(DiagnosticKind::InsufficientBins) => {
                "波形可能被截断，确认导出的bin数量 / Waveform may be truncated, check the exported bin count"
            }
            Some(DiagnosticKind::RangeTooSmall) => {
                "波形平坦或仅有噪声，确认tick mark已注入 / Waveform is flat or noise-only, check that tick marks were injected"
            }
            Some(DiagnosticKind::PlateauSeparationTooSmall) => {
                "tick mark 幅度不足，检查APV增益或采集设置 / Tick mark amplitude too low, check APV gain or acquisition settings"
            }
            _ => "请检查输入文件和参数设置 / Please check input file and parameter settings",
        },
    }
}

/// 错误处理和建议
fn handle_error(error: TimingError) -> ! {
    eprintln!("[ERROR] 错误 / Error: {error}");
    eprintln!("[INFO] 建议 / Suggestion: {}", get_error_suggestion(&error));

    let exit_code = match &error {
        TimingError::InvalidConfig(_) => exit_codes::CONFIG_ERROR,
        TimingError::Format(_) => exit_codes::FORMAT_ERROR,
        _ if DiagnosticKind::from_error(&error).is_some_and(|kind| kind.is_terminal()) => {
            exit_codes::ANALYSIS_REJECTED
        }
        _ => exit_codes::GENERAL_ERROR,
    };

    process::exit(exit_code);
}

/// 初始化诊断日志（RUST_LOG 优先）
fn init_tracing(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// 应用程序主逻辑（便于测试和复用）
fn run() -> Result<(), TimingError> {
    // 1. 解析命令行参数
    let config = tools::parse_args();
    init_tracing(&config);

    // 2. 显示启动信息
    tools::show_startup_info(&config);

    // 3. 加载并分析波形
    let report = tools::process_waveform_file(&config.input_path, &config)?;

    // 4. 输出结果
    tools::output_results(&report, &config)?;
    tools::show_completion_info(&config);
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        handle_error(error);
    }
}
