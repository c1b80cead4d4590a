//! 工具模块集合
//!
//! 包含CLI、文件加载、格式化等工具模块，支持main.rs的流程控制。

pub mod cli;
pub mod constants;
pub mod formatter;
pub mod loader;
pub mod processor;

// 重新导出主要的公共接口
pub use cli::{AppConfig, parse_args, parse_args_from, show_completion_info, show_startup_info};
pub use formatter::{format_json_report, format_text_report, write_output};
pub use loader::{ProfileDump, load_waveform, parse_waveform_json};
pub use processor::{output_results, process_waveform_file};
