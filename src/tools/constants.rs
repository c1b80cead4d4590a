//! 常量和默认配置集中管理
//!
//! 将所有重要常量集中定义，避免"默认值漂移"和重复定义

/// APV时序分析算法常量
pub mod timing_analysis {
    /// 最少bin数量
    ///
    /// 少于100个bin的波形视为截断或损坏的输入
    pub const MIN_BIN_COUNT: usize = 100;

    /// 最多bin数量
    ///
    /// APV profile 的bin数以16位无符号整数存储
    pub const MAX_BIN_COUNT: usize = u16::MAX as usize;

    /// 最小信号幅度范围（ADC计数）
    ///
    /// 全局 max - min 低于此值时认为是平坦/纯噪声波形
    pub const MIN_SIGNAL_RANGE: f64 = 50.0;

    /// tick mark 与 baseline 中位数之间的最小间隔（ADC计数）
    pub const MIN_TICK_SEPARATION: f64 = 50.0;

    /// 边沿检测的噪声倍数：导数必须超过 5 × baseline_rms
    pub const EDGE_NOISE_MULTIPLIER: f64 = 5.0;

    /// 边沿验证的噪声倍数：边沿后窗口内样本必须高于 baseline + 5 × rms
    pub const VALIDATION_NOISE_MULTIPLIER: f64 = 5.0;

    /// 边沿后验证窗口起点（相对边沿的bin偏移，含）
    pub const POST_EDGE_WINDOW_START: usize = 10;

    /// 边沿后验证窗口终点（相对边沿的bin偏移，不含）
    pub const POST_EDGE_WINDOW_END: usize = 40;

    /// PLL fine 步数：bin索引按24进制拆分为 coarse/fine
    pub const PLL_FINE_STEPS: u16 = 24;
}

/// 应用程序信息
pub mod app_info {
    /// 工具显示名称
    pub const APP_NAME: &str = "APV Timing Tool";

    /// 格式化输出文件头部标题
    pub fn format_output_header(version: &str) -> String {
        format!("{APP_NAME} v{version} / APV tick mark timing analysis")
    }
}

/// 默认配置值
pub mod defaults {
    /// 默认日志级别（未设置 RUST_LOG 时）
    pub const LOG_LEVEL: &str = "warn";

    /// verbose 模式下的日志级别
    pub const VERBOSE_LOG_LEVEL: &str = "debug";
}
