//! 统一错误处理框架
//!
//! 时序分析的错误类型定义与诊断分类。分析失败不会panic，
//! 所有预期内的数据问题都通过 `TimingError` 返回给调用方。

use std::fmt;
use std::io;
use thiserror::Error;

/// 时序分析相关的统一错误类型
#[derive(Debug, Error)]
pub enum TimingError {
    /// bin数量不足
    #[error("bin数量过少 / Too few bins: {bins} (最少 / minimum {minimum})")]
    InsufficientBins { bins: usize, minimum: usize },

    /// 全局信号幅度范围过小
    #[error("信号范围(max - min)过小 / Signal range (max - min) is too small: {range} (最少 / minimum {minimum})")]
    RangeTooSmall { range: f64, minimum: f64 },

    /// tick mark 与 baseline 中位数间隔过小
    #[error(
        "tick mark ({tick}) 与 baseline ({baseline}) 间隔过小 / Range b/w tick mark height and baseline is too small: {separation} (最少 / minimum {minimum})"
    )]
    PlateauSeparationTooSmall {
        tick: f64,
        baseline: f64,
        separation: f64,
        minimum: f64,
    },

    /// 分析配置无效
    #[error("配置无效 / Invalid configuration: {0}")]
    InvalidConfig(String),

    /// 文件I/O错误
    #[error("文件I/O错误 / I/O error: {0}")]
    Io(#[from] io::Error),

    /// 波形文件格式错误
    #[error("波形格式错误 / Waveform format error: {0}")]
    Format(String),
}

impl From<serde_json::Error> for TimingError {
    fn from(err: serde_json::Error) -> Self {
        TimingError::Format(format!("JSON解析错误 / JSON parse error: {err}"))
    }
}

/// 时序分析操作的标准Result类型
pub type TimingResult<T> = Result<T, TimingError>;

// ==================== 错误转换Helper函数 ====================

/// 创建格式错误的helper函数
#[inline]
pub fn format_error<E: fmt::Display>(context: &str, err: E) -> TimingError {
    TimingError::Format(format!("{context}: {err}"))
}

/// 创建配置错误的helper函数
#[inline]
pub fn invalid_config(msg: impl Into<String>) -> TimingError {
    TimingError::InvalidConfig(msg.into())
}

// ==================== 诊断分类系统 ====================

/// 诊断类别枚举
///
/// 前三类终止分析（以 `TimingError` 返回），后两类只记录警告，分析继续。
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, serde::Serialize)]
pub enum DiagnosticKind {
    /// bin数量低于下限
    InsufficientBins,
    /// 全局 max - min 低于下限
    RangeTooSmall,
    /// tick/baseline 中位数间隔低于下限
    PlateauSeparationTooSmall,
    /// 边沿后窗口内出现低于阈值的样本，该边沿被丢弃
    InvalidEdgeRejected,
    /// 没有边沿通过验证
    NoEdgesFound,
}

impl DiagnosticKind {
    /// 从TimingError提取诊断类别，适配层错误（配置/I/O/格式）返回None
    pub fn from_error(e: &TimingError) -> Option<Self> {
        match e {
            TimingError::InsufficientBins { .. } => Some(Self::InsufficientBins),
            TimingError::RangeTooSmall { .. } => Some(Self::RangeTooSmall),
            TimingError::PlateauSeparationTooSmall { .. } => {
                Some(Self::PlateauSeparationTooSmall)
            }
            TimingError::InvalidConfig(_) | TimingError::Io(_) | TimingError::Format(_) => None,
        }
    }

    /// 是否终止本次分析
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::InsufficientBins | Self::RangeTooSmall | Self::PlateauSeparationTooSmall
        )
    }

    /// 产生该诊断的检查名称（用于日志的 check 字段）
    pub fn check_name(&self) -> &'static str {
        match self {
            Self::InsufficientBins => "bin_count",
            Self::RangeTooSmall => "signal_range",
            Self::PlateauSeparationTooSmall => "plateau_separation",
            Self::InvalidEdgeRejected => "edge_validation",
            Self::NoEdgesFound => "result_assembly",
        }
    }

    /// 获取诊断类别的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::InsufficientBins => "bin数量不足",
            Self::RangeTooSmall => "信号范围过小",
            Self::PlateauSeparationTooSmall => "平台间隔过小",
            Self::InvalidEdgeRejected => "边沿被拒绝",
            Self::NoEdgesFound => "未找到tick mark",
        }
    }
}
