//! 波形文件加载模块
//!
//! 支持两种JSON格式：
//! - 样本列表：`[{"value": 100.0, "error": 0.5, "count": 10}, ...]`
//! - profile导出：`{"nbins": 200, "contents": [...], "errors": [...], "entries": [...]}`
//!
//! profile导出按 `nbins` 补齐或截断，缺失的bin读为0（空bin）；
//! `nbins` 超过 [`timing_analysis::MAX_BIN_COUNT`] 时视为格式错误。

use super::constants::timing_analysis;
use crate::core::{ProfileSource, Waveform, WaveformSample};
use crate::error::{TimingError, TimingResult, format_error};
use serde::Deserialize;
use std::path::Path;

/// profile直方图的逐bin导出
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileDump {
    /// 声明的bin数量，缺省为 contents 长度
    #[serde(default)]
    pub nbins: Option<usize>,

    /// 逐bin均值
    pub contents: Vec<f64>,

    /// 逐bin均值误差
    #[serde(default)]
    pub errors: Vec<f64>,

    /// 逐bin样本数
    pub entries: Vec<f64>,
}

impl ProfileSource for ProfileDump {
    fn bin_count(&self) -> usize {
        self.nbins.unwrap_or(self.contents.len())
    }

    fn bin_content(&self, index: usize) -> f64 {
        self.contents.get(index).copied().unwrap_or(0.0)
    }

    fn bin_error(&self, index: usize) -> f64 {
        self.errors.get(index).copied().unwrap_or(0.0)
    }

    fn bin_entries(&self, index: usize) -> f64 {
        self.entries.get(index).copied().unwrap_or(0.0)
    }
}

/// 波形文件的两种形态
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WaveformFile {
    Samples(Vec<WaveformSample>),
    Profile(ProfileDump),
}

/// 从JSON文本解析波形
pub fn parse_waveform_json(text: &str) -> TimingResult<Waveform> {
    let file: WaveformFile = serde_json::from_str(text).map_err(|e| {
        format_error(
            "无法识别的波形JSON（需为样本列表或profile导出） / Unrecognized waveform JSON (expected sample list or profile dump)",
            e,
        )
    })?;

    Ok(match file {
        WaveformFile::Samples(samples) => Waveform::from_samples(samples),
        WaveformFile::Profile(dump) => {
            if let Some(nbins) = dump.nbins
                && nbins > timing_analysis::MAX_BIN_COUNT
            {
                return Err(format_error(
                    "profile声明的bin数超出上限 / Declared profile bin count out of range",
                    format!("nbins = {nbins}, maximum = {}", timing_analysis::MAX_BIN_COUNT),
                ));
            }
            Waveform::from_profile(&dump)
        }
    })
}

/// 从文件加载波形
pub fn load_waveform(path: &Path) -> TimingResult<Waveform> {
    let text = std::fs::read_to_string(path).map_err(TimingError::Io)?;
    parse_waveform_json(&text)
}
