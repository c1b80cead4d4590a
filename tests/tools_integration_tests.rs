//! 工具链集成测试
//!
//! 覆盖 命令行解析 → 文件加载 → 分析 → 文本/JSON输出 的完整流程


use apv_timing_tool::TimingAnalyzer;
use apv_timing_tool::tools::{self, formatter};
use waveform_test_fixtures::*;

#[test]
fn test_profile_dump_end_to_end_text_output() {
    // 声明200个bin，只导出前180个，其余补齐为空bin
    let samples = step_waveform(180, 100, 100.0, 500.0, 2.0);
    let input = write_fixture("e2e_profile.json", &profile_dump_json(200, &samples));
    let output = fixtures_dir().join(format!("{}_e2e_report.txt", std::process::id()));

    let config = tools::parse_args_from([
        "apv-timing",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();

    let report = tools::process_waveform_file(&config.input_path, &config).unwrap();
    assert_eq!(report.total_bins, 200);
    assert_eq!(report.populated_bins, 180);

    tools::output_results(&report, &config).unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("APV TIMING Monitorables:"));
    assert!(text.contains(" PLL coarse setting : 4"));
    assert!(text.contains(" PLL fine setting   : 3"));
    assert!(text.contains(" Timing delay   [ns]: 99"));
    assert!(text.contains("Number of bins: 200 (populated: 180)"));

    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&output);
}

#[test]
fn test_sample_list_end_to_end_json_output() {
    let samples = pulse_waveform(200, 100, 106, 100.0, 500.0, 2.0);
    let input = write_fixture("e2e_pulse.json", &samples_json(&samples));
    let output = fixtures_dir().join(format!("{}_e2e_report.json", std::process::id()));

    let config = tools::parse_args_from([
        "apv-timing",
        input.to_str().unwrap(),
        "--json",
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();

    let report = tools::process_waveform_file(&config.input_path, &config).unwrap();
    tools::output_results(&report, &config).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["edge_found"], false);
    assert!(json["first_edge"].is_null());
    assert_eq!(json["monitorables"]["base"], 102.0);
    assert!(!json["rejected_edges"].as_array().unwrap().is_empty());

    let kinds: Vec<&str> = json["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"InvalidEdgeRejected"));
    assert!(kinds.contains(&"NoEdgesFound"));

    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&output);
}

#[test]
fn test_cli_threshold_overrides_reach_analysis() {
    // 宽度8的脉冲：默认窗口下无有效边沿，缩短窗口后可检出
    let samples = pulse_waveform(200, 100, 108, 100.0, 500.0, 2.0);
    let input = write_fixture("e2e_window.json", &samples_json(&samples));

    let config = tools::parse_args_from([
        "apv-timing",
        input.to_str().unwrap(),
        "--window-start",
        "2",
        "--window-end",
        "6",
    ])
    .unwrap();

    let report = tools::process_waveform_file(&config.input_path, &config).unwrap();
    assert_eq!(report.first_edge, Some(99));

    let _ = std::fs::remove_file(&input);
}

#[test]
fn test_verbose_text_report_lists_rejected_edges() {
    let mut samples = step_waveform(200, 100, 100.0, 500.0, 2.0);
    for sample in samples.iter_mut().take(35).skip(30) {
        sample.value = 500.0;
    }
    let report = TimingAnalyzer::default().analyze(&samples).unwrap();
    let config = tools::parse_args_from(["apv-timing", "spike.json", "--verbose"]).unwrap();

    let text = formatter::format_text_report(&config, &report);

    assert!(text.contains("rejected"));
    assert!(text.contains("first valid"));
    assert!(text.contains("[WARNING]"));
    assert!(text.contains("Baseline rms"));
}

#[test]
fn test_legacy_adapter_on_loaded_profiles() {
    let early = step_waveform(200, 50, 100.0, 500.0, 2.0);
    let late = step_waveform(200, 150, 100.0, 500.0, 2.0);

    let settings = TimingAnalyzer::default().analyze_legacy(&[early, late]);

    // 只分析第一个波形：边沿 49 → coarse 2, fine 1
    assert_eq!(settings, vec![2, 1]);
}
