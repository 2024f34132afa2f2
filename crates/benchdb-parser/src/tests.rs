use std::fs;
use std::path::PathBuf;

use crate::aliases::AliasTable;
use crate::errors::CaptureError;
use crate::model::{Metric, MetricValue};
use crate::reader::{parse_capture, parse_capture_str, FrameClock};

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn sample_times(content: &str) -> Vec<i32> {
    parse_capture_str(content, 1, AliasTable::builtin())
        .expect("capture parse failed")
        .results
        .iter()
        .map(|result| result.sample_time_ms)
        .collect()
}

#[test]
fn parses_presentmon_v1_export() {
    let content = fixture("presentmon_v1.csv");
    let parsed = parse_capture_str(&content, 42, AliasTable::builtin()).expect("v1 parse failed");

    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed.columns.frame_time.header, "MsBetweenPresents");
    assert_eq!(
        parsed.columns.resolved_metrics(),
        vec![Metric::FrameTime, Metric::DisplayLatency]
    );

    let times: Vec<i32> = parsed.results.iter().map(|r| r.sample_time_ms).collect();
    assert_eq!(times, vec![17, 33, 50]);
    assert!(parsed.results.iter().all(|r| r.run_id == 42));

    assert_eq!(parsed.results[0].display_latency, Some(18.905));
    assert_eq!(parsed.results[2].display_latency, None);
    assert_eq!(parsed.results[2].frame_time, 16.5);
    assert!(parsed.results.iter().all(|r| r.cpu_busy.is_none()));
}

#[test]
fn parses_presentmon_v2_telemetry_block() {
    let content = fixture("presentmon_v2.csv");
    let parsed = parse_capture_str(&content, 7, AliasTable::builtin()).expect("v2 parse failed");

    assert_eq!(parsed.len(), 4);
    assert_eq!(parsed.last_sample_time_ms(), Some(28));

    let first = &parsed.results[0];
    assert_eq!(first.sample_time_ms, 7);
    assert_eq!(first.cpu_busy, Some(5.112));
    assert_eq!(first.display_latency, Some(9.871));
    assert_eq!(first.gpu_power, Some(251.4));
    assert_eq!(first.gpu_frequency, Some(2610.0));
    assert_eq!(first.gpu_memory_size_used, Some(8_421_113_856));
    assert_eq!(first.gpu_fan_speed_0, Some(1450));
    assert_eq!(first.gpu_fan_speed_1, Some(1462));
    assert_eq!(first.gpu_fan_speed_2, None);
    assert_eq!(first.gpu_fan_speed_3, None);
    assert_eq!(first.cpu_frequency, Some(5210.0));

    let second = &parsed.results[1];
    assert_eq!(second.gpu_fan_speed_0, Some(1450));
    assert_eq!(second.gpu_fan_speed_1, None);
    assert_eq!(second.cpu_power, Some(87.6));

    let third = &parsed.results[2];
    assert_eq!(third.cpu_busy, None);
    assert_eq!(third.cpu_wait, Some(1.902));

    let fourth = &parsed.results[3];
    assert_eq!(fourth.gpu_power, None);
    assert_eq!(fourth.gpu_voltage, Some(1.031));
}

#[test]
fn alternate_aliases_resolve_to_identical_values() {
    let canonical = parse_capture_str(&fixture("presentmon_v2.csv"), 3, AliasTable::builtin())
        .expect("canonical parse failed");
    let renamed = parse_capture_str(
        &fixture("presentmon_v2_renamed.csv"),
        3,
        AliasTable::builtin(),
    )
    .expect("renamed parse failed");

    assert_eq!(renamed.columns.frame_time.header, "FrameTime");
    assert_eq!(canonical.len(), renamed.len());

    let shared = renamed.columns.resolved_metrics();
    assert!(shared.contains(&Metric::CpuBusy));
    assert!(shared.contains(&Metric::GpuFanSpeed0));

    for (left, right) in canonical.results.iter().zip(&renamed.results) {
        assert_eq!(left.sample_time_ms, right.sample_time_ms);
        for metric in &shared {
            assert_eq!(left.get(*metric), right.get(*metric), "metric {metric}");
        }
    }
}

#[test]
fn cpu_busy_spellings_are_interchangeable() {
    let old = "MsBetweenPresents,MsCPUBusy\n16.6,4.25\n16.7,4.5\n";
    let new = "MsBetweenPresents,CPUBusy\n16.6,4.25\n16.7,4.5\n";

    let old = parse_capture_str(old, 1, AliasTable::builtin()).expect("old parse");
    let new = parse_capture_str(new, 1, AliasTable::builtin()).expect("new parse");
    assert_eq!(old.results, new.results);
    assert_eq!(new.results[1].cpu_busy, Some(4.5));
}

#[test]
fn first_listed_alias_wins_when_several_present() {
    let content = "FrameTime,MsBetweenPresents\n1.0,16.0\n1.0,16.0\n";
    let parsed = parse_capture_str(content, 1, AliasTable::builtin()).expect("parse");

    assert_eq!(parsed.columns.frame_time.header, "MsBetweenPresents");
    assert_eq!(parsed.columns.frame_time.index, 1);
    assert_eq!(parsed.results[1].sample_time_ms, 32);
}

#[test]
fn missing_frame_time_column_is_fatal() {
    let content = fixture("missing_frame_time.csv");
    let err = parse_capture_str(&content, 1, AliasTable::builtin()).unwrap_err();

    match err {
        CaptureError::MissingMandatoryColumn { metric, aliases } => {
            assert_eq!(metric, Metric::FrameTime);
            assert!(aliases.iter().any(|alias| alias == "MsBetweenPresents"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_file_reports_missing_frame_time() {
    let err = parse_capture_str("", 1, AliasTable::builtin()).unwrap_err();
    assert!(matches!(err, CaptureError::MissingMandatoryColumn { .. }));
}

#[test]
fn header_only_file_yields_no_rows() {
    let parsed =
        parse_capture_str("MsBetweenPresents,MsCPUBusy\n", 1, AliasTable::builtin()).expect("parse");
    assert!(parsed.is_empty());
    assert_eq!(parsed.last_sample_time_ms(), None);
}

#[test]
fn malformed_frame_time_names_row_and_column() {
    let content = fixture("bad_frame_time.csv");
    let err = parse_capture_str(&content, 1, AliasTable::builtin()).unwrap_err();

    match err {
        CaptureError::MalformedMandatoryValue {
            row,
            line,
            column,
            value,
        } => {
            assert_eq!(row, 3);
            assert_eq!(line, 4);
            assert_eq!(column, "MsBetweenPresents");
            assert_eq!(value, "oops");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn negative_or_empty_frame_time_is_rejected() {
    let negative = "MsBetweenPresents\n16.6\n-2.0\n";
    let err = parse_capture_str(negative, 1, AliasTable::builtin()).unwrap_err();
    assert!(matches!(
        err,
        CaptureError::MalformedMandatoryValue { row: 2, .. }
    ));

    let empty = "MsBetweenPresents,MsCPUBusy\n,4.0\n";
    let err = parse_capture_str(empty, 1, AliasTable::builtin()).unwrap_err();
    assert!(matches!(
        err,
        CaptureError::MalformedMandatoryValue { row: 1, .. }
    ));
}

#[test]
fn ragged_row_is_a_csv_error() {
    let content = "MsBetweenPresents,MsCPUBusy\n16.6,4.0\n16.7\n";
    let err = parse_capture_str(content, 1, AliasTable::builtin()).unwrap_err();
    assert!(matches!(err, CaptureError::Csv { .. }));
}

#[test]
fn empty_optional_cell_leaves_only_that_field_unset() {
    let content = "MsBetweenPresents,MsCPUBusy,MsGPUBusy,GPUFanSpeed[0]\n16.6,,6.5,1200\n";
    let parsed = parse_capture_str(content, 1, AliasTable::builtin()).expect("parse");
    let row = &parsed.results[0];

    assert_eq!(row.cpu_busy, None);
    assert_eq!(row.gpu_busy, Some(6.5));
    assert_eq!(row.gpu_fan_speed_0, Some(1200));
    assert_eq!(row.frame_time, 16.6);
}

#[test]
fn zero_is_kept_distinct_from_absent() {
    let content = "MsBetweenPresents,GPUUtilization,CPUUtilization\n16.6,0,\n";
    let parsed = parse_capture_str(content, 1, AliasTable::builtin()).expect("parse");

    assert_eq!(parsed.results[0].gpu_utilization, Some(0.0));
    assert_eq!(parsed.results[0].cpu_utilization, None);
}

#[test]
fn non_numeric_optional_values_are_absent() {
    let content = "MsBetweenPresents,GPUPower,GPUMemUsed,GPUFanSpeed[0]\n16.6,NaN,lots,fast\n";
    let parsed = parse_capture_str(content, 1, AliasTable::builtin()).expect("parse");
    let row = &parsed.results[0];

    assert_eq!(row.gpu_power, None);
    assert_eq!(row.gpu_memory_size_used, None);
    assert_eq!(row.gpu_fan_speed_0, None);
}

#[test]
fn cumulative_keys_follow_documented_rounding() {
    assert_eq!(
        sample_times("MsBetweenPresents\n16.6\n16.7\n16.5\n"),
        vec![17, 33, 50]
    );
    // 0.5 rounds away from zero
    assert_eq!(sample_times("MsBetweenPresents\n0.5\n1.0\n"), vec![1, 2]);
}

#[test]
fn sub_half_millisecond_frames_may_share_a_key() {
    let times = sample_times("MsBetweenPresents\n0.2\n0.2\n0.2\n");
    assert_eq!(times, vec![0, 0, 1]);
    assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn reparsing_is_deterministic_and_does_not_deduplicate() {
    let content = fixture("presentmon_v2.csv");
    let first = parse_capture_str(&content, 5, AliasTable::builtin()).expect("first parse");
    let second = parse_capture_str(&content, 5, AliasTable::builtin()).expect("second parse");

    assert_eq!(first.results, second.results);
    let mut combined: Vec<(i32, i32)> = first
        .results
        .iter()
        .chain(&second.results)
        .map(|r| (r.run_id, r.sample_time_ms))
        .collect();
    assert_eq!(combined.len(), 8);
    combined.dedup();
    assert_eq!(combined.len(), 8);
}

#[test]
fn keys_are_non_decreasing_for_long_captures() {
    let mut content = String::from("MsBetweenPresents,MsCPUBusy\n");
    for idx in 0..5_000 {
        let frame = 4.0 + (idx % 17) as f64 * 0.731;
        content.push_str(&format!("{frame:.3},{:.3}\n", frame / 2.0));
    }

    let parsed = parse_capture(content.as_bytes(), 9, AliasTable::builtin()).expect("parse");
    assert_eq!(parsed.len(), 5_000);
    assert!(parsed
        .results
        .windows(2)
        .all(|pair| pair[0].sample_time_ms <= pair[1].sample_time_ms));
}

#[test]
fn extended_alias_table_resolves_custom_header() {
    let content = "Frame Time (ms),CPU Busy (ms)\n16.0,3.5\n";
    let err = parse_capture_str(content, 1, AliasTable::builtin()).unwrap_err();
    assert!(matches!(err, CaptureError::MissingMandatoryColumn { .. }));

    let table = AliasTable::default()
        .with_alias(Metric::FrameTime, "Frame Time (ms)")
        .with_alias(Metric::CpuBusy, "CPU Busy (ms)");
    let parsed = parse_capture_str(content, 1, &table).expect("custom alias parse");

    assert_eq!(parsed.results[0].sample_time_ms, 16);
    assert_eq!(parsed.results[0].cpu_busy, Some(3.5));
    assert_eq!(
        table.aliases(Metric::CpuBusy).last().map(String::as_str),
        Some("CPU Busy (ms)")
    );
}

#[test]
fn extend_skips_duplicate_aliases() {
    let mut table = AliasTable::default();
    let before = table.aliases(Metric::CpuBusy).len();
    table.extend(
        Metric::CpuBusy,
        vec!["CPUBusy".to_string(), " ".to_string()],
    );
    assert_eq!(table.aliases(Metric::CpuBusy).len(), before);
}

#[test]
fn headers_are_trimmed_and_bom_stripped() {
    let content = "\u{feff}MsBetweenPresents , MsGPUBusy\n8.0,7.5\n";
    let parsed = parse_capture_str(content, 1, AliasTable::builtin()).expect("parse");
    assert_eq!(parsed.results[0].gpu_busy, Some(7.5));
}

#[test]
fn frame_clock_reports_overflow() {
    let mut clock = FrameClock::new();
    assert_eq!(clock.advance(1.4), Some(1));
    assert_eq!(clock.advance(f64::from(i32::MAX)), None);
}

#[test]
fn metric_names_round_trip_through_from_str() {
    for metric in Metric::ALL {
        assert_eq!(metric.as_str().parse::<Metric>(), Ok(metric));
    }
    assert!("gpu_fan_speed_9".parse::<Metric>().is_err());
}

#[test]
fn set_ignores_mismatched_kinds() {
    let mut parsed = parse_capture_str("MsBetweenPresents\n1.0\n", 1, AliasTable::builtin())
        .expect("parse")
        .results;
    let row = &mut parsed[0];
    row.set(Metric::GpuFanSpeed0, MetricValue::Float(3.0));
    row.set(Metric::CpuPower, MetricValue::Integer(3));
    assert_eq!(row.gpu_fan_speed_0, None);
    assert_eq!(row.cpu_power, None);
}
