//! Parsing tests against a captured `ipmitool sdr` listing.

use herakles_ipmi_exporter::metrics::encode_collection;
use herakles_ipmi_exporter::{
    pair_readings, parse_target_output, MetricCategory, MetricCollection, ParseStats,
};

const SDR: &str = include_str!("fixtures/supermicro_sdr.txt");
const SKIP: &[&str] = &["no reading"];

#[test]
fn test_every_row_becomes_one_reading() {
    let names: Vec<_> = pair_readings(SDR).map(|r| r.name).collect();
    assert_eq!(names.len(), 15);
    assert_eq!(names[0], "CPU1 Temp");
    assert_eq!(names[8], "FAN3");
    assert_eq!(names[14], "PS1 Input Power");
}

#[test]
fn test_fixture_samples() {
    let (samples, stats) = parse_target_output("10.0.0.1", SDR, SKIP);

    let got: Vec<_> = samples
        .iter()
        .map(|s| (s.category, s.sensor.as_str(), s.value))
        .collect();
    assert_eq!(
        got,
        vec![
            (MetricCategory::CpuTemp, "CPU1 Temp", 45.0),
            (MetricCategory::SystemTemp, "System Temp", 29.0),
            (MetricCategory::FanSpeed, "FAN1", 3600.0),
            (MetricCategory::FanSpeed, "FAN2", 3700.0),
            (MetricCategory::Power, "PS1 Input Power", 120.0),
        ]
    );

    assert_eq!(
        stats,
        ParseStats {
            ignored: 6,
            skipped: 1,
            unparsed: 2,
            undefined: 1,
        }
    );
}

#[test]
fn test_parsing_is_idempotent() {
    let first = parse_target_output("10.0.0.1", SDR, SKIP);
    let second = parse_target_output("10.0.0.1", SDR, SKIP);
    assert_eq!(first, second);
}

#[test]
fn test_exposition_of_fixture() {
    let (samples, stats) = parse_target_output("10.0.0.1", SDR, SKIP);
    let collection = MetricCollection {
        samples,
        stats,
        ..Default::default()
    };

    let mut buffer = Vec::new();
    encode_collection(&collection, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();

    assert!(text.contains("# HELP ipmi_cpu_temp CPU temp"));
    assert!(text.contains("# TYPE ipmi_fan_speed gauge"));
    assert!(text.contains(r#"ipmi_cpu_temp{ip="10.0.0.1CPU1 Temp"} 45"#));
    assert!(text.contains(r#"ipmi_system_temp{ip="10.0.0.1System Temp"} 29"#));
    assert!(text.contains(r#"ipmi_fan_speed{ip="10.0.0.1FAN2"} 3700"#));
    assert!(text.contains(r#"ipmi_power{ip="10.0.0.1PS1 Input Power"} 120"#));
    assert!(!text.contains("FAN3"));
    assert!(!text.contains("MB_10G"));
    assert!(!text.contains("CPU2"));
}
