//! Sensor classification into exported metric categories.
//!
//! A sensor name is first checked against a broad set of interesting markers.
//! Names outside that set are ignored without further work. Interesting names
//! are then matched against the category keyword groups in precedence order.

use serde::Serialize;
use std::fmt;

/// Markers of sensors worth looking at. Everything else in the SDR is noise.
pub const INTERESTING_SENSORS: &[&str] =
    &["CPU1 Temp", "System Temp", "FAN", "MB", "PS", "DBP", "SYS"];

/// Keyword groups in precedence order. The first group with a matching
/// substring decides the category.
const CATEGORY_KEYWORDS: &[(MetricCategory, &[&str])] = &[
    (MetricCategory::CpuTemp, &["CPU"]),
    (MetricCategory::SystemTemp, &["System", "T_AMB", "T_OUT"]),
    (MetricCategory::FanSpeed, &["FAN"]),
    (MetricCategory::Power, &["PS"]),
];

/// Exported metric category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    CpuTemp,
    SystemTemp,
    FanSpeed,
    Power,
}

impl MetricCategory {
    /// All categories, in exposition order.
    pub const ALL: [MetricCategory; 4] = [
        MetricCategory::CpuTemp,
        MetricCategory::SystemTemp,
        MetricCategory::FanSpeed,
        MetricCategory::Power,
    ];

    /// Short key, also the suffix of the metric family name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricCategory::CpuTemp => "cpu_temp",
            MetricCategory::SystemTemp => "system_temp",
            MetricCategory::FanSpeed => "fan_speed",
            MetricCategory::Power => "power",
        }
    }

    /// Prometheus family name.
    pub fn metric_name(&self) -> &'static str {
        match self {
            MetricCategory::CpuTemp => "ipmi_cpu_temp",
            MetricCategory::SystemTemp => "ipmi_system_temp",
            MetricCategory::FanSpeed => "ipmi_fan_speed",
            MetricCategory::Power => "ipmi_power",
        }
    }

    /// Prometheus help text.
    pub fn help(&self) -> &'static str {
        match self {
            MetricCategory::CpuTemp => "CPU temp",
            MetricCategory::SystemTemp => "System temp",
            MetricCategory::FanSpeed => "Fan speed",
            MetricCategory::Power => "power",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a sensor name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Matched a category keyword group.
    Category(MetricCategory),
    /// Interesting sensor, but no category group matched.
    Undefined,
    /// Not in the interesting set; dropped without logging.
    Ignored,
}

/// Returns true if the name contains any interesting marker.
pub fn is_interesting(name: &str) -> bool {
    INTERESTING_SENSORS.iter().any(|marker| name.contains(marker))
}

/// Matches the name against the category groups only.
pub fn match_category(name: &str) -> Option<MetricCategory> {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map(|(category, _)| *category)
}

/// Classifies a sensor name.
pub fn classify(name: &str) -> Classification {
    if !is_interesting(name) {
        return Classification::Ignored;
    }
    match match_category(name) {
        Some(category) => Classification::Category(category),
        None => Classification::Undefined,
    }
}
