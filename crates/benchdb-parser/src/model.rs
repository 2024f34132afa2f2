use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Normalized per-sample field of the `results` table, independent of how a
/// particular capture-tool version spells its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    FrameTime,
    CpuBusy,
    CpuWait,
    GpuLatency,
    GpuTime,
    GpuBusy,
    GpuWait,
    DisplayLatency,
    GpuPower,
    GpuVoltage,
    GpuFrequency,
    GpuTemperature,
    GpuUtilization,
    GpuMemoryFrequency,
    GpuMemorySizeUsed,
    #[serde(rename = "gpu_fan_speed_0")]
    GpuFanSpeed0,
    #[serde(rename = "gpu_fan_speed_1")]
    GpuFanSpeed1,
    #[serde(rename = "gpu_fan_speed_2")]
    GpuFanSpeed2,
    #[serde(rename = "gpu_fan_speed_3")]
    GpuFanSpeed3,
    CpuUtilization,
    CpuPower,
    CpuTemperature,
    CpuFrequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Float,
    Integer,
    BigInteger,
}

impl Metric {
    pub const ALL: [Metric; 23] = [
        Metric::FrameTime,
        Metric::CpuBusy,
        Metric::CpuWait,
        Metric::GpuLatency,
        Metric::GpuTime,
        Metric::GpuBusy,
        Metric::GpuWait,
        Metric::DisplayLatency,
        Metric::GpuPower,
        Metric::GpuVoltage,
        Metric::GpuFrequency,
        Metric::GpuTemperature,
        Metric::GpuUtilization,
        Metric::GpuMemoryFrequency,
        Metric::GpuMemorySizeUsed,
        Metric::GpuFanSpeed0,
        Metric::GpuFanSpeed1,
        Metric::GpuFanSpeed2,
        Metric::GpuFanSpeed3,
        Metric::CpuUtilization,
        Metric::CpuPower,
        Metric::CpuTemperature,
        Metric::CpuFrequency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::FrameTime => "frame_time",
            Metric::CpuBusy => "cpu_busy",
            Metric::CpuWait => "cpu_wait",
            Metric::GpuLatency => "gpu_latency",
            Metric::GpuTime => "gpu_time",
            Metric::GpuBusy => "gpu_busy",
            Metric::GpuWait => "gpu_wait",
            Metric::DisplayLatency => "display_latency",
            Metric::GpuPower => "gpu_power",
            Metric::GpuVoltage => "gpu_voltage",
            Metric::GpuFrequency => "gpu_frequency",
            Metric::GpuTemperature => "gpu_temperature",
            Metric::GpuUtilization => "gpu_utilization",
            Metric::GpuMemoryFrequency => "gpu_memory_frequency",
            Metric::GpuMemorySizeUsed => "gpu_memory_size_used",
            Metric::GpuFanSpeed0 => "gpu_fan_speed_0",
            Metric::GpuFanSpeed1 => "gpu_fan_speed_1",
            Metric::GpuFanSpeed2 => "gpu_fan_speed_2",
            Metric::GpuFanSpeed3 => "gpu_fan_speed_3",
            Metric::CpuUtilization => "cpu_utilization",
            Metric::CpuPower => "cpu_power",
            Metric::CpuTemperature => "cpu_temperature",
            Metric::CpuFrequency => "cpu_frequency",
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::GpuMemorySizeUsed => MetricKind::BigInteger,
            Metric::GpuFanSpeed0
            | Metric::GpuFanSpeed1
            | Metric::GpuFanSpeed2
            | Metric::GpuFanSpeed3 => MetricKind::Integer,
            _ => MetricKind::Float,
        }
    }

    /// Only frame time is mandatory: every sample key is derived from it.
    pub fn is_required(&self) -> bool {
        matches!(self, Metric::FrameTime)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Metric::ALL
            .iter()
            .copied()
            .find(|metric| metric.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown metric '{trimmed}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Float(f64),
    Integer(i32),
    BigInteger(i64),
}

/// One normalized row of the `results` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    pub run_id: i32,
    pub sample_time_ms: i32,
    pub frame_time: f64,
    pub cpu_busy: Option<f64>,
    pub cpu_wait: Option<f64>,
    pub gpu_latency: Option<f64>,
    pub gpu_time: Option<f64>,
    pub gpu_busy: Option<f64>,
    pub gpu_wait: Option<f64>,
    pub display_latency: Option<f64>,
    pub gpu_power: Option<f64>,
    pub gpu_voltage: Option<f64>,
    pub gpu_frequency: Option<f64>,
    pub gpu_temperature: Option<f64>,
    pub gpu_utilization: Option<f64>,
    pub gpu_memory_frequency: Option<f64>,
    pub gpu_memory_size_used: Option<i64>,
    pub gpu_fan_speed_0: Option<i32>,
    pub gpu_fan_speed_1: Option<i32>,
    pub gpu_fan_speed_2: Option<i32>,
    pub gpu_fan_speed_3: Option<i32>,
    pub cpu_utilization: Option<f64>,
    pub cpu_power: Option<f64>,
    pub cpu_temperature: Option<f64>,
    pub cpu_frequency: Option<f64>,
}

impl FrameResult {
    pub fn new(run_id: i32, sample_time_ms: i32, frame_time: f64) -> Self {
        Self {
            run_id,
            sample_time_ms,
            frame_time,
            cpu_busy: None,
            cpu_wait: None,
            gpu_latency: None,
            gpu_time: None,
            gpu_busy: None,
            gpu_wait: None,
            display_latency: None,
            gpu_power: None,
            gpu_voltage: None,
            gpu_frequency: None,
            gpu_temperature: None,
            gpu_utilization: None,
            gpu_memory_frequency: None,
            gpu_memory_size_used: None,
            gpu_fan_speed_0: None,
            gpu_fan_speed_1: None,
            gpu_fan_speed_2: None,
            gpu_fan_speed_3: None,
            cpu_utilization: None,
            cpu_power: None,
            cpu_temperature: None,
            cpu_frequency: None,
        }
    }

    /// Stores `value` in the slot for `metric`. A value whose variant does not
    /// match the metric's kind is ignored, as is frame time (fixed at construction).
    pub fn set(&mut self, metric: Metric, value: MetricValue) {
        match (metric, value) {
            (Metric::GpuMemorySizeUsed, MetricValue::BigInteger(v)) => {
                self.gpu_memory_size_used = Some(v)
            }
            (Metric::GpuFanSpeed0, MetricValue::Integer(v)) => self.gpu_fan_speed_0 = Some(v),
            (Metric::GpuFanSpeed1, MetricValue::Integer(v)) => self.gpu_fan_speed_1 = Some(v),
            (Metric::GpuFanSpeed2, MetricValue::Integer(v)) => self.gpu_fan_speed_2 = Some(v),
            (Metric::GpuFanSpeed3, MetricValue::Integer(v)) => self.gpu_fan_speed_3 = Some(v),
            (metric, MetricValue::Float(v)) => {
                if let Some(slot) = self.float_slot(metric) {
                    *slot = Some(v);
                }
            }
            _ => {}
        }
    }

    pub fn get(&self, metric: Metric) -> Option<MetricValue> {
        match metric {
            Metric::FrameTime => Some(MetricValue::Float(self.frame_time)),
            Metric::GpuMemorySizeUsed => self.gpu_memory_size_used.map(MetricValue::BigInteger),
            Metric::GpuFanSpeed0 => self.gpu_fan_speed_0.map(MetricValue::Integer),
            Metric::GpuFanSpeed1 => self.gpu_fan_speed_1.map(MetricValue::Integer),
            Metric::GpuFanSpeed2 => self.gpu_fan_speed_2.map(MetricValue::Integer),
            Metric::GpuFanSpeed3 => self.gpu_fan_speed_3.map(MetricValue::Integer),
            Metric::CpuBusy => self.cpu_busy.map(MetricValue::Float),
            Metric::CpuWait => self.cpu_wait.map(MetricValue::Float),
            Metric::GpuLatency => self.gpu_latency.map(MetricValue::Float),
            Metric::GpuTime => self.gpu_time.map(MetricValue::Float),
            Metric::GpuBusy => self.gpu_busy.map(MetricValue::Float),
            Metric::GpuWait => self.gpu_wait.map(MetricValue::Float),
            Metric::DisplayLatency => self.display_latency.map(MetricValue::Float),
            Metric::GpuPower => self.gpu_power.map(MetricValue::Float),
            Metric::GpuVoltage => self.gpu_voltage.map(MetricValue::Float),
            Metric::GpuFrequency => self.gpu_frequency.map(MetricValue::Float),
            Metric::GpuTemperature => self.gpu_temperature.map(MetricValue::Float),
            Metric::GpuUtilization => self.gpu_utilization.map(MetricValue::Float),
            Metric::GpuMemoryFrequency => self.gpu_memory_frequency.map(MetricValue::Float),
            Metric::CpuUtilization => self.cpu_utilization.map(MetricValue::Float),
            Metric::CpuPower => self.cpu_power.map(MetricValue::Float),
            Metric::CpuTemperature => self.cpu_temperature.map(MetricValue::Float),
            Metric::CpuFrequency => self.cpu_frequency.map(MetricValue::Float),
        }
    }

    fn float_slot(&mut self, metric: Metric) -> Option<&mut Option<f64>> {
        let slot = match metric {
            Metric::CpuBusy => &mut self.cpu_busy,
            Metric::CpuWait => &mut self.cpu_wait,
            Metric::GpuLatency => &mut self.gpu_latency,
            Metric::GpuTime => &mut self.gpu_time,
            Metric::GpuBusy => &mut self.gpu_busy,
            Metric::GpuWait => &mut self.gpu_wait,
            Metric::DisplayLatency => &mut self.display_latency,
            Metric::GpuPower => &mut self.gpu_power,
            Metric::GpuVoltage => &mut self.gpu_voltage,
            Metric::GpuFrequency => &mut self.gpu_frequency,
            Metric::GpuTemperature => &mut self.gpu_temperature,
            Metric::GpuUtilization => &mut self.gpu_utilization,
            Metric::GpuMemoryFrequency => &mut self.gpu_memory_frequency,
            Metric::CpuUtilization => &mut self.cpu_utilization,
            Metric::CpuPower => &mut self.cpu_power,
            Metric::CpuTemperature => &mut self.cpu_temperature,
            Metric::CpuFrequency => &mut self.cpu_frequency,
            _ => return None,
        };
        Some(slot)
    }
}
