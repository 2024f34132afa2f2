use csv::StringRecord;
use once_cell::sync::Lazy;

use crate::errors::CaptureError;
use crate::model::Metric;

/// Known header spellings per metric, most preferred first. PresentMon 1.x
/// prefixes every timing column with `Ms`; 2.x dropped the prefix for some
/// columns and added the hardware telemetry block.
const BUILTIN_ALIASES: &[(Metric, &[&str])] = &[
    (
        Metric::FrameTime,
        &["MsBetweenPresents", "FrameTime", "msBetweenPresents"],
    ),
    (Metric::CpuBusy, &["MsCPUBusy", "CPUBusy"]),
    (Metric::CpuWait, &["MsCPUWait", "CPUWait"]),
    (Metric::GpuLatency, &["MsGPULatency", "GPULatency"]),
    (Metric::GpuTime, &["MsGPUTime", "GPUTime"]),
    (Metric::GpuBusy, &["MsGPUBusy", "GPUBusy"]),
    (Metric::GpuWait, &["MsGPUWait", "GPUWait"]),
    (
        Metric::DisplayLatency,
        &["MsDisplayLatency", "DisplayLatency", "MsUntilDisplayed"],
    ),
    (Metric::GpuPower, &["GPUPower"]),
    (Metric::GpuVoltage, &["GPUVoltage"]),
    (Metric::GpuFrequency, &["GPUFrequency"]),
    (Metric::GpuTemperature, &["GPUTemperature"]),
    (Metric::GpuUtilization, &["GPUUtilization"]),
    (
        Metric::GpuMemoryFrequency,
        &["GPUMemFrequency", "GPUMemoryFrequency"],
    ),
    (
        Metric::GpuMemorySizeUsed,
        &["GPUMemUsed", "GPUMemSizeUsed", "GPUMemoryUsed"],
    ),
    (
        Metric::GpuFanSpeed0,
        &["GPUFanSpeed[0]", "GPUFan[0]", "GPUFanSpeed0"],
    ),
    (
        Metric::GpuFanSpeed1,
        &["GPUFanSpeed[1]", "GPUFan[1]", "GPUFanSpeed1"],
    ),
    (
        Metric::GpuFanSpeed2,
        &["GPUFanSpeed[2]", "GPUFan[2]", "GPUFanSpeed2"],
    ),
    (
        Metric::GpuFanSpeed3,
        &["GPUFanSpeed[3]", "GPUFan[3]", "GPUFanSpeed3"],
    ),
    (Metric::CpuUtilization, &["CPUUtilization"]),
    (Metric::CpuPower, &["CPUPower"]),
    (Metric::CpuTemperature, &["CPUTemperature"]),
    (Metric::CpuFrequency, &["CPUFrequency"]),
];

static BUILTIN_TABLE: Lazy<AliasTable> = Lazy::new(|| {
    let entries = BUILTIN_ALIASES
        .iter()
        .map(|(metric, aliases)| {
            (
                *metric,
                aliases.iter().map(|alias| alias.to_string()).collect(),
            )
        })
        .collect();
    AliasTable { entries }
});

/// Ordered metric → header alias table. Resolution walks each metric's list
/// and takes the first alias present in the header row.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTable {
    entries: Vec<(Metric, Vec<String>)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        BUILTIN_TABLE.clone()
    }
}

impl AliasTable {
    pub fn builtin() -> &'static AliasTable {
        &BUILTIN_TABLE
    }

    pub fn aliases(&self, metric: Metric) -> &[String] {
        self.entries
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, aliases)| aliases.as_slice())
            .unwrap_or(&[])
    }

    pub fn with_alias(mut self, metric: Metric, alias: impl Into<String>) -> Self {
        self.extend(metric, [alias.into()]);
        self
    }

    /// Appends aliases after the ones already known for `metric`; duplicates are skipped.
    pub fn extend<I>(&mut self, metric: Metric, aliases: I)
    where
        I: IntoIterator<Item = String>,
    {
        let position = match self.entries.iter().position(|(m, _)| *m == metric) {
            Some(position) => position,
            None => {
                self.entries.push((metric, Vec::new()));
                self.entries.len() - 1
            }
        };
        let known = &mut self.entries[position].1;
        for alias in aliases {
            let alias = alias.trim().to_string();
            if !alias.is_empty() && !known.contains(&alias) {
                known.push(alias);
            }
        }
    }

    pub fn resolve(&self, header: &StringRecord) -> Result<ColumnMap, CaptureError> {
        let names: Vec<&str> = header.iter().map(normalize_header).collect();

        let frame_time = self
            .resolve_metric(Metric::FrameTime, &names)
            .ok_or_else(|| CaptureError::MissingMandatoryColumn {
                metric: Metric::FrameTime,
                aliases: self.aliases(Metric::FrameTime).to_vec(),
            })?;

        let metrics = Metric::ALL
            .iter()
            .filter(|metric| !metric.is_required())
            .filter_map(|metric| self.resolve_metric(*metric, &names))
            .collect();

        Ok(ColumnMap {
            frame_time,
            metrics,
        })
    }

    fn resolve_metric(&self, metric: Metric, names: &[&str]) -> Option<ResolvedColumn> {
        self.aliases(metric).iter().find_map(|alias| {
            names
                .iter()
                .position(|name| *name == alias.as_str())
                .map(|index| ResolvedColumn {
                    metric,
                    index,
                    header: alias.clone(),
                })
        })
    }
}

fn normalize_header(name: &str) -> &str {
    name.trim().trim_start_matches('\u{feff}')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub metric: Metric,
    pub index: usize,
    pub header: String,
}

/// Column positions resolved for one capture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub frame_time: ResolvedColumn,
    pub metrics: Vec<ResolvedColumn>,
}

impl ColumnMap {
    pub fn column(&self, metric: Metric) -> Option<&ResolvedColumn> {
        if metric == Metric::FrameTime {
            return Some(&self.frame_time);
        }
        self.metrics.iter().find(|column| column.metric == metric)
    }

    pub fn resolved_metrics(&self) -> Vec<Metric> {
        std::iter::once(self.frame_time.metric)
            .chain(self.metrics.iter().map(|column| column.metric))
            .collect()
    }
}
