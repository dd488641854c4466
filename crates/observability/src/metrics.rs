//! 帧组装指标收集模块
//!
//! 基于完成的 Frame 收集和统计组装器的运行指标。

use std::collections::BTreeMap;

use contracts::{Frame, SensorId};
use metrics::{counter, gauge, histogram};

/// 从完成帧记录指标
///
/// 每次组装器闭合一帧时调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_frame_metrics;
///
/// if let Some(frame) = assembler.push(reading) {
///     record_frame_metrics(&frame);
///     // ...
/// }
/// ```
pub fn record_frame_metrics(frame: &Frame) {
    // 帧计数器
    counter!("radar_monitor_frames_total").increment(1);

    // 帧 ID (用于检测跳帧)
    gauge!("radar_monitor_last_frame_id").set(frame.frame_id as f64);

    // 每帧点数
    histogram!("radar_monitor_frame_points").record(frame.points.len() as f64);

    // 缺失传感器
    let missing_count = frame.missing_sensors.len();
    gauge!("radar_monitor_sensors_missing").set(missing_count as f64);
    if missing_count > 0 {
        counter!("radar_monitor_frames_with_missing_sensors_total").increment(1);
        for sensor_id in &frame.missing_sensors {
            counter!("radar_monitor_sensor_missing_total", "sensor_id" => sensor_id.as_str())
                .increment(1);
        }
    }
}

/// 记录帧发布 (交接槽更新)
pub fn record_frame_published(generation: u64, points: usize) {
    counter!("radar_monitor_frames_published_total").increment(1);
    gauge!("radar_monitor_published_generation").set(generation as f64);
    histogram!("radar_monitor_published_points").record(points as f64);
}

/// 记录高度更新
pub fn record_altitude(meters: f64, superseded: usize) {
    gauge!("radar_monitor_altitude_m").set(meters);
    if superseded > 0 {
        counter!("radar_monitor_altitude_superseded_total").increment(superseded as u64);
    }
}

/// 记录场景渲染
pub fn record_scene_rendered(renderer: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "radar_monitor_scenes_rendered_total",
        "renderer" => renderer.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 帧指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct FrameMetricsAggregator {
    /// 总帧数
    pub total_frames: u64,

    /// 有缺失传感器的帧数
    pub frames_with_missing: u64,

    /// 每帧点数统计
    pub points_stats: RunningStats,

    /// 各传感器缺失次数
    pub missing_counts: BTreeMap<SensorId, u64>,

    /// 最后一帧 ID
    pub last_frame_id: u64,
}

impl FrameMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, frame: &Frame) {
        self.total_frames += 1;
        self.last_frame_id = frame.frame_id;
        self.points_stats.push(frame.points.len() as f64);

        if !frame.missing_sensors.is_empty() {
            self.frames_with_missing += 1;
            for sensor_id in &frame.missing_sensors {
                *self.missing_counts.entry(*sensor_id).or_insert(0) += 1;
            }
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            frames_with_missing: self.frames_with_missing,
            missing_rate: if self.total_frames > 0 {
                self.frames_with_missing as f64 / self.total_frames as f64 * 100.0
            } else {
                0.0
            },
            points_per_frame: StatsSummary::from(&self.points_stats),
            sensor_missing_counts: self.missing_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub frames_with_missing: u64,
    pub missing_rate: f64,
    pub points_per_frame: StatsSummary,
    pub sensor_missing_counts: BTreeMap<SensorId, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Frame Metrics Summary ===")?;
        writeln!(f, "Total frames: {}", self.total_frames)?;
        writeln!(
            f,
            "Frames with missing sensors: {} ({:.2}%)",
            self.frames_with_missing, self.missing_rate
        )?;
        writeln!(f, "Points per frame: {}", self.points_per_frame)?;

        if !self.sensor_missing_counts.is_empty() {
            writeln!(f, "Missing sensor counts:")?;
            for (sensor, count) in &self.sensor_missing_counts {
                writeln!(f, "  {}: {}", sensor, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
