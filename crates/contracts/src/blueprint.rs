//! MonitorBlueprint - Config Loader 输出
//!
//! 描述完整的监控配置：数据源、解码单位、传感器挂载、队列背压、显示参数。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::{DecoderScale, SensorId};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的监控配置蓝图
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MonitorBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 数据源
    #[serde(default)]
    #[validate(nested)]
    pub source: SourceConfig,

    /// 解码单位换算
    #[serde(default)]
    #[validate(nested)]
    pub decoder: DecoderScale,

    /// 传感器集合与挂载几何
    #[serde(default)]
    #[validate(nested)]
    pub sensors: SensorsConfig,

    /// 摄取队列
    #[serde(default)]
    #[validate(nested)]
    pub queues: QueueConfig,

    /// 帧组装
    #[serde(default)]
    #[validate(nested)]
    pub assembler: AssemblerConfig,

    /// 高度跟踪
    #[serde(default)]
    #[validate(nested)]
    pub altitude: AltitudeConfig,

    /// 显示
    #[serde(default)]
    #[validate(nested)]
    pub display: DisplayConfig,
}

impl MonitorBlueprint {
    /// Mount entry for a sensor, if configured
    pub fn mount_for(&self, sensor_id: SensorId) -> Option<&MountGeometry> {
        self.sensors.mounts.iter().find(|m| m.sensor == sensor_id)
    }
}

// ===== Source =====

/// 数据源类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// JSON records over UDP
    #[default]
    Udp,
    /// JSON lines file
    Replay,
    /// Synthetic constellation
    Mock,
}

/// 数据源配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// UDP 监听地址
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// UDP 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 单次阻塞接收上限 (ms)，决定停机响应延迟
    #[serde(default = "default_recv_timeout_ms")]
    #[validate(range(min = 1))]
    pub recv_timeout_ms: u64,

    /// 回放文件路径 (kind = replay)
    #[serde(default)]
    pub replay_path: Option<PathBuf>,

    /// 回放记录间隔 (ms)，0 = 尽快
    #[serde(default)]
    pub replay_interval_ms: u64,

    /// 回放结束后循环
    #[serde(default)]
    pub replay_loop: bool,

    /// 模拟源参数 (kind = mock)
    #[serde(default)]
    #[validate(nested)]
    pub mock: MockSourceConfig,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    14550
}

fn default_recv_timeout_ms() -> u64 {
    100
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            bind_host: default_bind_host(),
            port: default_port(),
            recv_timeout_ms: default_recv_timeout_ms(),
            replay_path: None,
            replay_interval_ms: 0,
            replay_loop: false,
            mock: MockSourceConfig::default(),
        }
    }
}

impl SourceConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    pub fn replay_interval(&self) -> Duration {
        Duration::from_millis(self.replay_interval_ms)
    }
}

/// 模拟传感器阵列配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MockSourceConfig {
    /// 每秒完整扫描次数
    #[serde(default = "default_cycle_hz")]
    #[validate(range(min = 0.01, max = 10000.0))]
    pub cycle_hz: f64,

    /// 每个传感器每次扫描的点数
    #[serde(default = "default_points_per_sweep")]
    #[validate(range(min = 1))]
    pub points_per_sweep: usize,

    /// 不上报的传感器
    #[serde(default)]
    pub offline: Vec<SensorId>,

    /// 模拟高度 (m)
    #[serde(default = "default_mock_altitude")]
    pub altitude_m: f64,

    /// 随机种子
    #[serde(default)]
    pub seed: u64,
}

fn default_cycle_hz() -> f64 {
    10.0
}

fn default_points_per_sweep() -> usize {
    8
}

fn default_mock_altitude() -> f64 {
    0.28
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            cycle_hz: default_cycle_hz(),
            points_per_sweep: default_points_per_sweep(),
            offline: Vec::new(),
            altitude_m: default_mock_altitude(),
            seed: 0,
        }
    }
}

// ===== Sensors =====

/// 传感器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SensorsConfig {
    /// 参与缺失判定的传感器
    #[serde(default = "default_expected_sensors")]
    pub expected: Vec<SensorId>,

    /// 挂载几何 (仅用于绘制缺失传感器视场)
    #[serde(default = "default_mounts")]
    #[validate(nested)]
    pub mounts: Vec<MountGeometry>,
}

fn default_expected_sensors() -> Vec<SensorId> {
    SensorId::REAL.to_vec()
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            expected: default_expected_sensors(),
            mounts: default_mounts(),
        }
    }
}

/// 传感器挂载位姿与视场
///
/// Not applied to readings: decoder output is already vehicle-relative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct MountGeometry {
    pub sensor: SensorId,

    /// 挂载位置 (m)
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,

    /// 朝向 (度)
    #[serde(default)]
    pub yaw_deg: f64,
    #[serde(default)]
    pub pitch_deg: f64,

    /// 水平视场角 (度)
    #[serde(default = "default_fov_deg")]
    #[validate(range(exclusive_min = 0.0, max = 360.0))]
    pub fov_deg: f64,

    /// 最大量程 (m)
    #[serde(default = "default_range_m")]
    #[validate(range(exclusive_min = 0.0))]
    pub range_m: f64,
}

fn default_fov_deg() -> f64 {
    60.0
}

fn default_range_m() -> f64 {
    5.0
}

/// Four radars on the body axes, facing outward.
pub fn default_mounts() -> Vec<MountGeometry> {
    const OFFSET_M: f64 = 0.25;
    [
        (SensorId::Front, OFFSET_M, 0.0, 0.0),
        (SensorId::Right, 0.0, OFFSET_M, 90.0),
        (SensorId::Rear, -OFFSET_M, 0.0, 180.0),
        (SensorId::Left, 0.0, -OFFSET_M, -90.0),
    ]
    .into_iter()
    .map(|(sensor, x, y, yaw_deg)| MountGeometry {
        sensor,
        x,
        y,
        z: 0.0,
        yaw_deg,
        pitch_deg: 0.0,
        fov_deg: default_fov_deg(),
        range_m: default_range_m(),
    })
    .collect()
}

// ===== Queues =====

/// 丢包策略 (队列满时)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// 丢弃最旧的记录 (latest wins)
    #[default]
    DropOldest,
    /// 丢弃最新的记录
    DropNewest,
}

/// Backpressure configuration for one queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BackpressureConfig {
    /// Channel capacity
    #[validate(range(min = 1))]
    pub capacity: usize,

    /// Drop policy when full
    #[serde(default)]
    pub drop_policy: DropPolicy,
}

impl BackpressureConfig {
    pub fn new(capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            capacity,
            drop_policy,
        }
    }
}

/// 双摄取队列配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueueConfig {
    #[serde(default = "default_obstacle_queue")]
    #[validate(nested)]
    pub obstacle: BackpressureConfig,

    #[serde(default = "default_altitude_queue")]
    #[validate(nested)]
    pub altitude: BackpressureConfig,
}

fn default_obstacle_queue() -> BackpressureConfig {
    BackpressureConfig::new(4096, DropPolicy::DropOldest)
}

fn default_altitude_queue() -> BackpressureConfig {
    BackpressureConfig::new(64, DropPolicy::DropOldest)
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            obstacle: default_obstacle_queue(),
            altitude: default_altitude_queue(),
        }
    }
}

// ===== Assembler / Altitude / Display =====

/// 帧组装配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssemblerConfig {
    /// 合并多少个完成帧后发布一次
    #[serde(default = "default_frames_per_publish")]
    #[validate(range(min = 1))]
    pub frames_per_publish: usize,
}

fn default_frames_per_publish() -> usize {
    1
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            frames_per_publish: default_frames_per_publish(),
        }
    }
}

/// 高度跟踪配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AltitudeConfig {
    /// 两次读取之间的空闲时间 (ms)
    #[serde(default = "default_idle_interval_ms")]
    #[validate(range(min = 1))]
    pub idle_interval_ms: u64,

    /// 首个读数之前的高度 (m)
    #[serde(default)]
    pub initial_m: f64,
}

fn default_idle_interval_ms() -> u64 {
    100
}

impl Default for AltitudeConfig {
    fn default() -> Self {
        Self {
            idle_interval_ms: default_idle_interval_ms(),
            initial_m: 0.0,
        }
    }
}

impl AltitudeConfig {
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}

/// 视图方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewOrientation {
    /// 俯视: 横轴 y, 纵轴 x
    #[default]
    TopDown,
    /// 侧视: 横轴 x, 纵轴 z
    SideOn,
}

/// 显示配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DisplayConfig {
    /// 渲染刷新率 (Hz)
    #[serde(default = "default_refresh_rate_hz")]
    #[validate(range(min = 0.01, max = 1000.0))]
    pub refresh_rate_hz: f64,

    /// 视图半宽 (m)
    #[serde(default = "default_plot_size_m")]
    #[validate(range(exclusive_min = 0.0))]
    pub plot_size_m: f64,

    #[serde(default)]
    pub view: ViewOrientation,
}

fn default_refresh_rate_hz() -> f64 {
    10.0
}

fn default_plot_size_m() -> f64 {
    5.0
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: default_refresh_rate_hz(),
            plot_size_m: default_plot_size_m(),
            view: ViewOrientation::default(),
        }
    }
}

impl MockSourceConfig {
    /// 扫描周期；非法频率退回默认值
    pub fn period(&self) -> Duration {
        period_for(self.cycle_hz, default_cycle_hz())
    }
}

impl DisplayConfig {
    /// 刷新周期；非法频率退回默认值
    pub fn refresh_interval(&self) -> Duration {
        period_for(self.refresh_rate_hz, default_refresh_rate_hz())
    }
}

fn period_for(hz: f64, fallback_hz: f64) -> Duration {
    Duration::try_from_secs_f64(1.0 / hz)
        .ok()
        .filter(|period| !period.is_zero())
        .unwrap_or_else(|| Duration::from_secs_f64(1.0 / fallback_hz))
}
