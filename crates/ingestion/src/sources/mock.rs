//! Mock 雷达阵列源
//!
//! 无真实硬件时生成合成扫描数据：每个周期先发送各在线传感器的边界哨兵，
//! 随后是随机交错的测量点，最后是一条高度记录。

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use contracts::{
    ContractError, DecoderScale, MockSourceConfig, SensorId, TelemetryRecord, TelemetrySource,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

/// 单个传感器的水平半视场 (度)
const HALF_FOV_DEG: f64 = 30.0;

/// Mock 雷达阵列
pub struct MockRadarSource {
    config: MockSourceConfig,
    scale: DecoderScale,
    online: Vec<SensorId>,
    rng: StdRng,
    pending: VecDeque<TelemetryRecord>,
    period: Duration,
    next_cycle: Instant,
    cycles: u64,
}

impl MockRadarSource {
    /// 创建 Mock 源
    ///
    /// `scale` 必须与摄取端使用的解码单位一致。
    pub fn new(config: MockSourceConfig, scale: DecoderScale) -> Self {
        let online = SensorId::REAL
            .into_iter()
            .filter(|id| !config.offline.contains(id))
            .collect();
        let period = config.period();

        debug!(
            online = ?online,
            cycle_hz = config.cycle_hz,
            points_per_sweep = config.points_per_sweep,
            "mock radar source created"
        );

        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            scale,
            online,
            pending: VecDeque::new(),
            period,
            next_cycle: Instant::now(),
            cycles: 0,
        }
    }

    /// 已生成的扫描周期数
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn online_sensors(&self) -> &[SensorId] {
        &self.online
    }

    fn heading_deg(sensor_id: SensorId) -> f64 {
        match sensor_id {
            SensorId::Front | SensorId::Undefined => 0.0,
            SensorId::Right => 90.0,
            SensorId::Rear => 180.0,
            SensorId::Left => -90.0,
        }
    }

    fn measurement(&mut self, sensor_id: SensorId) -> TelemetryRecord {
        let mut yaw = Self::heading_deg(sensor_id)
            + self.rng.random_range(-HALF_FOV_DEG..=HALF_FOV_DEG);
        if yaw > 180.0 {
            yaw -= 360.0;
        }
        let pitch = self.rng.random_range(-5.0..=5.0);
        let distance = self.rng.random_range(0.5..4.5);

        TelemetryRecord::Obstacle {
            sensor_id: sensor_id.raw(),
            yaw: self.scale.encode_angle(yaw),
            pitch: self.scale.encode_angle(pitch),
            // 0 is the boundary sentinel
            distance: self.scale.encode_distance(distance).max(1),
        }
    }

    /// 生成一个完整周期
    fn generate_cycle(&mut self) {
        for id in self.online.clone() {
            self.pending.push_back(TelemetryRecord::boundary(id.raw()));
        }

        let mut points = Vec::with_capacity(self.online.len() * self.config.points_per_sweep);
        for id in self.online.clone() {
            for _ in 0..self.config.points_per_sweep {
                points.push(self.measurement(id));
            }
        }
        points.shuffle(&mut self.rng);
        self.pending.extend(points);

        let jitter = self.rng.random_range(-0.01..=0.01);
        self.pending.push_back(TelemetryRecord::Altitude {
            distance: self
                .scale
                .encode_distance((self.config.altitude_m + jitter).max(0.0)),
        });

        self.cycles += 1;
        trace!(cycle = self.cycles, records = self.pending.len(), "mock cycle generated");
    }
}

impl TelemetrySource for MockRadarSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn recv(&mut self, timeout: Duration) -> Result<Option<TelemetryRecord>, ContractError> {
        if self.pending.is_empty() {
            let now = Instant::now();
            if now < self.next_cycle {
                let wait = self.next_cycle - now;
                if wait > timeout {
                    std::thread::sleep(timeout);
                    return Ok(None);
                }
                std::thread::sleep(wait);
            }

            self.generate_cycle();
            self.next_cycle += self.period;
            if self.next_cycle < Instant::now() {
                // Fell behind; do not burst to catch up.
                self.next_cycle = Instant::now() + self.period;
            }
        }

        Ok(self.pending.pop_front())
    }
}
