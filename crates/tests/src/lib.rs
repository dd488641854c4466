//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（无需真实雷达）
//! - 配置到管道的贯通测试

#[cfg(test)]
mod contract_tests {
    use contracts::{AltitudeValue, CartesianPoint, Frame, SensorId, TelemetryRecord};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_frame_json_shape() {
        let frame = Frame {
            frame_id: 7,
            points: vec![CartesianPoint::new(1.0, 2.0, 0.0)],
            missing_sensors: [SensorId::Rear].into_iter().collect(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["frame_id"], 7);
        assert_eq!(json["points"][0]["y"], 2.0);
        assert_eq!(json["missing_sensors"], serde_json::json!(["rear"]));
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_string(&TelemetryRecord::Altitude { distance: 28 }).unwrap();
        assert_eq!(json, r#"{"kind":"altitude","distance":28}"#);
        assert_eq!(AltitudeValue::default().meters, 0.0);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use assembler::{AltitudeTracker, FrameAssembler, FrameAssemblyWorker};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        AltitudeValue, DecoderScale, MonitorBlueprint, SensorId, ShutdownSignal, TelemetryRecord,
    };
    use handoff::{AltitudeCell, FrameSlot, MonitorHandle, SceneBuilder};
    use ingestion::{
        IngestionHandle, IngestionLoop, IngestionQueues, MockRadarSource, ScriptedSource,
        TelemetrySource,
    };
    use tokio::task::JoinHandle;

    /// Wired pipeline without the render loop
    struct Harness {
        handle: MonitorHandle,
        shutdown: ShutdownSignal,
        ingestion: IngestionHandle,
        assembly: JoinHandle<assembler::AssemblyReport>,
        altitude: JoinHandle<assembler::AltitudeStats>,
    }

    fn wire<S: TelemetrySource + 'static>(source: S, blueprint: &MonitorBlueprint) -> Harness {
        let shutdown = ShutdownSignal::new();
        let slot = FrameSlot::new();
        let cell = AltitudeCell::new(AltitudeValue::new(blueprint.altitude.initial_m));

        let (queues, rx) = IngestionQueues::new(&blueprint.queues);
        let ingestion = IngestionLoop::new(source, blueprint.decoder, queues, shutdown.clone())
            .with_recv_timeout(Duration::from_millis(5))
            .spawn()
            .unwrap();

        let assembly = FrameAssemblyWorker::new(
            FrameAssembler::new(blueprint.sensors.expected.iter().copied()),
            rx.obstacle,
            slot.clone(),
            shutdown.clone(),
        )
        .with_frames_per_publish(blueprint.assembler.frames_per_publish)
        .spawn();

        let altitude = AltitudeTracker::new(
            rx.altitude,
            cell.clone(),
            Duration::from_millis(1),
            shutdown.clone(),
        )
        .spawn();

        Harness {
            handle: MonitorHandle::new(slot, cell),
            shutdown,
            ingestion,
            assembly,
            altitude,
        }
    }

    async fn wait_for_generation(handle: &MonitorHandle, target: u64) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while handle.generation() < target {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("frames were not published in time");
    }

    fn mock_blueprint(offline: Vec<SensorId>) -> MonitorBlueprint {
        let mut blueprint = MonitorBlueprint::default();
        blueprint.source.mock.cycle_hz = 200.0;
        blueprint.source.mock.offline = offline;
        blueprint
    }

    /// End-to-end test: MockRadarSource -> IngestionLoop -> FrameAssemblyWorker -> MonitorHandle
    ///
    /// 验证完整的数据流：
    /// 1. MockRadarSource 生成哨兵与测量
    /// 2. FrameAssembler 组装帧并标记缺失传感器
    /// 3. MonitorHandle 读到最新帧与高度
    #[tokio::test]
    async fn test_e2e_mock_flags_offline_sensor_only() {
        let blueprint = mock_blueprint(vec![SensorId::Rear]);
        let source = MockRadarSource::new(blueprint.source.mock.clone(), blueprint.decoder);
        let harness = wire(source, &blueprint);

        wait_for_generation(&harness.handle, 5).await;
        let frame = harness.handle.latest_frame();
        assert_eq!(
            frame.missing_sensors.iter().copied().collect::<Vec<_>>(),
            vec![SensorId::Rear]
        );
        assert_eq!(frame.points.len(), 3 * blueprint.source.mock.points_per_sweep);
        assert!((harness.handle.latest_altitude().meters - 0.28).abs() < 0.02);

        harness.shutdown.trigger();
        harness.ingestion.join().unwrap();
        let report = harness.assembly.await.unwrap();
        harness.altitude.await.unwrap();

        assert!(report.frames.total_frames >= 5);
        assert_eq!(report.frames.frames_with_missing, report.frames.total_frames);
        assert_eq!(
            report.frames.sensor_missing_counts.get(&SensorId::Rear),
            Some(&report.frames.total_frames)
        );
        assert_eq!(report.stats.points_discarded, 0);
    }

    /// Single-sensor sweep from raw decoder records
    #[tokio::test]
    async fn test_e2e_scripted_single_sweep() {
        let scale = DecoderScale::default();
        let source = ScriptedSource::from_records([
            TelemetryRecord::boundary(1),
            TelemetryRecord::Obstacle {
                sensor_id: 1,
                yaw: scale.encode_angle(30.0),
                pitch: 0,
                distance: scale.encode_distance(10.0),
            },
            TelemetryRecord::Altitude { distance: 150 },
            TelemetryRecord::boundary(1),
        ]);
        let harness = wire(source, &MonitorBlueprint::default());

        // Source exhaustion closes both queues; every worker stops by itself.
        let snapshot = harness.ingestion.join().unwrap();
        let report = harness.assembly.await.unwrap();
        let altitude = harness.altitude.await.unwrap();

        assert_eq!(snapshot.records_received, 4);
        assert_eq!(report.published, 1);
        assert_eq!(altitude.updates, 1);

        let frame = harness.handle.latest_frame();
        assert_eq!(frame.frame_id, 1);
        assert_eq!(frame.points.len(), 1);
        assert!((frame.points[0].x - 8.660254).abs() < 1e-5);
        assert!((frame.points[0].y - 5.0).abs() < 1e-9);
        assert_eq!(frame.points[0].z, 0.0);
        assert_eq!(
            frame.missing_sensors.iter().copied().collect::<Vec<_>>(),
            vec![SensorId::Right, SensorId::Rear, SensorId::Left]
        );
        assert_eq!(harness.handle.latest_altitude(), AltitudeValue::new(1.5));
    }

    #[tokio::test]
    async fn test_e2e_empty_input_publishes_nothing() {
        let harness = wire(ScriptedSource::new("empty"), &MonitorBlueprint::default());

        harness.ingestion.join().unwrap();
        let report = harness.assembly.await.unwrap();
        harness.altitude.await.unwrap();

        assert_eq!(report.published, 0);
        assert!(harness.handle.latest_frame().is_empty());
        assert_eq!(harness.handle.generation(), 0);
    }

    /// Config -> pipeline: expected set, mock offline list and accumulation all honoured
    #[tokio::test]
    async fn test_config_drives_pipeline() {
        let toml = r#"
[source]
kind = "mock"

[source.mock]
cycle_hz = 200.0
points_per_sweep = 4
offline = ["right"]

[sensors]
expected = ["front", "right"]

[assembler]
frames_per_publish = 2

[display]
view = "side_on"
plot_size_m = 5.0
"#;
        let blueprint = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        let source = MockRadarSource::new(blueprint.source.mock.clone(), blueprint.decoder);
        let harness = wire(source, &blueprint);

        wait_for_generation(&harness.handle, 2).await;
        let (generation, frame) = harness.handle.snapshot();
        harness.shutdown.trigger();

        // Two cycles of front, rear and left merged into one published frame.
        assert_eq!(frame.points.len(), 2 * 3 * 4);
        assert_eq!(frame.frame_id % 2, 0);
        assert_eq!(
            frame.missing_sensors.iter().copied().collect::<Vec<_>>(),
            vec![SensorId::Right]
        );

        let scene = SceneBuilder::from_blueprint(&blueprint).build(
            generation,
            &frame,
            harness.handle.latest_altitude(),
        );
        assert_eq!(scene.missing_sensors, vec![SensorId::Right]);
        assert_eq!(scene.wedges.len(), 1);
        assert_eq!(scene.wedges[0].sensor, SensorId::Right);
        assert!(scene.ground.is_some());

        harness.ingestion.join().unwrap();
        harness.assembly.await.unwrap();
        harness.altitude.await.unwrap();
    }
}
