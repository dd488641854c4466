//! # Assembler
//!
//! 雷达阵列帧组装（以哨兵协议为准）。
//!
//! 负责：
//! - 球坐标到车体坐标转换
//! - 每传感器哨兵状态机
//! - 输出 `Frame` 并写入交接槽
//! - 高度最新值跟踪
//!
//! ## 使用示例
//!
//! ```ignore
//! use assembler::FrameAssembler;
//!
//! let mut assembler = FrameAssembler::with_real_sensors();
//!
//! // Push readings as they arrive
//! if let Some(frame) = assembler.push(reading) {
//!     // Handle completed frame
//! }
//! ```

mod altitude;
mod engine;
mod state;
mod transform;
mod worker;

pub use altitude::{AltitudeStats, AltitudeTracker};
pub use engine::{AssemblerStats, FrameAssembler};
pub use state::{SensorFrameState, SensorStates};
pub use transform::{reading_to_point, spherical_to_cartesian};
pub use worker::{AssemblyReport, FrameAssemblyWorker};
