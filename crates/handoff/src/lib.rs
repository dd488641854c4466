//! # Handoff
//!
//! 帧交接模块。
//!
//! 负责：
//! - 单槽最新帧交接 (`FrameSlot`)，生产者不阻塞、读者不撕裂
//! - 最新高度 (`AltitudeCell`)
//! - 多帧合并发布 (`FrameAccumulator`)
//! - 渲染侧视图、场景与渲染循环

mod accumulator;
mod altitude;
mod error;
mod handle;
mod renderer;
mod slot;
mod view;

pub use accumulator::FrameAccumulator;
pub use altitude::AltitudeCell;
pub use error::{HandoffError, Result};
pub use handle::MonitorHandle;
pub use renderer::{
    JsonLinesRenderer, LocalSceneRenderer, LogRenderer, RenderLoop, RenderStats, SceneRenderer,
};
pub use slot::FrameSlot;
pub use view::{project, FovWedge, GroundBand, ProjectedWedge, Scene, SceneBuilder, ViewPoint};

pub use contracts::ViewOrientation;
