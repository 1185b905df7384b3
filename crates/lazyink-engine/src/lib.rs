//! LazyInk Engine
//!
//! Ties the core model and the raster layers into one drawing surface:
//! pointer gestures through the lazy brush, undo and clear, save and load
//! with rescaling, sync event emission and replay, and image export.

mod engine;
mod replay;

pub use engine::{Engine, EngineError, EngineResult, MediaSize};
pub use replay::ReplayStep;

pub use lazyink_core::{
    EngineConfig, PointerEvent, PointerKind, SaveData, SyncEvent, ToolKind, UndoMode,
};
pub use lazyink_render::{ExportFormat, ExportOptions, LayerKind, MediaFrame, Snapshot};
