//! LazyInk Core Library
//!
//! Platform-agnostic data model and logic for the LazyInk drawing surface:
//! lazy-brush smoothing, strokes and labels, persistence with rescaling, and
//! the sync events that keep several surfaces consistent.

pub mod canvas;
pub mod catenary;
pub mod config;
pub mod input;
pub mod lazy;
pub mod scheduler;
pub mod shapes;
pub mod storage;
pub mod sync;
pub mod tools;

pub use canvas::{DrawingState, UndoMode};
pub use catenary::Catenary;
pub use config::{ConfigError, Dimension, EngineConfig};
pub use input::{InputState, PointerEvent, PointerKind};
pub use lazy::{LazyCursor, LazyCursorState, UpdateOptions};
pub use scheduler::Scheduler;
pub use shapes::{AuthorId, Padding, Stroke, TextLabel, TextMetrics};
pub use storage::{LoadError, Rescale, SaveData, StrokeDefaults};
pub use sync::{SyncError, SyncEvent};
pub use tools::{GestureState, TextPress, TextStyle, TextTool, ToolKind, ToolManager};
