//! The drawing engine: one surface with its gestures, layers and sync.

use crate::replay::{Replay, ReplayStep};
use kurbo::{Point, Size, Vec2};
use lazyink_core::canvas::{DrawingState, UndoMode};
use lazyink_core::config::{ConfigError, EngineConfig, check_color};
use lazyink_core::input::{InputState, PointerEvent, PointerKind};
use lazyink_core::lazy::{LazyCursor, LazyCursorState, UpdateOptions};
use lazyink_core::shapes::{Stroke, TextLabel, now_millis};
use lazyink_core::storage::{LoadError, SaveData, StrokeDefaults};
use lazyink_core::sync::{SyncError, SyncEvent};
use lazyink_core::tools::{TextPress, TextStyle, TextTool, ToolKind, ToolManager};
use lazyink_render::export::{self, ExportOptions, Snapshot};
use lazyink_render::painter::{self, InterfaceStyle, MediaFrame};
use lazyink_render::{
    Color, Compositor, LayerKind, Pixmap, RenderError, TextRasterizer, css_color_or_black,
};
use std::time::Duration;
use thiserror::Error;

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Engine has been disposed")]
    Disposed,
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Natural size of the background media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaSize {
    pub width: u32,
    pub height: u32,
}

type ChangeCallback = Box<dyn FnMut(&Engine)>;
type SyncCallback = Box<dyn FnMut(&SyncEvent)>;
type MediaCallback = Box<dyn FnMut(MediaSize)>;

/// A drawing surface.
///
/// Single-threaded and frame-driven: the host forwards pointer input, calls
/// [`frame`](Self::frame) once per display refresh, and moves
/// [`SyncEvent`]s between peers.
pub struct Engine {
    config: EngineConfig,
    state: DrawingState,
    compositor: Compositor,
    lazy: LazyCursor,
    input: InputState,
    tools: ToolManager,
    text_tool: TextTool,
    text_dragged: bool,
    text: TextRasterizer,
    replay: Replay,
    media: Option<MediaFrame>,
    last_sync_event: Option<SyncEvent>,
    /// Interface overlay needs a repaint on the next frame.
    dirty: bool,
    disposed: bool,
    on_change: Option<ChangeCallback>,
    on_sync_data_change: Option<SyncCallback>,
    on_load_media: Option<MediaCallback>,
}

impl Engine {
    /// Build an engine for a container of the given size.
    pub fn new(config: EngineConfig, container: Size) -> EngineResult<Self> {
        config.validate()?;
        let size = config.canvas_size(container);
        let compositor = Compositor::new(size)?;

        // Start centered with a slack string so the guide is visible at once
        let center = Point::new(size.width / 2.0, size.height / 2.0);
        let quarter = Vec2::new(config.lazy_radius / 4.0, 0.0);
        let mut lazy = LazyCursor::new(config.lazy_radius, center);
        lazy.update(center - quarter, UpdateOptions::BOTH);
        lazy.update(center + quarter, UpdateOptions::default());

        let mut engine = Self {
            text_tool: TextTool::new(config.input_anchor),
            state: DrawingState::new(compositor.size().width, compositor.size().height),
            compositor,
            lazy,
            input: InputState::new(),
            tools: ToolManager::new(),
            text_dragged: false,
            text: TextRasterizer::new(),
            replay: Replay::new(),
            media: None,
            last_sync_event: None,
            dirty: true,
            disposed: false,
            on_change: None,
            on_sync_data_change: None,
            on_load_media: None,
            config,
        };
        engine.paint_grid();
        log::info!(
            "Engine ready at {}x{}",
            engine.state.canvas_width,
            engine.state.canvas_height
        );
        Ok(engine)
    }

    // --- Callbacks ---

    /// Called after every local committed mutation.
    pub fn set_on_change(&mut self, callback: impl FnMut(&Engine) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Called with every locally emitted sync event.
    pub fn set_on_sync_data_change(&mut self, callback: impl FnMut(&SyncEvent) + 'static) {
        self.on_sync_data_change = Some(Box::new(callback));
    }

    /// Called when the natural size of the background media becomes known.
    pub fn set_on_load_media(&mut self, callback: impl FnMut(MediaSize) + 'static) {
        self.on_load_media = Some(Box::new(callback));
    }

    fn fire_change(&mut self) {
        if let Some(mut callback) = self.on_change.take() {
            callback(self);
            // The callback may have installed a replacement
            if self.on_change.is_none() {
                self.on_change = Some(callback);
            }
        }
    }

    fn emit(&mut self, event: SyncEvent) {
        if let Some(callback) = self.on_sync_data_change.as_mut() {
            callback(&event);
        }
        self.last_sync_event = Some(event);
    }

    // --- Accessors ---

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn lines(&self) -> &[Stroke] {
        &self.state.lines
    }

    pub fn texts(&self) -> &[TextLabel] {
        &self.state.texts
    }

    /// Canvas size in pixels.
    pub fn size(&self) -> Size {
        self.state.size()
    }

    pub fn mode(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn lazy_state(&self) -> LazyCursorState {
        self.lazy.state()
    }

    /// Where the next label will be placed.
    pub fn text_anchor(&self) -> Point {
        self.text_tool.anchor()
    }

    /// Points of the local stroke in progress.
    pub fn stroke_in_progress(&self) -> &[Point] {
        self.tools.points()
    }

    /// Most recent locally emitted sync event.
    pub fn last_sync_event(&self) -> Option<&SyncEvent> {
        self.last_sync_event.as_ref()
    }

    /// Whether a load replay still has steps pending.
    pub fn is_replaying(&self) -> bool {
        self.replay.is_active()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// One raster layer.
    pub fn layer(&self, kind: LayerKind) -> &Pixmap {
        self.compositor.layer(kind)
    }

    fn accepts_input(&self) -> bool {
        !self.disposed && !self.config.disabled
    }

    // --- Pointer input ---

    /// Dispatch a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position, kind } => self.pointer_down(position, kind),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position),
            PointerEvent::Leave { position } => self.pointer_leave(position),
        }
    }

    pub fn pointer_down(&mut self, position: Point, kind: PointerKind) {
        if !self.accepts_input() {
            return;
        }
        self.input
            .handle_pointer_event(PointerEvent::Down { position, kind });

        match self.tools.current_tool {
            ToolKind::Text => {
                self.text_dragged = false;
                if let TextPress::Anchored(anchor) = self.text_tool.press(&self.state, position) {
                    log::debug!("Text input anchored at ({:.1}, {:.1})", anchor.x, anchor.y);
                }
            }
            ToolKind::Brush => {
                let options = match kind {
                    PointerKind::Touch => UpdateOptions::BOTH,
                    PointerKind::Mouse => UpdateOptions::default(),
                };
                self.lazy.update(position, options);
                self.dirty = true;
                self.tools.begin(self.lazy.brush());
            }
        }
    }

    pub fn pointer_move(&mut self, position: Point) {
        if !self.accepts_input() {
            return;
        }
        self.input.handle_pointer_event(PointerEvent::Move { position });

        match self.tools.current_tool {
            ToolKind::Text => {
                if self.input.is_pressed {
                    self.drag_text(position);
                }
            }
            ToolKind::Brush => self.advance_brush(position),
        }
    }

    /// End the gesture at `position`.
    pub fn pointer_up(&mut self, position: Point) {
        self.finish_gesture(PointerEvent::Up { position });
    }

    /// The pointer left the surface; ends the gesture like `pointer_up`.
    pub fn pointer_leave(&mut self, position: Point) {
        self.finish_gesture(PointerEvent::Leave { position });
    }

    fn finish_gesture(&mut self, event: PointerEvent) {
        if !self.accepts_input() {
            return;
        }
        let position = event.position();
        self.input.handle_pointer_event(event);

        match self.tools.current_tool {
            ToolKind::Text => {
                self.text_tool.release();
                if std::mem::take(&mut self.text_dragged) {
                    self.fire_change();
                }
            }
            ToolKind::Brush => {
                if !self.tools.is_active() {
                    // Hovering out of the surface
                    self.lazy.update(position, UpdateOptions::default());
                    self.dirty = true;
                    return;
                }
                self.advance_brush(position);
                match self.tools.end() {
                    Some(points) => self.commit_stroke(points),
                    None => self.compositor.clear(LayerKind::Temp),
                }
            }
        }
    }

    fn advance_brush(&mut self, position: Point) {
        self.lazy.update(position, UpdateOptions::default());
        self.dirty = true;

        if self
            .tools
            .update(self.lazy.brush(), self.lazy.is_enabled(), self.lazy.has_moved())
        {
            let temp = self.compositor.layer_mut(LayerKind::Temp);
            temp.fill(Color::TRANSPARENT);
            painter::stroke_points(
                temp,
                self.tools.points(),
                &self.config.brush_color,
                self.config.brush_radius,
            );
            let event = SyncEvent::stroke_progress(
                self.tools.points(),
                &self.config.brush_color,
                self.config.brush_radius,
                self.size(),
            );
            self.emit(event);
        }
    }

    fn commit_stroke(&mut self, points: Vec<Point>) {
        let stroke = Stroke::new(points, self.config.brush_color.clone(), self.config.brush_radius)
            .with_author(self.config.author_id)
            .with_timestamp(now_millis());

        painter::draw_stroke(self.compositor.layer_mut(LayerKind::Drawing), &stroke);
        self.compositor.clear(LayerKind::Temp);

        let event = SyncEvent::stroke_commit(&stroke, self.size());
        self.state.push_line(stroke);
        self.emit(event);
        self.fire_change();
    }

    fn drag_text(&mut self, position: Point) {
        let Some(index) = self.text_tool.drag(&mut self.state.texts, position) else {
            return;
        };
        self.text_dragged = true;
        self.paint_texts();
        if let Some(label) = self.state.texts.get(index) {
            let event = SyncEvent::text_move(index, label, self.size());
            self.emit(event);
        }
    }

    // --- Modes and text entry ---

    /// Switch between brush and text mode, abandoning any gesture.
    pub fn set_mode(&mut self, mode: ToolKind) {
        if self.disposed || self.tools.current_tool == mode {
            return;
        }
        self.tools.set_tool(mode);
        self.text_tool.release();
        self.compositor.clear(LayerKind::Temp);
        self.dirty = true;
    }

    /// Replace the live text input buffer.
    pub fn set_text_input(&mut self, text: &str) {
        if !self.disposed {
            self.text_tool.set_input(text);
        }
    }

    pub fn text_input(&self) -> &str {
        self.text_tool.input()
    }

    /// Commit the text input as a new label (blur or Enter).
    /// Returns false when the input was blank.
    pub fn commit_text(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let style = TextStyle {
            font_family: self.config.font_family.clone(),
            size_ratio: self.config.font_size_ratio,
            color: self.config.text_color.clone(),
            background_color: self.config.text_background.clone(),
            padding: self.config.text_padding,
            author_id: self.config.author_id,
        };
        let size = self.size();
        let Some(label) = self.text_tool.commit(&style, size, &self.text) else {
            return false;
        };

        let event = SyncEvent::text_new(&label, size);
        self.state.push_text(label);
        self.paint_texts();
        self.emit(event);
        self.fire_change();
        true
    }

    // --- Undo and clear ---

    /// Undo in the collection of the current mode.
    pub fn undo(&mut self) -> bool {
        let mode = match self.tools.current_tool {
            ToolKind::Brush => UndoMode::Brush,
            ToolKind::Text => UndoMode::Text,
        };
        self.undo_mode(mode)
    }

    /// Remove the most recent stroke or label. Returns false (and emits
    /// nothing) when there was nothing to remove.
    pub fn undo_mode(&mut self, mode: UndoMode) -> bool {
        if self.disposed || !self.undo_local(mode) {
            return false;
        }
        self.emit(SyncEvent::Undo { mode });
        self.fire_change();
        true
    }

    fn undo_local(&mut self, mode: UndoMode) -> bool {
        if !self.state.undo(mode) {
            return false;
        }
        match mode {
            UndoMode::Brush => {
                // A half-finished replay would repaint the removed stroke
                self.replay.cancel();
                let drawing = self.compositor.layer_mut(LayerKind::Drawing);
                painter::redraw_strokes(drawing, &self.state.lines);
                self.compositor.clear(LayerKind::Temp);
            }
            UndoMode::Text => {
                self.text_tool.release();
                self.paint_texts();
            }
        }
        true
    }

    /// Erase all strokes and labels.
    pub fn clear(&mut self) {
        if self.disposed {
            return;
        }
        self.clear_local();
        self.emit(SyncEvent::Clear);
        self.fire_change();
    }

    fn clear_local(&mut self) {
        self.replay.cancel();
        self.tools.cancel();
        self.text_tool.release();
        self.state.clear();
        self.compositor.clear_content();
        self.paint_grid();
    }

    // --- Persistence ---

    /// Current drawing in the persistence format.
    pub fn save_data(&self) -> SaveData {
        SaveData::from_state(&self.state)
    }

    /// Current drawing as JSON.
    pub fn serialized_state(&self) -> EngineResult<String> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        Ok(self.save_data().to_json()?)
    }

    /// Load a saved drawing, replaying it unless configured otherwise.
    pub fn load(&mut self, json: &str) -> EngineResult<()> {
        self.load_with(json, self.config.immediate_loading)
    }

    /// Load a saved drawing.
    ///
    /// The payload is fully validated before anything is touched. With
    /// `immediate` the strokes are painted at once; otherwise they are
    /// replayed point by point from [`frame`](Self::frame). Fires
    /// `on_change` once the drawing is in place; emits no sync event.
    pub fn load_with(&mut self, json: &str, immediate: bool) -> EngineResult<()> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        let defaults = StrokeDefaults {
            color: self.config.brush_color.clone(),
            radius: self.config.brush_radius,
        };
        let data = SaveData::parse(json, &defaults)?;
        let source = data.size();
        let data = data.rescaled_to(self.size())?;

        self.clear_local();
        self.state = data.into_state();
        self.fit_texts();
        log::info!(
            "Loaded {} lines and {} texts ({}x{} -> {}x{})",
            self.state.lines.len(),
            self.state.texts.len(),
            source.width,
            source.height,
            self.state.canvas_width,
            self.state.canvas_height
        );

        self.paint_texts();
        if immediate {
            let drawing = self.compositor.layer_mut(LayerKind::Drawing);
            painter::redraw_strokes(drawing, &self.state.lines);
        } else {
            let offset = Duration::from_millis(self.config.load_time_offset);
            let steps = self.replay.start(self.state.lines.clone(), offset);
            log::debug!("Queued {steps} replay steps");
        }
        self.fire_change();
        Ok(())
    }

    // --- Sync ---

    /// Replay a peer's event against this surface.
    ///
    /// Never emits an event and never fires `on_change`. Events with
    /// unusable dimensions are rejected and leave the state untouched.
    pub fn apply_sync_event(&mut self, event: SyncEvent) -> EngineResult<()> {
        if self.disposed {
            return Ok(());
        }
        let kind = event.kind();
        let event = event.rescaled_to(self.size()).inspect_err(|e| {
            log::warn!("Rejected {kind} sync event: {e}");
        })?;

        match event {
            SyncEvent::Clear => self.clear_local(),
            SyncEvent::Undo { mode } => {
                self.undo_local(mode);
            }
            SyncEvent::StrokeProgress {
                points,
                color,
                radius,
                ..
            } => {
                let temp = self.compositor.layer_mut(LayerKind::Temp);
                temp.fill(Color::TRANSPARENT);
                painter::stroke_points(temp, &points, &color, radius);
            }
            commit @ SyncEvent::StrokeCommit { .. } => {
                if let Some(stroke) = commit.to_stroke() {
                    painter::draw_stroke(self.compositor.layer_mut(LayerKind::Drawing), &stroke);
                    self.compositor.clear(LayerKind::Temp);
                    if !self.state.push_line(stroke) {
                        log::debug!("Ignored remote stroke with too few points");
                    }
                }
            }
            SyncEvent::TextNew { mut text, .. } => {
                text.fit(self.state.canvas_width, &self.text);
                self.state.push_text(text);
                self.paint_texts();
            }
            SyncEvent::TextMove {
                index, mut text, ..
            } => {
                text.fit(self.state.canvas_width, &self.text);
                if self.state.replace_text(index, text) {
                    self.paint_texts();
                } else {
                    log::warn!(
                        "Ignored text move for index {index}, only {} labels",
                        self.state.texts.len()
                    );
                }
            }
        }
        Ok(())
    }

    // --- Frame and layout ---

    /// Run due replay steps and repaint the interface if needed.
    /// `now` is the monotonic time since the engine was created.
    pub fn frame(&mut self, now: Duration) {
        if self.disposed {
            return;
        }
        for step in self.replay.advance(now) {
            self.run_replay_step(step);
        }
        if std::mem::take(&mut self.dirty) {
            self.paint_interface();
        }
    }

    fn run_replay_step(&mut self, step: ReplayStep) {
        match step {
            ReplayStep::Progress { line, upto } => {
                if let Some(stroke) = self.replay.line(line) {
                    let temp = self.compositor.layer_mut(LayerKind::Temp);
                    temp.fill(Color::TRANSPARENT);
                    let upto = upto.min(stroke.points.len());
                    let points = &stroke.points[..upto];
                    painter::stroke_points(temp, points, &stroke.color, stroke.radius);
                }
            }
            ReplayStep::Commit { line } => {
                if let Some(stroke) = self.replay.line(line) {
                    painter::draw_stroke(self.compositor.layer_mut(LayerKind::Drawing), stroke);
                    self.compositor.clear(LayerKind::Temp);
                }
            }
        }
    }

    /// Re-layout inside a container of the given size.
    pub fn resize(&mut self, container: Size) -> EngineResult<()> {
        let size = self.config.canvas_size(container);
        self.set_canvas_dimensions(size)
    }

    /// Change the canvas size, rescaling all content to fit.
    pub fn set_canvas_dimensions(&mut self, size: Size) -> EngineResult<()> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        // Geometry follows the rounded pixel size the layers end up with
        let before = self.size();
        self.compositor.resize(size)?;
        let rescaled = match self.save_data().rescaled_to(self.compositor.size()) {
            Ok(data) => data,
            Err(e) => {
                self.compositor.resize(before)?;
                return Err(e.into());
            }
        };

        self.replay.cancel();
        self.tools.cancel();
        self.state = rescaled.into_state();
        self.fit_texts();
        log::info!(
            "Canvas resized {}x{} -> {}x{}",
            before.width,
            before.height,
            self.state.canvas_width,
            self.state.canvas_height
        );

        self.repaint_all()
    }

    /// Repaint every layer from the drawing state.
    pub fn repaint_all(&mut self) -> EngineResult<()> {
        self.paint_grid();
        self.paint_media()?;
        let drawing = self.compositor.layer_mut(LayerKind::Drawing);
        painter::redraw_strokes(drawing, &self.state.lines);
        self.compositor.clear(LayerKind::Temp);
        self.paint_texts();
        self.dirty = true;
        Ok(())
    }

    fn paint_grid(&mut self) {
        let grid = self.compositor.layer_mut(LayerKind::Grid);
        if self.config.hide_grid {
            grid.fill(Color::TRANSPARENT);
        } else {
            painter::draw_grid(grid, self.config.grid_spacing, &self.config.grid_color);
        }
    }

    fn paint_texts(&mut self) {
        let layer = self.compositor.layer_mut(LayerKind::Text);
        painter::draw_texts(layer, &self.state.texts, self.state.canvas_width, &mut self.text);
    }

    /// Re-measure every label at the current canvas width.
    fn fit_texts(&mut self) {
        let width = self.state.canvas_width;
        for label in &mut self.state.texts {
            label.fit(width, &self.text);
        }
    }

    fn paint_media(&mut self) -> EngineResult<()> {
        let layer = self.compositor.layer_mut(LayerKind::Media);
        match &self.media {
            Some(frame) => painter::draw_media(layer, frame)?,
            None => layer.fill(Color::TRANSPARENT),
        }
        Ok(())
    }

    fn paint_interface(&mut self) {
        let cursor = self.lazy.state();
        let style = InterfaceStyle {
            brush_color: self.config.brush_color.clone(),
            brush_radius: self.config.brush_radius,
            catenary_color: self.config.catenary_color.clone(),
        };
        let layer = self.compositor.layer_mut(LayerKind::Interface);
        if self.config.hide_interface {
            layer.fill(Color::TRANSPARENT);
        } else {
            painter::draw_interface(layer, &cursor, &style);
        }
    }

    // --- Live settings ---

    pub fn set_lazy_radius(&mut self, radius: f64) -> EngineResult<()> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "lazyRadius",
                value: radius,
            }
            .into());
        }
        self.config.lazy_radius = radius;
        self.lazy.set_radius(radius);
        self.dirty = true;
        Ok(())
    }

    pub fn set_brush_radius(&mut self, radius: f64) -> EngineResult<()> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "brushRadius",
                value: radius,
            }
            .into());
        }
        self.config.brush_radius = radius;
        self.dirty = true;
        Ok(())
    }

    pub fn set_brush_color(&mut self, color: &str) -> EngineResult<()> {
        check_color("brushColor", color)?;
        self.config.brush_color = color.to_string();
        self.dirty = true;
        Ok(())
    }

    pub fn set_catenary_color(&mut self, color: &str) -> EngineResult<()> {
        check_color("catenaryColor", color)?;
        self.config.catenary_color = color.to_string();
        self.dirty = true;
        Ok(())
    }

    pub fn set_grid_color(&mut self, color: &str) -> EngineResult<()> {
        check_color("gridColor", color)?;
        self.config.grid_color = color.to_string();
        self.paint_grid();
        self.dirty = true;
        Ok(())
    }

    pub fn set_hide_grid(&mut self, hide: bool) {
        self.config.hide_grid = hide;
        self.paint_grid();
        self.dirty = true;
    }

    pub fn set_hide_interface(&mut self, hide: bool) {
        self.config.hide_interface = hide;
        self.dirty = true;
    }

    /// Ignore pointer input while set. A gesture in progress is dropped.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
        if disabled {
            self.tools.cancel();
            self.text_tool.release();
            self.compositor.clear(LayerKind::Temp);
        }
        self.dirty = true;
    }

    // --- Media ---

    /// Show a decoded background image or the current video frame.
    ///
    /// `on_load_media` fires when the natural size is first known or changes.
    pub fn set_media_frame(&mut self, frame: MediaFrame) -> EngineResult<()> {
        if self.disposed {
            return Ok(());
        }
        let size = MediaSize {
            width: frame.width,
            height: frame.height,
        };
        let changed = self
            .media
            .as_ref()
            .is_none_or(|m| m.width != size.width || m.height != size.height);

        self.media = Some(frame);
        self.paint_media()?;

        if changed {
            log::debug!("Background media is {}x{}", size.width, size.height);
            if let Some(callback) = self.on_load_media.as_mut() {
                callback(size);
            }
        }
        Ok(())
    }

    /// Remove the background media.
    pub fn clear_media(&mut self) {
        self.media = None;
        self.compositor.clear(LayerKind::Media);
    }

    pub fn media_size(&self) -> Option<MediaSize> {
        self.media.as_ref().map(|m| MediaSize {
            width: m.width,
            height: m.height,
        })
    }

    // --- Output ---

    fn background(&self) -> Color {
        css_color_or_black(&self.config.background_color)
    }

    /// Encode the background and annotations as a `data:` URL.
    pub fn export_image(&mut self, options: &ExportOptions) -> EngineResult<Snapshot> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        let background = self.background();
        Ok(export::export(
            &mut self.compositor,
            self.media.as_ref(),
            background,
            options,
        )?)
    }

    /// Everything as shown on screen, grid and overlay included.
    pub fn composite(&self) -> EngineResult<Pixmap> {
        Ok(self.compositor.composite(self.background())?)
    }

    /// Stop all deferred work. Every later call is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.replay.close();
        self.tools.cancel();
        self.disposed = true;
        self.on_change = None;
        self.on_sync_data_change = None;
        self.on_load_media = None;
        log::info!("Engine disposed");
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("size", &self.size())
            .field("lines", &self.state.lines.len())
            .field("texts", &self.state.texts.len())
            .field("mode", &self.tools.current_tool)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
