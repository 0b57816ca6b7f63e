use plate_core::CalloutTone;
use serde::Serialize;

use crate::bulk;
use crate::config::OverlayConfig;
use crate::decorations::{Decoration, DecorationSet};
use crate::error::OverlayError;
use crate::geometry::{Point, Size};
use crate::grid_resize::{
    GridHandle, GridResizeSession, ResizePreview, apply_grid_edits, plan_grid_edits,
};
use crate::hover::{HoverSession, resolve_hover};
use crate::layout::LayoutSnapshot;
use crate::overlay::{
    GutterControls, MenuPlacement, PanelPlacement, color_panel, column_quick_menu,
    gutter_controls, hover_menu, row_quick_menu,
};
use crate::pointer::{Control, HitTarget, PointerButton, PointerEvent, PointerId};
use crate::reorder::{ReorderSession, moved_index};
use crate::schedule::Millis;
use crate::selection::SelectionSession;
use crate::surface::BlockTree;

/// Side effects the host must carry out after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", content = "value", rename_all = "snake_case")]
pub enum EngineEffect {
    /// Call [`BlockOverlay::on_animation_frame`] on the next frame.
    RequestAnimationFrame,
    CapturePointer(PointerId),
    /// Emitted whenever a gesture ends, however it ends.
    ReleasePointer(PointerId),
    OpenBlockMenu(usize),
}

/// The pointer gesture in progress. At most one exists at a time.
#[derive(Debug, Clone, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Reorder(ReorderSession),
    GridResize(GridResizeSession),
}

impl Interaction {
    pub fn pointer_id(&self) -> Option<PointerId> {
        match self {
            Interaction::Idle => None,
            Interaction::Reorder(session) => Some(session.pointer_id()),
            Interaction::GridResize(session) => Some(session.pointer_id()),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }
}

/// Every floating control's placement for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlayLayout {
    pub gutter: Option<GutterControls>,
    pub menu: Option<MenuPlacement>,
    pub color_panel: Option<PanelPlacement>,
    pub row_quick_menu: Option<Point>,
    pub column_quick_menu: Option<Point>,
    pub resize_preview: Option<ResizePreview>,
}

/// Routes pointer, timer and keyboard input to the hover, selection,
/// reorder and grid-resize sessions.
///
/// The engine owns no document: every handler that reads or edits blocks
/// takes the [`BlockTree`] and a fresh [`LayoutSnapshot`]. Handlers never
/// fail; anything that goes wrong is logged and leaves the view unchanged.
#[derive(Debug, Clone, Default)]
pub struct BlockOverlay {
    config: OverlayConfig,
    hover: HoverSession,
    selection: SelectionSession,
    interaction: Interaction,
    menu: Option<usize>,
    color_panel_open: bool,
    frame_pending: bool,
}

impl BlockOverlay {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn hover(&self) -> &HoverSession {
        &self.hover
    }

    pub fn selection(&self) -> &SelectionSession {
        &self.selection
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn menu_block(&self) -> Option<usize> {
        self.menu
    }

    pub fn is_color_panel_open(&self) -> bool {
        self.color_panel_open
    }

    pub fn is_frame_pending(&self) -> bool {
        self.frame_pending
    }

    pub fn select_block(&mut self, index: usize, extend: bool) {
        self.selection.select_block(index, extend);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    // --- pointer input -------------------------------------------------

    pub fn on_pointer_move<T: BlockTree + ?Sized>(
        &mut self,
        tree: &T,
        layout: &LayoutSnapshot,
        event: &PointerEvent,
    ) -> Vec<EngineEffect> {
        let mut effects = Vec::new();
        match self.interaction.pointer_id() {
            None => {
                self.resolve_hover(tree, layout, event);
                return effects;
            }
            Some(active) if active != event.pointer_id => return effects,
            Some(_) => {}
        }

        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::GridResize(session) => {
                session.update(event.position, &self.config);
            }
            Interaction::Reorder(session) => {
                let was_dragging = session.is_dragging();
                let needs_frame = session.on_move(event.position, &self.config);
                if !was_dragging && session.is_dragging() {
                    if !tree.is_editable() {
                        tracing::debug!("reorder cancelled: document is read-only");
                        return self.end_interaction();
                    }
                    let source = session.source();
                    self.selection.select_range(source);
                    self.close_menu_at(event.time);
                }
                if needs_frame && !self.frame_pending {
                    self.frame_pending = true;
                    effects.push(EngineEffect::RequestAnimationFrame);
                }
            }
        }
        effects
    }

    fn resolve_hover<T: BlockTree + ?Sized>(
        &mut self,
        tree: &T,
        layout: &LayoutSnapshot,
        event: &PointerEvent,
    ) {
        // Without a rendered target, fall back to the layout's own hit test.
        let resolved;
        let target = match &event.target {
            // The pointer is on a floating control; enter/leave callbacks own that.
            HitTarget::Control(_) => return,
            HitTarget::Tree(path) => Some(path.as_slice()),
            HitTarget::None => {
                resolved = layout.resolve_position(event.position);
                resolved.as_deref()
            }
        };
        let hit = resolve_hover(tree, layout, event.position, target, &self.config);
        tracing::trace!(block = hit.map(|hit| hit.state.block), "hover resolved");
        self.hover.apply(hit, event.time, &self.config);
    }

    /// Applies the newest buffered reorder position as one committed move.
    pub fn on_animation_frame<T: BlockTree + ?Sized>(
        &mut self,
        tree: &mut T,
        layout: &LayoutSnapshot,
    ) -> Vec<EngineEffect> {
        self.frame_pending = false;
        let Interaction::Reorder(session) = &mut self.interaction else {
            return Vec::new();
        };
        let source = session.source();
        match session.on_frame(tree, layout) {
            Ok(Some(range)) => {
                self.hover
                    .remap(&*tree, |ix| moved_index(ix, &source, &range));
                self.selection.select_range(range);
                Vec::new()
            }
            Ok(None) => Vec::new(),
            Err(OverlayError::ReadOnly) => {
                tracing::debug!("reorder cancelled: document is read-only");
                self.end_interaction()
            }
            Err(err) => {
                tracing::debug!(error = %err, "reorder frame skipped");
                Vec::new()
            }
        }
    }

    pub fn on_pointer_down<T: BlockTree + ?Sized>(
        &mut self,
        tree: &T,
        layout: &LayoutSnapshot,
        event: &PointerEvent,
    ) -> Vec<EngineEffect> {
        if !self.interaction.is_idle() {
            tracing::debug!(pointer = event.pointer_id, "pointer down ignored: pointer already captured");
            return Vec::new();
        }
        let count = tree.child_count();

        match &event.target {
            HitTarget::Control(Control::DragHandle) => {
                let Some(grabbed) = self.hover.current().map(|h| h.block).filter(|ix| *ix < count)
                else {
                    return Vec::new();
                };
                let source = match self.selection.range() {
                    Some(range) if self.selection.contains(grabbed) && range.end <= count => range,
                    _ => grabbed..grabbed + 1,
                };
                self.interaction = Interaction::Reorder(ReorderSession::arm(
                    event.pointer_id,
                    grabbed,
                    source,
                    event.position,
                    event.shift,
                ));
                vec![EngineEffect::CapturePointer(event.pointer_id)]
            }
            HitTarget::Control(Control::GridHandle(handle)) => {
                self.start_grid_resize(tree, layout, *handle, event)
            }
            HitTarget::Control(_) => Vec::new(),
            HitTarget::Tree(path) if event.button == PointerButton::Secondary => {
                let Some(block) = path.first().copied().filter(|ix| *ix < count) else {
                    return Vec::new();
                };
                if !self.selection.contains(block) {
                    self.selection.select_block(block, event.shift);
                }
                self.open_menu(block)
            }
            HitTarget::Tree(_) | HitTarget::None => {
                self.selection.clear_selection();
                self.close_menu_at(event.time);
                Vec::new()
            }
        }
    }

    fn start_grid_resize<T: BlockTree + ?Sized>(
        &mut self,
        tree: &T,
        layout: &LayoutSnapshot,
        handle: GridHandle,
        event: &PointerEvent,
    ) -> Vec<EngineEffect> {
        let Some(table) = self
            .hover
            .current()
            .filter(|hover| hover.kind.has_grid_controls())
            .map(|hover| hover.block)
        else {
            return Vec::new();
        };
        match GridResizeSession::start(
            tree,
            layout,
            table,
            handle,
            event.pointer_id,
            event.position,
            &self.config,
        ) {
            Ok(session) => {
                self.interaction = Interaction::GridResize(session);
                vec![EngineEffect::CapturePointer(event.pointer_id)]
            }
            Err(err) => {
                tracing::debug!(error = %err, table, "grid resize not started");
                Vec::new()
            }
        }
    }

    pub fn on_pointer_up<T: BlockTree + ?Sized>(
        &mut self,
        tree: &mut T,
        layout: &LayoutSnapshot,
        event: &PointerEvent,
    ) -> Vec<EngineEffect> {
        if self.interaction.pointer_id() != Some(event.pointer_id) {
            return Vec::new();
        }
        let mut effects = vec![EngineEffect::ReleasePointer(event.pointer_id)];
        self.frame_pending = false;

        match std::mem::take(&mut self.interaction) {
            Interaction::Idle => {}
            Interaction::Reorder(mut session) => {
                if session.is_dragging() {
                    session.on_move(event.position, &self.config);
                    let source = session.source();
                    match session.on_frame(tree, layout) {
                        Ok(Some(range)) => {
                            self.hover
                                .remap(&*tree, |ix| moved_index(ix, &source, &range));
                            self.selection.select_range(range);
                        }
                        Ok(None) => self.selection.select_range(session.source()),
                        Err(err) => tracing::debug!(error = %err, "final reorder frame skipped"),
                    }
                    tracing::debug!(source = ?session.source(), "reorder finished");
                    self.revalidate_indices(&*tree);
                } else {
                    self.selection.select_block(session.grabbed(), session.extend_on_click());
                    effects.extend(self.open_menu(session.grabbed()));
                }
            }
            Interaction::GridResize(mut session) => {
                session.update(event.position, &self.config);
                let delta = session.finish();
                let edits = plan_grid_edits(delta);
                match apply_grid_edits(tree, session.table(), &edits) {
                    Ok(applied) => {
                        tracing::debug!(table = session.table(), ?delta, applied, "grid resize committed")
                    }
                    Err(err) => tracing::debug!(error = %err, "grid resize dropped"),
                }
                self.revalidate_indices(&*tree);
            }
        }
        effects
    }

    /// Ends the gesture without applying anything further.
    pub fn on_pointer_cancel(&mut self, event: &PointerEvent) -> Vec<EngineEffect> {
        self.on_lost_pointer_capture(event.pointer_id)
    }

    pub fn on_lost_pointer_capture(&mut self, pointer_id: PointerId) -> Vec<EngineEffect> {
        if self.interaction.pointer_id() != Some(pointer_id) {
            return Vec::new();
        }
        tracing::debug!(pointer = pointer_id, "gesture cancelled");
        self.end_interaction()
    }

    /// Cancels any gesture and closes the menu and color panel.
    pub fn on_escape(&mut self, now: Millis) -> Vec<EngineEffect> {
        let effects = self.end_interaction();
        self.close_menu_at(now);
        effects
    }

    fn end_interaction(&mut self) -> Vec<EngineEffect> {
        self.frame_pending = false;
        std::mem::take(&mut self.interaction)
            .pointer_id()
            .map(EngineEffect::ReleasePointer)
            .into_iter()
            .collect()
    }

    // --- timers and floating UI -----------------------------------------

    /// Advances the virtual clock. Returns whether hover was cleared.
    pub fn tick(&mut self, now: Millis) -> bool {
        if !self.interaction.is_idle() {
            return false;
        }
        let cleared = self.hover.tick(now);
        if cleared {
            tracing::trace!(now, "hover cleared");
        }
        cleared
    }

    pub fn on_hover_ui_enter(&mut self) {
        self.hover.on_ui_enter();
    }

    pub fn on_hover_ui_leave(&mut self, now: Millis) {
        self.hover.on_ui_leave(now, &self.config);
    }

    pub fn open_menu(&mut self, block: usize) -> Vec<EngineEffect> {
        self.menu = Some(block);
        self.color_panel_open = false;
        self.hover.set_menu_open(true, 0, &self.config);
        vec![EngineEffect::OpenBlockMenu(block)]
    }

    /// Closes the menu and restarts the hover clear countdown.
    pub fn close_menu(&mut self, now: Millis) {
        self.close_menu_at(now);
    }

    fn close_menu_at(&mut self, now: Millis) {
        self.color_panel_open = false;
        if self.menu.take().is_some() {
            self.hover.set_menu_open(false, now, &self.config);
        }
    }

    pub fn open_color_panel(&mut self) -> bool {
        self.color_panel_open = self.menu.is_some();
        self.color_panel_open
    }

    pub fn close_color_panel(&mut self) {
        self.color_panel_open = false;
    }

    // --- tree lifecycle -------------------------------------------------

    /// Re-validates every index the engine holds after the tree changed
    /// underneath it. Gestures whose target vanished are ended.
    pub fn on_tree_changed<T: BlockTree + ?Sized>(&mut self, tree: &T) -> Vec<EngineEffect> {
        let count = tree.child_count();
        self.revalidate_indices(&*tree);

        let stale = match &self.interaction {
            Interaction::Idle => false,
            Interaction::Reorder(session) => session.source().end > count,
            Interaction::GridResize(session) => !tree
                .block_kind(session.table())
                .is_some_and(|kind| kind.is_table()),
        };
        if stale {
            tracing::debug!("gesture target no longer exists");
            return self.end_interaction();
        }
        Vec::new()
    }

    /// A different document was loaded: forget everything.
    pub fn on_document_reload(&mut self) -> Vec<EngineEffect> {
        let effects = self.end_interaction();
        self.hover = HoverSession::default();
        self.selection.clear_selection();
        self.menu = None;
        self.color_panel_open = false;
        effects
    }

    fn revalidate_indices<T: BlockTree + ?Sized>(&mut self, tree: &T) {
        let count = tree.child_count();
        self.selection.clamp_to(count);
        self.hover.revalidate(&*tree);
        if self.menu.is_some_and(|block| block >= count) {
            self.drop_menu_and_hover();
        }
    }

    /// Closes the menu without a hover clear countdown; used when the block
    /// it belonged to is gone.
    fn drop_menu_and_hover(&mut self) {
        self.menu = None;
        self.color_panel_open = false;
        self.hover.set_menu_open(false, 0, &self.config);
        self.hover.clear();
    }

    // --- bulk operations ------------------------------------------------

    pub fn active_indices<T: BlockTree + ?Sized>(&self, tree: &T) -> Vec<usize> {
        self.selection.resolve_active_indices(
            tree.child_count(),
            self.hover.current().map(|hover| hover.block),
            tree.cursor_block(),
        )
    }

    pub fn duplicate_active<T: BlockTree + ?Sized>(&mut self, tree: &mut T) -> bool {
        let indices = self.active_indices(&*tree);
        match bulk::duplicate_blocks(tree, &indices) {
            Ok(Some(copies)) => {
                self.selection.select_range(copies);
                self.revalidate_indices(&*tree);
                true
            }
            Ok(None) => false,
            Err(err) => {
                tracing::debug!(error = %err, "duplicate skipped");
                false
            }
        }
    }

    pub fn delete_active<T: BlockTree + ?Sized>(&mut self, tree: &mut T) -> bool {
        let indices = self.active_indices(&*tree);
        match bulk::delete_blocks(tree, &indices) {
            Ok(deleted) => {
                if deleted {
                    self.selection.clear_selection();
                    self.drop_menu_and_hover();
                }
                deleted
            }
            Err(err) => {
                tracing::debug!(error = %err, "delete skipped");
                false
            }
        }
    }

    pub fn wrap_active_in_callout<T: BlockTree + ?Sized>(
        &mut self,
        tree: &mut T,
        tone: CalloutTone,
    ) -> bool {
        let indices = self.active_indices(&*tree);
        match bulk::wrap_in_callout(tree, &indices, tone) {
            Ok(Some(callout)) => {
                self.selection.select_range(callout..callout + 1);
                self.revalidate_indices(&*tree);
                true
            }
            Ok(None) => false,
            Err(err) => {
                tracing::debug!(error = %err, "wrap in callout skipped");
                false
            }
        }
    }

    pub fn set_active_text_color<T: BlockTree + ?Sized>(
        &mut self,
        tree: &mut T,
        color: Option<&str>,
    ) -> bool {
        let indices = self.active_indices(&*tree);
        bulk::set_text_color(tree, &indices, color).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "text color skipped");
            false
        })
    }

    pub fn set_active_background_color<T: BlockTree + ?Sized>(
        &mut self,
        tree: &mut T,
        color: Option<&str>,
    ) -> bool {
        let indices = self.active_indices(&*tree);
        bulk::set_background_color(tree, &indices, color).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "background color skipped");
            false
        })
    }

    // --- render outputs -------------------------------------------------

    pub fn decorations(&self) -> DecorationSet {
        let mut set = DecorationSet::default();
        if let Some(hover) = self.hover.current() {
            set.insert(hover.block, Decoration::Hovered);
        }
        for block in self.selection.indices() {
            set.insert(*block, Decoration::Selected);
        }
        if let Interaction::Reorder(session) = &self.interaction {
            if session.is_dragging() {
                for block in session.source() {
                    set.insert(block, Decoration::Dragging);
                }
            }
        }
        set
    }

    /// Places every visible control against `layout`. `menu_size` and
    /// `panel_size` are the rendered menu and color panel sizes.
    pub fn overlay_layout(
        &self,
        layout: &LayoutSnapshot,
        menu_size: Size,
        panel_size: Size,
    ) -> OverlayLayout {
        let config = &self.config;
        let hovered = self.hover.current().map(|hover| hover.block);

        let gutter = hovered
            .and_then(|block| layout.block_rect(block))
            .and_then(|rect| gutter_controls(layout.shell, rect, config));

        let menu = self
            .menu
            .and_then(|block| layout.block_rect(block))
            .and_then(|anchor| hover_menu(anchor, menu_size, layout.viewport, config));

        let color_panel = menu
            .filter(|_| self.color_panel_open)
            .and_then(|menu| color_panel(&menu, panel_size, layout.viewport, config));

        let (row_quick_menu, column_quick_menu) = self
            .hover
            .cell()
            .and_then(|cell| {
                let table = layout.block_rect(cell.block)?;
                let rect = layout.table_layout(cell.block)?.cell(cell.row, cell.col)?;
                Some((
                    row_quick_menu(rect, table, config),
                    column_quick_menu(rect, table, config),
                ))
            })
            .unwrap_or((None, None));

        let resize_preview = match &self.interaction {
            Interaction::GridResize(session) => Some(session.preview()),
            Interaction::Idle | Interaction::Reorder(_) => None,
        };

        OverlayLayout {
            gutter,
            menu,
            color_panel,
            row_quick_menu,
            column_quick_menu,
            resize_preview,
        }
    }
}
