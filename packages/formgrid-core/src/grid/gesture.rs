//! Pointer gesture lifecycle for resize and drag.
//!
//! A gesture is `Idle → Active → Idle`. While active the controller holds a
//! pointer-move subscription and a cursor override on the host; both are
//! released whenever the gesture ends, is cancelled or the controller is
//! dropped. Live frames of a gesture dropped without `end` or `cancel` are
//! rolled back by the engine before its next committed operation.

use crate::error::FormError;

use super::coords::{end_column, layout_span};
use super::layout::{LayoutEngine, MoveOutcome, MoveTarget, ResizeEdge, ResizeOutcome};

/// Cursor shown for the whole page while a gesture is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    ColumnResize,
    Grabbing,
}

/// Environment hooks used by a gesture.
pub trait PointerHost {
    /// Starts delivering pointer-move notifications.
    fn subscribe_pointer_moves(&mut self);

    /// Stops delivering pointer-move notifications.
    fn unsubscribe_pointer_moves(&mut self);

    /// Forces `cursor` and suppresses text selection.
    fn set_cursor_override(&mut self, cursor: CursorStyle);

    /// Restores the default cursor and selection behaviour.
    fn clear_cursor_override(&mut self);
}

/// Gesture in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    Resize {
        field_id: String,
        edge: ResizeEdge,
    },
    Drag {
        field_id: String,
        hover: Option<MoveTarget>,
    },
}

/// How a gesture finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureResult {
    Resized(ResizeOutcome),
    Moved(MoveOutcome),
    /// Drag released away from any drop target
    Dropped,
}

/// Drives resize and drag gestures against a [`LayoutEngine`].
pub struct GestureController<H: PointerHost> {
    host: H,
    active: Option<Gesture>,
}

impl<H: PointerHost> GestureController<H> {
    pub fn new(host: H) -> Self {
        Self { host, active: None }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Gesture> {
        self.active.as_ref()
    }

    /// Starts resizing `field_id` from `edge`.
    ///
    /// # Errors
    /// `Busy` while another gesture is active, `NodeNotFound` for an
    /// unknown field.
    pub fn begin_resize(
        &mut self,
        engine: &mut LayoutEngine,
        field_id: &str,
        edge: ResizeEdge,
    ) -> Result<(), FormError> {
        self.begin(
            engine,
            Gesture::Resize {
                field_id: field_id.to_string(),
                edge,
            },
            CursorStyle::ColumnResize,
        )
    }

    /// Starts dragging `field_id`.
    pub fn begin_drag(&mut self, engine: &mut LayoutEngine, field_id: &str) -> Result<(), FormError> {
        self.begin(
            engine,
            Gesture::Drag {
                field_id: field_id.to_string(),
                hover: None,
            },
            CursorStyle::Grabbing,
        )
    }

    fn begin(
        &mut self,
        engine: &mut LayoutEngine,
        gesture: Gesture,
        cursor: CursorStyle,
    ) -> Result<(), FormError> {
        if self.active.is_some() {
            return Err(FormError::Busy);
        }
        let field_id = match &gesture {
            Gesture::Resize { field_id, .. } | Gesture::Drag { field_id, .. } => field_id,
        };
        if engine.document().field(field_id).is_none() {
            return Err(FormError::field_not_found(field_id));
        }

        engine.begin_gesture();
        self.host.subscribe_pointer_moves();
        self.host.set_cursor_override(cursor);
        tracing::debug!("Gesture started: {:?}", gesture);
        self.active = Some(gesture);
        Ok(())
    }

    /// Feeds the grid column under the pointer to an active resize.
    ///
    /// Returns the live placement, or `None` when no resize is active.
    pub fn pointer_moved(
        &mut self,
        engine: &mut LayoutEngine,
        column: u32,
    ) -> Result<Option<ResizeOutcome>, FormError> {
        let (field_id, edge) = match &self.active {
            Some(Gesture::Resize { field_id, edge }) => (field_id.clone(), *edge),
            _ => return Ok(None),
        };
        let field = engine
            .document()
            .field(&field_id)
            .ok_or_else(|| FormError::field_not_found(&field_id))?;
        let requested = match edge {
            ResizeEdge::Right => column.saturating_sub(field.grid_column) + 1,
            ResizeEdge::Left => end_column(field).saturating_sub(column) + 1,
        };
        engine
            .resize_field(&field_id, edge, requested, true)
            .map(Some)
    }

    /// Updates the drop target under an active drag.
    pub fn hover(&mut self, target: Option<MoveTarget>) {
        if let Some(Gesture::Drag { hover, .. }) = &mut self.active {
            *hover = target;
        }
    }

    /// Commits the active gesture.
    ///
    /// Returns `Ok(None)` when no gesture was active.
    pub fn end(&mut self, engine: &mut LayoutEngine) -> Result<Option<GestureResult>, FormError> {
        let gesture = match self.active.take() {
            Some(gesture) => gesture,
            None => return Ok(None),
        };
        self.release();

        let result = match gesture {
            Gesture::Resize { field_id, edge } => {
                let span = engine
                    .document()
                    .field(&field_id)
                    .map(layout_span)
                    .ok_or_else(|| FormError::field_not_found(&field_id));
                span.and_then(|span| engine.resize_field(&field_id, edge, span, false))
                    .map(GestureResult::Resized)
            }
            Gesture::Drag {
                field_id,
                hover: Some(target),
            } => engine
                .move_field(&field_id, &target)
                .map(GestureResult::Moved),
            Gesture::Drag { hover: None, .. } => Ok(GestureResult::Dropped),
        };

        // Rejected or failed commits leave the snapshot behind.
        if engine.gesture_active() {
            engine.abort_gesture();
        }
        tracing::debug!("Gesture ended: {:?}", result);
        result.map(Some)
    }

    /// Abandons the active gesture and restores the pre-gesture layout.
    ///
    /// Returns `false` when no gesture was active.
    pub fn cancel(&mut self, engine: &mut LayoutEngine) -> bool {
        if self.active.take().is_none() {
            return false;
        }
        self.release();
        engine.abort_gesture();
        tracing::debug!("Gesture cancelled");
        true
    }

    fn release(&mut self) {
        self.host.unsubscribe_pointer_moves();
        self.host.clear_cursor_override();
    }
}

impl<H: PointerHost> Drop for GestureController<H> {
    fn drop(&mut self) {
        if self.active.take().is_some() {
            self.release();
        }
    }
}
