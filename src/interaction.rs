//! Pointer interaction on the workspace canvas.
//!
//! The state machine consumes surface-agnostic [`PointerEvent`]s, mutates the
//! [`EditorSession`] and asks a [`DecisionProvider`] whenever the user has to
//! confirm something. Anything that needs the server is handed back to the
//! caller as a [`ServerRequest`]; nothing here touches the network or the DOM.

use crate::config::CLICK_SLOP_PX;
use crate::palette::CatalogColor;
use crate::session::EditorSession;
use crate::{rotate_vec, PieceId, PlacementKey, Point};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` code.
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => PointerButton::Primary,
            2 => PointerButton::Secondary,
            _ => PointerButton::Other,
        }
    }
}

/// Pointer input in workspace canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { at: Point, button: PointerButton },
    Move { at: Point },
    Up { at: Point },
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Follows the placed copy even when pieces before it are removed.
        key: PlacementKey,
        piece_id: PieceId,
        /// Grab point in the piece's unrotated local frame.
        grab: Point,
        /// Where the press started, for click detection.
        origin: Point,
        moved: bool,
    },
}

/// The user's answer to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<T> {
    Accept(T),
    Decline,
}

/// Source of user decisions; browser dialogs in the app, scripted in tests.
pub trait DecisionProvider {
    fn confirm_rotation(&mut self, piece_id: PieceId) -> Decision<()>;
    fn confirm_removal(&mut self, piece_id: PieceId) -> Decision<()>;
    /// Pick a replacement from the closed catalog palette.
    fn choose_color(&mut self, piece_id: PieceId, current: &str) -> Decision<CatalogColor>;
}

/// Work the caller must send to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerRequest {
    Recolor { piece_id: PieceId, color: CatalogColor },
    Delete { piece_id: PieceId },
}

/// Outcome of one event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reaction {
    pub redraw: bool,
    pub request: Option<ServerRequest>,
}

impl Reaction {
    const NONE: Reaction = Reaction {
        redraw: false,
        request: None,
    };

    const REDRAW: Reaction = Reaction {
        redraw: true,
        request: None,
    };
}

/// Ask for a colour and turn an accepted choice into a recolour request.
///
/// Shared by clicks on placed pieces and clicks in the colour-group panel.
pub fn request_recolor(
    session: &EditorSession,
    piece_id: PieceId,
    decisions: &mut impl DecisionProvider,
) -> Option<ServerRequest> {
    let current = session.piece(piece_id)?.catalog_color.clone();
    match decisions.choose_color(piece_id, &current) {
        Decision::Accept(color) => Some(ServerRequest::Recolor { piece_id, color }),
        Decision::Decline => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Interaction {
    state: DragState,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Drop any drag in progress, e.g. when the session is reset under it.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn handle(
        &mut self,
        session: &mut EditorSession,
        event: PointerEvent,
        decisions: &mut impl DecisionProvider,
    ) -> Reaction {
        match event {
            PointerEvent::Down { at, button } => self.on_down(session, at, button, decisions),
            PointerEvent::Move { at } => self.on_move(session, at),
            PointerEvent::Up { at } => self.on_up(session, at, decisions),
            PointerEvent::Leave => {
                if self.is_dragging() {
                    debug!("Pointer left the workspace, drag ended");
                }
                self.state = DragState::Idle;
                Reaction::NONE
            }
        }
    }

    fn on_down(
        &mut self,
        session: &mut EditorSession,
        at: Point,
        button: PointerButton,
        decisions: &mut impl DecisionProvider,
    ) -> Reaction {
        match button {
            PointerButton::Primary => {}
            PointerButton::Secondary => return Self::remove_at(session, at, decisions),
            PointerButton::Other => return Reaction::NONE,
        }

        if let Some(index) = session.workspace_hit(at) {
            let placed = &session.workspace()[index];
            self.state = DragState::Dragging {
                key: placed.key,
                piece_id: placed.id,
                grab: placed.to_local(at),
                origin: at,
                moved: false,
            };
            debug!("Grabbed placed piece {} at index {}", placed.id, index);
            return Reaction::NONE;
        }

        let Some(piece_id) = session.source_hit(at).map(|piece| piece.id) else {
            return Reaction::NONE;
        };
        let Some(key) = session.spawn(piece_id, at) else {
            return Reaction::NONE;
        };
        // A fresh spawn is a drag, never a click.
        self.state = DragState::Dragging {
            key,
            piece_id,
            grab: Point::ORIGIN,
            origin: at,
            moved: true,
        };
        Reaction::REDRAW
    }

    fn on_move(&mut self, session: &mut EditorSession, at: Point) -> Reaction {
        let DragState::Dragging {
            key,
            piece_id,
            grab,
            origin,
            moved,
        } = self.state
        else {
            return Reaction::NONE;
        };
        let Some(placed) = session.placed_mut(key) else {
            self.state = DragState::Idle;
            return Reaction::NONE;
        };

        placed.position = at - rotate_vec(grab, f64::from(placed.rotation.degrees()));
        self.state = DragState::Dragging {
            key,
            piece_id,
            grab,
            origin,
            moved: moved || at.distance(origin) > CLICK_SLOP_PX,
        };
        Reaction::REDRAW
    }

    fn on_up(
        &mut self,
        session: &mut EditorSession,
        at: Point,
        decisions: &mut impl DecisionProvider,
    ) -> Reaction {
        let DragState::Dragging {
            key,
            piece_id,
            origin,
            moved,
            ..
        } = std::mem::take(&mut self.state)
        else {
            return Reaction::NONE;
        };

        if !moved && at.distance(origin) <= CLICK_SLOP_PX {
            return Reaction {
                redraw: false,
                request: request_recolor(session, piece_id, decisions),
            };
        }

        let Some(placed) = session.placed_mut(key) else {
            return Reaction::NONE;
        };
        match decisions.confirm_rotation(piece_id) {
            Decision::Accept(()) => {
                placed.rotate_quarter();
                debug!(
                    "Piece {} rotated to {} degrees",
                    piece_id,
                    placed.rotation.degrees()
                );
                Reaction::REDRAW
            }
            Decision::Decline => Reaction::NONE,
        }
    }

    fn remove_at(
        session: &mut EditorSession,
        at: Point,
        decisions: &mut impl DecisionProvider,
    ) -> Reaction {
        let Some(index) = session.workspace_hit(at) else {
            return Reaction::NONE;
        };
        let piece_id = session.workspace()[index].id;
        match decisions.confirm_removal(piece_id) {
            Decision::Accept(()) => {
                session.remove_workspace_piece(index);
                info!("Removed placed piece {}", piece_id);
                Reaction {
                    redraw: true,
                    request: Some(ServerRequest::Delete { piece_id }),
                }
            }
            Decision::Decline => Reaction::NONE,
        }
    }
}
