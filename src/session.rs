//! The editor session: everything the glass-piece editor knows between events.
//!
//! A session starts empty and is (re)initialised by each successful analysis;
//! a failed upload leaves it untouched. Server-origin pieces are replaced
//! wholesale on every recolour/delete reply; placed workspace pieces are then
//! reconciled against the new set so every placed id still resolves.
//!
//! Each analysis starts a new generation. Replies to requests sent under an
//! older generation are dropped instead of being applied to the new image.

use crate::api::{Analysis, ColorGroups, CuttingPlan, PieceSet};
use crate::{
    hit_test, hit_test_source, CanvasSize, ClientError, Piece, PieceId, PlacementKey, Point,
    WorkspaceIndex, WorkspacePiece,
};
use log::{debug, info, warn};

/// What a finished analysis means for the page.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Pieces were found; the workspace can be shown once the image loads.
    Ready { image_path: String, pieces: usize },
    /// Nothing to edit; the workspace stays hidden.
    Empty,
}

/// Counts analyses applied to a session.
pub type SessionGeneration = u64;

/// A generated replica and the cache token its image is loaded with.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaImage {
    pub path: String,
    pub token: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorSession {
    pieces: Vec<Piece>,
    color_groups: ColorGroups,
    workspace: Vec<WorkspacePiece>,
    image_path: Option<String>,
    replica: Option<ReplicaImage>,
    canvas: Option<CanvasSize>,
    split_x: f64,
    highlight: Option<String>,
    // both survive `reset`
    generation: SessionGeneration,
    next_key: PlacementKey,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything from the previous upload.
    pub fn reset(&mut self) {
        debug!("Resetting editor session");
        *self = Self {
            generation: self.generation,
            next_key: self.next_key,
            ..Self::default()
        };
    }

    /// Initialise from an analysis reply, starting a new generation.
    pub fn apply_analysis(&mut self, analysis: Analysis) -> AnalysisOutcome {
        self.reset();
        self.generation += 1;
        if analysis.pieces.is_empty() {
            warn!("Analysis of {} found no pieces", analysis.image_path);
            return AnalysisOutcome::Empty;
        }
        info!(
            "Session initialised with {} pieces in {} colour groups",
            analysis.pieces.len(),
            analysis.color_groups.len()
        );
        let outcome = AnalysisOutcome::Ready {
            image_path: analysis.image_path.clone(),
            pieces: analysis.pieces.len(),
        };
        self.pieces = analysis.pieces;
        self.color_groups = analysis.color_groups;
        self.image_path = Some(analysis.image_path);
        outcome
    }

    /// Apply the reply to an upload. A failed upload leaves the current
    /// image, pieces and placements as they were.
    pub fn apply_upload(
        &mut self,
        reply: Result<Analysis, ClientError>,
    ) -> Result<AnalysisOutcome, ClientError> {
        Ok(self.apply_analysis(reply?))
    }

    /// True once an analysis with at least one piece has been applied.
    pub fn is_ready(&self) -> bool {
        self.image_path.is_some()
    }

    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    /// Size the canvases once the original image has loaded.
    pub fn attach_canvas(&mut self, size: CanvasSize) {
        debug!("Canvas attached at {}x{}", size.width, size.height);
        self.canvas = Some(size);
        self.split_x = self.split_x.clamp(0.0, size.width);
    }

    pub fn canvas(&self) -> Option<CanvasSize> {
        self.canvas
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn color_groups(&self) -> &ColorGroups {
        &self.color_groups
    }

    pub fn workspace(&self) -> &[WorkspacePiece] {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut [WorkspacePiece] {
        &mut self.workspace
    }

    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    /// Topmost placed piece under `p`.
    pub fn workspace_hit(&self, p: Point) -> Option<WorkspaceIndex> {
        hit_test(&self.workspace, p)
    }

    /// Source piece under `p`, in source-image coordinates.
    pub fn source_hit(&self, p: Point) -> Option<&Piece> {
        hit_test_source(&self.pieces, p).map(|idx| &self.pieces[idx])
    }

    /// Place a copy of `piece_id` with its local origin at `at`.
    pub fn spawn(&mut self, piece_id: PieceId, at: Point) -> Option<PlacementKey> {
        let piece = self.pieces.iter().find(|p| p.id == piece_id)?;
        self.next_key += 1;
        let key = self.next_key;
        let placed = WorkspacePiece::spawn(piece, at, key);
        self.workspace.push(placed);
        Some(key)
    }

    pub fn placed_mut(&mut self, key: PlacementKey) -> Option<&mut WorkspacePiece> {
        self.workspace.iter_mut().find(|p| p.key == key)
    }

    pub fn remove_workspace_piece(&mut self, index: WorkspaceIndex) -> Option<WorkspacePiece> {
        if index < self.workspace.len() {
            Some(self.workspace.remove(index))
        } else {
            None
        }
    }

    /// Replace the server piece set and bring placed pieces in line with it.
    ///
    /// Placed pieces keep their geometry and position; only their colour is
    /// refreshed. Placed pieces whose id vanished are dropped. Returns how
    /// many were dropped, or `None` when the reply belongs to an earlier
    /// generation and was ignored.
    pub fn apply_piece_set(
        &mut self,
        generation: SessionGeneration,
        set: PieceSet,
    ) -> Option<usize> {
        if generation != self.generation {
            warn!(
                "Ignoring piece set from generation {} (now {})",
                generation, self.generation
            );
            return None;
        }
        self.pieces = set.pieces;
        self.color_groups = set.color_groups;

        let pieces = &self.pieces;
        let before = self.workspace.len();
        self.workspace
            .retain(|placed| pieces.iter().any(|p| p.id == placed.id));
        for placed in &mut self.workspace {
            if let Some(piece) = pieces.iter().find(|p| p.id == placed.id) {
                placed.color = piece.catalog_rgb;
            }
        }
        let dropped = before - self.workspace.len();
        if dropped > 0 {
            info!("Dropped {} placed pieces no longer known to the server", dropped);
        }
        if let Some(colour) = &self.highlight {
            if !self.color_groups.contains_key(colour) {
                self.highlight = None;
            }
        }
        Some(dropped)
    }

    /// Update the hovered colour group from a pointer on the source canvas.
    /// Returns whether the highlight changed.
    pub fn hover_source(&mut self, p: Point) -> bool {
        let next = self.source_hit(p).map(|piece| piece.catalog_color.clone());
        if next == self.highlight {
            return false;
        }
        self.highlight = next;
        true
    }

    pub fn clear_hover(&mut self) -> bool {
        self.highlight.take().is_some()
    }

    pub fn highlight(&self) -> Option<&str> {
        self.highlight.as_deref()
    }

    /// Move the preview divider, clamped to the canvas when its size is known.
    pub fn set_split(&mut self, x: f64) {
        self.split_x = match self.canvas {
            Some(size) => x.clamp(0.0, size.width),
            None => x.max(0.0),
        };
    }

    pub fn split_x(&self) -> f64 {
        self.split_x
    }

    /// Record the reply to a replica request.
    ///
    /// An error leaves any earlier replica in place. Returns whether a new
    /// replica was taken; stale replies are ignored.
    pub fn apply_replica(
        &mut self,
        generation: SessionGeneration,
        reply: Result<String, ClientError>,
        token: u64,
    ) -> Result<bool, ClientError> {
        let path = reply?;
        if generation != self.generation {
            warn!("Ignoring replica {} from generation {}", path, generation);
            return Ok(false);
        }
        info!("Replica available at {}", path);
        self.replica = Some(ReplicaImage { path, token });
        Ok(true)
    }

    pub fn replica(&self) -> Option<&ReplicaImage> {
        self.replica.as_ref()
    }

    /// Forget a replica whose image could not be loaded.
    pub fn drop_replica(&mut self) -> bool {
        self.replica.take().is_some()
    }

    /// Snapshot of the workspace for the save-plan request.
    pub fn cutting_plan(&self) -> CuttingPlan {
        CuttingPlan {
            plan: self.workspace.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{decode_reply, Replica};
    use crate::test_support::{piece, rect};
    use crate::{ColorGroup, Rgb, Rotation};

    pub(crate) fn analysis(pieces: Vec<Piece>) -> Analysis {
        let mut color_groups = ColorGroups::new();
        for p in &pieces {
            color_groups
                .entry(p.catalog_color.clone())
                .or_insert_with(|| ColorGroup {
                    pieces: Vec::new(),
                    total_area: 0,
                    percent_area: 0.0,
                })
                .pieces
                .push(p.clone());
        }
        Analysis {
            pieces,
            color_groups,
            image_path: "uploads/vitraz.png".to_string(),
        }
    }

    pub(crate) fn two_piece_session() -> EditorSession {
        let mut session = EditorSession::new();
        session.apply_analysis(analysis(vec![
            piece(1, "red", Rgb(255, 0, 0), rect(20.0, 20.0, 60.0, 40.0)),
            piece(2, "blue", Rgb(0, 0, 255), rect(100.0, 100.0, 140.0, 130.0)),
        ]));
        session.attach_canvas(CanvasSize {
            width: 200.0,
            height: 150.0,
        });
        session
    }

    #[test]
    fn empty_analysis_keeps_workspace_hidden() {
        let mut session = two_piece_session();
        let outcome = session.apply_analysis(analysis(Vec::new()));
        assert_eq!(outcome, AnalysisOutcome::Empty);
        assert!(!session.is_ready());
        assert!(session.pieces().is_empty());
        assert!(session.workspace().is_empty());
    }

    #[test]
    fn failed_upload_keeps_current_work() {
        let mut session = two_piece_session();
        session.spawn(1, Point::new(30.0, 30.0));
        let before = session.clone();

        let reply = decode_reply::<Analysis>(r#"{"error": "Neplatny soubor"}"#);
        let err = session.apply_upload(reply).unwrap_err();
        assert_eq!(err, ClientError::Application("Neplatny soubor".into()));
        assert_eq!(session, before);

        let err = session
            .apply_upload(Err(ClientError::Network("offline".into())))
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(session, before);
        assert!(session.is_ready());
    }

    #[test]
    fn new_analysis_resets_previous_state() {
        let mut session = two_piece_session();
        session.spawn(1, Point::new(30.0, 30.0));
        session.set_split(50.0);
        let outcome = session.apply_analysis(analysis(vec![piece(
            9,
            "lime",
            Rgb(0, 255, 0),
            rect(0.0, 0.0, 5.0, 5.0),
        )]));
        assert_eq!(
            outcome,
            AnalysisOutcome::Ready {
                image_path: "uploads/vitraz.png".into(),
                pieces: 1
            }
        );
        assert!(session.workspace().is_empty());
        assert_eq!(session.split_x(), 0.0);
        assert_eq!(session.canvas(), None);
    }

    #[test]
    fn recolor_updates_only_colour_of_every_instance() {
        let mut session = two_piece_session();
        session.spawn(1, Point::new(30.0, 30.0));
        session.spawn(2, Point::new(110.0, 110.0));
        session.spawn(1, Point::new(50.0, 25.0));
        session.workspace_mut()[2].rotate_quarter();
        let before = session.workspace().to_vec();

        let generation = session.generation();
        session.apply_piece_set(generation, PieceSet {
            pieces: vec![
                piece(1, "teal", Rgb(0, 128, 128), rect(20.0, 20.0, 60.0, 40.0)),
                piece(2, "blue", Rgb(0, 0, 255), rect(100.0, 100.0, 140.0, 130.0)),
            ],
            color_groups: ColorGroups::new(),
        });

        let after = session.workspace();
        assert_eq!(after.len(), 3);
        for (old, new) in before.iter().zip(after) {
            assert_eq!(old.contour, new.contour);
            assert_eq!(old.position, new.position);
            assert_eq!(old.rotation, new.rotation);
        }
        assert_eq!(after[0].color, Rgb(0, 128, 128));
        assert_eq!(after[2].color, Rgb(0, 128, 128));
        assert_eq!(after[1].color, Rgb(0, 0, 255));
        assert_eq!(after[2].rotation, Rotation::from_degrees(90));
    }

    #[test]
    fn vanished_pieces_are_dropped_from_workspace() {
        let mut session = two_piece_session();
        session.spawn(1, Point::new(30.0, 30.0));
        session.spawn(2, Point::new(110.0, 110.0));
        let generation = session.generation();
        let dropped = session.apply_piece_set(generation, PieceSet {
            pieces: vec![piece(2, "blue", Rgb(0, 0, 255), rect(100.0, 100.0, 140.0, 130.0))],
            color_groups: ColorGroups::new(),
        });
        assert_eq!(dropped, Some(1));
        assert_eq!(session.workspace().len(), 1);
        assert!(session
            .workspace()
            .iter()
            .all(|placed| session.piece(placed.id).is_some()));
    }

    #[test]
    fn hover_highlights_colour_group() {
        let mut session = two_piece_session();
        assert!(session.hover_source(Point::new(30.0, 30.0)));
        assert_eq!(session.highlight(), Some("red"));
        assert!(!session.hover_source(Point::new(35.0, 30.0)));
        assert!(session.hover_source(Point::new(5.0, 5.0)));
        assert_eq!(session.highlight(), None);
    }

    #[test]
    fn split_is_clamped_to_canvas() {
        let mut session = two_piece_session();
        session.set_split(500.0);
        assert_eq!(session.split_x(), 200.0);
        session.set_split(-3.0);
        assert_eq!(session.split_x(), 0.0);
    }

    #[test]
    fn spawn_of_unknown_piece_is_refused() {
        let mut session = two_piece_session();
        assert_eq!(session.spawn(42, Point::ORIGIN), None);
        assert!(session.workspace().is_empty());
    }

    fn replica_reply(body: &str) -> Result<String, ClientError> {
        decode_reply::<Replica>(body).map(|replica| replica.replica_path)
    }

    #[test]
    fn replica_error_reply_keeps_previous_state() {
        let mut session = two_piece_session();
        let generation = session.generation();

        let err = session
            .apply_replica(generation, replica_reply(r#"{"error": "Chyba"}"#), 1)
            .unwrap_err();
        assert_eq!(err, ClientError::Application("Chyba".into()));
        assert_eq!(session.replica(), None);

        let taken = session
            .apply_replica(generation, replica_reply(r#"{"replica_path": "out/r.png"}"#), 2)
            .unwrap();
        assert!(taken);
        assert!(session
            .apply_replica(generation, replica_reply(r#"{"error": "Chyba"}"#), 3)
            .is_err());
        assert_eq!(
            session.replica(),
            Some(&ReplicaImage {
                path: "out/r.png".into(),
                token: 2
            })
        );
    }

    #[test]
    fn unloadable_replica_is_dropped() {
        let mut session = two_piece_session();
        let generation = session.generation();
        session
            .apply_replica(generation, Ok("out/r.png".into()), 7)
            .unwrap();
        assert!(session.drop_replica());
        assert!(!session.drop_replica());
        assert_eq!(session.replica(), None);
    }

    #[test]
    fn replies_from_an_earlier_upload_are_ignored() {
        let mut session = two_piece_session();
        let stale = session.generation();
        session.apply_analysis(analysis(vec![piece(
            9,
            "lime",
            Rgb(0, 255, 0),
            rect(0.0, 0.0, 5.0, 5.0),
        )]));
        session.spawn(9, Point::new(2.0, 2.0));

        let applied = session.apply_piece_set(stale, PieceSet {
            pieces: vec![piece(1, "teal", Rgb(0, 128, 128), rect(20.0, 20.0, 60.0, 40.0))],
            color_groups: ColorGroups::new(),
        });
        assert_eq!(applied, None);
        assert_eq!(session.pieces()[0].id, 9);
        assert_eq!(session.workspace().len(), 1);

        let taken = session.apply_replica(stale, Ok("out/old.png".into()), 1);
        assert_eq!(taken, Ok(false));
        assert_eq!(session.replica(), None);
    }

    #[test]
    fn placement_keys_stay_unique_across_resets() {
        let mut session = two_piece_session();
        let first = session.spawn(1, Point::new(30.0, 30.0)).unwrap();
        let second = session.spawn(1, Point::new(40.0, 30.0)).unwrap();
        assert_ne!(first, second);

        session.remove_workspace_piece(0);
        assert_eq!(session.placed_mut(second).map(|p| p.position), Some(Point::new(40.0, 30.0)));
        assert!(session.placed_mut(first).is_none());

        session.apply_analysis(analysis(vec![piece(
            1,
            "red",
            Rgb(255, 0, 0),
            rect(20.0, 20.0, 60.0, 40.0),
        )]));
        let third = session.spawn(1, Point::new(30.0, 30.0)).unwrap();
        assert!(third > second);
    }

    #[test]
    fn cutting_plan_snapshots_workspace() {
        let mut session = two_piece_session();
        session.spawn(2, Point::new(110.0, 110.0));
        let plan = session.cutting_plan();
        assert_eq!(plan.plan.len(), 1);
        assert_eq!(plan.plan[0].id, 2);
        assert_eq!(plan.plan[0].contour[0], Point::new(-10.0, -10.0));
    }
}
