//! Draw passes for the three editor canvases.
//!
//! Passes are written against [`Surface`] so they can run on a real 2D canvas
//! context or on a recording surface in tests.

use crate::config::{HIGHLIGHT_FILL, PIECE_STROKE};
use crate::session::EditorSession;
use crate::{CanvasSize, Point, WorkspacePiece};
use log::warn;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// The subset of a 2D drawing context the passes need.
pub trait Surface {
    type Image;

    fn clear(&mut self, size: CanvasSize);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, by: Point);
    fn rotate(&mut self, radians: f64);
    fn draw_image(&mut self, image: &Self::Image, at: Point);
    /// Restrict further drawing to an axis-aligned rectangle until `restore`.
    fn clip_rect(&mut self, origin: Point, size: CanvasSize);
    fn fill_polygon(&mut self, points: &[Point], fill: &str, stroke: Option<&str>);
}

/// Source canvas: the original image plus a highlight over the hovered colour group.
pub fn draw_source<S: Surface>(surface: &mut S, session: &EditorSession, original: &S::Image) {
    let size = session.canvas().unwrap_or_default();
    surface.clear(size);
    surface.draw_image(original, Point::ORIGIN);
    let Some(highlight) = session.highlight() else {
        return;
    };
    for piece in session
        .pieces()
        .iter()
        .filter(|p| p.catalog_color == highlight)
    {
        surface.fill_polygon(&piece.contour, HIGHLIGHT_FILL, None);
    }
}

fn draw_placed<S: Surface>(surface: &mut S, piece: &WorkspacePiece) {
    surface.save();
    surface.translate(piece.position);
    surface.rotate(piece.rotation.radians());
    surface.fill_polygon(&piece.contour, &piece.color.css(), Some(PIECE_STROKE));
    surface.restore();
}

/// Workspace canvas: every placed piece in insertion order, later on top.
pub fn draw_workspace<S: Surface>(surface: &mut S, session: &EditorSession) {
    surface.clear(session.canvas().unwrap_or_default());
    for piece in session.workspace() {
        draw_placed(surface, piece);
    }
}

/// Preview canvas: original left of the split, replica right of it.
///
/// Without a replica only the original half is drawn.
pub fn draw_preview<S: Surface>(
    surface: &mut S,
    session: &EditorSession,
    original: &S::Image,
    replica: Option<&S::Image>,
) {
    let size = session.canvas().unwrap_or_default();
    let split = session.split_x().clamp(0.0, size.width);
    surface.clear(size);

    surface.save();
    surface.clip_rect(
        Point::ORIGIN,
        CanvasSize {
            width: split,
            height: size.height,
        },
    );
    surface.draw_image(original, Point::ORIGIN);
    surface.restore();

    if let Some(replica) = replica {
        surface.save();
        surface.clip_rect(
            Point::new(split, 0.0),
            CanvasSize {
                width: size.width - split,
                height: size.height,
            },
        );
        surface.draw_image(replica, Point::ORIGIN);
        surface.restore();
    }
}

fn log_failure(what: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        warn!("Canvas {} failed: {:?}", what, e);
    }
}

impl Surface for CanvasRenderingContext2d {
    type Image = HtmlImageElement;

    fn clear(&mut self, size: CanvasSize) {
        self.clear_rect(0.0, 0.0, size.width, size.height);
    }

    fn save(&mut self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn translate(&mut self, by: Point) {
        log_failure("translate", CanvasRenderingContext2d::translate(self, by.x, by.y));
    }

    fn rotate(&mut self, radians: f64) {
        log_failure("rotate", CanvasRenderingContext2d::rotate(self, radians));
    }

    fn draw_image(&mut self, image: &HtmlImageElement, at: Point) {
        log_failure(
            "drawImage",
            self.draw_image_with_html_image_element(image, at.x, at.y),
        );
    }

    fn clip_rect(&mut self, origin: Point, size: CanvasSize) {
        self.begin_path();
        self.rect(origin.x, origin.y, size.width, size.height);
        self.clip();
    }

    fn fill_polygon(&mut self, points: &[Point], fill: &str, stroke: Option<&str>) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.begin_path();
        self.move_to(first.x, first.y);
        for p in rest {
            self.line_to(p.x, p.y);
        }
        self.close_path();
        self.set_fill_style_str(fill);
        self.fill();
        if let Some(stroke) = stroke {
            self.set_stroke_style_str(stroke);
            self.stroke();
        }
    }
}
