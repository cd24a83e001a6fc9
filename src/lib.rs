//! Client core for the stained-glass piece editor and the colour-guessing game.
//!
//! Everything that does not need a browser lives here: piece geometry and
//! hit-testing, the editor session, the interaction state machine, draw
//! passes over an abstract surface, the guess-game board and the typed
//! server contracts. The two binaries only wire these into Yew components.

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

pub mod api;
pub mod browser;
pub mod components;
pub mod config;
pub mod game;
pub mod hooks;
pub mod interaction;
pub mod palette;
pub mod render;
pub mod session;
pub mod utils;

/// Geometry parameters shared by the editor
pub mod defaults {
    pub const ROTATION_STEP_DEG: u16 = 90;
    pub const FULL_TURN_DEG: u16 = 360;
    /// Contours with fewer vertices than this enclose no area.
    pub const MIN_POLYGON_VERTICES: usize = 3;
}

/// Server-assigned piece identifier.
pub type PieceId = u32;

/// Index into the workspace piece list (insertion order, later draws on top).
pub type WorkspaceIndex = usize;

/// Identity of one placed copy; unlike its index it survives removals.
pub type PlacementKey = u64;

// Custom error type for every failing round-trip or resource
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request never produced a response (fetch rejected, offline, CORS).
    Network(String),
    /// The server answered with an `error` field.
    Application(String),
    /// An image failed to load.
    ResourceLoad(String),
    /// The response body was not the shape we expected.
    Decode(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network(detail) => write!(f, "Network error: {}", detail),
            ClientError::Application(message) => write!(f, "{}", message),
            ClientError::ResourceLoad(src) => write!(f, "Failed to load image '{}'", src),
            ClientError::Decode(detail) => write!(f, "Unexpected server response: {}", detail),
        }
    }
}

impl std::error::Error for ClientError {}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let d = self - other;
        (d.x * d.x + d.y * d.y).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Rotate a vector about the origin, clockwise on a y-down surface.
///
/// Same convention as a 2D canvas `rotate()`, so a point rotated here lands
/// exactly where the rendering transform draws it.
pub fn rotate_vec(v: Point, angle_deg: f64) -> Point {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Point::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Even-odd ray casting containment test.
pub fn polygon_contains(vertices: &[Point], p: Point) -> bool {
    if vertices.len() < defaults::MIN_POLYGON_VERTICES {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if ((vi.y > p.y) != (vj.y > p.y)) && (p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Quarter-turn rotation in degrees, always in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Rotation(u16);

impl Rotation {
    pub const ZERO: Rotation = Rotation(0);

    /// Snap an arbitrary angle onto the quarter-turn grid.
    pub fn from_degrees(degrees: i32) -> Self {
        let step = i32::from(defaults::ROTATION_STEP_DEG);
        let full = i32::from(defaults::FULL_TURN_DEG);
        let snapped = ((degrees as f64 / step as f64).round() as i32) * step;
        Rotation(snapped.rem_euclid(full) as u16)
    }

    pub fn degrees(self) -> u16 {
        self.0
    }

    pub fn radians(self) -> f64 {
        f64::from(self.0).to_radians()
    }

    /// Next quarter turn, wrapping at a full turn.
    pub fn advanced(self) -> Self {
        Rotation((self.0 + defaults::ROTATION_STEP_DEG) % defaults::FULL_TURN_DEG)
    }
}

/// 8-bit RGB triple, serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn css(self) -> String {
        format!("rgb({},{},{})", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.0, self.1, self.2)
    }
}

/// Contour vertices arrive either flat (`[x, y]`) or wrapped once (`[[x, y]]`).
#[derive(Deserialize)]
#[serde(untagged)]
enum WirePoint {
    Flat([f64; 2]),
    Nested([[f64; 2]; 1]),
}

fn contour_from_wire<'de, D>(deserializer: D) -> Result<Vec<Point>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<WirePoint>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|p| match p {
            WirePoint::Flat([x, y]) | WirePoint::Nested([[x, y]]) => Point::new(x, y),
        })
        .collect())
}

/// A polygonal region of the analysed image, as reported by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    #[serde(default)]
    pub area: u64,
    #[serde(default)]
    pub percent_area: f64,
    pub original_rgb: Rgb,
    pub catalog_color: String,
    pub catalog_rgb: Rgb,
    #[serde(deserialize_with = "contour_from_wire")]
    pub contour: Vec<Point>,
}

impl Piece {
    /// Containment in source-image coordinates.
    pub fn contains(&self, p: Point) -> bool {
        polygon_contains(&self.contour, p)
    }
}

/// Pieces sharing one catalog colour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColorGroup {
    pub pieces: Vec<Piece>,
    #[serde(default)]
    pub total_area: u64,
    #[serde(default)]
    pub percent_area: f64,
}

/// A placed, user-manipulable copy of a [`Piece`].
///
/// The contour is stored in local shape space: relative to `position`, before
/// `rotation` is applied. Serializes in the cutting-plan format
/// `{id, contour, color, x, y, rotation}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspacePiece {
    #[serde(skip)]
    pub key: PlacementKey,
    pub id: PieceId,
    pub contour: Vec<Point>,
    pub color: Rgb,
    #[serde(flatten)]
    pub position: Point,
    pub rotation: Rotation,
}

impl WorkspacePiece {
    /// Place `piece` with its local origin at `at`, unrotated.
    pub fn spawn(piece: &Piece, at: Point, key: PlacementKey) -> Self {
        debug!("Spawning piece {} at ({:.1}, {:.1})", piece.id, at.x, at.y);
        Self {
            key,
            id: piece.id,
            contour: piece.contour.iter().map(|&p| p - at).collect(),
            color: piece.catalog_rgb,
            position: at,
            rotation: Rotation::ZERO,
        }
    }

    /// Local shape space → workspace canvas space.
    pub fn to_world(&self, local: Point) -> Point {
        self.position + rotate_vec(local, f64::from(self.rotation.degrees()))
    }

    /// Workspace canvas space → local shape space.
    pub fn to_local(&self, world: Point) -> Point {
        rotate_vec(world - self.position, -f64::from(self.rotation.degrees()))
    }

    /// The contour as it is drawn on the workspace.
    pub fn world_contour(&self) -> Vec<Point> {
        self.contour.iter().map(|&p| self.to_world(p)).collect()
    }

    /// Containment under the piece's current translate + rotate transform.
    ///
    /// The point is pulled back into local space instead of pushing every
    /// vertex forward; both describe the same transform.
    pub fn contains(&self, world: Point) -> bool {
        polygon_contains(&self.contour, self.to_local(world))
    }

    pub fn rotate_quarter(&mut self) {
        self.rotation = self.rotation.advanced();
    }
}

/// Topmost workspace piece under `p`: the last inserted one wins.
pub fn hit_test(pieces: &[WorkspacePiece], p: Point) -> Option<WorkspaceIndex> {
    pieces.iter().rposition(|piece| piece.contains(p))
}

/// First source piece under `p` (source pieces do not overlap).
pub fn hit_test_source(pieces: &[Piece], p: Point) -> Option<usize> {
    pieces.iter().position(|piece| piece.contains(p))
}

/// Pixel dimensions of a canvas, taken from the loaded original image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn bar_at(position: Point, rotation: Rotation) -> WorkspacePiece {
        // 40 x 10 bar extending right and down from its local origin
        WorkspacePiece {
            key: 0,
            id: 7,
            contour: rect(0.0, 0.0, 40.0, 10.0),
            color: Rgb(255, 0, 0),
            position,
            rotation,
        }
    }

    #[test]
    fn rotation_stays_in_range_and_cycles() {
        let mut rotation = Rotation::ZERO;
        let mut seen = Vec::new();
        for _ in 0..4 {
            rotation = rotation.advanced();
            assert!(rotation.degrees() < 360);
            assert_eq!(rotation.degrees() % 90, 0);
            seen.push(rotation.degrees());
        }
        assert_eq!(seen, vec![90, 180, 270, 0]);
        assert_eq!(rotation, Rotation::ZERO);
    }

    #[test]
    fn rotation_from_degrees_snaps_and_wraps() {
        assert_eq!(Rotation::from_degrees(-90).degrees(), 270);
        assert_eq!(Rotation::from_degrees(450).degrees(), 90);
        assert_eq!(Rotation::from_degrees(100).degrees(), 90);
        assert_eq!(Rotation::from_degrees(360).degrees(), 0);
    }

    #[test]
    fn polygon_contains_square() {
        let square = rect(0.0, 0.0, 10.0, 10.0);
        assert!(polygon_contains(&square, Point::new(5.0, 5.0)));
        assert!(!polygon_contains(&square, Point::new(15.0, 5.0)));
        assert!(!polygon_contains(&square, Point::new(-1.0, -1.0)));
    }

    #[test]
    fn degenerate_contour_contains_nothing() {
        let line = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        assert!(!polygon_contains(&line, Point::new(5.0, 5.0)));
    }

    #[test]
    fn concave_polygon_excludes_notch() {
        // U shape opening upwards
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 40.0),
            Point::new(0.0, 40.0),
        ];
        assert!(polygon_contains(&u, Point::new(5.0, 20.0)));
        assert!(!polygon_contains(&u, Point::new(15.0, 10.0)));
        assert!(polygon_contains(&u, Point::new(15.0, 35.0)));
    }

    #[test]
    fn hit_test_follows_rotation() {
        let piece = bar_at(Point::new(100.0, 100.0), Rotation::from_degrees(90));
        // rotated bar occupies x in [90, 100], y in [100, 140]
        assert_eq!(hit_test(&[piece.clone()], Point::new(95.0, 130.0)), Some(0));
        assert_eq!(hit_test(&[piece], Point::new(130.0, 105.0)), None);
    }

    #[test]
    fn hit_test_matches_drawn_contour() {
        let piece = bar_at(Point::new(50.0, 20.0), Rotation::from_degrees(270));
        let drawn = piece.world_contour();
        for sample in [
            Point::new(55.0, 0.0),
            Point::new(52.0, -30.0),
            Point::new(45.0, 10.0),
            Point::new(58.0, -39.0),
        ] {
            assert_eq!(piece.contains(sample), polygon_contains(&drawn, sample));
        }
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let lower = bar_at(Point::new(0.0, 0.0), Rotation::ZERO);
        let mut upper = bar_at(Point::new(5.0, 0.0), Rotation::ZERO);
        upper.id = 8;
        let pieces = vec![lower, upper];
        assert_eq!(hit_test(&pieces, Point::new(10.0, 5.0)), Some(1));
        assert_eq!(hit_test(&pieces, Point::new(2.0, 5.0)), Some(0));
        assert_eq!(hit_test(&pieces, Point::new(100.0, 100.0)), None);
    }

    #[test]
    fn spawn_moves_contour_into_local_space() {
        let source = piece(3, "red", Rgb(255, 0, 0), rect(20.0, 20.0, 60.0, 40.0));
        let placed = WorkspacePiece::spawn(&source, Point::new(30.0, 30.0), 1);
        assert_eq!(placed.contour[0], Point::new(-10.0, -10.0));
        assert_eq!(placed.rotation, Rotation::ZERO);
        assert_eq!(placed.color, Rgb(255, 0, 0));
        for (world, original) in placed.world_contour().iter().zip(&source.contour) {
            assert!(approx_point(*world, *original));
        }
    }

    #[test]
    fn local_and_world_are_inverse() {
        let piece = bar_at(Point::new(12.0, -4.0), Rotation::from_degrees(180));
        let p = Point::new(3.5, 8.25);
        assert!(approx_point(piece.to_local(piece.to_world(p)), p));
    }

    #[test]
    fn contour_decodes_flat_and_nested() {
        let flat = r#"{"id":2,"original_rgb":[10,20,30],"catalog_color":"navy",
            "catalog_rgb":[0,0,128],"contour":[[1,2],[3,4],[5,6]]}"#;
        let nested = r#"{"id":2,"area":400,"percent_area":2.5,"original_rgb":[10,20,30],
            "catalog_color":"navy","catalog_rgb":[0,0,128],"contour":[[[1,2]],[[3,4]],[[5,6]]]}"#;
        let a: Piece = serde_json::from_str(flat).unwrap();
        let b: Piece = serde_json::from_str(nested).unwrap();
        assert_eq!(a.contour, b.contour);
        assert_eq!(a.contour[1], Point::new(3.0, 4.0));
        assert_eq!(b.area, 400);
        assert_eq!(a.catalog_rgb, Rgb(0, 0, 128));
    }

    #[test]
    fn workspace_piece_serializes_as_plan_entry() {
        let piece = bar_at(Point::new(1.0, 2.0), Rotation::from_degrees(90));
        let json = serde_json::to_value(&piece).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["x"], 1.0);
        assert_eq!(json["y"], 2.0);
        assert_eq!(json["rotation"], 90);
        assert_eq!(json["color"], serde_json::json!([255, 0, 0]));
        assert_eq!(json["contour"][1], serde_json::json!({"x": 40.0, "y": 0.0}));
    }
}
