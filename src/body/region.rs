/// Region classifier for the body diagram
///
/// Decides whether a point in normalized diagram coordinates lies on the
/// body. `(0, 0)` is the top-left of the diagram bounding box and `(1, 1)`
/// the bottom-right. The silhouette is a fixed union of one ellipse and
/// eleven axis-aligned rectangles, shared by the front and back views.
use crate::state::data::BodyView;

/// Ellipse given by centre and radii
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub cx: f32,
    pub cy: f32,
    pub rx: f32,
    pub ry: f32,
}

impl Ellipse {
    pub fn contains(&self, nx: f32, ny: f32) -> bool {
        let dx = (nx - self.cx) / self.rx;
        let dy = (ny - self.cy) / self.ry;
        dx * dx + dy * dy <= 1.0
    }
}

/// Axis-aligned rectangle, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub fn contains(&self, nx: f32, ny: f32) -> bool {
        self.x1 <= nx && nx <= self.x2 && self.y1 <= ny && ny <= self.y2
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Ellipse(Ellipse),
    Rect(Rect),
}

impl Shape {
    pub fn contains(&self, nx: f32, ny: f32) -> bool {
        match self {
            Shape::Ellipse(e) => e.contains(nx, ny),
            Shape::Rect(r) => r.contains(nx, ny),
        }
    }
}

/// A named part of the silhouette
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub name: &'static str,
    pub shape: Shape,
}

const fn rect(name: &'static str, x1: f32, y1: f32, x2: f32, y2: f32) -> Region {
    Region {
        name,
        shape: Shape::Rect(Rect { x1, y1, x2, y2 }),
    }
}

pub const HEAD: Ellipse = Ellipse {
    cx: 0.5,
    cy: 0.09,
    rx: 0.13,
    ry: 0.10,
};

/// Hand-tuned silhouette, head first
pub const SILHOUETTE: [Region; 12] = [
    Region {
        name: "head",
        shape: Shape::Ellipse(HEAD),
    },
    rect("neck", 0.44, 0.17, 0.56, 0.22),
    rect("torso", 0.33, 0.22, 0.67, 0.56),
    rect("waist", 0.35, 0.50, 0.65, 0.62),
    rect("left upper arm", 0.20, 0.22, 0.33, 0.45),
    rect("left forearm", 0.12, 0.45, 0.26, 0.62),
    rect("right upper arm", 0.67, 0.22, 0.80, 0.45),
    rect("right forearm", 0.74, 0.45, 0.88, 0.62),
    rect("left thigh", 0.36, 0.62, 0.49, 0.80),
    rect("left shin", 0.38, 0.80, 0.48, 0.98),
    rect("right thigh", 0.51, 0.62, 0.64, 0.80),
    rect("right shin", 0.52, 0.80, 0.62, 0.98),
];

/// Whether `(nx, ny)` lies on the body.
///
/// `view` is accepted for symmetry with the rest of the pipeline; both
/// diagrams share one silhouette. Inputs are not clamped, so points outside
/// `[0, 1]²` simply never match.
pub fn is_on_body(nx: f32, ny: f32, _view: BodyView) -> bool {
    SILHOUETTE.iter().any(|region| region.shape.contains(nx, ny))
}

/// Name of the first region containing the point, in declaration order
pub fn region_at(nx: f32, ny: f32) -> Option<&'static str> {
    SILHOUETTE
        .iter()
        .find(|region| region.shape.contains(nx, ny))
        .map(|region| region.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rects() -> impl Iterator<Item = Rect> {
        SILHOUETTE.iter().filter_map(|region| match region.shape {
            Shape::Rect(r) => Some(r),
            Shape::Ellipse(_) => None,
        })
    }

    #[test]
    fn test_silhouette_has_head_and_eleven_rects() {
        assert_eq!(rects().count(), 11);
        assert!(matches!(SILHOUETTE[0].shape, Shape::Ellipse(e) if e == HEAD));
    }

    #[test]
    fn test_torso_center_is_on_body() {
        assert!(is_on_body(0.5, 0.39, BodyView::Front));
        assert!(is_on_body(0.5, 0.39, BodyView::Back));
        assert_eq!(region_at(0.5, 0.39), Some("torso"));
    }

    #[test]
    fn test_corner_is_background() {
        assert!(!is_on_body(0.02, 0.02, BodyView::Front));
        assert_eq!(region_at(0.02, 0.02), None);
    }

    #[test]
    fn test_head_ellipse() {
        assert!(is_on_body(0.5, 0.09, BodyView::Front));
        // Just inside the top of the ellipse
        assert!(is_on_body(0.5, 0.0, BodyView::Front));
        // Just outside the side of the ellipse, above the neck
        assert!(!is_on_body(0.64, 0.09, BodyView::Front));
    }

    #[test]
    fn test_rect_edges_and_corners_are_inclusive() {
        for r in rects() {
            let (cx, cy) = ((r.x1 + r.x2) / 2.0, (r.y1 + r.y2) / 2.0);
            for (x, y) in [(r.x1, r.y1), (r.x2, r.y2), (r.x1, r.y2), (r.x2, r.y1), (cx, cy)] {
                assert!(is_on_body(x, y, BodyView::Front), "({}, {}) not on body", x, y);
            }
        }
    }

    #[test]
    fn test_outside_everything_is_false() {
        let grid = (0..=40).flat_map(|i| (0..=40).map(move |j| (i as f32 / 40.0, j as f32 / 40.0)));

        for (x, y) in grid {
            let in_head = {
                let dx = (x - 0.5) / 0.13;
                let dy = (y - 0.09) / 0.10;
                dx * dx + dy * dy <= 1.0
            };
            let in_rect = rects().any(|r| r.contains(x, y));

            assert_eq!(is_on_body(x, y, BodyView::Front), in_head || in_rect);
        }
    }

    #[test]
    fn test_out_of_range_inputs() {
        assert!(!is_on_body(-3.0, 0.4, BodyView::Front));
        assert!(!is_on_body(0.5, 1.5, BodyView::Back));
        assert!(!is_on_body(f32::NAN, 0.5, BodyView::Front));
    }

    #[test]
    fn test_views_share_geometry() {
        for (x, y) in [(0.15, 0.5), (0.5, 0.9), (0.9, 0.9), (0.45, 0.2)] {
            assert_eq!(
                is_on_body(x, y, BodyView::Front),
                is_on_body(x, y, BodyView::Back)
            );
        }
    }
}
