/// The body map component
///
/// One reusable body map: owns the active view, the gesture engine and
/// the last measured layout. Pointer input goes in, and at most one
/// `BodyMapAction` comes out for the hosting screen to act on.
use iced::{Point, Size};
use std::time::Instant;

use super::gesture::{GestureEngine, Phase, Release, Transform};
use super::layout::{DiagramLayout, ResolvedPoint};
use super::region;
use crate::state::data::{BodyView, Marker};
use crate::state::markers::MarkerList;

/// Screen-space radius around a marker icon that counts as hitting it
pub const MARKER_HIT_RADIUS: f32 = 14.0;

/// Raw pointer input, already in container-local coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    /// A finger went down; all fingers currently down
    Down(Vec<Point>),
    /// Fingers moved; all fingers currently down
    Moved(Vec<Point>),
    /// The last finger was lifted here
    Up(Point),
    /// The interaction was interrupted
    Lost,
    /// Zoom ratio from a scroll wheel
    Wheel(f32),
    /// Secondary mouse button, treated like a long press
    SecondaryClick(Point),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub input: PointerInput,
    pub at: Instant,
    /// Measured size of the container at the time of the event
    pub container: Size,
}

/// What the hosting screen should do in response to a gesture
#[derive(Debug, Clone, PartialEq)]
pub enum BodyMapAction {
    /// Tap on an existing marker's icon: open its photo
    MarkerTap(String),
    /// Long press on an existing marker's icon: ask to delete it
    MarkerLongPress(String),
    /// Tap on an empty part of the body: start a new marker here
    EmptyAreaTap { x: f32, y: f32, view: BodyView },
}

#[derive(Debug, Clone)]
pub struct BodyMap {
    view: BodyView,
    engine: GestureEngine,
    layout: DiagramLayout,
    /// Bumped on every cancel so input sources can drop stale pointer state
    cancels: u64,
}

impl BodyMap {
    pub fn new(view: BodyView, container: Size) -> Self {
        let layout = DiagramLayout::centered(container);
        Self {
            view,
            engine: GestureEngine::new(layout.image_size()),
            layout,
            cancels: 0,
        }
    }

    pub fn view(&self) -> BodyView {
        self.view
    }

    pub fn transform(&self) -> Transform {
        self.engine.transform()
    }

    pub fn layout(&self) -> DiagramLayout {
        self.layout
    }

    /// A one-finger drag is currently moving the diagram
    pub fn is_panning(&self) -> bool {
        matches!(self.engine.phase(), Phase::Panning { .. })
    }

    /// Switch between front and back, resetting zoom and pan
    pub fn toggle_view(&mut self) {
        self.set_view(self.view.flipped());
    }

    pub fn set_view(&mut self, view: BodyView) {
        self.view = view;
        self.engine.reset();
        tracing::debug!("🔄 Body view switched to {}", view);
    }

    /// Markers belonging to the active view
    pub fn visible<'a>(&self, markers: &'a MarkerList) -> impl Iterator<Item = &'a Marker> {
        markers.for_view(self.view)
    }

    /// Re-measure the container. The image size is fixed, so this only
    /// moves the diagram's centre.
    pub fn set_container(&mut self, container: Size) {
        if self.layout.container != container {
            self.layout = DiagramLayout::centered(container);
        }
    }

    /// Drop any in-progress gesture, keeping the current zoom and pan
    pub fn cancel(&mut self) {
        if self.engine.phase() != Phase::Idle {
            tracing::debug!("Gesture cancelled");
        }
        self.engine.cancel();
        self.cancels += 1;
    }

    /// Number of gestures cancelled so far
    pub fn cancel_count(&self) -> u64 {
        self.cancels
    }

    /// Screen position of a marker icon
    pub fn marker_position(&self, marker: &Marker) -> Point {
        self.layout
            .project(Point::new(marker.x, marker.y), self.engine.transform())
    }

    /// The visible marker whose icon is closest to `point`, within the hit radius
    pub fn marker_at<'a>(&self, point: Point, markers: &'a MarkerList) -> Option<&'a Marker> {
        self.visible(markers)
            .map(|marker| (marker, self.marker_position(marker).distance(point)))
            .filter(|(_, distance)| *distance <= MARKER_HIT_RADIUS)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(marker, _)| marker)
    }

    /// Resolve a screen point into diagram space under the current transform
    pub fn resolve(&self, point: Point) -> ResolvedPoint {
        self.layout.resolve(point, self.engine.transform())
    }

    /// Feed one pointer event through the gesture engine
    pub fn handle(&mut self, event: PointerEvent, markers: &MarkerList) -> Option<BodyMapAction> {
        self.set_container(event.container);

        let release = match event.input {
            PointerInput::Down(touches) => {
                self.engine.touch_down(&touches, event.at);
                return None;
            }
            PointerInput::Moved(touches) => {
                self.engine.touch_move(&touches, event.at);
                return None;
            }
            PointerInput::Lost => {
                self.cancel();
                return None;
            }
            PointerInput::Wheel(ratio) => {
                self.engine.wheel(ratio);
                return None;
            }
            PointerInput::SecondaryClick(point) => Release::LongPress(point),
            PointerInput::Up(position) => self.engine.touch_up(position, event.at),
        };

        match release {
            Release::Tap(point) => {
                if let Some(marker) = self.marker_at(point, markers) {
                    return Some(BodyMapAction::MarkerTap(marker.id.clone()));
                }
                self.empty_area_tap(point)
            }
            Release::LongPress(point) => self
                .marker_at(point, markers)
                .map(|marker| BodyMapAction::MarkerLongPress(marker.id.clone())),
            Release::None => None,
        }
    }

    fn empty_area_tap(&self, point: Point) -> Option<BodyMapAction> {
        let resolved = self.resolve(point);
        let (nx, ny) = (resolved.normalized.x, resolved.normalized.y);

        if !region::is_on_body(nx, ny, self.view) {
            tracing::debug!("Tap at ({:.3}, {:.3}) missed the body", nx, ny);
            return None;
        }

        Some(BodyMapAction::EmptyAreaTap {
            x: resolved.pixel.x,
            y: resolved.pixel.y,
            view: self.view,
        })
    }
}
