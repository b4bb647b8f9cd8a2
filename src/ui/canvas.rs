use iced::mouse::{self, Cursor};
use iced::touch::{self, Finger};
use iced::widget::canvas::{self, path, Frame, Path, Program, Stroke, Text};
use iced::{Color, Pixels, Point, Radians, Rectangle, Renderer, Size, Theme, Vector};
use std::f32::consts::PI;
use std::time::Instant;

use crate::body::layout::DiagramLayout;
use crate::body::map::{BodyMap, PointerEvent, PointerInput};
use crate::body::region::{Shape, SILHOUETTE};
use crate::state::data::Marker;
use crate::state::markers::MarkerList;
use crate::Message;

const MARKER_RADIUS: f32 = 8.0;

/// Canvas hosting the body diagram and its markers.
///
/// Only translates raw mouse and touch events into `PointerEvent`s; the
/// gesture state machine itself lives in `BodyMap`, owned by the application.
pub struct BodyCanvas<'a> {
    pub map: &'a BodyMap,
    pub markers: &'a MarkerList,
    pub selected: Option<&'a str>,
}

impl<'a> Program<Message> for BodyCanvas<'a> {
    type State = PointerState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let palette = theme.palette();
        // Centred in the live bounds; the map only learns them on input
        let layout = DiagramLayout::centered(bounds.size());
        let transform = self.map.transform();

        // Diagram bounding box
        let image_rect = layout.image_rect(transform);
        frame.stroke(
            &Path::rectangle(image_rect.position(), image_rect.size()),
            Stroke::default()
                .with_color(faded(palette.text, 0.2))
                .with_width(1.0),
        );

        // Silhouette
        let image = layout.image_size();
        let body_color = faded(palette.primary, 0.35);
        for region in SILHOUETTE.iter() {
            let shape = match region.shape {
                Shape::Rect(r) => {
                    let top_left = layout.project_normalized(Point::new(r.x1, r.y1), transform);
                    let size = Size::new(
                        (r.x2 - r.x1) * image.width * transform.scale,
                        (r.y2 - r.y1) * image.height * transform.scale,
                    );
                    Path::rectangle(top_left, size)
                }
                Shape::Ellipse(e) => Path::new(|builder| {
                    builder.ellipse(path::arc::Elliptical {
                        center: layout.project_normalized(Point::new(e.cx, e.cy), transform),
                        radii: Vector::new(
                            e.rx * image.width * transform.scale,
                            e.ry * image.height * transform.scale,
                        ),
                        rotation: Radians(0.0),
                        start_angle: Radians(0.0),
                        end_angle: Radians(2.0 * PI),
                    });
                }),
            };
            frame.fill(&shape, body_color);
        }

        // Markers of the active view
        for (index, marker) in self.map.visible(self.markers).enumerate() {
            let center = layout.project(Point::new(marker.x, marker.y), transform);
            let color = marker_color(marker, palette.success, palette.danger);
            let icon = Path::circle(center, MARKER_RADIUS);

            frame.fill(&icon, color);
            if self.selected == Some(marker.id.as_str()) {
                frame.stroke(
                    &Path::circle(center, MARKER_RADIUS + 3.0),
                    Stroke::default().with_color(palette.text).with_width(2.0),
                );
            }
            frame.fill_text(Text {
                content: (index + 1).to_string(),
                position: Point::new(center.x + MARKER_RADIUS + 2.0, center.y - MARKER_RADIUS),
                color: palette.text,
                size: Pixels(12.0),
                ..Text::default()
            });
        }

        frame.fill_text(Text {
            content: self.map.view().to_string().to_uppercase(),
            position: Point::new(12.0, 12.0),
            color: faded(palette.text, 0.6),
            size: Pixels(14.0),
            ..Text::default()
        });

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        state.sync(self.map.cancel_count());

        let input = match event {
            canvas::Event::Mouse(mouse_event) => state.mouse(mouse_event, bounds, cursor),
            canvas::Event::Touch(touch_event) => state.touch(touch_event, bounds),
            _ => None,
        };

        match input {
            Some(input) => (
                canvas::event::Status::Captured,
                Some(Message::Pointer(PointerEvent {
                    input,
                    at: Instant::now(),
                    container: bounds.size(),
                })),
            ),
            None => (canvas::event::Status::Ignored, None),
        }
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.mouse_down && self.map.is_panning() {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

fn faded(color: Color, alpha: f32) -> Color {
    Color { a: alpha, ..color }
}

/// Markers with a photo use the success color, the rest the danger color
fn marker_color(marker: &Marker, with_photo: Color, without_photo: Color) -> Color {
    if marker.has_photo() {
        with_photo
    } else {
        without_photo
    }
}

/// Zoom ratio for a scroll delta. Always positive, and scrolling back
/// by the same amount undoes it.
fn wheel_ratio(delta: mouse::ScrollDelta) -> f32 {
    match delta {
        mouse::ScrollDelta::Lines { y, .. } => 1.1f32.powf(y),
        mouse::ScrollDelta::Pixels { y, .. } => 1.01f32.powf(y),
    }
}

/// Fingers and mouse button currently down on the canvas
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    pub fingers: Vec<(Finger, Point)>,
    pub mouse_down: bool,
    pub last_mouse: Option<Point>,
    /// Map cancel count this state was last checked against
    pub cancels_seen: u64,
}

impl PointerState {
    /// Forget fingers and buttons if the map cancelled the gesture since
    fn sync(&mut self, cancels: u64) {
        if self.cancels_seen != cancels {
            self.cancels_seen = cancels;
            self.fingers.clear();
            self.mouse_down = false;
            self.last_mouse = None;
        }
    }

    fn positions(&self) -> Vec<Point> {
        self.fingers.iter().map(|(_, p)| *p).collect()
    }

    fn mouse(&mut self, event: mouse::Event, bounds: Rectangle, cursor: Cursor) -> Option<PointerInput> {
        match event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                let position = cursor.position_in(bounds)?;
                self.mouse_down = true;
                self.last_mouse = Some(position);
                Some(PointerInput::Down(vec![position]))
            }
            mouse::Event::ButtonPressed(mouse::Button::Right) => {
                cursor.position_in(bounds).map(PointerInput::SecondaryClick)
            }
            mouse::Event::CursorMoved { .. } if self.mouse_down => {
                let position = cursor.position_in(bounds).or(self.last_mouse)?;
                self.last_mouse = Some(position);
                Some(PointerInput::Moved(vec![position]))
            }
            mouse::Event::ButtonReleased(mouse::Button::Left) if self.mouse_down => {
                self.mouse_down = false;
                let position = cursor.position_in(bounds).or(self.last_mouse.take())?;
                Some(PointerInput::Up(position))
            }
            mouse::Event::WheelScrolled { delta } if cursor.is_over(bounds) => {
                Some(PointerInput::Wheel(wheel_ratio(delta)))
            }
            _ => None,
        }
    }

    fn touch(&mut self, event: touch::Event, bounds: Rectangle) -> Option<PointerInput> {
        let local = |p: Point| Point::new(p.x - bounds.x, p.y - bounds.y);

        match event {
            touch::Event::FingerPressed { id, position } => {
                if self.fingers.is_empty() && !bounds.contains(position) {
                    return None;
                }
                self.fingers.retain(|(finger, _)| *finger != id);
                self.fingers.push((id, local(position)));
                Some(PointerInput::Down(self.positions()))
            }
            touch::Event::FingerMoved { id, position } => {
                let entry = self.fingers.iter_mut().find(|(finger, _)| *finger == id)?;
                entry.1 = local(position);
                Some(PointerInput::Moved(self.positions()))
            }
            touch::Event::FingerLifted { id, position } => {
                let before = self.fingers.len();
                self.fingers.retain(|(finger, _)| *finger != id);
                if self.fingers.len() == before {
                    return None;
                }
                if self.fingers.is_empty() {
                    Some(PointerInput::Up(local(position)))
                } else {
                    Some(PointerInput::Moved(self.positions()))
                }
            }
            touch::Event::FingerLost { .. } => {
                self.fingers.clear();
                Some(PointerInput::Lost)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::gesture::MIN_SCALE;
    use crate::state::data::BodyView;

    fn bounds() -> Rectangle {
        Rectangle::new(Point::new(100.0, 50.0), Size::new(400.0, 800.0))
    }

    #[test]
    fn test_touch_positions_are_local() {
        let mut state = PointerState::default();

        let input = state.touch(
            touch::Event::FingerPressed {
                id: Finger(1),
                position: Point::new(150.0, 70.0),
            },
            bounds(),
        );

        assert_eq!(input, Some(PointerInput::Down(vec![Point::new(50.0, 20.0)])));
    }

    #[test]
    fn test_second_finger_lift_keeps_gesture_going() {
        let mut state = PointerState::default();
        let b = bounds();

        state.touch(touch::Event::FingerPressed { id: Finger(1), position: Point::new(150.0, 70.0) }, b);
        state.touch(touch::Event::FingerPressed { id: Finger(2), position: Point::new(250.0, 70.0) }, b);

        let lifted = state.touch(
            touch::Event::FingerLifted { id: Finger(2), position: Point::new(250.0, 70.0) },
            b,
        );
        assert_eq!(lifted, Some(PointerInput::Moved(vec![Point::new(50.0, 20.0)])));

        let last = state.touch(
            touch::Event::FingerLifted { id: Finger(1), position: Point::new(150.0, 70.0) },
            b,
        );
        assert_eq!(last, Some(PointerInput::Up(Point::new(50.0, 20.0))));
    }

    #[test]
    fn test_wheel_ratio_stays_positive() {
        let fast = wheel_ratio(mouse::ScrollDelta::Lines { x: 0.0, y: -12.0 });
        assert!(fast > 0.0 && fast < 1.0);

        let up = wheel_ratio(mouse::ScrollDelta::Pixels { x: 0.0, y: 40.0 });
        let down = wheel_ratio(mouse::ScrollDelta::Pixels { x: 0.0, y: -40.0 });
        assert!((up * down - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_fast_scroll_out_reaches_min_scale() {
        let mut map = BodyMap::new(BodyView::Front, bounds().size());
        let markers = MarkerList::new();
        let mut zoom = |delta| {
            let input = PointerState::default().mouse(
                mouse::Event::WheelScrolled { delta },
                bounds(),
                Cursor::Available(Point::new(300.0, 400.0)),
            );
            map.handle(
                PointerEvent {
                    input: input.expect("cursor is over the canvas"),
                    at: Instant::now(),
                    container: bounds().size(),
                },
                &markers,
            );
        };

        zoom(mouse::ScrollDelta::Lines { x: 0.0, y: 8.0 });
        zoom(mouse::ScrollDelta::Lines { x: 0.0, y: -12.0 });

        assert_eq!(map.transform().scale, MIN_SCALE);
    }

    #[test]
    fn test_cancelled_gesture_drops_stale_fingers() {
        let mut map = BodyMap::new(BodyView::Front, bounds().size());
        let mut state = PointerState::default();
        let b = bounds();

        state.touch(touch::Event::FingerPressed { id: Finger(1), position: Point::new(150.0, 70.0) }, b);
        // Focus lost before the finger was lifted
        map.cancel();
        state.sync(map.cancel_count());

        let input = state.touch(
            touch::Event::FingerPressed { id: Finger(2), position: Point::new(250.0, 70.0) },
            b,
        );
        assert_eq!(input, Some(PointerInput::Down(vec![Point::new(150.0, 20.0)])));
        assert!(!state.mouse_down);

        // Nothing changes until the next cancel
        state.sync(map.cancel_count());
        assert_eq!(state.fingers.len(), 1);
    }

    #[test]
    fn test_touch_outside_is_ignored() {
        let mut state = PointerState::default();

        let input = state.touch(
            touch::Event::FingerPressed {
                id: Finger(1),
                position: Point::new(10.0, 10.0),
            },
            bounds(),
        );

        assert_eq!(input, None);
        assert!(state.fingers.is_empty());
    }
}
