/// Coordinate resolution between screen space and diagram space
///
/// The diagram image is laid out at a fixed fraction of the screen
/// (85% of the width, 55% of the height), centred in its container. Screen
/// points are local to the container.
use iced::{Point, Rectangle, Size};

use super::gesture::Transform;

pub const IMAGE_WIDTH_FRACTION: f32 = 0.85;
pub const IMAGE_HEIGHT_FRACTION: f32 = 0.55;

/// Reference screen the image size is taken of.
///
/// Fixed so that stored marker pixels keep their meaning across window
/// sizes and restarts; only the centring follows the container.
pub const NOMINAL_SCREEN: Size = Size {
    width: 400.0,
    height: 800.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramLayout {
    /// Measured bounds of the container hosting the diagram
    pub container: Size,
    /// Size the image fractions are taken of
    pub screen: Size,
}

/// A tap resolved into diagram space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPoint {
    /// Unscaled image pixels, the unit markers are stored in
    pub pixel: Point,
    /// Pixel divided by the image size; not clamped to `[0, 1]`
    pub normalized: Point,
}

impl DiagramLayout {
    pub fn new(container: Size, screen: Size) -> Self {
        Self { container, screen }
    }

    /// Nominal-size image centred in a container of any size
    pub fn centered(container: Size) -> Self {
        Self::new(container, NOMINAL_SCREEN)
    }

    /// Unscaled size of the diagram image
    pub fn image_size(&self) -> Size {
        Size::new(
            self.screen.width * IMAGE_WIDTH_FRACTION,
            self.screen.height * IMAGE_HEIGHT_FRACTION,
        )
    }

    fn center(&self) -> Point {
        Point::new(self.container.width / 2.0, self.container.height / 2.0)
    }

    /// Undo pan and zoom, then normalize by the image size
    pub fn resolve(&self, point: Point, transform: Transform) -> ResolvedPoint {
        let image = self.image_size();
        let center = self.center();

        let pixel = Point::new(
            (point.x - transform.translate.x - center.x) / transform.scale + image.width / 2.0,
            (point.y - transform.translate.y - center.y) / transform.scale + image.height / 2.0,
        );
        let normalized = Point::new(pixel.x / image.width, pixel.y / image.height);

        ResolvedPoint { pixel, normalized }
    }

    /// Where an unscaled image pixel appears on screen
    pub fn project(&self, pixel: Point, transform: Transform) -> Point {
        let image = self.image_size();
        let center = self.center();

        Point::new(
            center.x + transform.translate.x + (pixel.x - image.width / 2.0) * transform.scale,
            center.y + transform.translate.y + (pixel.y - image.height / 2.0) * transform.scale,
        )
    }

    /// Where a normalized diagram point appears on screen
    pub fn project_normalized(&self, normalized: Point, transform: Transform) -> Point {
        let image = self.image_size();
        self.project(
            Point::new(normalized.x * image.width, normalized.y * image.height),
            transform,
        )
    }

    /// On-screen rectangle of the scaled and panned image
    pub fn image_rect(&self, transform: Transform) -> Rectangle {
        let image = self.image_size();
        let top_left = self.project(Point::ORIGIN, transform);
        Rectangle::new(
            top_left,
            Size::new(image.width * transform.scale, image.height * transform.scale),
        )
    }
}
