/// Marker gallery: one tile per marker of the active view
use iced::widget::{button, column, container, image, text};
use iced::{Element, Length, Size};
use iced_aw::Wrap;

use crate::body::region;
use crate::state::data::Marker;
use crate::Message;

const TILE_SIZE: f32 = 88.0;

/// Region name under a marker, given the current unscaled image size
pub fn region_label(marker: &Marker, image_size: Size) -> &'static str {
    region::region_at(marker.x / image_size.width, marker.y / image_size.height).unwrap_or("body")
}

pub fn gallery<'a>(
    markers: impl Iterator<Item = &'a Marker>,
    image_size: Size,
    show_labels: bool,
    selected: Option<&str>,
) -> Element<'a, Message> {
    let tiles: Vec<Element<'a, Message>> = markers
        .enumerate()
        .map(|(index, marker)| {
            let preview: Element<'a, Message> = match &marker.photo_uri {
                Some(uri) => image(uri.as_str())
                    .width(Length::Fixed(TILE_SIZE))
                    .height(Length::Fixed(TILE_SIZE))
                    .into(),
                None => container(text("No photo").size(12))
                    .width(Length::Fixed(TILE_SIZE))
                    .height(Length::Fixed(TILE_SIZE))
                    .center_x(Length::Fixed(TILE_SIZE))
                    .center_y(Length::Fixed(TILE_SIZE))
                    .into(),
            };

            let mut caption = format!("#{}", index + 1);
            if show_labels {
                caption.push_str(&format!(" {}", region_label(marker, image_size)));
            }

            let tile = button(column![preview, text(caption).size(12)].spacing(4))
                .on_press(Message::SelectMarker(marker.id.clone()))
                .padding(6);

            if selected == Some(marker.id.as_str()) {
                tile.style(button::primary).into()
            } else {
                tile.style(button::secondary).into()
            }
        })
        .collect();

    if tiles.is_empty() {
        return text("Tap on the body to add a marker.").size(14).into();
    }

    Wrap::with_elements(tiles).spacing(8.0).line_spacing(8.0).into()
}
