/// Detail panel for the selected marker
use chrono::DateTime;
use iced::widget::{button, column, container, image, row, text};
use iced::{Element, Length};

use crate::state::data::Marker;
use crate::Message;

/// Creation time as shown to the user, in UTC
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}

pub fn detail<'a>(marker: &'a Marker, region: &'static str) -> Element<'a, Message> {
    let photo: Element<'a, Message> = match &marker.photo_uri {
        Some(uri) => image(uri.as_str())
            .width(Length::Fill)
            .height(Length::Fixed(240.0))
            .into(),
        None => container(text("No photo attached yet.").size(14))
            .height(Length::Fixed(240.0))
            .center_y(Length::Fixed(240.0))
            .into(),
    };

    let photo_label = if marker.has_photo() {
        "Replace photo"
    } else {
        "Add photo"
    };

    column![
        text(format!("Marker on the {} ({})", region, marker.body_view)).size(18),
        text(format!("Added {}", format_timestamp(marker.timestamp))).size(12),
        photo,
        row![
            button(photo_label)
                .on_press(Message::PickPhoto(marker.id.clone()))
                .padding(8),
            button("Delete")
                .on_press(Message::DeleteRequested(marker.id.clone()))
                .style(button::danger)
                .padding(8),
            button("Close")
                .on_press(Message::CloseDetail)
                .style(button::secondary)
                .padding(8),
        ]
        .spacing(8),
    ]
    .spacing(10)
    .into()
}
