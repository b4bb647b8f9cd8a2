use chrono::Utc;
use iced::widget::{button, canvas, checkbox, column, container, row, scrollable, text, Column};
use iced::{event, window, Alignment, Element, Event, Length, Size, Subscription, Task, Theme};
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageDialogResult, MessageLevel};
use std::path::PathBuf;

mod body;
mod error;
mod logging;
mod state;
mod ui;

use body::map::{BodyMap, BodyMapAction, PointerEvent};
use state::data::{BodyView, Marker};
use state::markers::MarkerList;
use state::settings::Settings;
use state::store::SqliteStore;

/// Size the body map assumes until the canvas reports its bounds
const INITIAL_MAP_SIZE: Size = Size {
    width: 640.0,
    height: 760.0,
};

/// Main application state
struct LesionMap {
    /// Where the key-value store lives; each background task opens its own connection
    db_path: PathBuf,
    settings: Settings,
    markers: MarkerList,
    body_map: BodyMap,
    /// Marker shown in the detail panel
    selected: Option<String>,
    /// Bumped on every local change to the marker list
    revision: u64,
    /// Marker list writes not yet acknowledged
    saves_in_flight: usize,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Background load finished; carries the revision it was started at
    MarkersLoaded(u64, Vec<Marker>),
    /// The window regained focus
    WindowFocused,
    /// The window lost focus; any half-done gesture is dropped
    WindowUnfocused,
    /// Raw input from the body canvas
    Pointer(PointerEvent),
    ToggleView,
    SelectMarker(String),
    CloseDetail,
    /// Open the photo picker for a marker
    PickPhoto(String),
    PhotoPicked(String, Option<String>),
    DeleteRequested(String),
    DeleteConfirmed(String, bool),
    MarkersSaved(Result<(), String>),
    ToggleTheme,
    ShowRegionLabels(bool),
    ConfirmDelete(bool),
    DebugLogging(bool),
    SettingsSaved(Result<(), String>),
}

impl LesionMap {
    /// Create a new instance of the application
    fn new(db_path: PathBuf, settings: Settings) -> (Self, Task<Message>) {
        let app = LesionMap {
            db_path,
            settings,
            markers: MarkerList::new(),
            body_map: BodyMap::new(BodyView::Front, INITIAL_MAP_SIZE),
            selected: None,
            revision: 0,
            saves_in_flight: 0,
            status: "Loading markers...".to_string(),
        };
        let load = app.load_markers();
        (app, load)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::MarkersLoaded(revision, markers) => {
                if revision != self.revision {
                    tracing::debug!("Dropping stale marker load (revision {})", revision);
                    return Task::none();
                }
                self.markers = MarkerList::from_markers(markers);
                let selected_gone = self
                    .selected
                    .as_deref()
                    .is_some_and(|id| self.markers.get(id).is_none());
                if selected_gone {
                    self.selected = None;
                }
                self.status = if self.markers.is_empty() {
                    "No markers yet. Tap on the body to add one.".to_string()
                } else {
                    format!("{} markers.", self.markers.len())
                };
                Task::none()
            }
            Message::WindowUnfocused => {
                self.body_map.cancel();
                Task::none()
            }
            Message::WindowFocused => {
                if self.saves_in_flight > 0 {
                    return Task::none();
                }
                self.load_markers()
            }
            Message::Pointer(event) => match self.body_map.handle(event, &self.markers) {
                Some(action) => self.apply(action),
                None => Task::none(),
            },
            Message::ToggleView => {
                self.body_map.toggle_view();
                self.selected = None;
                Task::none()
            }
            Message::SelectMarker(id) => {
                self.selected = Some(id);
                Task::none()
            }
            Message::CloseDetail => {
                self.selected = None;
                Task::none()
            }
            Message::PickPhoto(id) => Task::perform(pick_photo(id), |(id, uri)| {
                Message::PhotoPicked(id, uri)
            }),
            Message::PhotoPicked(id, Some(uri)) => {
                if !self.markers.attach_photo(&id, uri) {
                    tracing::warn!("⚠️  Photo picked for unknown marker {}", id);
                    return Task::none();
                }
                self.status = "Photo saved.".to_string();
                self.save_markers()
            }
            Message::PhotoPicked(_, None) => Task::none(),
            Message::DeleteRequested(id) => {
                if self.settings.confirm_delete {
                    Task::perform(confirm_delete(id), |(id, confirmed)| {
                        Message::DeleteConfirmed(id, confirmed)
                    })
                } else {
                    self.update(Message::DeleteConfirmed(id, true))
                }
            }
            Message::DeleteConfirmed(id, true) => {
                if self.markers.remove(&id).is_none() {
                    return Task::none();
                }
                tracing::info!("🗑️  Deleted marker {}", id);
                if self.selected.as_deref() == Some(id.as_str()) {
                    self.selected = None;
                }
                self.status = "Marker deleted.".to_string();
                self.save_markers()
            }
            Message::DeleteConfirmed(_, false) => Task::none(),
            Message::MarkersSaved(result) => {
                self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
                if let Err(e) = result {
                    tracing::error!("⚠️  Could not save markers: {}", e);
                    self.status = format!("Could not save markers: {}", e);
                }
                Task::none()
            }
            Message::ToggleTheme => {
                self.settings.theme = self.settings.theme.toggled();
                self.save_settings()
            }
            Message::ShowRegionLabels(show) => {
                self.settings.show_region_labels = show;
                self.save_settings()
            }
            Message::ConfirmDelete(confirm) => {
                self.settings.confirm_delete = confirm;
                self.save_settings()
            }
            Message::DebugLogging(debug) => {
                self.settings.debug_logging = debug;
                self.status = "Logging level applies after restart.".to_string();
                self.save_settings()
            }
            Message::SettingsSaved(result) => {
                if let Err(e) = result {
                    tracing::error!("⚠️  Could not save settings: {}", e);
                }
                Task::none()
            }
        }
    }

    /// Carry out what the body map asked for
    fn apply(&mut self, action: BodyMapAction) -> Task<Message> {
        match action {
            BodyMapAction::MarkerTap(id) => {
                self.selected = Some(id);
                Task::none()
            }
            BodyMapAction::MarkerLongPress(id) => self.update(Message::DeleteRequested(id)),
            BodyMapAction::EmptyAreaTap { x, y, view } => {
                let now = Utc::now().timestamp_millis();
                let id = self.markers.create(x, y, view, now).id.clone();
                self.selected = Some(id.clone());
                self.status = "Marker added. Choose a photo for it.".to_string();

                Task::batch([self.save_markers(), self.update(Message::PickPhoto(id))])
            }
        }
    }

    fn load_markers(&self) -> Task<Message> {
        let revision = self.revision;
        Task::perform(load_markers_async(self.db_path.clone()), move |markers| {
            Message::MarkersLoaded(revision, markers)
        })
    }

    /// Write the full list back, invalidating any load still in flight
    fn save_markers(&mut self) -> Task<Message> {
        self.revision += 1;
        self.saves_in_flight += 1;
        Task::perform(
            save_markers_async(self.db_path.clone(), self.markers.all().to_vec()),
            Message::MarkersSaved,
        )
    }

    fn save_settings(&self) -> Task<Message> {
        Task::perform(
            save_settings_async(self.db_path.clone(), self.settings.clone()),
            Message::SettingsSaved,
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let toggle_label = match self.body_map.view() {
            BodyView::Front => "Show back",
            BodyView::Back => "Show front",
        };

        let map = column![
            row![
                text("Lesion Map").size(28),
                button(toggle_label)
                    .on_press(Message::ToggleView)
                    .padding(8),
            ]
            .spacing(20)
            .align_y(Alignment::Center),
            canvas(ui::canvas::BodyCanvas {
                map: &self.body_map,
                markers: &self.markers,
                selected: self.selected.as_deref(),
            })
            .width(Length::Fill)
            .height(Length::Fill),
        ]
        .spacing(12)
        .width(Length::FillPortion(3));

        let settings = column![
            button(match self.settings.theme {
                state::settings::ThemeChoice::Dark => "Light theme",
                state::settings::ThemeChoice::Light => "Dark theme",
            })
            .on_press(Message::ToggleTheme)
            .style(button::secondary)
            .padding(6),
            checkbox("Show body regions", self.settings.show_region_labels)
                .on_toggle(Message::ShowRegionLabels),
            checkbox("Confirm before deleting", self.settings.confirm_delete)
                .on_toggle(Message::ConfirmDelete),
            checkbox("Debug logging", self.settings.debug_logging)
                .on_toggle(Message::DebugLogging),
        ]
        .spacing(8);

        let image_size = self.body_map.layout().image_size();
        let mut side: Column<Message> = column![
            settings,
            text(format!("Markers ({})", self.body_map.view())).size(18),
            scrollable(ui::gallery::gallery(
                self.body_map.visible(&self.markers),
                image_size,
                self.settings.show_region_labels,
                self.selected.as_deref(),
            ))
            .height(Length::FillPortion(1)),
        ]
        .spacing(16)
        .width(Length::FillPortion(2));

        if let Some(marker) = self.selected.as_deref().and_then(|id| self.markers.get(id)) {
            let region = ui::gallery::region_label(marker, image_size);
            side = side.push(ui::detail::detail(marker, region));
        }

        side = side.push(text(&self.status).size(14));

        container(row![map, side].spacing(24))
            .padding(24)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        self.settings.theme.to_theme()
    }

    /// Reload the marker list whenever the window comes back into focus
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::Focused) => Some(Message::WindowFocused),
            Event::Window(window::Event::Unfocused) => Some(Message::WindowUnfocused),
            _ => None,
        })
    }
}

fn main() -> iced::Result {
    let db_path = SqliteStore::default_path().unwrap_or_else(|_| PathBuf::from("lesion_map.db"));

    // Settings decide the log level, so they are read before logging starts
    let (settings, open_error) = match SqliteStore::open(&db_path) {
        Ok(store) => (Settings::load(&store), None),
        Err(e) => (Settings::default(), Some(e)),
    };

    logging::init(&settings);

    match open_error {
        Some(e) => tracing::error!("⚠️  Could not open store at {}: {}", db_path.display(), e),
        None => tracing::info!("🩺 Lesion Map starting, store at {}", db_path.display()),
    }

    iced::application("Lesion Map", LesionMap::update, LesionMap::view)
        .theme(LesionMap::theme)
        .subscription(LesionMap::subscription)
        .window_size((1100.0, 820.0))
        .centered()
        .run_with(move || LesionMap::new(db_path, settings))
}

/// Read the full marker list on a blocking thread.
/// rusqlite::Connection is not Send, so every task opens its own connection.
async fn load_markers_async(db_path: PathBuf) -> Vec<Marker> {
    let result = tokio::task::spawn_blocking(move || match SqliteStore::open(&db_path) {
        Ok(store) => MarkerList::load(&store).all().to_vec(),
        Err(e) => {
            tracing::warn!("⚠️  Could not open store, no markers loaded: {}", e);
            Vec::new()
        }
    })
    .await;

    result.unwrap_or_else(|e| {
        tracing::warn!("⚠️  Marker load task failed: {}", e);
        Vec::new()
    })
}

/// Overwrite the stored marker list
async fn save_markers_async(db_path: PathBuf, markers: Vec<Marker>) -> Result<(), String> {
    tokio::task::spawn_blocking(move || {
        let store = SqliteStore::open(&db_path)?;
        MarkerList::from_markers(markers).save(&store)
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
    .map_err(|e| e.to_string())
}

async fn save_settings_async(db_path: PathBuf, settings: Settings) -> Result<(), String> {
    tokio::task::spawn_blocking(move || {
        let store = SqliteStore::open(&db_path)?;
        settings.save(&store)
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
    .map_err(|e| e.to_string())
}

/// Let the user pick a photo for a marker from disk
async fn pick_photo(marker_id: String) -> (String, Option<String>) {
    let file = AsyncFileDialog::new()
        .set_title("Choose a photo of this spot")
        .add_filter("Images", &["jpg", "jpeg", "png", "webp", "heic"])
        .pick_file()
        .await;

    let uri = file.map(|handle| handle.path().to_string_lossy().to_string());
    (marker_id, uri)
}

/// Ask before deleting a marker
async fn confirm_delete(marker_id: String) -> (String, bool) {
    let answer = AsyncMessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("Delete marker")
        .set_description("Delete this marker and its photo reference?")
        .set_buttons(MessageButtons::YesNo)
        .show()
        .await;

    (marker_id, matches!(answer, MessageDialogResult::Yes))
}
