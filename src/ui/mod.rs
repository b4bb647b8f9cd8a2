/// User interface module
///
/// - Body diagram canvas and pointer translation (canvas.rs)
/// - Marker gallery grid (gallery.rs)
/// - Selected marker panel (detail.rs)

pub mod canvas;
pub mod detail;
pub mod gallery;
