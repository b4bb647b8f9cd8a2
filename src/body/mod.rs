/// Body diagram engine
///
/// - Region classifier over the fixed silhouette (region.rs)
/// - Pan/zoom gesture state machine (gesture.rs)
/// - Screen to diagram coordinate resolution (layout.rs)
/// - The body map component tying them together (map.rs)

pub mod gesture;
pub mod layout;
pub mod map;
pub mod region;
