mod gallery;
mod kalman_filter;
mod matching;
mod player_tracker;
mod rect;
mod track;
mod track_state;

pub use gallery::{Embedding, Gallery, unit_normalized};
pub use matching::Detection;
pub use player_tracker::{PlayerTracker, TrackerConfig};
pub use rect::Rect;
pub use track::Track;
pub use track_state::TrackState;
