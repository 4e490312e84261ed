/// Track lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Newly spawned track, identity not yet confirmed
    #[default]
    Tentative,
    /// Confirmed identity, actively tracked and emitted
    Confirmed,
    /// Missing this frame, eligible for re-identification
    Lost,
    /// Terminal; removed from the live set and never revived
    Deleted,
}
