use bevy::prelude::*;

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Running,
    Paused,
    /// The clock reached its horizon; only a restart leaves this state
    Finished,
}
