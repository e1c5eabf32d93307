use bevy_app::{App, Plugin};

use super::systems::diplomacy::DiplomacyPlugin;
use super::systems::strength::StrengthPlugin;
use super::systems::war::WarPlugin;

/// Aggregate plugin that installs every simulation domain.
pub struct SimPlugin;

impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((DiplomacyPlugin, WarPlugin, StrengthPlugin));
    }
}
