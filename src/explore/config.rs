use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Static exploration parameters loaded once at startup. Layout values stay
/// fixed for a whole session; changing them underneath a running map would
/// invalidate persisted positions.
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
pub struct ExploreConfig {
    /// Horizontal distance between cell centers in one row.
    pub tile_width: f32,
    /// Vertical distance between rows.
    pub row_height: f32,
    /// Actor movement speed, world units per second.
    pub move_speed: f32,
    /// Distance at which a waypoint counts as reached.
    pub arrival_epsilon: f32,
    /// Z-index applied to actors in the shared draw-order formula. Must stay
    /// below the row stride of 100.
    pub actor_z: i32,
    /// Directory holding persisted session state.
    pub save_dir: String,
    /// Opaque id scoping persisted positions to one play session.
    pub session_id: String,
    /// Asset path of the world map batch.
    pub map_asset: String,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            tile_width: 32.0,
            row_height: 24.0,
            move_speed: 140.0,
            arrival_epsilon: 0.25,
            actor_z: 50,
            save_dir: "saves".to_string(),
            session_id: "default".to_string(),
            map_asset: "world.map.ron".to_string(),
        }
    }
}

/// Load the static config synchronously at startup. Everything downstream
/// (map layout, hero speed) depends on these values, so a broken file
/// degrades to the defaults rather than aborting.
pub fn load_explore_config(mut commands: Commands) {
    let config_path = "assets/explore_config.ron";

    match std::fs::read_to_string(config_path) {
        Ok(contents) => match ron::from_str::<ExploreConfig>(&contents) {
            Ok(config) => {
                info!("Loaded exploration config from {}", config_path);
                commands.insert_resource(config);
            }
            Err(e) => {
                error!("Failed to parse exploration config: {}", e);
                error!("Using default ExploreConfig");
                commands.insert_resource(ExploreConfig::default());
            }
        },
        Err(e) => {
            error!("Failed to read {}: {}", config_path, e);
            error!("Using default ExploreConfig");
            commands.insert_resource(ExploreConfig::default());
        }
    }
}
