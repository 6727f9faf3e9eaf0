use bevy::prelude::*;

pub mod config;
pub mod fixed_math;
pub mod graph;
pub mod mover;
pub mod pathfinding;
pub mod persistence;
pub mod world_map;

use config::ExploreConfig;
use fixed_math::FixedNum;
use mover::{Hero, Mover, MoverPlugin, RenderOrder};
use persistence::PositionStore;
use world_map::{sort_order, WorldMap, WorldMapPlugin};

pub struct ExplorePlugin;

impl Plugin for ExplorePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((WorldMapPlugin, MoverPlugin)).add_systems(
            Startup,
            (
                config::load_explore_config,
                world_map::setup_world_map,
                persistence::setup_position_store,
                spawn_hero,
            )
                .chain(),
        );
    }
}

/// Spawn the hero at the persisted destination of this session, or at the
/// origin cell on a fresh session.
fn spawn_hero(
    mut commands: Commands,
    config: Res<ExploreConfig>,
    store: Res<PositionStore>,
    map: Res<WorldMap>,
) {
    let start = store.load().unwrap_or_default();
    let position = map.vertex_to_world(start);
    info!("Hero enters at vertex {:?} ({:?})", start, position);

    commands.spawn((
        Hero,
        Mover::new(
            position,
            FixedNum::from_num(config.move_speed),
            FixedNum::from_num(config.arrival_epsilon),
        ),
        RenderOrder(sort_order(start, config.actor_z)),
    ));
}
