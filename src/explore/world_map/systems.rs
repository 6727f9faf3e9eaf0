use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;

use crate::explore::config::ExploreConfig;
use crate::explore::fixed_math::{FixedNum, FixedVec2};
use crate::explore::mover::{ArrivalNotice, Arrived, Hero, Mover, Npc, RenderOrder};
use crate::explore::persistence::PositionStore;

use super::{sort_order, TileBatch, WorldMap};

/// A world-space click delivered by the input collaborator.
#[derive(Message, Debug, Clone)]
pub struct MapClick {
    pub point: FixedVec2,
}

#[derive(Resource)]
pub struct WorldMapHandle(pub Handle<TileBatch>);

pub struct WorldMapPlugin;

impl Plugin for WorldMapPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<TileBatch>::new(&["map.ron"]))
            .add_message::<MapClick>()
            .add_systems(Update, (ingest_loaded_batches, handle_map_clicks).chain());
    }
}

/// Create the map resource from the configured layout and kick off the map
/// asset load. Runs after the config load in the startup chain.
pub fn setup_world_map(
    mut commands: Commands,
    config: Res<ExploreConfig>,
    asset_server: Res<AssetServer>,
) {
    commands.insert_resource(WorldMap::new(config.tile_width, config.row_height));
    let handle = asset_server.load(config.map_asset.clone());
    commands.insert_resource(WorldMapHandle(handle));
}

/// Swap the tile registry for every freshly loaded or hot-reloaded batch.
/// Ingestion is wholesale, so previously spawned occupants are despawned and
/// re-seeded from the new batch.
pub fn ingest_loaded_batches(
    mut commands: Commands,
    mut events: MessageReader<AssetEvent<TileBatch>>,
    batches: Res<Assets<TileBatch>>,
    handle: Res<WorldMapHandle>,
    mut map: ResMut<WorldMap>,
    config: Res<ExploreConfig>,
    occupants_q: Query<Entity, (With<Mover>, Without<Hero>)>,
) {
    for event in events.read() {
        if !event.is_loaded_with_dependencies(handle.0.id()) && !event.is_modified(handle.0.id()) {
            continue;
        }
        let Some(batch) = batches.get(&handle.0) else {
            continue;
        };

        for entity in occupants_q.iter() {
            commands.entity(entity).despawn();
        }

        let occupants = map.ingest(batch);
        info!(
            "Ingested world map: {} tiles, {} occupants",
            map.tile_count(),
            occupants.len()
        );

        for (vertex, id) in occupants {
            let position = map.vertex_to_world(vertex);
            commands.spawn((
                Npc { id },
                Mover::new(
                    position,
                    FixedNum::from_num(config.move_speed),
                    FixedNum::from_num(config.arrival_epsilon),
                ),
                RenderOrder(sort_order(vertex, config.actor_z)),
            ));
        }
    }
}

/// Resolve clicks into hero movement: nearest vertex, classification rules,
/// shortest path, persisted destination, waypoint hand-off.
pub fn handle_map_clicks(
    mut clicks: MessageReader<MapClick>,
    map: Res<WorldMap>,
    store: Res<PositionStore>,
    mut hero_q: Query<(Entity, &mut Mover), With<Hero>>,
    mut arrivals: MessageWriter<Arrived>,
) {
    if clicks.is_empty() {
        return;
    }

    let (hero, mut mover) = hero_q
        .single_mut()
        .expect("map clicks require exactly one spawned hero");

    for click in clicks.read() {
        let started = std::time::Instant::now();
        let hero_at = map.world_to_vertex(mover.position());

        let Some(route) = map.resolve_click(click.point, hero_at) else {
            debug!("Click at {:?} resolved to no movement", click.point);
            continue;
        };

        let destination = *route
            .vertices
            .last()
            .expect("resolved routes are never empty");
        store.store(destination);

        let waypoints: Vec<FixedVec2> = route
            .vertices
            .iter()
            .map(|&v| map.vertex_to_world(v))
            .collect();
        let hops = waypoints.len();

        let notice = ArrivalNotice {
            action: route.on_visit,
        };
        if let Some(fired) = mover.move_on_path(waypoints, Some(notice)) {
            // Zero-length assignment: the arrival fires on the spot.
            arrivals.write(Arrived {
                entity: hero,
                action: fired.action,
            });
        }

        let elapsed = started.elapsed();
        if elapsed.as_millis() > 5 {
            warn!("Slow click resolution: {:?} for {} hops", elapsed, hops);
        }
    }
}
