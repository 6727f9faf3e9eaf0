use std::collections::VecDeque;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::ExploreConfig;
use super::fixed_math::{FixedNum, FixedVec2};
use super::world_map::{sort_order, WorldMap};

#[cfg(test)]
mod tests;

/// Cardinal facing of an actor sprite, derived from the movement direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

/// Completion signal carried by a path assignment. Fires at most once, when
/// the waypoint queue empties; a superseding assignment discards it unfired.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalNotice {
    /// On-visit action of the clicked tile, forwarded to the rules engine.
    pub action: Option<String>,
}

/// Emitted when an actor finishes a path assignment.
#[derive(Message, Debug, Clone)]
pub struct Arrived {
    pub entity: Entity,
    pub action: Option<String>,
}

/// Marks the player-controlled actor.
#[derive(Component)]
pub struct Hero;

/// Non-player actor spawned from a tile occupant descriptor.
#[derive(Component, Debug, Clone)]
pub struct Npc {
    pub id: String,
}

/// Draw order of an actor, on the same scale as terrain render entries.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct RenderOrder(pub i32);

/// Waypoint-following movement executor. Idle while the queue is empty,
/// Moving otherwise; the state machine lives in plain methods so it can be
/// driven tick by tick in tests without an `App`.
#[derive(Component, Debug, Clone)]
pub struct Mover {
    position: FixedVec2,
    queue: VecDeque<FixedVec2>,
    speed: FixedNum,
    epsilon: FixedNum,
    facing: Facing,
    pending: Option<ArrivalNotice>,
}

impl Mover {
    pub fn new(position: FixedVec2, speed: FixedNum, epsilon: FixedNum) -> Self {
        Self {
            position,
            queue: VecDeque::new(),
            speed,
            epsilon,
            facing: Facing::default(),
            pending: None,
        }
    }

    pub fn position(&self) -> FixedVec2 {
        self.position
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Assign a fresh path. Replaces (never appends to) the current queue and
    /// silently drops any still-pending notice. A returned notice means the
    /// assignment was empty and completes on the spot; the caller fires it.
    #[must_use]
    pub fn move_on_path(
        &mut self,
        waypoints: impl IntoIterator<Item = FixedVec2>,
        notice: Option<ArrivalNotice>,
    ) -> Option<ArrivalNotice> {
        self.queue.clear();
        self.pending = None;
        self.queue.extend(waypoints);

        match self.queue.front() {
            None => notice,
            Some(&first) => {
                self.facing = facing_toward(self.position, first);
                self.pending = notice;
                None
            }
        }
    }

    /// One movement tick: step toward the queue head without overshooting,
    /// pop it once within epsilon, and hand back the pending notice exactly
    /// when the queue empties.
    #[must_use]
    pub fn advance(&mut self, dt: FixedNum) -> Option<ArrivalNotice> {
        let Some(&target) = self.queue.front() else {
            return None;
        };

        let to_target = target - self.position;
        let dist = to_target.length();
        let step = self.speed * dt;
        if dist <= step {
            self.position = target;
        } else if dist > FixedNum::ZERO {
            self.position = self.position + to_target * (step / dist);
        }

        if (target - self.position).length() < self.epsilon {
            self.position = target;
            self.queue.pop_front();
            match self.queue.front() {
                None => return self.pending.take(),
                Some(&next) => self.facing = facing_toward(self.position, next),
            }
        }
        None
    }
}

/// Facing from a movement vector: horizontal wins only when |dx| strictly
/// exceeds |dy|, so diagonal ties resolve to the vertical branch.
pub fn facing_toward(from: FixedVec2, to: FixedVec2) -> Facing {
    let d = to - from;
    if d.x.abs() > d.y.abs() {
        if d.x < FixedNum::ZERO {
            Facing::Left
        } else {
            Facing::Right
        }
    } else if d.y < FixedNum::ZERO {
        Facing::Down
    } else {
        Facing::Up
    }
}

pub struct MoverPlugin;

impl Plugin for MoverPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<Arrived>()
            .add_systems(Update, (advance_movers, sync_render_order).chain());
    }
}

/// Per-frame movement tick for every actor; completed assignments are
/// forwarded as `Arrived` messages.
pub fn advance_movers(
    time: Res<Time>,
    mut movers: Query<(Entity, &mut Mover)>,
    mut arrivals: MessageWriter<Arrived>,
) {
    let dt = FixedNum::from_num(time.delta_secs());
    if dt <= FixedNum::ZERO {
        return;
    }
    for (entity, mut mover) in movers.iter_mut() {
        if let Some(notice) = mover.advance(dt) {
            arrivals.write(Arrived {
                entity,
                action: notice.action,
            });
        }
    }
}

/// Keep each actor's draw order in step with the cell it currently stands
/// on, using the same formula as the terrain entries.
pub fn sync_render_order(
    map: Res<WorldMap>,
    config: Res<ExploreConfig>,
    mut actors: Query<(&Mover, &mut RenderOrder)>,
) {
    for (mover, mut order) in actors.iter_mut() {
        let vertex = map.world_to_vertex(mover.position());
        order.0 = sort_order(vertex, config.actor_z);
    }
}
