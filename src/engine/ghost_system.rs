use serde::Deserialize;

use crate::constants::{
    GHOST_CHASE_PROBABILITY, GHOST_DECISION_TOLERANCE, GHOST_DEVIATION_PROBABILITY,
    GHOST_SCATTER_STEPS,
};
use crate::rng::RandomSource;
use crate::types::{Direction, GhostMode, GhostView, Vec2, Vec2f};
use crate::world::{tile_of, GridMap};

use super::movement::{can_occupy, direction_vector, Actor};
use super::pathfinding::DistanceField;
use super::utils::wrapped_offset;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GhostPolicy {
    pub chase_probability: f32,
    pub deviation_probability: f32,
    pub scatter_steps: u32,
}

impl Default for GhostPolicy {
    fn default() -> Self {
        Self {
            chase_probability: GHOST_CHASE_PROBABILITY,
            deviation_probability: GHOST_DEVIATION_PROBABILITY,
            scatter_steps: GHOST_SCATTER_STEPS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostDecision {
    pub dir: Direction,
    pub mode: GhostMode,
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub actor: Actor,
    scatter_steps_remaining: u32,
    initial_scatter_steps: u32,
    policy: GhostPolicy,
    mode: GhostMode,
}

impl Ghost {
    pub fn new(spawn: Vec2f, scatter_steps: u32, policy: GhostPolicy) -> Self {
        Self {
            actor: Actor::new(spawn, Direction::Left),
            scatter_steps_remaining: scatter_steps,
            initial_scatter_steps: scatter_steps,
            policy,
            mode: GhostMode::Explore,
        }
    }

    pub fn reset(&mut self) {
        self.actor.reset();
        self.scatter_steps_remaining = self.initial_scatter_steps;
        self.mode = GhostMode::Explore;
    }

    pub fn position(&self) -> Vec2f {
        self.actor.position
    }

    pub fn heading(&self) -> Direction {
        self.actor.dir
    }

    pub fn mode(&self) -> GhostMode {
        self.mode
    }

    pub fn scatter_steps_remaining(&self) -> u32 {
        self.scatter_steps_remaining
    }

    pub fn view(&self, id: usize) -> GhostView {
        GhostView {
            id,
            x: self.actor.position.x,
            y: self.actor.position.y,
            dir: self.actor.dir,
            mode: self.mode,
            scatter_steps_remaining: self.scatter_steps_remaining,
        }
    }

    pub fn update(
        &mut self,
        grid: &GridMap,
        target: Vec2f,
        rng: &mut dyn RandomSource,
    ) -> Option<GhostDecision> {
        let heading = self.actor.dir;
        let at_center = self.actor.at_decision_point(GHOST_DECISION_TOLERANCE);
        let blocked = !can_occupy(grid, self.actor.position + direction_vector(heading));

        let decision = if blocked || at_center {
            self.decide(grid, target, rng)
        } else {
            None
        };

        if let Some(decision) = decision {
            if decision.dir != heading && at_center {
                self.actor.snap_to_center();
            }
            if decision.mode != self.mode {
                tracing::debug!(mode = ?decision.mode, dir = ?decision.dir, "ghost_mode_changed");
            }
            self.actor.dir = decision.dir;
            self.mode = decision.mode;
        }

        let step = direction_vector(self.actor.dir);
        if can_occupy(grid, self.actor.position + step) {
            self.actor.step_and_wrap(step, grid);
        }
        self.actor.apply_teleport(grid);
        decision
    }

    fn select_mode(&mut self, rng: &mut dyn RandomSource) -> GhostMode {
        if self.scatter_steps_remaining > 0 {
            self.scatter_steps_remaining -= 1;
            return GhostMode::Explore;
        }
        if rng.bool(self.policy.chase_probability) {
            GhostMode::Chase
        } else {
            GhostMode::Explore
        }
    }

    fn decide(
        &mut self,
        grid: &GridMap,
        target: Vec2f,
        rng: &mut dyn RandomSource,
    ) -> Option<GhostDecision> {
        let mut order = Direction::CARDINALS;
        rng.shuffle(&mut order);
        let mode = self.select_mode(rng);

        let candidates =
            candidate_directions(grid, self.actor.tile_center(), self.actor.dir, &order);
        let explore = GhostDecision {
            dir: *candidates.first()?,
            mode: GhostMode::Explore,
        };
        if mode == GhostMode::Explore {
            return Some(explore);
        }

        let field = DistanceField::from_target(grid, tile_of(target));
        let best = closest_candidate(grid, &field, self.actor.tile(), &candidates);
        let confused = rng.bool(self.policy.deviation_probability);
        match best {
            Some(dir) if !confused => Some(GhostDecision {
                dir,
                mode: GhostMode::Chase,
            }),
            _ => Some(explore),
        }
    }
}

// Walkable directions from `center` in `order`, without the U-turn unless it is
// the only way out.
fn candidate_directions(
    grid: &GridMap,
    center: Vec2f,
    heading: Direction,
    order: &[Direction],
) -> Vec<Direction> {
    let walkable: Vec<Direction> = order
        .iter()
        .copied()
        .filter(|dir| can_occupy(grid, center + direction_vector(*dir)))
        .collect();
    let reverse = heading.opposite();
    let forward: Vec<Direction> = walkable
        .iter()
        .copied()
        .filter(|dir| *dir != reverse)
        .collect();
    if forward.is_empty() {
        walkable
    } else {
        forward
    }
}

// First candidate with the strictly smallest distance, so ties follow `candidates` order.
fn closest_candidate(
    grid: &GridMap,
    field: &DistanceField,
    tile: Vec2,
    candidates: &[Direction],
) -> Option<Direction> {
    let mut best: Option<(u32, Direction)> = None;
    for dir in candidates {
        let Some(dist) = field.distance(wrapped_offset(grid, tile, *dir)) else {
            continue;
        };
        if best.map(|(d, _)| dist < d).unwrap_or(true) {
            best = Some((dist, *dir));
        }
    }
    best.map(|(_, dir)| dir)
}
