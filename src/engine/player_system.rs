use std::f32::consts::TAU;

use crate::constants::{MOUTH_PHASE_STEP, PELLET_POINTS, PLAYER_TURN_TOLERANCE};
use crate::types::{AudioCue, Direction, InputSnapshot, MunchVariant, PlayerView, Vec2f};
use crate::world::GridMap;

use super::movement::{can_occupy, direction_vector, Actor};

pub trait PlayerHooks {
    fn add_score(&mut self, points: u32);

    fn play_cue(&mut self, _cue: AudioCue) {}
}

impl<F: FnMut(u32)> PlayerHooks for F {
    fn add_score(&mut self, points: u32) {
        self(points)
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub actor: Actor,
    desired_dir: Direction,
    last_dir: Direction,
    mouth_phase: f32,
    next_munch: MunchVariant,
}

impl Player {
    pub fn new(spawn: Vec2f) -> Self {
        Self {
            actor: Actor::new(spawn, Direction::None),
            desired_dir: Direction::None,
            last_dir: Direction::Right,
            mouth_phase: 0.0,
            next_munch: MunchVariant::A,
        }
    }

    pub fn reset(&mut self) {
        self.actor.reset();
        self.desired_dir = Direction::None;
        self.last_dir = Direction::Right;
        self.mouth_phase = 0.0;
        self.next_munch = MunchVariant::A;
    }

    pub fn position(&self) -> Vec2f {
        self.actor.position
    }

    pub fn heading(&self) -> Direction {
        self.actor.dir
    }

    pub fn desired_direction(&self) -> Direction {
        self.desired_dir
    }

    pub fn last_heading(&self) -> Direction {
        self.last_dir
    }

    pub fn mouth_phase(&self) -> f32 {
        self.mouth_phase
    }

    // Last write wins; nothing is queued.
    pub fn record_desired_direction(&mut self, dir: Direction) {
        self.desired_dir = dir;
    }

    pub fn record_input(&mut self, input: InputSnapshot) {
        if let Some(dir) = input.direction() {
            self.desired_dir = dir;
        }
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            x: self.actor.position.x,
            y: self.actor.position.y,
            dir: self.actor.dir,
            desired_dir: self.desired_dir,
            last_dir: self.last_dir,
            mouth_phase: self.mouth_phase,
        }
    }

    pub fn update(&mut self, grid: &mut GridMap, hooks: &mut impl PlayerHooks) {
        self.mouth_phase += MOUTH_PHASE_STEP;
        if self.mouth_phase > TAU {
            self.mouth_phase -= TAU;
        }

        let tile = self.actor.tile();
        if grid.eat_pellet(tile.x, tile.y) {
            tracing::trace!(x = tile.x, y = tile.y, "pellet_eaten");
            hooks.add_score(PELLET_POINTS);
            hooks.play_cue(AudioCue::Munch(self.next_munch));
            self.next_munch = self.next_munch.toggled();
        }

        self.try_turn(grid);

        let step = direction_vector(self.actor.dir);
        if can_occupy(grid, self.actor.position + step) {
            self.actor.step_and_wrap(step, grid);
        } else {
            self.actor.dir = Direction::None;
        }
        if self.actor.dir != Direction::None {
            self.last_dir = self.actor.dir;
        }

        self.actor.apply_teleport(grid);
    }

    fn try_turn(&mut self, grid: &GridMap) {
        let desired = self.desired_dir;
        if desired == Direction::None || desired == self.actor.dir {
            return;
        }
        if !self.actor.at_decision_point(PLAYER_TURN_TOLERANCE) {
            return;
        }
        if can_occupy(grid, self.actor.tile_center() + direction_vector(desired)) {
            self.actor.snap_to_center();
            self.actor.dir = desired;
        }
    }
}
