use crate::types::Vec2;

pub const TICK_RATE: u32 = 60;

pub const TILE: f32 = 16.0;
pub const SPEED_PX: f32 = 2.0;
pub const ACTOR_RADIUS: f32 = TILE * 0.48;
pub const COLLISION_RADIUS: f32 = ACTOR_RADIUS * 0.80;

pub const PLAYER_TURN_TOLERANCE: f32 = TILE * 0.2;
pub const GHOST_DECISION_TOLERANCE: f32 = 1.0;

pub const PELLET_POINTS: u32 = 10;
pub const MOUTH_PHASE_STEP: f32 = 0.15;

pub const GHOST_CHASE_PROBABILITY: f32 = 0.6;
pub const GHOST_DEVIATION_PROBABILITY: f32 = 0.3;
pub const GHOST_SCATTER_STEPS: u32 = 40;

pub const START_LIVES: i32 = 3;

pub const CUE_SLOTS: usize = 8;
pub const MUNCH_CUE_TICKS: u64 = 15;

pub const AUTOPILOT_JITTER: f32 = 0.02;

pub const PLAYER_SPAWN: Vec2 = Vec2 { x: 12, y: 23 };
pub const GHOST_SPAWNS: [Vec2; 4] = [
    Vec2 { x: 13, y: 14 },
    Vec2 { x: 14, y: 14 },
    Vec2 { x: 12, y: 14 },
    Vec2 { x: 15, y: 14 },
];

pub fn get_scatter_steps(ghost_index: usize, base: u32) -> u32 {
    base.saturating_mul(ghost_index as u32 + 1)
}
