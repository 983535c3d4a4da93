use crate::constants::AUTOPILOT_JITTER;
use crate::rng::Rng;
use crate::types::{Direction, Vec2};
use crate::world::GridMap;

use super::ghost_system::Ghost;
use super::pathfinding::DistanceField;
use super::player_system::Player;
use super::utils::{manhattan, wrapped_offset};

const NO_PELLET_PENALTY: f32 = 1_000.0;

pub fn choose_direction(
    grid: &GridMap,
    player: &Player,
    ghosts: &[Ghost],
    rng: &mut Rng,
) -> Direction {
    let tile = player.actor.tile();
    let field = DistanceField::from_sources(grid, grid.pellet_tiles());
    let ghost_tiles: Vec<Vec2> = ghosts.iter().map(|ghost| ghost.actor.tile()).collect();

    let mut best_safe = (Direction::None, f32::NEG_INFINITY);
    let mut best_any = (Direction::None, f32::NEG_INFINITY);
    let mut open = Vec::new();

    for dir in Direction::CARDINALS {
        let next = wrapped_offset(grid, tile, dir);
        if !grid.is_walkable(next.x, next.y) {
            continue;
        }
        open.push(dir);

        let ghost_dist = ghost_tiles
            .iter()
            .map(|ghost| manhattan(next, *ghost))
            .min()
            .unwrap_or(99);
        let mut score = match field.distance(next) {
            Some(steps) => -(steps as f32),
            None => -NO_PELLET_PENALTY,
        };
        score += ghost_dist.min(6) as f32 * 0.1;
        score += rng.next_f32() * AUTOPILOT_JITTER;

        if score > best_any.1 {
            best_any = (dir, score);
        }
        if ghost_dist > 1 && score > best_safe.1 {
            best_safe = (dir, score);
        }
    }

    if best_safe.0 != Direction::None {
        return best_safe.0;
    }
    if grid.pellet_count() == 0 && !open.is_empty() {
        return open[rng.pick_index(open.len())];
    }
    best_any.0
}
