use crate::constants::{COLLISION_RADIUS, SPEED_PX};
use crate::types::{Direction, Vec2, Vec2f};
use crate::world::{tile_center, tile_of, GridMap};

const DIAGONAL_SCALE: f32 = std::f32::consts::FRAC_1_SQRT_2;

pub fn direction_vector(dir: Direction) -> Vec2f {
    match dir {
        Direction::Left => Vec2f::new(-SPEED_PX, 0.0),
        Direction::Right => Vec2f::new(SPEED_PX, 0.0),
        Direction::Up => Vec2f::new(0.0, -SPEED_PX),
        Direction::Down => Vec2f::new(0.0, SPEED_PX),
        Direction::None => Vec2f::ZERO,
    }
}

pub fn collision_samples(pos: Vec2f) -> [Vec2f; 8] {
    let r = COLLISION_RADIUS;
    let d = COLLISION_RADIUS * DIAGONAL_SCALE;
    [
        Vec2f::new(pos.x - r, pos.y),
        Vec2f::new(pos.x + r, pos.y),
        Vec2f::new(pos.x, pos.y - r),
        Vec2f::new(pos.x, pos.y + r),
        Vec2f::new(pos.x - d, pos.y - d),
        Vec2f::new(pos.x + d, pos.y - d),
        Vec2f::new(pos.x + d, pos.y + d),
        Vec2f::new(pos.x - d, pos.y + d),
    ]
}

pub fn sampled_cells(grid: &GridMap, pos: Vec2f) -> [Vec2; 8] {
    collision_samples(pos).map(|sample| {
        tile_of(Vec2f::new(grid.wrap_pixel_x(sample.x), sample.y))
    })
}

pub fn can_occupy(grid: &GridMap, pos: Vec2f) -> bool {
    sampled_cells(grid, pos)
        .iter()
        .all(|cell| grid.is_walkable(cell.x, cell.y))
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub position: Vec2f,
    pub dir: Direction,
    pub on_teleport: bool,
    spawn: Vec2f,
    spawn_dir: Direction,
}

impl Actor {
    pub fn new(spawn: Vec2f, spawn_dir: Direction) -> Self {
        Self {
            position: spawn,
            dir: spawn_dir,
            on_teleport: false,
            spawn,
            spawn_dir,
        }
    }

    pub fn reset(&mut self) {
        self.position = self.spawn;
        self.dir = self.spawn_dir;
        self.on_teleport = false;
    }

    pub fn tile(&self) -> Vec2 {
        tile_of(self.position)
    }

    pub fn tile_center(&self) -> Vec2f {
        tile_center(self.tile())
    }

    pub fn at_decision_point(&self, tolerance: f32) -> bool {
        let to_center = self.tile_center() - self.position;
        to_center.x.abs() < tolerance && to_center.y.abs() < tolerance
    }

    pub fn snap_to_center(&mut self) {
        self.position = self.tile_center();
    }

    pub fn step_and_wrap(&mut self, displacement: Vec2f, grid: &GridMap) {
        let next = self.position + displacement;
        self.position = Vec2f::new(grid.wrap_pixel_x(next.x), next.y);
    }

    pub fn apply_teleport(&mut self, grid: &GridMap) -> bool {
        let tile = self.tile();
        let on_portal = grid.is_teleport(tile.x, tile.y);
        if on_portal && !self.on_teleport {
            self.position = grid.teleport_destination(tile.x, tile.y);
            self.on_teleport = true;
            tracing::trace!(from_x = tile.x, from_y = tile.y, "teleported");
            return true;
        }
        if !on_portal {
            self.on_teleport = false;
        }
        false
    }
}
