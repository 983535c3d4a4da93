use std::path::Path;

use thiserror::Error;

use crate::constants::TILE;
use crate::types::{Vec2, Vec2f};

const CLASSIC_LEVEL: &str = include_str!("../levels/classic.txt");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Open,
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level has no rows")]
    Empty,
    #[error("level row 0 has no columns")]
    EmptyRow,
    #[error("level row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("failed to read level {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Debug)]
pub struct GridMap {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    initial_pellets: Vec<bool>,
    pellets: Vec<bool>,
    teleports: Vec<Vec2>,
}

impl GridMap {
    // `#` is a wall, `.` is open with a pellet, anything else is open floor.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        if rows.is_empty() {
            return Err(LevelError::Empty);
        }
        let width = rows[0].as_ref().chars().count();
        if width == 0 {
            return Err(LevelError::EmptyRow);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        let mut pellets = Vec::with_capacity(width * rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let found = row.as_ref().chars().count();
            if found != width {
                return Err(LevelError::Ragged {
                    row: row_idx,
                    expected: width,
                    found,
                });
            }
            for c in row.as_ref().chars() {
                cells.push(if c == '#' { Cell::Wall } else { Cell::Open });
                pellets.push(c == '.');
            }
        }

        let mut grid = Self {
            width: width as i32,
            height: rows.len() as i32,
            cells,
            initial_pellets: pellets.clone(),
            pellets,
            teleports: Vec::new(),
        };
        grid.teleports = collect_teleports(&grid);
        Ok(grid)
    }

    pub fn parse(text: &str) -> Result<Self, LevelError> {
        let mut rows: Vec<&str> = text
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        Self::from_rows(&rows)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn classic() -> Result<Self, LevelError> {
        Self::parse(CLASSIC_LEVEL)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * TILE
    }

    fn index(&self, gx: i32, gy: i32) -> Option<usize> {
        if gx < 0 || gy < 0 || gx >= self.width || gy >= self.height {
            return None;
        }
        Some((gy * self.width + gx) as usize)
    }

    pub fn is_walkable(&self, gx: i32, gy: i32) -> bool {
        self.index(gx, gy)
            .map(|idx| self.cells[idx] != Cell::Wall)
            .unwrap_or(false)
    }

    pub fn has_pellet(&self, gx: i32, gy: i32) -> bool {
        self.index(gx, gy)
            .map(|idx| self.pellets[idx])
            .unwrap_or(false)
    }

    pub fn eat_pellet(&mut self, gx: i32, gy: i32) -> bool {
        let Some(idx) = self.index(gx, gy) else {
            return false;
        };
        std::mem::replace(&mut self.pellets[idx], false)
    }

    pub fn pellets_remaining(&self) -> bool {
        self.pellets.iter().any(|pellet| *pellet)
    }

    pub fn pellet_count(&self) -> usize {
        self.pellets.iter().filter(|pellet| **pellet).count()
    }

    pub fn pellet_tiles(&self) -> impl Iterator<Item = Vec2> + '_ {
        let width = self.width;
        self.pellets
            .iter()
            .enumerate()
            .filter(|(_, pellet)| **pellet)
            .map(move |(idx, _)| Vec2 {
                x: idx as i32 % width,
                y: idx as i32 / width,
            })
    }

    pub fn reset_pellets(&mut self) {
        self.pellets.clone_from(&self.initial_pellets);
    }

    pub fn is_teleport(&self, gx: i32, gy: i32) -> bool {
        self.teleports.iter().any(|t| t.x == gx && t.y == gy)
    }

    pub fn teleport_cells(&self) -> &[Vec2] {
        &self.teleports
    }

    // Only portal cells have a partner; every other cell maps to its own center.
    pub fn teleport_destination(&self, gx: i32, gy: i32) -> Vec2f {
        if !self.is_teleport(gx, gy) {
            return tile_center(Vec2 { x: gx, y: gy });
        }
        self.teleports
            .iter()
            .find(|t| t.y == gy && t.x != gx)
            .map(|t| tile_center(*t))
            .unwrap_or_else(|| tile_center(Vec2 { x: gx, y: gy }))
    }

    pub fn wrap_column(&self, gx: i32) -> i32 {
        gx.rem_euclid(self.width)
    }

    pub fn wrap_pixel_x(&self, x: f32) -> f32 {
        let w = self.pixel_width();
        let wrapped = x.rem_euclid(w);
        // rem_euclid can return w for tiny negative inputs
        if wrapped >= w {
            0.0
        } else {
            wrapped
        }
    }
}

fn collect_teleports(grid: &GridMap) -> Vec<Vec2> {
    let last = grid.width - 1;
    let mut out = Vec::new();
    for y in 0..grid.height {
        if grid.is_walkable(0, y) && grid.is_walkable(last, y) {
            out.push(Vec2 { x: 0, y });
            out.push(Vec2 { x: last, y });
        }
    }
    out
}

pub fn tile_center(tile: Vec2) -> Vec2f {
    Vec2f::new(TILE * (tile.x as f32 + 0.5), TILE * (tile.y as f32 + 0.5))
}

pub fn tile_of(pos: Vec2f) -> Vec2 {
    Vec2 {
        x: (pos.x / TILE).floor() as i32,
        y: (pos.y / TILE).floor() as i32,
    }
}
