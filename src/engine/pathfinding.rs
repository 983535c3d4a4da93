use std::collections::VecDeque;

use crate::types::{Direction, Vec2};
use crate::world::GridMap;

use super::utils::wrapped_offset;

#[derive(Clone, Debug)]
pub struct DistanceField {
    width: i32,
    height: i32,
    distances: Vec<Option<u32>>,
}

impl DistanceField {
    pub fn from_target(grid: &GridMap, target: Vec2) -> Self {
        Self::from_sources(grid, [target])
    }

    pub fn from_sources(grid: &GridMap, sources: impl IntoIterator<Item = Vec2>) -> Self {
        let width = grid.width();
        let height = grid.height();
        let mut distances = vec![None; (width * height) as usize];
        let mut queue = VecDeque::new();

        for source in sources {
            if !grid.is_walkable(source.x, source.y) {
                continue;
            }
            let idx = (source.y * width + source.x) as usize;
            if distances[idx].is_none() {
                distances[idx] = Some(0);
                queue.push_back(source);
            }
        }

        while let Some(tile) = queue.pop_front() {
            let Some(current) = distances[(tile.y * width + tile.x) as usize] else {
                continue;
            };
            for dir in Direction::CARDINALS {
                let next = wrapped_offset(grid, tile, dir);
                if !grid.is_walkable(next.x, next.y) {
                    continue;
                }
                let idx = (next.y * width + next.x) as usize;
                if distances[idx].is_none() {
                    distances[idx] = Some(current + 1);
                    queue.push_back(next);
                }
            }
        }

        Self {
            width,
            height,
            distances,
        }
    }

    pub fn distance(&self, tile: Vec2) -> Option<u32> {
        if tile.x < 0 || tile.y < 0 || tile.x >= self.width || tile.y >= self.height {
            return None;
        }
        self.distances[(tile.y * self.width + tile.x) as usize]
    }

    #[cfg(test)]
    pub fn reachable_count(&self) -> usize {
        self.distances.iter().filter(|d| d.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> GridMap {
        GridMap::from_rows(rows).expect("valid test level")
    }

    #[test]
    fn distance_matches_known_shortest_path() {
        let map = grid(&[
            "#######",
            "#.....#",
            "#.###.#",
            "#.#...#",
            "#######",
        ]);
        let field = DistanceField::from_target(&map, Vec2 { x: 3, y: 3 });
        assert_eq!(field.distance(Vec2 { x: 3, y: 3 }), Some(0));
        assert_eq!(field.distance(Vec2 { x: 5, y: 1 }), Some(4));
        assert_eq!(field.distance(Vec2 { x: 1, y: 3 }), Some(10));
        assert_eq!(field.distance(Vec2 { x: 2, y: 3 }), None);
    }

    #[test]
    fn walled_off_cells_have_no_distance() {
        let map = grid(&[
            "#######",
            "#..#..#",
            "#######",
        ]);
        let field = DistanceField::from_target(&map, Vec2 { x: 1, y: 1 });
        assert_eq!(field.distance(Vec2 { x: 2, y: 1 }), Some(1));
        assert_eq!(field.distance(Vec2 { x: 4, y: 1 }), None);
        assert_eq!(field.distance(Vec2 { x: 5, y: 1 }), None);
        assert_eq!(field.distance(Vec2 { x: -1, y: 1 }), None);
        assert_eq!(field.reachable_count(), 2);
    }

    #[test]
    fn wall_target_reaches_nothing() {
        let map = grid(&["###", "#.#", "###"]);
        let field = DistanceField::from_target(&map, Vec2 { x: 0, y: 0 });
        assert_eq!(field.reachable_count(), 0);
        let off_grid = DistanceField::from_target(&map, Vec2 { x: 9, y: 9 });
        assert_eq!(off_grid.reachable_count(), 0);
    }

    #[test]
    fn tunnel_rows_shorten_paths_across_the_edge() {
        let map = grid(&[
            "#########",
            "         ",
            "#########",
        ]);
        let field = DistanceField::from_target(&map, Vec2 { x: 0, y: 1 });
        assert_eq!(field.distance(Vec2 { x: 8, y: 1 }), Some(1));
        assert_eq!(field.distance(Vec2 { x: 4, y: 1 }), Some(4));
    }

    #[test]
    fn multiple_sources_take_the_nearest() {
        let map = grid(&["#########", "#.......#", "#########"]);
        let field =
            DistanceField::from_sources(&map, [Vec2 { x: 1, y: 1 }, Vec2 { x: 7, y: 1 }]);
        assert_eq!(field.distance(Vec2 { x: 4, y: 1 }), Some(3));
        assert_eq!(field.distance(Vec2 { x: 6, y: 1 }), Some(1));
    }
}
