use crate::types::{Direction, Vec2};
use crate::world::GridMap;

pub(super) fn manhattan(a: Vec2, b: Vec2) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

pub(super) fn offset(tile: Vec2, dir: Direction) -> Vec2 {
    let Vec2 { x, y } = tile;
    match dir {
        Direction::Up => Vec2 { x, y: y - 1 },
        Direction::Down => Vec2 { x, y: y + 1 },
        Direction::Left => Vec2 { x: x - 1, y },
        Direction::Right => Vec2 { x: x + 1, y },
        Direction::None => Vec2 { x, y },
    }
}

pub(super) fn wrapped_offset(grid: &GridMap, tile: Vec2, dir: Direction) -> Vec2 {
    let next = offset(tile, dir);
    Vec2 {
        x: grid.wrap_column(next.x),
        y: next.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_screen_axes() {
        let origin = Vec2 { x: 3, y: 3 };
        assert_eq!(offset(origin, Direction::Up), Vec2 { x: 3, y: 2 });
        assert_eq!(offset(origin, Direction::Down), Vec2 { x: 3, y: 4 });
        assert_eq!(offset(origin, Direction::Left), Vec2 { x: 2, y: 3 });
        assert_eq!(offset(origin, Direction::Right), Vec2 { x: 4, y: 3 });
        assert_eq!(offset(origin, Direction::None), origin);
    }

    #[test]
    fn wrapped_offset_crosses_the_horizontal_edge() {
        let grid = GridMap::from_rows(&["     "]).expect("valid level");
        assert_eq!(
            wrapped_offset(&grid, Vec2 { x: 0, y: 0 }, Direction::Left),
            Vec2 { x: 4, y: 0 }
        );
        assert_eq!(
            wrapped_offset(&grid, Vec2 { x: 4, y: 0 }, Direction::Right),
            Vec2 { x: 0, y: 0 }
        );
        assert_eq!(
            wrapped_offset(&grid, Vec2 { x: 2, y: 0 }, Direction::Up),
            Vec2 { x: 2, y: -1 }
        );
    }

    #[test]
    fn manhattan_sums_both_axes() {
        assert_eq!(manhattan(Vec2 { x: 1, y: 1 }, Vec2 { x: 4, y: -1 }), 5);
    }
}
