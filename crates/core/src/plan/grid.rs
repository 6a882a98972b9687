//! Row-major grid addressing shared by the raster and graph builders.

use crate::types::Point;

pub(super) const AXIS_NEIGHBOUR_OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

pub(super) fn in_bounds(width: i32, height: i32, pos: Point) -> bool {
    pos.x >= 0 && pos.y >= 0 && pos.x < width && pos.y < height
}

pub(super) fn cell_index(width: i32, pos: Point) -> usize {
    (pos.y as usize) * (width as usize) + (pos.x as usize)
}

pub(super) fn all_points(width: i32, height: i32) -> impl Iterator<Item = Point> {
    (0..height).flat_map(move |y| (0..width).map(move |x| Point { x, y }))
}

pub(super) fn axis_neighbours(width: i32, height: i32, pos: Point) -> impl Iterator<Item = Point> {
    AXIS_NEIGHBOUR_OFFSETS
        .into_iter()
        .map(move |(dx, dy)| Point { x: pos.x + dx, y: pos.y + dy })
        .filter(move |&next| in_bounds(width, height, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_cells_have_two_axis_neighbours() {
        assert_eq!(axis_neighbours(4, 3, Point { x: 0, y: 0 }).count(), 2);
        assert_eq!(axis_neighbours(4, 3, Point { x: 3, y: 2 }).count(), 2);
        assert_eq!(axis_neighbours(4, 3, Point { x: 1, y: 1 }).count(), 4);
    }

    #[test]
    fn cell_index_is_row_major() {
        assert_eq!(cell_index(5, Point { x: 2, y: 3 }), 17);
        let order: Vec<usize> = all_points(3, 2).map(|pos| cell_index(3, pos)).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
    }
}
