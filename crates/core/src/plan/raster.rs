//! Ownership raster built by stamping room rectangles in gene order.

use std::collections::BTreeMap;

use crate::chromosome::RoomChromosome;
use crate::config::LevelConfig;
use crate::types::{Centroid, Layering, Point};

use super::grid::{all_points, cell_index, in_bounds};

#[derive(Clone, Debug, PartialEq)]
pub struct RoomMap {
    width: i32,
    height: i32,
    cells: Vec<Option<usize>>,
    placed: Vec<RoomChromosome>,
}

impl RoomMap {
    pub fn new(width: i32, height: i32, gene: &[RoomChromosome]) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let cells = vec![None; (width as usize) * (height as usize)];
        let mut room_map = Self { width, height, cells, placed: Vec::new() };
        for chromosome in gene {
            room_map.try_place(chromosome);
        }
        room_map
    }

    pub fn from_config(config: &LevelConfig, gene: &[RoomChromosome]) -> Self {
        Self::new(config.width, config.height, gene)
    }

    /// Places one room if the overlap rules allow it, returning whether it was stamped.
    ///
    /// A room is refused when it crosses any placed room, when any cell it
    /// covers is owned by a room it mutually links with, or when every cell it
    /// covers is already owned and it is layered `Under`.
    pub fn try_place(&mut self, chromosome: &RoomChromosome) -> bool {
        let rect = chromosome.rect;
        if self.placed.iter().any(|placed| rect.crosses(placed.rect) || placed.rect.crosses(rect)) {
            return false;
        }

        let mut covers_owned = false;
        let mut exposes_empty = false;
        for pos in rect.cells().filter(|&pos| in_bounds(self.width, self.height, pos)) {
            match self.cells[cell_index(self.width, pos)] {
                Some(owner) => {
                    covers_owned = true;
                    if self.placed_room(owner).is_some_and(|placed| placed.links_with(chromosome)) {
                        return false;
                    }
                }
                None => exposes_empty = true,
            }
        }
        if covers_owned && !exposes_empty && chromosome.layering == Layering::Under {
            return false;
        }

        self.stamp(chromosome);
        self.placed.push(chromosome.clone());
        true
    }

    fn stamp(&mut self, chromosome: &RoomChromosome) {
        let repaint = chromosome.layering == Layering::Over;
        for pos in chromosome.rect.cells().filter(|&pos| in_bounds(self.width, self.height, pos)) {
            let cell = &mut self.cells[cell_index(self.width, pos)];
            if cell.is_none() || repaint {
                *cell = Some(chromosome.index);
            }
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Row-major ownership grid, `width * height` cells.
    pub fn grid(&self) -> &[Option<usize>] {
        &self.cells
    }

    /// Owner of `pos`, or `None` for empty and off-grid cells.
    pub fn owner_at(&self, pos: Point) -> Option<usize> {
        if !in_bounds(self.width, self.height, pos) {
            return None;
        }
        self.cells[cell_index(self.width, pos)]
    }

    pub fn placed(&self) -> &[RoomChromosome] {
        &self.placed
    }

    pub fn placed_room(&self, index: usize) -> Option<&RoomChromosome> {
        self.placed.iter().find(|placed| placed.index == index)
    }

    pub fn room_count(&self) -> usize {
        self.placed.len()
    }

    pub fn rooms_tiles(&self) -> BTreeMap<usize, Vec<Point>> {
        let mut tiles: BTreeMap<usize, Vec<Point>> = BTreeMap::new();
        for pos in all_points(self.width, self.height) {
            if let Some(owner) = self.owner_at(pos) {
                tiles.entry(owner).or_default().push(pos);
            }
        }
        tiles
    }

    pub fn rooms_area(&self) -> BTreeMap<usize, usize> {
        self.rooms_tiles().into_iter().map(|(room, tiles)| (room, tiles.len())).collect()
    }

    pub fn building_area(&self) -> usize {
        self.rooms_area().values().sum()
    }

    pub fn rooms_centers(&self) -> BTreeMap<usize, Centroid> {
        self.rooms_tiles()
            .into_iter()
            .filter_map(|(room, tiles)| Centroid::of_tiles(&tiles).map(|center| (room, center)))
            .collect()
    }

    /// Empty cells that see an owned cell in each of the four axis directions.
    /// Every scan runs to the grid edge, so owners on row 0 and column 0 count.
    pub fn holes(&self) -> Vec<Point> {
        all_points(self.width, self.height).filter(|&pos| self.is_hole(pos)).collect()
    }

    fn is_hole(&self, pos: Point) -> bool {
        if self.owner_at(pos).is_some() {
            return false;
        }
        [(-1, 0), (1, 0), (0, -1), (0, 1)].into_iter().all(|(dx, dy)| {
            let mut cursor = Point { x: pos.x + dx, y: pos.y + dy };
            while in_bounds(self.width, self.height, cursor) {
                if self.owner_at(cursor).is_some() {
                    return true;
                }
                cursor = Point { x: cursor.x + dx, y: cursor.y + dy };
            }
            false
        })
    }

    /// Owned cells isolated along exactly one axis.
    pub fn narrow_corridors(&self) -> Vec<Point> {
        self.owned_points()
            .filter(|&pos| self.isolated_along(pos, 1, 0) != self.isolated_along(pos, 0, 1))
            .collect()
    }

    /// Owned cells isolated along both axes.
    pub fn tiny_corridors(&self) -> Vec<Point> {
        self.owned_points()
            .filter(|&pos| self.isolated_along(pos, 1, 0) && self.isolated_along(pos, 0, 1))
            .collect()
    }

    // Off-grid neighbours read as empty, which always differs from an owned cell.
    fn isolated_along(&self, pos: Point, dx: i32, dy: i32) -> bool {
        let owner = self.owner_at(pos);
        self.owner_at(Point { x: pos.x - dx, y: pos.y - dy }) != owner
            && self.owner_at(Point { x: pos.x + dx, y: pos.y + dy }) != owner
    }

    fn owned_points(&self) -> impl Iterator<Item = Point> + '_ {
        all_points(self.width, self.height).filter(|&pos| self.owner_at(pos).is_some())
    }

    /// Room owning the owned cell closest to `anchor`, ties broken by lowest `(y, x)`.
    pub fn nearest_room(&self, anchor: Point) -> Option<usize> {
        let mut best: Option<(u32, Point, usize)> = None;
        for pos in self.owned_points() {
            let distance = pos.manhattan(anchor);
            let should_replace = match best {
                None => true,
                Some((best_distance, best_pos, _)) => {
                    (distance, pos.y, pos.x) < (best_distance, best_pos.y, best_pos.x)
                }
            };
            if should_replace && let Some(owner) = self.owner_at(pos) {
                best = Some((distance, pos, owner));
            }
        }
        best.map(|(_, _, owner)| owner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::types::Rect;

    fn room(
        index: usize,
        rect: Rect,
        layering: Layering,
        links: &[usize],
        len: usize,
    ) -> RoomChromosome {
        let mut connected = vec![false; len];
        for &link in links {
            connected[link] = true;
        }
        RoomChromosome { index, rect, layering, connected }
    }

    #[test]
    fn separated_rooms_are_both_placed_and_grid_matches_dimensions() {
        let gene = vec![
            room(0, Rect { x: 1, y: 1, w: 3, h: 3 }, Layering::Under, &[1], 2),
            room(1, Rect { x: 6, y: 6, w: 3, h: 3 }, Layering::Under, &[0], 2),
        ];
        let room_map = RoomMap::new(10, 10, &gene);

        assert_eq!(room_map.room_count(), 2);
        assert_eq!(room_map.grid().len(), 100);
        assert_eq!(room_map.building_area(), 18);
        assert!(room_map.grid().iter().flatten().all(|&owner| owner < 2));
    }

    #[test]
    fn crossing_room_is_rejected_regardless_of_links() {
        let gene = vec![
            room(0, Rect { x: 0, y: 4, w: 10, h: 2 }, Layering::Under, &[], 2),
            room(1, Rect { x: 4, y: 0, w: 2, h: 10 }, Layering::Over, &[], 2),
        ];
        let room_map = RoomMap::new(10, 10, &gene);

        assert_eq!(room_map.room_count(), 1);
        assert_eq!(room_map.owner_at(Point { x: 4, y: 0 }), None);
    }

    #[test]
    fn crossing_room_is_rejected_when_placed_second_over() {
        let gene = vec![
            room(0, Rect { x: 4, y: 0, w: 2, h: 10 }, Layering::Under, &[], 2),
            room(1, Rect { x: 0, y: 4, w: 10, h: 2 }, Layering::Over, &[], 2),
        ];
        let room_map = RoomMap::new(10, 10, &gene);

        assert_eq!(room_map.room_count(), 1);
        assert_eq!(room_map.owner_at(Point { x: 0, y: 4 }), None);
        assert_eq!(room_map.owner_at(Point { x: 4, y: 4 }), Some(0));
    }

    #[test]
    fn overlap_with_mutually_linked_room_is_rejected() {
        let gene = vec![
            room(0, Rect { x: 0, y: 0, w: 4, h: 4 }, Layering::Under, &[1], 2),
            room(1, Rect { x: 2, y: 2, w: 4, h: 4 }, Layering::Over, &[0], 2),
        ];
        let room_map = RoomMap::new(8, 8, &gene);

        assert_eq!(room_map.room_count(), 1);
        assert_eq!(room_map.owner_at(Point { x: 3, y: 3 }), Some(0));
    }

    #[test]
    fn one_sided_link_does_not_block_overlap() {
        let gene = vec![
            room(0, Rect { x: 0, y: 0, w: 4, h: 4 }, Layering::Under, &[], 2),
            room(1, Rect { x: 2, y: 2, w: 4, h: 4 }, Layering::Under, &[0], 2),
        ];
        let room_map = RoomMap::new(8, 8, &gene);

        assert_eq!(room_map.room_count(), 2);
        assert_eq!(room_map.owner_at(Point { x: 3, y: 3 }), Some(0), "under rooms keep old owners");
        assert_eq!(room_map.owner_at(Point { x: 5, y: 5 }), Some(1));
    }

    #[test]
    fn over_room_repaints_overlapped_cells() {
        let gene = vec![
            room(0, Rect { x: 0, y: 0, w: 4, h: 4 }, Layering::Under, &[], 2),
            room(1, Rect { x: 2, y: 2, w: 4, h: 4 }, Layering::Over, &[], 2),
        ];
        let room_map = RoomMap::new(8, 8, &gene);

        assert_eq!(room_map.owner_at(Point { x: 3, y: 3 }), Some(1));
        assert_eq!(room_map.rooms_area()[&0], 12);
        assert_eq!(room_map.rooms_area()[&1], 16);
    }

    #[test]
    fn fully_covered_room_needs_over_layering() {
        let outer = room(0, Rect { x: 0, y: 0, w: 8, h: 8 }, Layering::Under, &[], 2);
        let hidden_under = room(1, Rect { x: 2, y: 2, w: 3, h: 3 }, Layering::Under, &[], 2);
        let hidden_over = room(1, Rect { x: 2, y: 2, w: 3, h: 3 }, Layering::Over, &[], 2);

        let under_map = RoomMap::new(8, 8, &[outer.clone(), hidden_under]);
        assert_eq!(under_map.room_count(), 1);

        let over_map = RoomMap::new(8, 8, &[outer, hidden_over]);
        assert_eq!(over_map.room_count(), 2);
        assert_eq!(over_map.owner_at(Point { x: 3, y: 3 }), Some(1));
        assert_eq!(over_map.rooms_area()[&0], 64 - 9);
    }

    #[test]
    fn framed_empty_cells_are_holes() {
        let gene = vec![
            room(0, Rect { x: 0, y: 0, w: 5, h: 1 }, Layering::Under, &[], 4),
            room(1, Rect { x: 0, y: 4, w: 5, h: 1 }, Layering::Under, &[], 4),
            room(2, Rect { x: 0, y: 1, w: 1, h: 3 }, Layering::Under, &[], 4),
            room(3, Rect { x: 4, y: 1, w: 1, h: 3 }, Layering::Under, &[], 4),
        ];
        let room_map = RoomMap::new(5, 5, &gene);

        assert_eq!(room_map.room_count(), 4);
        let holes: BTreeSet<Point> = room_map.holes().into_iter().collect();
        assert_eq!(holes.len(), 9);
        assert!(holes.contains(&Point { x: 2, y: 2 }));
    }

    #[test]
    fn holes_see_rooms_on_row_and_column_zero() {
        let gene = vec![
            room(0, Rect { x: 1, y: 0, w: 1, h: 1 }, Layering::Under, &[], 4),
            room(1, Rect { x: 0, y: 1, w: 1, h: 1 }, Layering::Under, &[], 4),
            room(2, Rect { x: 2, y: 1, w: 1, h: 1 }, Layering::Under, &[], 4),
            room(3, Rect { x: 1, y: 2, w: 1, h: 1 }, Layering::Under, &[], 4),
        ];
        let room_map = RoomMap::new(3, 3, &gene);

        assert_eq!(room_map.room_count(), 4);
        assert_eq!(room_map.holes(), vec![Point { x: 1, y: 1 }]);
    }

    #[test]
    fn open_sided_empty_cells_are_not_holes() {
        let gene = vec![room(0, Rect { x: 0, y: 0, w: 3, h: 1 }, Layering::Under, &[], 1)];
        let room_map = RoomMap::new(3, 3, &gene);
        assert!(room_map.holes().is_empty());
    }

    #[test]
    fn single_width_room_is_a_narrow_corridor() {
        let gene = vec![room(0, Rect { x: 2, y: 0, w: 1, h: 3 }, Layering::Under, &[], 1)];
        let room_map = RoomMap::new(5, 3, &gene);

        assert_eq!(room_map.narrow_corridors().len(), 3);
        assert!(room_map.tiny_corridors().is_empty());
    }

    #[test]
    fn single_cell_room_is_a_tiny_corridor() {
        let gene = vec![room(0, Rect { x: 2, y: 1, w: 1, h: 1 }, Layering::Under, &[], 1)];
        let room_map = RoomMap::new(5, 3, &gene);

        assert_eq!(room_map.tiny_corridors(), vec![Point { x: 2, y: 1 }]);
        assert!(room_map.narrow_corridors().is_empty());
    }

    #[test]
    fn wide_room_interior_is_not_a_corridor() {
        let gene = vec![room(0, Rect { x: 0, y: 0, w: 4, h: 4 }, Layering::Under, &[], 1)];
        let room_map = RoomMap::new(6, 6, &gene);
        assert!(room_map.narrow_corridors().is_empty());
        assert!(room_map.tiny_corridors().is_empty());
    }

    #[test]
    fn nearest_room_prefers_closest_owned_tile() {
        let gene = vec![
            room(0, Rect { x: 0, y: 0, w: 3, h: 3 }, Layering::Under, &[], 2),
            room(1, Rect { x: 6, y: 6, w: 3, h: 3 }, Layering::Under, &[], 2),
        ];
        let room_map = RoomMap::new(10, 10, &gene);

        assert_eq!(room_map.nearest_room(Point { x: 9, y: 12 }), Some(1));
        assert_eq!(room_map.nearest_room(Point { x: 0, y: 0 }), Some(0));
        assert_eq!(RoomMap::new(4, 4, &[]).nearest_room(Point { x: 1, y: 1 }), None);
    }

    #[test]
    fn centers_follow_room_tiles() {
        let gene = vec![room(0, Rect { x: 2, y: 2, w: 2, h: 2 }, Layering::Under, &[], 1)];
        let centers = RoomMap::new(6, 6, &gene).rooms_centers();
        assert_eq!(centers[&0], Centroid { x: 3.0, y: 3.0 });
    }
}
