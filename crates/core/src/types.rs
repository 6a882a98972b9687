use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn manhattan(self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Axis-aligned rectangle covering the cells `x..x + w` by `y..y + h`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn right(self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(self) -> i32 {
        self.y + self.h
    }

    /// True when the two rectangles form a cross: `self` sits strictly inside
    /// `other` along one axis while spanning all of `other` along the other
    /// axis. This is not a general intersection test.
    pub fn crosses(self, other: Rect) -> bool {
        (other.x < self.x
            && self.right() < other.right()
            && self.y <= other.y
            && other.bottom() <= self.bottom())
            || (other.x <= self.x
                && self.right() <= other.right()
                && self.y < other.y
                && other.bottom() < self.bottom())
    }

    pub fn cells(self) -> impl Iterator<Item = Point> {
        (self.y..self.bottom())
            .flat_map(move |y| (self.x..self.right()).map(move |x| Point { x, y }))
    }
}

/// Mean position of a room's tiles, shifted to the middle of the cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    pub fn of_tiles(tiles: &[Point]) -> Option<Centroid> {
        if tiles.is_empty() {
            return None;
        }
        let count = tiles.len() as f64;
        let (sum_x, sum_y) = tiles.iter().fold((0_i64, 0_i64), |(sx, sy), tile| {
            (sx + i64::from(tile.x), sy + i64::from(tile.y))
        });
        Some(Centroid { x: sum_x as f64 / count + 0.5, y: sum_y as f64 / count + 0.5 })
    }

    pub fn manhattan(self, other: Centroid) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Paint precedence of a room over cells that are already owned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layering {
    Over,
    Under,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Kitchen,
    Bathroom,
    Storage,
    Hall,
    Corridor,
}

impl RoomType {
    pub const ALL: [RoomType; 5] = [
        RoomType::Kitchen,
        RoomType::Bathroom,
        RoomType::Storage,
        RoomType::Hall,
        RoomType::Corridor,
    ];
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomType::Kitchen => "kitchen",
            RoomType::Bathroom => "bathroom",
            RoomType::Storage => "storage",
            RoomType::Hall => "hall",
            RoomType::Corridor => "corridor",
        };
        f.pad(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    Brute,
    Hound,
    Dodger,
    MeleeStatic,
    MeleePatrol,
    MeleeWander,
    SmgStatic,
    SmgPatrol,
    SmgWander,
    PistolStatic,
    PistolPatrol,
    PistolWander,
    ShotgunStatic,
    ShotgunPatrol,
    ShotgunWander,
}

impl HazardKind {
    pub const ALL: [HazardKind; 15] = [
        HazardKind::Brute,
        HazardKind::Hound,
        HazardKind::Dodger,
        HazardKind::MeleeStatic,
        HazardKind::MeleePatrol,
        HazardKind::MeleeWander,
        HazardKind::SmgStatic,
        HazardKind::SmgPatrol,
        HazardKind::SmgWander,
        HazardKind::PistolStatic,
        HazardKind::PistolPatrol,
        HazardKind::PistolWander,
        HazardKind::ShotgunStatic,
        HazardKind::ShotgunPatrol,
        HazardKind::ShotgunWander,
    ];

    /// Difficulty contributed by one hazard of this kind.
    pub fn weight(self) -> f64 {
        match self {
            HazardKind::Brute => 100.0,
            HazardKind::Hound => 40.0,
            HazardKind::Dodger => 80.0,
            HazardKind::MeleeStatic => 10.0,
            HazardKind::MeleePatrol | HazardKind::MeleeWander => 15.0,
            HazardKind::SmgStatic => 30.0,
            HazardKind::SmgPatrol | HazardKind::SmgWander => 35.0,
            HazardKind::PistolStatic => 20.0,
            HazardKind::PistolPatrol | HazardKind::PistolWander => 25.0,
            HazardKind::ShotgunStatic => 30.0,
            HazardKind::ShotgunPatrol | HazardKind::ShotgunWander => 35.0,
        }
    }
}
