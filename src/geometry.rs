//! Grid geometry shared by the domain decomposition
//!
//! Coordinates are integer grid indices. `x` grows from the LEFT side towards the
//! RIGHT side and `y` grows from the TOP side towards the BOTTOM side, so a
//! rectangle spans `top_left..top_left + size` on both axes.

use std::fmt;
use std::ops::{Add, Range, Sub};

/// Integer grid position or extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Point {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Point in the simulation plane (`z = 0`)
    pub fn xy(x: i64, y: i64) -> Self {
        Self { x, y, z: 0 }
    }

    /// Component along a planar axis
    pub fn get(&self, axis: Axis) -> i64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Axis along which a derivative or attenuation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// The two sides bounding a domain along this axis, lower index first
    pub fn sides(self) -> (Direction, Direction) {
        match self {
            Axis::X => (Direction::Left, Direction::Right),
            Axis::Y => (Direction::Top, Direction::Bottom),
        }
    }
}

/// Side of a domain on which a neighbour lies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    pub fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Top => 2,
            Direction::Bottom => 3,
        }
    }

    /// Axis normal to the shared edge
    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::X,
            Direction::Top | Direction::Bottom => Axis::Y,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
        }
    }

    /// True for the side with the smaller grid indices (LEFT, TOP)
    pub fn is_lower(self) -> bool {
        matches!(self, Direction::Left | Direction::Top)
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Top => "top",
            Direction::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Axis-aligned rectangle of grid cells, `[top_left, top_left + size)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub top_left: Point,
    pub size: Point,
}

impl Rect {
    pub fn new(top_left: Point, size: Point) -> Self {
        Self { top_left, size }
    }

    pub fn bottom_right(&self) -> Point {
        self.top_left + self.size
    }

    /// Half-open cell range along an axis
    pub fn extent(&self, axis: Axis) -> Range<i64> {
        self.top_left.get(axis)..self.bottom_right().get(axis)
    }

    /// True if the interiors share at least one cell
    pub fn overlaps(&self, other: &Rect) -> bool {
        Axis::ALL
            .iter()
            .all(|&axis| !intersect(&self.extent(axis), &other.extent(axis)).is_empty())
    }

    /// Side of `self` on which `other` touches it, with the shared edge range
    ///
    /// Rectangles touching only at a corner are not neighbours.
    pub fn contact(&self, other: &Rect) -> Option<(Direction, Range<i64>)> {
        for direction in Direction::ALL {
            let axis = direction.axis();
            let (own_edge, other_edge) = if direction.is_lower() {
                (self.top_left.get(axis), other.bottom_right().get(axis))
            } else {
                (self.bottom_right().get(axis), other.top_left.get(axis))
            };
            if own_edge != other_edge {
                continue;
            }
            let orth = axis.orthogonal();
            let shared = intersect(&self.extent(orth), &other.extent(orth));
            if !shared.is_empty() {
                return Some((direction, shared));
            }
        }
        None
    }
}

/// Intersection of two half-open ranges (empty range when disjoint)
pub fn intersect(a: &Range<i64>, b: &Range<i64>) -> Range<i64> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    if start < end {
        start..end
    } else {
        start..start
    }
}

/// Parts of `base` not covered by any of `covered`, in ascending order
pub fn subtract_ranges(base: &Range<i64>, covered: &[Range<i64>]) -> Vec<Range<i64>> {
    let mut pieces: Vec<Range<i64>> = covered
        .iter()
        .map(|r| intersect(base, r))
        .filter(|r| !r.is_empty())
        .collect();
    pieces.sort_by_key(|r| r.start);

    let mut vacant = Vec::new();
    let mut cursor = base.start;
    for piece in pieces {
        if piece.start > cursor {
            vacant.push(cursor..piece.start);
        }
        cursor = cursor.max(piece.end);
    }
    if cursor < base.end {
        vacant.push(cursor..base.end);
    }
    vacant
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::xy(3, 4);
        let b = Point::new(1, 2, 0);
        assert_eq!(a + b, Point::xy(4, 6));
        assert_eq!(a - b, Point::xy(2, 2));
        assert_eq!(a.get(Axis::X), 3);
        assert_eq!(a.get(Axis::Y), 4);
    }

    #[test]
    fn test_direction_relations() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(direction.axis(), direction.opposite().axis());
            assert_ne!(direction.is_lower(), direction.opposite().is_lower());
        }
        assert_eq!(Axis::X.sides(), (Direction::Left, Direction::Right));
        assert_eq!(Axis::Y.sides(), (Direction::Top, Direction::Bottom));
    }

    #[test]
    fn test_intersect() {
        assert_eq!(intersect(&(0..10), &(5..20)), 5..10);
        assert!(intersect(&(0..5), &(5..10)).is_empty());
        assert!(intersect(&(0..5), &(7..10)).is_empty());
    }

    #[test]
    fn test_subtract_ranges() {
        assert_eq!(subtract_ranges(&(0..10), &[]), vec![0..10]);
        assert_eq!(subtract_ranges(&(0..10), &[2..4, 6..8]), vec![0..2, 4..6, 8..10]);
        assert_eq!(subtract_ranges(&(0..10), &[-5..3, 3..15]), Vec::<Range<i64>>::new());
        assert_eq!(subtract_ranges(&(0..10), &[4..6, 2..5]), vec![0..2, 6..10]);
    }

    #[test]
    fn test_rect_contact() {
        let a = Rect::new(Point::xy(0, 0), Point::xy(10, 10));
        let right = Rect::new(Point::xy(10, 5), Point::xy(4, 10));
        let below = Rect::new(Point::xy(-3, 10), Point::xy(5, 2));
        let corner = Rect::new(Point::xy(10, 10), Point::xy(2, 2));

        assert_eq!(a.contact(&right), Some((Direction::Right, 5..10)));
        assert_eq!(right.contact(&a), Some((Direction::Left, 5..10)));
        assert_eq!(a.contact(&below), Some((Direction::Bottom, 0..2)));
        assert_eq!(below.contact(&a), Some((Direction::Top, 0..2)));
        assert_eq!(a.contact(&corner), None);
        assert!(!a.overlaps(&right));
        assert!(a.overlaps(&Rect::new(Point::xy(9, 9), Point::xy(3, 3))));
    }
}
