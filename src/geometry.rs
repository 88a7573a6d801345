//! Geometry primitives shared by the builder and the query engines.
//!
//! Distances are compared through their squares wherever the square is a normal float. See
//! [`Distance`] for the ranges where squaring loses the order.

use std::cmp::Ordering;

use geo_traits::{CoordTrait, Dimensions, RectTrait};

use crate::r#type::IndexableNum;

/// An indexed point: a coordinate pair plus its insertion index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<N: IndexableNum> {
    /// The `x` coordinate.
    pub x: N,
    /// The `y` coordinate.
    pub y: N,
    /// The 0-based insertion index of this point.
    pub id: u32,
}

impl<N: IndexableNum> Point<N> {
    /// Create a new point with the given insertion index.
    pub fn new(x: N, y: N, id: u32) -> Self {
        Self { x, y, id }
    }
}

impl<N: IndexableNum> CoordTrait for Point<N> {
    type T = N;

    fn dim(&self) -> Dimensions {
        Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Invalid index of coord"),
        }
    }
}

/// A bare coordinate, used as the corners of a [`Rect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord<N: IndexableNum> {
    x: N,
    y: N,
}

impl<N: IndexableNum> CoordTrait for Coord<N> {
    type T = N;

    fn dim(&self) -> Dimensions {
        Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Invalid index of coord"),
        }
    }
}

/// An axis-aligned minimum bounding rectangle.
///
/// A rectangle produced by [`Rect::empty`] bounds nothing: its minimums are `+inf` and its
/// maximums are `-inf`, so that it is the identity of [`Rect::union`]. Every other rectangle
/// satisfies `min_x <= max_x` and `min_y <= max_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<N: IndexableNum> {
    pub min_x: N,
    pub min_y: N,
    pub max_x: N,
    pub max_y: N,
}

impl<N: IndexableNum> Rect<N> {
    pub fn new(min_x: N, min_y: N, max_x: N, max_y: N) -> Self {
        debug_assert!(min_x <= max_x && min_y <= max_y, "inverted rectangle");
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The rectangle that bounds nothing.
    pub fn empty() -> Self {
        Self {
            min_x: N::infinity(),
            min_y: N::infinity(),
            max_x: N::neg_infinity(),
            max_y: N::neg_infinity(),
        }
    }

    /// The degenerate rectangle of a single point.
    pub fn from_point(point: &Point<N>) -> Self {
        Self::new(point.x, point.y, point.x, point.y)
    }

    /// Returns `true` if this rectangle bounds nothing.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Grow this rectangle in place to include a point.
    #[inline]
    pub fn expand_to_point(&mut self, x: N, y: N) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Componentwise min of minimums and max of maximums.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Area of the rectangle. Zero for degenerate and empty rectangles.
    ///
    /// Bulk loading packs by sort order, so no cost heuristic calls this.
    pub fn area(&self) -> N {
        if self.is_empty() {
            return N::zero();
        }
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }

    /// The center of the rectangle, used as the sort key when packing nodes.
    ///
    /// Halves are taken before adding so that the center of a finite rectangle is finite.
    #[inline]
    pub fn center(&self) -> (N, N) {
        let two = N::one() + N::one();
        (
            self.min_x / two + self.max_x / two,
            self.min_y / two + self.max_y / two,
        )
    }

    /// Returns `true` if the point lies inside or on the boundary of this rectangle.
    #[inline]
    pub fn contains_point(&self, x: N, y: N) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Returns `true` if `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.is_empty()
            || (other.min_x >= self.min_x
                && other.min_y >= self.min_y
                && other.max_x <= self.max_x
                && other.max_y <= self.max_y)
    }
}

impl<N: IndexableNum> RectTrait for Rect<N> {
    type T = N;
    type CoordType<'a>
        = Coord<N>
    where
        Self: 'a;

    fn dim(&self) -> Dimensions {
        Dimensions::Xy
    }

    fn min(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.min_x,
            y: self.min_y,
        }
    }

    fn max(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.max_x,
            y: self.max_y,
        }
    }
}

/// Squared Euclidean distance between two coordinates.
#[inline]
pub fn distance_sq<N: IndexableNum>(ax: N, ay: N, bx: N, by: N) -> N {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

/// Minimum squared distance from a coordinate to any point on or inside a rectangle.
///
/// This is zero when the coordinate is inside the rectangle or on its boundary.
#[inline]
pub fn min_dist_sq<N: IndexableNum>(x: N, y: N, rect: &Rect<N>) -> N {
    let dx = axis_dist(x, rect.min_x, rect.max_x);
    let dy = axis_dist(y, rect.min_y, rect.max_y);
    dx * dx + dy * dy
}

/// 1D distance from a value to a range.
#[inline]
pub(crate) fn axis_dist<N: IndexableNum>(k: N, min: N, max: N) -> N {
    if k < min {
        min - k
    } else if k <= max {
        N::zero()
    } else {
        k - max
    }
}

/// A Euclidean distance with a total order that holds across the whole float range.
///
/// Squares of finite coordinates overflow to infinity far below the largest finite value, and
/// underflow to zero or a subnormal far above the smallest one. Distinct distances then collapse
/// onto the same square. Distances are therefore ranked first by the class of their square
/// (subnormal or zero, normal, infinite). Inside the normal class the squares are compared.
/// Inside the other two the distance itself is compared, computed with `hypot`.
#[derive(Debug, Clone, Copy)]
pub struct Distance<N: IndexableNum> {
    squared: N,
    /// `hypot` of the offsets, only computed when `squared` is not a normal float.
    exact: N,
}

impl<N: IndexableNum> Distance<N> {
    #[inline]
    fn from_squared(squared: N, exact: impl FnOnce() -> N) -> Self {
        let exact = if squared.is_normal() {
            N::zero()
        } else {
            exact()
        };
        Self { squared, exact }
    }

    /// Distance between two coordinates.
    #[inline]
    pub fn between(ax: N, ay: N, bx: N, by: N) -> Self {
        Self::from_squared(distance_sq(ax, ay, bx, by), || (ax - bx).hypot(ay - by))
    }

    /// Minimum distance from a coordinate to any point on or inside a rectangle.
    #[inline]
    pub fn to_rect(x: N, y: N, rect: &Rect<N>) -> Self {
        Self::from_squared(min_dist_sq(x, y, rect), || {
            axis_dist(x, rect.min_x, rect.max_x).hypot(axis_dist(y, rect.min_y, rect.max_y))
        })
    }

    /// A non-negative radius, as a distance to compare against.
    #[inline]
    pub fn from_radius(radius: N) -> Self {
        debug_assert!(radius >= N::zero());
        Self::from_squared(radius * radius, || radius)
    }

    /// The squared distance. May be infinite or zero for finite, non-zero distances.
    pub fn squared(&self) -> N {
        self.squared
    }

    /// The Euclidean distance.
    pub fn value(&self) -> N {
        if self.squared.is_normal() {
            self.squared.sqrt()
        } else {
            self.exact
        }
    }

    #[inline]
    fn class(&self) -> u8 {
        if self.squared.is_normal() {
            1
        } else if self.squared.is_infinite() {
            2
        } else {
            0
        }
    }
}

impl<N: IndexableNum> PartialEq for Distance<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: IndexableNum> Eq for Distance<N> {}

impl<N: IndexableNum> Ord for Distance<N> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        let class = self.class();
        class.cmp(&other.class()).then_with(|| {
            // coordinates are validated to be finite, so neither value is NaN
            let (a, b) = if class == 1 {
                (self.squared, other.squared)
            } else {
                (self.exact, other.exact)
            };
            a.partial_cmp(&b).expect("distances are never NaN")
        })
    }
}

impl<N: IndexableNum> PartialOrd for Distance<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
