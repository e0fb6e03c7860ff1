/*!

  Integer geometry shared by pins, element bodies and compound bounds.

*/

/// A point (or an offset between two points) in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct Point {
    /// Horizontal coordinate, growing to the right
    pub x: i32,
    /// Vertical coordinate, growing downwards
    pub y: i32,
}

impl Point {
    /// Creates a new point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`, saturating at [i64::MAX]
    pub fn distance_sq(&self, other: Point) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle. Containment is half-open: the right and bottom
/// edges are outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct Rect {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and extent
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Creates a rectangle from its four edges
    pub fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// A zero-sized rectangle anchored at `at`
    pub fn degenerate(at: Point) -> Self {
        Self::new(at.x, at.y, 0, 0)
    }

    /// Returns the left edge
    pub fn left(&self) -> i32 {
        self.left
    }

    /// Returns the top edge
    pub fn top(&self) -> i32 {
        self.top
    }

    /// Returns the right edge (exclusive)
    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Returns the bottom edge (exclusive)
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Returns the width
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Returns the height
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns the top-left corner
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Returns `true` if the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns `true` if `p` lies inside the rectangle
    pub fn contains(&self, p: Point) -> bool {
        self.left <= p.x && p.x < self.right() && self.top <= p.y && p.y < self.bottom()
    }

    /// The smallest rectangle covering both `self` and `other`
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_ltrb(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// The union of all rectangles in `rects`, or [None] when there are none
    pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects.into_iter().fold(None, |acc, r| match acc {
            None => Some(*r),
            Some(u) => Some(u.union(r)),
        })
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.left,
            self.top,
            self.right(),
            self.bottom()
        )
    }
}
