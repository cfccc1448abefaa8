use glam::Vec2;

/// Axis-aligned rectangle: top-left position plus a size that is never
/// negative. Mutations that would produce a negative extent clamp to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    position: Vec2,
    size: Vec2,
}

impl Rect {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size: size.max(Vec2::ZERO),
        }
    }

    pub fn from_components(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(width, height))
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size.max(Vec2::ZERO);
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.y >= self.top()
            && point.x <= self.right()
            && point.y <= self.bottom()
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Grows (or shrinks, for negative amounts) the rect by `amount` on every
    /// side. Shrinking past a degenerate extent clamps at zero size around
    /// the rect's center edge.
    pub fn inflated(&self, amount: f32) -> Rect {
        Rect::new(
            self.position - Vec2::splat(amount),
            self.size + Vec2::splat(2.0 * amount),
        )
    }

    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect::new(self.position + offset, self.size)
    }
}
