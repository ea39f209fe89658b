use glam::Vec2;

/// Axis-aligned rectangle in pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    /// Corners in drawing order: top-left, top-right, bottom-right, bottom-left.
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        let min = self.min();
        let max = self.max();
        [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let min = self.origin.min(self.origin + self.size);
        let max = self.origin.max(self.origin + self.size);
        Rect::from_origin_size(min, max - min)
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        p.x >= r.origin.x && p.y >= r.origin.y && p.x < r.max().x && p.y < r.max().y
    }

    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();

        let min = a.min().max(b.min());
        let max = a.max().min(b.max());
        let size = max - min;

        if size.x <= 0.0 || size.y <= 0.0 {
            None
        } else {
            Some(Rect::from_origin_size(min, size))
        }
    }

    /// Returns `true` if the segment `a..b` touches the rectangle.
    ///
    /// A segment fully inside counts as intersecting. Each of the four edges
    /// is tested once; the bottom edge runs from bottom-right to bottom-left.
    pub fn intersects_line(self, a: Vec2, b: Vec2) -> bool {
        if self.contains(a) || self.contains(b) {
            return true;
        }

        let [tl, tr, br, bl] = self.normalized().corners();
        segments_intersect(a, b, tl, tr)
            || segments_intersect(a, b, tr, br)
            || segments_intersect(a, b, br, bl)
            || segments_intersect(a, b, bl, tl)
    }
}

fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let r = p2 - p1;
    let s = q2 - q1;
    let denom = r.perp_dot(s);
    if denom == 0.0 {
        return false;
    }
    let t = (q1 - p1).perp_dot(s) / denom;
    let u = (q1 - p1).perp_dot(r) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(x, y, w, h)
    }

    #[test]
    fn normalized_negative_width() {
        let n = r(10.0, 0.0, -4.0, 5.0).normalized();
        assert_eq!(n.origin.x, 6.0);
        assert_eq!(n.size.x, 4.0);
    }

    #[test]
    fn normalized_negative_height() {
        let n = r(0.0, 10.0, 5.0, -3.0).normalized();
        assert_eq!(n.origin.y, 7.0);
        assert_eq!(n.size.y, 3.0);
    }

    #[test]
    fn contains_is_half_open() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Vec2::new(0.0, 0.0)));
        assert!(rect.contains(Vec2::new(5.0, 5.0)));
        assert!(!rect.contains(Vec2::new(10.0, 10.0)));
        assert!(!rect.contains(Vec2::new(-1.0, 5.0)));
    }

    #[test]
    fn intersect_overlapping() {
        let i = r(0.0, 0.0, 10.0, 10.0).intersect(r(5.0, 5.0, 10.0, 10.0));
        assert_eq!(i, Some(r(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn intersect_touching_edge_returns_none() {
        assert!(r(0.0, 0.0, 10.0, 10.0).intersect(r(10.0, 0.0, 10.0, 10.0)).is_none());
    }

    #[test]
    fn corners_run_clockwise_from_top_left() {
        let c = r(1.0, 2.0, 3.0, 4.0).corners();
        assert_eq!(c[0], Vec2::new(1.0, 2.0));
        assert_eq!(c[1], Vec2::new(4.0, 2.0));
        assert_eq!(c[2], Vec2::new(4.0, 6.0));
        assert_eq!(c[3], Vec2::new(1.0, 6.0));
    }

    #[test]
    fn line_clipping_bottom_right_corner() {
        // Crosses the bottom and right edges; both endpoints are outside.
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(rect.intersects_line(Vec2::new(-5.0, 12.0), Vec2::new(15.0, 8.0)));
    }

    #[test]
    fn line_touching_only_the_bottom_edge() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(rect.intersects_line(Vec2::new(5.0, 15.0), Vec2::new(5.0, 10.0)));
    }

    #[test]
    fn line_passing_through() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(rect.intersects_line(Vec2::new(-5.0, 5.0), Vec2::new(15.0, 5.0)));
        assert!(rect.intersects_line(Vec2::new(5.0, -5.0), Vec2::new(5.0, 15.0)));
    }

    #[test]
    fn line_missing_rect() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(!rect.intersects_line(Vec2::new(-5.0, -5.0), Vec2::new(-1.0, 20.0)));
        assert!(!rect.intersects_line(Vec2::new(0.0, 12.0), Vec2::new(10.0, 12.0)));
    }

    #[test]
    fn line_inside_rect() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(rect.intersects_line(Vec2::new(2.0, 2.0), Vec2::new(3.0, 3.0)));
    }
}
