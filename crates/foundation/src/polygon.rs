//! Point-in-polygon classification for image-map hit testing.

use crate::math::Vec2;

/// Result of classifying a point against a polygon.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Outside,
    /// The point lies on an edge or vertex.
    Boundary,
}

impl Containment {
    /// Boundary points count as hits.
    pub fn is_hit(self) -> bool {
        !matches!(self, Containment::Outside)
    }
}

/// Crossing-number test with explicit boundary detection.
///
/// Edges (including horizontal ones) and vertices are checked for incidence
/// first, so a point on the outline is always [`Containment::Boundary`]. The
/// remaining crossing test uses the half-open rule `(a.y > p.y) != (b.y > p.y)`
/// so a ray passing through a vertex is counted exactly once.
///
/// Polygons with fewer than three vertices contain nothing, but their
/// segments still report boundary hits.
pub fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> Containment {
    let n = polygon.len();
    if n == 0 {
        return Containment::Outside;
    }
    if n == 1 {
        return if polygon[0] == p {
            Containment::Boundary
        } else {
            Containment::Outside
        };
    }

    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if on_segment(p, a, b) {
            return Containment::Boundary;
        }
    }

    if n < 3 {
        return Containment::Outside;
    }

    let mut inside = false;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }

    if inside {
        Containment::Inside
    } else {
        Containment::Outside
    }
}

/// Builds a polygon from a flat `[x0, y0, x1, y1, ...]` coordinate list.
///
/// A trailing odd coordinate is ignored.
pub fn polygon_from_flat(coords: &[f64]) -> Vec<Vec2> {
    coords
        .chunks_exact(2)
        .map(|pair| Vec2::new(pair[0], pair[1]))
        .collect()
}

fn on_segment(p: Vec2, a: Vec2, b: Vec2) -> bool {
    let ab = b - a;
    let ap = p - a;
    if ab.cross(ap) != 0.0 {
        return false;
    }
    let min_x = a.x.min(b.x);
    let max_x = a.x.max(b.x);
    let min_y = a.y.min(b.y);
    let max_y = a.y.max(b.y);
    p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y
}

#[cfg(test)]
mod tests {
    use super::{Containment, point_in_polygon, polygon_from_flat};
    use crate::math::Vec2;

    fn square() -> Vec<Vec2> {
        polygon_from_flat(&[0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0])
    }

    #[test]
    fn strict_interior_is_inside() {
        let sq = square();
        for y in 1..10 {
            for x in 1..10 {
                let p = Vec2::new(x as f64, y as f64);
                assert_eq!(point_in_polygon(p, &sq), Containment::Inside, "{p:?}");
            }
        }
    }

    #[test]
    fn edges_and_vertices_are_boundary() {
        let sq = square();
        let outline = [
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (5.0, 0.0),
            (10.0, 5.0),
            (5.0, 10.0),
            (0.0, 5.0),
        ];
        for (x, y) in outline {
            assert_eq!(
                point_in_polygon(Vec2::new(x, y), &sq),
                Containment::Boundary,
                "({x}, {y})"
            );
        }
    }

    #[test]
    fn exterior_points_are_outside() {
        let sq = square();
        for (x, y) in [(-1.0, 5.0), (11.0, 5.0), (5.0, -0.5), (5.0, 10.5), (20.0, 0.0)] {
            assert_eq!(point_in_polygon(Vec2::new(x, y), &sq), Containment::Outside);
        }
    }

    #[test]
    fn ray_through_vertex_counts_once() {
        // The apex (10, 5) sits at the test point's height.
        let tri = polygon_from_flat(&[0.0, 0.0, 10.0, 5.0, 0.0, 10.0]);
        assert_eq!(point_in_polygon(Vec2::new(2.0, 5.0), &tri), Containment::Inside);
        assert_eq!(point_in_polygon(Vec2::new(-2.0, 5.0), &tri), Containment::Outside);
        assert_eq!(point_in_polygon(Vec2::new(12.0, 5.0), &tri), Containment::Outside);
    }

    #[test]
    fn concave_polygon_notch_is_outside() {
        // U shape open at the top.
        let u = polygon_from_flat(&[
            0.0, 0.0, 3.0, 0.0, 3.0, 7.0, 7.0, 7.0, 7.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0,
        ]);
        assert_eq!(point_in_polygon(Vec2::new(5.0, 3.0), &u), Containment::Outside);
        assert_eq!(point_in_polygon(Vec2::new(1.0, 3.0), &u), Containment::Inside);
        assert_eq!(point_in_polygon(Vec2::new(5.0, 7.0), &u), Containment::Boundary);
    }

    #[test]
    fn degenerate_polygons() {
        assert_eq!(point_in_polygon(Vec2::new(0.0, 0.0), &[]), Containment::Outside);
        let seg = polygon_from_flat(&[0.0, 0.0, 4.0, 4.0]);
        assert_eq!(point_in_polygon(Vec2::new(2.0, 2.0), &seg), Containment::Boundary);
        assert_eq!(point_in_polygon(Vec2::new(2.0, 3.0), &seg), Containment::Outside);
    }

    #[test]
    fn boundary_counts_as_hit() {
        assert!(Containment::Boundary.is_hit());
        assert!(Containment::Inside.is_hit());
        assert!(!Containment::Outside.is_hit());
    }
}
