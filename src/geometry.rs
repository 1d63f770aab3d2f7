//! Coordinate geometry on plain `[f64; 3]` points: distances, angles,
//! dihedrals, signed volumes and out-of-plane distances.
//!
//! 2D positions are lifted with [`lift_2d`] so every routine works for
//! both depiction and 3D coordinates.

pub type Point3 = [f64; 3];

pub fn lift_2d(p: [f64; 2]) -> Point3 {
    [p[0], p[1], 0.0]
}

pub fn sub(a: &Point3, b: &Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn add(a: &Point3, b: &Point3) -> Point3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn scale(a: &Point3, f: f64) -> Point3 {
    [a[0] * f, a[1] * f, a[2] * f]
}

pub fn dot(a: &Point3, b: &Point3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: &Point3, b: &Point3) -> Point3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn norm(a: &Point3) -> f64 {
    dot(a, a).sqrt()
}

/// Unit vector along `a`, or `None` for (near) zero vectors.
pub fn normalize(a: &Point3) -> Option<Point3> {
    let len = norm(a);
    if len < 1e-8 {
        None
    } else {
        Some(scale(a, 1.0 / len))
    }
}

/// Euclidean distance between two points.
pub fn distance(a: &Point3, b: &Point3) -> f64 {
    norm(&sub(a, b))
}

/// Angle in degrees at `center`, or `None` if a leg has zero length.
pub fn bond_angle(a: &Point3, center: &Point3, b: &Point3) -> Option<f64> {
    let v1 = normalize(&sub(a, center))?;
    let v2 = normalize(&sub(b, center))?;
    Some(dot(&v1, &v2).clamp(-1.0, 1.0).acos().to_degrees())
}

/// Signed dihedral angle in degrees (-180, 180] of the chain `p1-p2-p3-p4`.
/// `None` if three consecutive points are collinear.
pub fn dihedral_angle(p1: &Point3, p2: &Point3, p3: &Point3, p4: &Point3) -> Option<f64> {
    let b1 = sub(p2, p1);
    let b2 = sub(p3, p2);
    let b3 = sub(p4, p3);

    let n1 = cross(&b1, &b2);
    let n2 = cross(&b2, &b3);
    if norm(&n1) < 1e-8 || norm(&n2) < 1e-8 {
        return None;
    }
    let m1 = cross(&n1, &normalize(&b2)?);

    let x = dot(&n1, &n2);
    let y = dot(&m1, &n2);

    Some((-y).atan2(x).to_degrees())
}

/// Six times the signed volume of the tetrahedron `a, b, c, d`:
/// `det(b - a, c - a, d - a)`.
pub fn signed_volume(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> f64 {
    let u = sub(b, a);
    let v = sub(c, a);
    let w = sub(d, a);
    dot(&u, &cross(&v, &w))
}

/// Distance of `p` from the plane through `a`, `b` and `c`, or `None` if
/// the three points are collinear.
pub fn plane_deviation(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> Option<f64> {
    let normal = normalize(&cross(&sub(b, a), &sub(c, a)))?;
    Some(dot(&sub(p, a), &normal).abs())
}

/// Signed side of `p` relative to the directed line `a -> b` in the xy
/// plane: positive on the left, negative on the right.
pub fn side_of_line(a: &Point3, b: &Point3, p: &Point3) -> f64 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}
