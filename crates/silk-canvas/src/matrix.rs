//! Affine Transforms
//!
//! 2x3 matrix mapping user space to device space, in the column layout of
//! the 2D context API: `[[a, c, e], [b, d, f], [0, 0, 1]]`. Every consumer
//! applies the transform at call time; recorded geometry freezes whatever
//! the matrix was when the shape was specified.

/// Affine transformation matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    /// The identity transform
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Create a matrix from its six scalars
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Identity matrix
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Pure translation matrix
    pub fn translation(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Pure scale matrix
    pub fn scaling(x: f64, y: f64) -> Self {
        Self::new(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    /// Pure rotation matrix, angle clockwise in radians (y axis points down)
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Matrix product `self ∘ other` (post-multiplication).
    ///
    /// Not commutative: transform-call semantics require the existing
    /// transform to stay outermost, so each new operation is multiplied on
    /// the right.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// `self ∘ translation(x, y)`
    pub fn translate(&self, x: f64, y: f64) -> Matrix {
        self.multiply(&Matrix::translation(x, y))
    }

    /// `self ∘ scaling(x, y)`
    pub fn scale(&self, x: f64, y: f64) -> Matrix {
        self.multiply(&Matrix::scaling(x, y))
    }

    /// `self ∘ rotation(angle)`
    pub fn rotate(&self, angle: f64) -> Matrix {
        self.multiply(&Matrix::rotation(angle))
    }

    /// Map a user-space point to device space
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// The scale component per axis: `(hypot(a, b), hypot(c, d))`
    pub fn scale_components(&self) -> (f64, f64) {
        (self.a.hypot(self.b), self.c.hypot(self.d))
    }

    /// The rotation component in radians: `atan2(b, a)`
    pub fn rotation_component(&self) -> f64 {
        self.b.atan2(self.a)
    }

    /// Render as an SVG `transform` attribute value
    pub fn to_svg_transform(&self) -> String {
        format!(
            "matrix({} {} {} {} {} {})",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
