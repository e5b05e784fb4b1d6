//! Affine transformation matrix.

use crate::Status;

/// Affine transformation `x' = xx*x + xy*y + x0`, `y' = yx*x + yy*y + y0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub const fn new(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Self {
        Self { xx, yx, xy, yy, x0, y0 }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn rotation(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Components in `xx, yx, xy, yy, x0, y0` order.
    pub fn to_array(self) -> [f64; 6] {
        [self.xx, self.yx, self.xy, self.yy, self.x0, self.y0]
    }

    pub fn from_array(v: [f64; 6]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5])
    }

    /// Transformation applying `a` first, then `b`.
    pub fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
        Matrix {
            xx: a.xx * b.xx + a.yx * b.xy,
            yx: a.xx * b.yx + a.yx * b.yy,
            xy: a.xy * b.xx + a.yy * b.xy,
            yy: a.xy * b.yx + a.yy * b.yy,
            x0: a.x0 * b.xx + a.y0 * b.xy + b.x0,
            y0: a.x0 * b.yx + a.y0 * b.yy + b.y0,
        }
    }

    /// Prepend a translation.
    pub fn translate(&mut self, tx: f64, ty: f64) {
        *self = Matrix::multiply(&Matrix::translation(tx, ty), self);
    }

    /// Prepend a scale.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        *self = Matrix::multiply(&Matrix::scaling(sx, sy), self);
    }

    /// Prepend a rotation.
    pub fn rotate(&mut self, radians: f64) {
        *self = Matrix::multiply(&Matrix::rotation(radians), self);
    }

    pub fn determinant(&self) -> f64 {
        self.xx * self.yy - self.yx * self.xy
    }

    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det != 0.0 && det.is_finite()
    }

    pub fn invert(&self) -> Result<Matrix, Status> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(Status::InvalidMatrix);
        }
        Ok(Matrix {
            xx: self.yy / det,
            yx: -self.yx / det,
            xy: -self.xy / det,
            yy: self.xx / det,
            x0: (self.xy * self.y0 - self.yy * self.x0) / det,
            y0: (self.yx * self.x0 - self.xx * self.y0) / det,
        })
    }

    pub fn transform_distance(&self, dx: f64, dy: f64) -> (f64, f64) {
        (self.xx * dx + self.xy * dy, self.yx * dx + self.yy * dy)
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let (dx, dy) = self.transform_distance(x, y);
        (dx + self.x0, dy + self.y0)
    }

    /// Length of the unit x and unit y vectors after transformation.
    pub(crate) fn scale_factors(&self) -> (f64, f64) {
        (self.xx.hypot(self.yx), self.xy.hypot(self.yy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_translate_then_scale_order() {
        let mut m = Matrix::identity();
        m.translate(10.0, 20.0);
        m.scale(2.0, 3.0);
        // User point is scaled first, then translated.
        assert!(close(m.transform_point(1.0, 1.0), (12.0, 23.0)));
    }

    #[test]
    fn test_invert() {
        let mut m = Matrix::identity();
        m.translate(5.0, -4.0);
        m.rotate(0.5);
        m.scale(2.0, 0.5);
        let inv = m.invert().unwrap();
        let (x, y) = m.transform_point(3.0, 7.0);
        assert!(close(inv.transform_point(x, y), (3.0, 7.0)));
    }

    #[test]
    fn test_singular_matrix() {
        let m = Matrix::scaling(0.0, 1.0);
        assert_eq!(m.invert(), Err(Status::InvalidMatrix));
        assert!(!m.is_invertible());
    }

    #[test]
    fn test_distance_ignores_translation() {
        let m = Matrix::translation(100.0, 100.0);
        assert_eq!(m.transform_distance(1.0, 2.0), (1.0, 2.0));
    }
}
