//! Small numeric helpers shared by the kinematic solvers.

/// Real roots of `a·x² + b·x + c = 0`, in ascending order.
///
/// Degenerates to the linear case when `a == 0`.  Returns an empty vector
/// when there is no real root (negative discriminant, or `a == b == 0`).
/// Uses the numerically stable form that avoids cancellation between `-b`
/// and the square root of the discriminant.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a == 0.0 {
        if b == 0.0 {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    if discriminant == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    // q != 0 because the discriminant is positive
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    let (r1, r2) = (q / a, c / q);
    if r1 <= r2 { vec![r1, r2] } else { vec![r2, r1] }
}

/// `true` if `a` and `b` differ by at most `eps`.
#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
