//! Numerically stable real roots of a·x² + b·x + c = 0.

/// Leading coefficients below this magnitude are treated as zero and the
/// equation is solved as linear.
pub const DEGENERATE_EPSILON: f32 = 1e-12;

/// Solve the quadratic equation for real roots.
///
/// Returns the roots ordered `x0 <= x1`, or `None` if there is no real root.
/// A degenerate (linear) equation returns its single root twice.
///
/// The root with the larger magnitude is computed first on the branch that
/// adds quantities of the same sign, and the other from the product relation
/// x0 · x1 = c / a, so neither suffers from cancellation.
pub fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a.abs() < DEGENERATE_EPSILON {
        if b == 0.0 {
            return None;
        }
        let x = -c / b;
        return x.is_finite().then_some((x, x));
    }

    // Evaluate the discriminant in f64; b² and 4ac are close for grazing rays
    let (a64, b64, c64) = (a as f64, b as f64, c as f64);
    let discriminant = b64 * b64 - 4.0 * a64 * c64;
    if discriminant < 0.0 || discriminant.is_nan() {
        return None;
    }

    let q = -0.5 * (b64 + b64.signum() * discriminant.sqrt());
    let (x0, x1) = if q == 0.0 {
        // b == 0 and c == 0: double root at the origin
        (0.0, 0.0)
    } else {
        ((q / a64) as f32, (c64 / q) as f32)
    };

    Some(if x0 <= x1 { (x0, x1) } else { (x1, x0) })
}
