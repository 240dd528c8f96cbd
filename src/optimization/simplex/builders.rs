//! simplex::builders — Nelder–Mead construction helpers.
//!
//! Purpose
//! -------
//! Build the initial simplex around a starting point and wrap it in an
//! argmin [`NelderMead`](argmin::solver::neldermead::NelderMead) solver
//! configured from [`SimplexOptions`].
//!
//! Conventions
//! -----------
//! - Vertex 0 is the starting point itself; vertex `i + 1` moves coordinate
//!   `i` by `rel_step · θ_i`, or by `zero_step` when `θ_i == 0`.
//! - The builder does not set `max_iters`; that is a runtime concern applied
//!   by the runner.
use crate::optimization::{
    errors::OptResult,
    simplex::traits::SimplexOptions,
    types::{Simplex, Theta},
};

/// initial_simplex — `n + 1` vertices around `theta0`.
///
/// Parameters
/// ----------
/// - `theta0`: `&Theta`
///   Starting point; becomes the first vertex.
/// - `opts`: `&SimplexOptions`
///   Supplies `rel_step` and `zero_step`.
///
/// Returns
/// -------
/// `Vec<Theta>` of length `theta0.len() + 1`.
///
/// Panics
/// ------
/// - Never panics.
pub fn initial_simplex(theta0: &Theta, opts: &SimplexOptions) -> Vec<Theta> {
    let mut vertices = Vec::with_capacity(theta0.len() + 1);
    vertices.push(theta0.clone());
    for i in 0..theta0.len() {
        let mut vertex = theta0.clone();
        vertex[i] = if vertex[i] != 0.0 { vertex[i] * (1.0 + opts.rel_step) } else { opts.zero_step };
        vertices.push(vertex);
    }
    vertices
}

/// build_simplex_solver — Nelder–Mead over the initial simplex of `theta0`.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) when argmin rejects the
///   spread tolerance.
pub fn build_simplex_solver(theta0: &Theta, opts: &SimplexOptions) -> OptResult<Simplex> {
    let solver = Simplex::new(initial_simplex(theta0, opts)).with_sd_tolerance(opts.tol_spread)?;
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Check the vertex layout, including the zero-coordinate offset.
    //
    // Given
    // -----
    // - θ₀ = [2, 0, −4] and default options.
    //
    // Expect
    // ------
    // - vertices θ₀, [2.1, 0, −4], [2, 0.00025, −4], [2, 0, −4.2].
    fn initial_simplex_offsets_each_axis() {
        let theta0 = array![2.0, 0.0, -4.0];

        let v = initial_simplex(&theta0, &SimplexOptions::default());

        assert_eq!(v.len(), 4);
        assert_eq!(v[0], theta0);
        assert!((v[1][0] - 2.1).abs() < 1e-15);
        assert_eq!(v[2][1], 0.00025);
        assert!((v[3][2] + 4.2).abs() < 1e-15);
        assert_eq!(v[3][0], 2.0);
    }
}
