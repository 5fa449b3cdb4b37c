//! Top-level synthesis driver.
//!
//! Pipeline: enumerate grid candidates for the rotated epsilon region at
//! `-theta/2`, solve the Diophantine equation `t t^adj = 1 - |u|^2` for each
//! candidate `u` of the level, build the exact unitary
//! `[[u, -t^adj], [t, u^adj]]` for every solvable pair, decompose each, and
//! keep the cheapest word. Both per-level passes are embarrassingly parallel
//! and run on the rayon pool; the winner is the minimum of
//! `(T-count, candidate index)`, so scheduling cannot change the output.

use log::debug;
use rayon::prelude::*;

use crate::decompose::UnitaryDecomposer;
use crate::diophantine::Diophantine;
use crate::gate::Gate;
use crate::grid::TwoDimGridSolver;
use crate::matrix::MCD2;
use crate::real::{real_from_bigint, real_from_i64, Real};
use crate::ring::{CD2, D2};
use num_bigint::BigInt;

/// `epsilon = 10^-digits`, exactly rounded once.
pub fn epsilon_from_digits(digits: u32) -> Real {
    real_from_i64(1) / real_from_bigint(&BigInt::from(10).pow(digits))
}

/// Shortest-T-count Clifford+T approximation of `Rz(theta)` within `epsilon`
/// in operator norm.
pub fn synthesize(theta: &Real, epsilon: &Real) -> Gate {
    let half = -theta.clone() / real_from_i64(2);
    let mut solver = TwoDimGridSolver::new(&half, epsilon);
    let diophantine = Diophantine::new();
    let decomposer = UnitaryDecomposer::new();

    solver.enumerate_all_solutions();
    let pairs: Vec<(CD2, CD2)> = loop {
        let candidates = solver.solutions();
        let found: Vec<(CD2, CD2)> = candidates
            .par_iter()
            .filter_map(|u| {
                let xi = D2::one() - (u.clone() * u.adj()).re().clone();
                diophantine.solve(&xi).map(|t| (u.clone(), t))
            })
            .collect();
        if !found.is_empty() {
            debug!(
                "level {}: {} of {} candidates are solvable",
                solver.level(),
                found.len(),
                candidates.len()
            );
            break found;
        }
        solver.enumerate_next_level();
    };

    let (_, _, best) = pairs
        .par_iter()
        .enumerate()
        .map(|(i, (u, t))| {
            let m = MCD2::new(u.clone(), -t.adj(), t.clone(), u.adj());
            let gate = decomposer.decompose(&m);
            debug!("candidate {}: T-count {}", i, gate.count_t());
            (gate.count_t(), i, gate)
        })
        .min_by_key(|(count, i, _)| (*count, *i))
        .expect("at least one candidate pair");
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::real::to_f64;

    #[test]
    fn test_epsilon_from_digits() {
        assert!((to_f64(&epsilon_from_digits(10)) - 1e-10).abs() < 1e-24);
        assert_eq!(to_f64(&epsilon_from_digits(0)), 1.0);
    }
}
