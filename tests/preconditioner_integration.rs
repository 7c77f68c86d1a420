//! Integration tests for preconditioners and solvers.
//!
//! Verifies that the Jacobi and Block-Jacobi preconditioners work with CG and GMRES
//! on small assembled matrices: convergence, solution accuracy, iteration savings
//! against the unpreconditioned solve, and progress reporting through a monitor.

use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use fesolve::config::{KspOptions, PcOptions};
use fesolve::context::{KspContext, PcContext, PcType, SolverType};
use fesolve::matrix::{SparseMatrix, SparseRowMatrix};
use fesolve::preconditioner::Preconditioner;

/// SPD tridiagonal matrix with a strongly varying diagonal, and `b` for x = [1, ..., 1].
fn spd_matrix(n: usize) -> (SparseRowMatrix, Vec<f64>) {
    let mut a = SparseRowMatrix::new(n);
    for i in 0..n {
        a.add(i, i, 2.0 + 10.0 * i as f64);
        if i > 0 {
            a.add(i, i - 1, -1.0);
            a.add(i - 1, i, -1.0);
        }
    }
    let mut b = vec![0.0; n];
    a.multiply(&vec![1.0; n], &mut b);
    (a, b)
}

/// Nonsymmetric tridiagonal matrix, and `b` for x = [1, ..., 1].
fn nonsym_matrix(n: usize) -> (SparseRowMatrix, Vec<f64>) {
    let mut a = SparseRowMatrix::new(n);
    for i in 0..n {
        a.add(i, i, 3.0 + i as f64);
        if i > 0 {
            a.add(i, i - 1, -1.5);
        }
        if i + 1 < n {
            a.add(i, i + 1, 0.5);
        }
    }
    let mut b = vec![0.0; n];
    a.multiply(&vec![1.0; n], &mut b);
    (a, b)
}

fn solve(kind: SolverType, pc: PcType, a: &SparseRowMatrix, b: &[f64]) -> (Vec<f64>, usize) {
    let mut x = vec![0.0; b.len()];
    let stats = KspContext::new()
        .with_type(kind)
        .with_pc(pc, 4)
        .with_restart(4)
        .with_tol(1e-12)
        .solve(a, b, &mut x)
        .unwrap();
    assert!(stats.converged, "{kind} with {pc} did not converge");
    (x, stats.iterations)
}

#[test]
fn every_preconditioner_solves_spd_with_cg() {
    let (a, b) = spd_matrix(16);
    for pc in [PcType::None, PcType::Jacobi, PcType::BlockJacobi] {
        let (x, _) = solve(SolverType::Cg, pc, &a, &b);
        for xi in x {
            assert_abs_diff_eq!(xi, 1.0, epsilon = 1e-8);
        }
    }
}

#[test]
fn every_preconditioner_solves_nonsymmetric_with_gmres() {
    let (a, b) = nonsym_matrix(16);
    for pc in [PcType::None, PcType::Jacobi, PcType::BlockJacobi] {
        let (x, _) = solve(SolverType::Gmres, pc, &a, &b);
        for xi in x {
            assert_abs_diff_eq!(xi, 1.0, epsilon = 1e-8);
        }
    }
}

#[test]
fn jacobi_saves_iterations_on_badly_scaled_diagonal() {
    let (a, b) = spd_matrix(40);
    let (_, plain) = solve(SolverType::Cg, PcType::None, &a, &b);
    let (_, jacobi) = solve(SolverType::Cg, PcType::Jacobi, &a, &b);
    assert!(jacobi <= plain, "jacobi {jacobi} vs none {plain}");
}

#[test]
fn full_width_block_jacobi_is_a_direct_solve() {
    let (a, b) = nonsym_matrix(8);
    let (x, iterations) = {
        let mut x = vec![0.0; 8];
        let stats = KspContext::new()
            .with_type(SolverType::Gmres)
            .with_pc(PcType::BlockJacobi, 8)
            .with_tol(1e-12)
            .solve(&a, &b, &mut x)
            .unwrap();
        (x, stats.iterations)
    };
    assert!(iterations <= 1);
    for xi in x {
        assert_abs_diff_eq!(xi, 1.0, epsilon = 1e-10);
    }
}

#[test]
fn block_width_shrinks_and_length_is_checked() {
    let (a, _) = spd_matrix(6);
    let pc = PcContext::new(PcType::BlockJacobi, 4).build(&a).unwrap();
    // width 4 does not divide 6, so blocks of 3 are used
    let mut z = vec![0.0; 6];
    let r = vec![1.0; 6];
    pc.apply(&r, &mut z).unwrap();
    assert!(z.iter().all(|zi| zi.is_finite() && *zi > 0.0));
    assert!(pc.apply(&r[..4], &mut z[..4]).is_err());
}

#[test]
fn monitor_sees_increasing_iterations() {
    let (a, b) = spd_matrix(30);
    let lines = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = Arc::clone(&lines);
    let opts = KspOptions {
        ksp_type: "cg".into(),
        pc: PcOptions { pc_type: "none".into(), block_width: 1 },
        tol: 1e-12,
        report_every: 2,
        ..Default::default()
    };
    let mut ksp = KspContext::from_options(&opts).unwrap().with_monitor(move |line| {
        sink.lock().unwrap().push(line.to_string());
    });
    let mut x = vec![0.0; 30];
    let stats = ksp.solve(&a, &b, &mut x).unwrap();
    assert!(stats.converged);

    let lines = lines.lock().unwrap();
    assert!(!lines.is_empty());
    let iterations: Vec<usize> = lines
        .iter()
        .map(|l| {
            assert!(l.starts_with("cg: iteration "), "{l}");
            l["cg: iteration ".len()..].split_whitespace().next().unwrap().parse().unwrap()
        })
        .collect();
    assert!(iterations.windows(2).all(|w| w[0] < w[1]));
    assert!(iterations.iter().all(|k| k % 2 == 0));
}
