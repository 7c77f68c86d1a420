use fesolve::context::{EigenContext, KspContext, SolverType};
use fesolve::eigen::EigenMethod;
use fesolve::matrix::{SparseMatrix, SparseRowMatrix};
use fesolve::parallel::init_thread_pool;

/// Stiffness and consistent mass of linear elements on (0, 1) with fixed ends.
fn bar(n: usize) -> (SparseRowMatrix, SparseRowMatrix) {
    let h = 1.0 / (n as f64 + 1.0);
    let mut k = SparseRowMatrix::new(n);
    let mut m = SparseRowMatrix::new(n);
    for i in 0..n {
        k.add(i, i, 2.0 / h);
        m.add(i, i, 4.0 * h / 6.0);
        if i > 0 {
            k.add(i, i - 1, -1.0 / h);
            k.add(i - 1, i, -1.0 / h);
            m.add(i, i - 1, h / 6.0);
            m.add(i - 1, i, h / 6.0);
        }
    }
    (k, m)
}

fn main() {
    let threads = init_thread_pool(None);
    let n = 40;
    let (k, m) = bar(n);
    println!("bar with {n} interior nodes, {threads} worker thread(s)");

    // static load: K u = f with a uniform unit load
    let f: Vec<f64> = {
        let mut f = vec![0.0; n];
        m.multiply(&vec![1.0; n], &mut f);
        f
    };
    let mut u = vec![0.0; n];
    let stats = KspContext::new().with_type(SolverType::Cg).with_tol(1e-12).solve(&k, &f, &mut u).unwrap();
    println!("static solve: {} iterations, mid-span deflection {:.6e}", stats.iterations, u[n / 2]);

    for method in [EigenMethod::Lanczos, EigenMethod::Arnoldi, EigenMethod::Rayleigh] {
        let sol = EigenContext::new(method).with_n_eig(8).solve(&m, &k).unwrap();
        let exact: Vec<f64> = (1..=sol.len()).map(|j| (j as f64 * std::f64::consts::PI).powi(2)).collect();
        println!("{method}: {:?}", sol.eigenvalues);
        println!("  continuum (jπ)²: {:?}", exact);
    }
}
