use criterion::{black_box, Criterion, criterion_group, criterion_main};
use fesolve::context::{KspContext, PcType, SolverType};
use fesolve::matrix::{SparseMatrix, SparseRowMatrix};

fn laplacian(n: usize) -> SparseRowMatrix {
    let mut a = SparseRowMatrix::new(n);
    for i in 0..n {
        a.add(i, i, 2.0 + 1e-2);
        if i > 0 {
            a.add(i, i - 1, -1.0);
            a.add(i - 1, i, -1.0);
        }
    }
    a
}

fn bench_cg_vs_gmres(c: &mut Criterion) {
    let n = 400;
    let a = laplacian(n);
    let b: Vec<f64> = (0..n).map(|i| (i as f64 * 0.1).sin()).collect();

    for (name, kind, pc) in [
        ("cg jacobi", SolverType::Cg, PcType::Jacobi),
        ("cg block_jacobi", SolverType::Cg, PcType::BlockJacobi),
        ("gmres jacobi", SolverType::Gmres, PcType::Jacobi),
        ("gmres block_jacobi", SolverType::Gmres, PcType::BlockJacobi),
    ] {
        c.bench_function(name, |ben| {
            let mut ksp = KspContext::new().with_type(kind).with_pc(pc, 8).with_tol(1e-10);
            ben.iter(|| {
                let mut x = vec![0.0; n];
                let _stats = ksp.solve(black_box(&a), black_box(&b), &mut x).unwrap();
            })
        });
    }

    c.bench_function("spmv", |ben| {
        let mut y = vec![0.0; n];
        ben.iter(|| a.multiply(black_box(&b), &mut y))
    });
}

criterion_group!(benches, bench_cg_vs_gmres);
criterion_main!(benches);
