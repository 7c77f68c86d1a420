//! Convergence tracking & tolerance checks for iterative solvers.
//!
//! A `ConvergenceTracker` is created at the start of every solve and dropped at its
//! end; it owns the iteration counter and reporting cadence, so concurrent solves
//! never share counters.

/// Receives human-readable progress lines.
pub type ProgressSink = Box<dyn FnMut(&str) + Send>;

/// Stopping criteria.
#[derive(Clone, Copy, Debug)]
pub struct Convergence<T> {
    pub tol: T,
    pub max_iters: usize,
}

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
}

impl<T: Copy + num_traits::Float> Convergence<T> {
    /// Returns (should_stop, stats) given the current residual ratio and iteration `i`.
    pub fn check(&self, ratio: T, i: usize) -> (bool, SolveStats<T>) {
        let converged = ratio < self.tol;
        (
            converged || i >= self.max_iters,
            SolveStats {
                iterations: i,
                final_residual: ratio,
                converged,
            },
        )
    }
}

/// Per-solve iteration state and progress reporting.
pub struct ConvergenceTracker<'a> {
    label: &'static str,
    conv: Convergence<f64>,
    iteration: usize,
    residual: f64,
    report_every: usize,
    sink: Option<&'a mut ProgressSink>,
}

impl<'a> ConvergenceTracker<'a> {
    pub fn new(label: &'static str, conv: Convergence<f64>, report_every: usize) -> Self {
        Self {
            label,
            conv,
            iteration: 0,
            residual: f64::INFINITY,
            report_every,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Option<&'a mut ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn residual(&self) -> f64 {
        self.residual
    }

    pub fn threshold(&self) -> f64 {
        self.conv.tol
    }

    pub fn max_iters(&self) -> usize {
        self.conv.max_iters
    }

    /// True once the iteration cap has been reached.
    pub fn exhausted(&self) -> bool {
        self.iteration >= self.conv.max_iters
    }

    /// Record the residual ratio reached after `iteration` iterations.
    /// Returns true when the ratio is below the threshold.
    pub fn update(&mut self, iteration: usize, ratio: f64) -> bool {
        debug_assert!(iteration >= self.iteration, "iteration numbers must not decrease");
        self.iteration = iteration;
        self.residual = ratio;
        if self.report_every > 0 && iteration > 0 && iteration % self.report_every == 0 {
            let line = format!(
                "{}: iteration {} of {}, residual={:.6e}",
                self.label, iteration, self.conv.max_iters, ratio
            );
            match self.sink.as_deref_mut() {
                Some(sink) => sink(&line),
                None => log::debug!("{line}"),
            }
        }
        self.conv.check(ratio, iteration).1.converged
    }

    /// Close the solve, warning when the threshold was not reached.
    pub fn finish(self) -> SolveStats<f64> {
        let converged = self.residual < self.conv.tol;
        if !converged {
            log::warn!(
                "{}: not converged after {} iterations (residual={:.3e}, threshold={:.3e})",
                self.label, self.iteration, self.residual, self.conv.tol
            );
        } else {
            log::debug!(
                "{}: converged in {} iterations (residual={:.3e})",
                self.label, self.iteration, self.residual
            );
        }
        SolveStats {
            iterations: self.iteration,
            final_residual: self.residual,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn reports_at_cadence() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let mut sink: ProgressSink = Box::new(move |l: &str| captured.lock().unwrap().push(l.to_string()));
        let conv = Convergence { tol: 1e-3, max_iters: 10 };
        let mut tracker = ConvergenceTracker::new("cg", conv, 2).with_sink(Some(&mut sink));
        for i in 1..=5 {
            assert!(!tracker.update(i, 1.0 / i as f64));
        }
        assert!(tracker.update(6, 1e-4));
        let stats = tracker.finish();
        assert!(stats.converged);
        assert_eq!(stats.iterations, 6);
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("cg: iteration 2 of 10, residual="));
    }

    #[test]
    fn cap_stops_without_converging() {
        let conv = Convergence { tol: 1e-8, max_iters: 3 };
        let (stop, stats) = conv.check(0.5, 3);
        assert!(stop);
        assert!(!stats.converged);
    }
}
