//! Common utilities used across the crate.
//!
//! Parallelism configuration and thread pool setup shared by the
//! streaming driver and the buffered decomposition.

use rayon::prelude::*;

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Whether parallel execution is allowed.
///
/// When `true`, each axis pair and each fiber grouping may be computed by a
/// separate `rayon` worker over the same immutable coordinate buffer.
/// When `false`, records are streamed once and dispatched sequentially.
///
/// The actual thread pool is set up by [`run_with_threads`]. Components
/// don't manage thread pools - they just respect this flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Create from thread count semantics.
    ///
    /// - 0 = auto (parallel if rayon pool has multiple threads, sequential otherwise)
    /// - 1 = sequential
    /// - >1 = parallel
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Run `f` on every element of a mutable slice, in parallel when allowed.
    #[inline]
    pub fn maybe_par_for_each_mut<T, F>(self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(&mut T) + Sync + Send,
    {
        if self.is_parallel() {
            items.par_iter_mut().for_each(f);
        } else {
            items.iter_mut().for_each(f);
        }
    }
}

// =============================================================================
// Thread Pool Setup
// =============================================================================

/// Run a closure with the appropriate thread pool.
///
/// Thread count semantics:
/// - `0` = auto (use the global rayon pool)
/// - `1` = sequential (no thread pool)
/// - `n > 1` = use exactly `n` threads
///
/// # Errors
///
/// Returns the pool build error if a dedicated pool of `n` threads
/// cannot be created.
///
/// # Example
///
/// ```
/// use sparse_fibers::{run_with_threads, Parallelism};
///
/// let doubled = run_with_threads(1, |par| {
///     assert_eq!(par, Parallelism::Sequential);
///     let mut values = vec![1, 2, 3];
///     par.maybe_par_for_each_mut(&mut values, |x| *x *= 2);
///     values
/// })
/// .unwrap();
/// assert_eq!(doubled, vec![2, 4, 6]);
/// ```
#[inline]
pub fn run_with_threads<T: Send>(
    n_threads: usize,
    f: impl FnOnce(Parallelism) -> T + Send,
) -> Result<T, rayon::ThreadPoolBuildError> {
    let parallelism = Parallelism::from_threads(n_threads);

    match (parallelism, n_threads) {
        (Parallelism::Sequential, _) => Ok(f(Parallelism::Sequential)),
        (Parallelism::Parallel, 0) => Ok(f(Parallelism::Parallel)),
        (Parallelism::Parallel, n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            Ok(pool.install(|| f(Parallelism::Parallel)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_thread_is_sequential() {
        assert_eq!(Parallelism::from_threads(1), Parallelism::Sequential);
        assert!(Parallelism::from_threads(4).is_parallel());
    }

    #[test]
    fn for_each_mut_touches_every_item() {
        let mut seq: Vec<usize> = (0..1000).collect();
        let mut par = seq.clone();
        Parallelism::Sequential.maybe_par_for_each_mut(&mut seq, |x| *x *= 3);
        Parallelism::Parallel.maybe_par_for_each_mut(&mut par, |x| *x *= 3);
        assert_eq!(seq, par);
        assert_eq!(par[999], 2997);
    }

    #[test]
    fn run_with_threads_uses_dedicated_pool() {
        let n = run_with_threads(3, |par| {
            assert!(par.is_parallel());
            rayon::current_num_threads()
        })
        .unwrap();
        assert_eq!(n, 3);
    }
}
