//! Switch between rayon and plain iterators.
//!
//! With the `parallel` feature the voxel scans split work per `i` slab on
//! the rayon pool. Without it, `into_par_iter()` resolves to `into_iter()`
//! and the same chains (`map`, `flat_map`, `collect`) run sequentially.
//! Slab results are always merged in slab order, so both builds produce
//! identical output.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential replacement for `rayon::prelude::IntoParallelIterator`.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
