//! Constant fill for per-ray buffers.

use rayon::prelude::*;

/// Fill every element of `data` with `val` in parallel.
pub fn init_array<T: Copy + Send + Sync>(data: &mut [T], val: T) {
    data.par_iter_mut().for_each(|x| *x = val);
}
