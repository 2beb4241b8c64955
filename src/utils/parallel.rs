#[cfg(feature = "parallel")]
use rayon::prelude::*;

// Below this many items the rayon pool costs more than it saves.
#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
const PARALLEL_THRESHOLD: usize = 1000;

/// Maps every item, on the rayon pool when the collection is large enough.
/// Output order always matches input order.
#[inline]
pub fn map<T, R, F>(collection: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    {
        if collection.len() > PARALLEL_THRESHOLD {
            return collection.par_iter().map(f).collect();
        }
    }
    collection.iter().map(f).collect()
}

// Helper for mutable iteration
#[inline]
pub fn iterate_mut<T, F>(collection: &mut [T], f: F)
where
    T: Send,
    F: Fn(&mut T) + Sync + Send,
{
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    {
        if collection.len() > PARALLEL_THRESHOLD {
            collection.par_iter_mut().for_each(f);
            return;
        }
    }
    collection.iter_mut().for_each(f);
}
