use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        PoisonError, RwLock,
    },
    thread::{self, ThreadId},
};

/// Finds the segment `i` of `nodes` that holds `x`, starting from `hint`.
///
/// The returned index satisfies `0 <= i <= nodes.len() - 2` and
/// `nodes[i] < nodes[i + 1]`. For `x` inside the range also
/// `nodes[i] <= x <= nodes[i + 1]`. When `x` sits exactly on a shared node the
/// segment on the right wins, unless it has zero length. Abscissas outside the
/// range map to the first or last segment.
///
/// `nodes` must be non-decreasing with at least one segment of positive length.
pub fn locate(nodes: &[f64], x: f64, hint: usize) -> usize {
    let last = nodes.len() - 2;
    let hint = hint.min(last);

    if holds(nodes, hint, x) {
        return hint;
    }
    if hint < last && holds(nodes, hint + 1, x) {
        return hint + 1;
    }
    if hint > 0 && holds(nodes, hint - 1, x) {
        return hint - 1;
    }

    log::trace!("interval hint {} missed x = {}", hint, x);
    locate_bisect(nodes, x)
}

/// Binary search without a hint.
pub fn locate_bisect(nodes: &[f64], x: f64) -> usize {
    let last = nodes.len() - 2;
    let mut index = nodes.partition_point(|&node| node <= x).saturating_sub(1).min(last);

    // zero length segments are never returned
    while index > 0 && nodes[index] >= nodes[index + 1] {
        index -= 1;
    }
    while index < last && nodes[index] >= nodes[index + 1] {
        index += 1;
    }
    index
}

#[inline]
fn holds(nodes: &[f64], index: usize, x: f64) -> bool {
    let (left, right) = (nodes[index], nodes[index + 1]);
    if left > x || left >= right {
        return false;
    }
    x < right || (x == right && index + 2 == nodes.len())
}

/// Last interval returned by [`locate`], remembered per evaluation context.
///
/// `Single` keeps one hint shared by every caller, the right choice when one
/// thread owns the spline. `PerThread` gives each calling thread its own slot.
/// Slots are inserted lazily under the write lock; once a thread has a slot it
/// only ever takes the read lock, so evaluating threads never wait on each
/// other.
///
/// Slots outlive their threads. A pool of short lived workers should call
/// [`SearchCache::release`] before each worker exits; [`SearchCache::reset`]
/// drops every slot at once.
pub enum SearchCache {
    Single(AtomicUsize),
    PerThread(RwLock<HashMap<ThreadId, AtomicUsize>>),
}

impl SearchCache {
    pub fn single() -> Self {
        SearchCache::Single(AtomicUsize::new(0))
    }

    pub fn per_thread() -> Self {
        SearchCache::PerThread(RwLock::new(HashMap::new()))
    }

    pub fn new(per_thread: bool) -> Self {
        if per_thread {
            Self::per_thread()
        } else {
            Self::single()
        }
    }

    pub fn is_per_thread(&self) -> bool {
        matches!(self, SearchCache::PerThread(_))
    }

    /// Locates `x` in `nodes` and remembers the interval for the calling context.
    pub fn find(&self, nodes: &[f64], x: f64) -> usize {
        match self {
            SearchCache::Single(hint) => {
                let previous = hint.load(Ordering::Relaxed);
                let index = locate(nodes, x, previous);
                if index != previous {
                    hint.store(index, Ordering::Relaxed);
                }
                index
            }
            SearchCache::PerThread(slots) => {
                let id = thread::current().id();
                {
                    let map = slots.read().unwrap_or_else(PoisonError::into_inner);
                    if let Some(slot) = map.get(&id) {
                        let previous = slot.load(Ordering::Relaxed);
                        let index = locate(nodes, x, previous);
                        if index != previous {
                            slot.store(index, Ordering::Relaxed);
                        }
                        return index;
                    }
                }
                let index = locate_bisect(nodes, x);
                let mut map = slots.write().unwrap_or_else(PoisonError::into_inner);
                map.insert(id, AtomicUsize::new(index));
                index
            }
        }
    }

    /// Hint of the calling context, 0 if it has none yet.
    pub fn hint(&self) -> usize {
        match self {
            SearchCache::Single(hint) => hint.load(Ordering::Relaxed),
            SearchCache::PerThread(slots) => {
                let map = slots.read().unwrap_or_else(PoisonError::into_inner);
                map.get(&thread::current().id())
                    .map_or(0, |slot| slot.load(Ordering::Relaxed))
            }
        }
    }

    /// Drops every remembered interval. Called whenever the nodes change.
    pub fn reset(&mut self) {
        match self {
            SearchCache::Single(hint) => *hint.get_mut() = 0,
            SearchCache::PerThread(slots) => {
                slots.get_mut().unwrap_or_else(PoisonError::into_inner).clear()
            }
        }
    }

    /// Forgets the calling thread's slot. The next lookup from this thread
    /// starts from a bisection again.
    pub fn release(&self) {
        if let SearchCache::PerThread(slots) = self {
            let id = thread::current().id();
            slots.write().unwrap_or_else(PoisonError::into_inner).remove(&id);
        }
    }

    /// Number of threads holding a slot, 1 for the single variant.
    pub fn contexts(&self) -> usize {
        match self {
            SearchCache::Single(_) => 1,
            SearchCache::PerThread(slots) => {
                slots.read().unwrap_or_else(PoisonError::into_inner).len()
            }
        }
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::per_thread()
    }
}

impl Clone for SearchCache {
    /// A clone starts with empty hints of the same kind.
    fn clone(&self) -> Self {
        Self::new(self.is_per_thread())
    }
}

impl fmt::Debug for SearchCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchCache::Single(hint) => write!(f, "SearchCache::Single({})", hint.load(Ordering::Relaxed)),
            SearchCache::PerThread(_) => write!(f, "SearchCache::PerThread({} threads)", self.contexts()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn check(nodes: &[f64], x: f64, index: usize) {
        assert!(index + 1 < nodes.len());
        assert!(nodes[index] < nodes[index + 1], "degenerate segment {} for x = {}", index, x);
        assert!(nodes[index] <= x && x <= nodes[index + 1], "x = {} not in segment {}", x, index);
    }

    #[test]
    fn tie_break_prefers_right_segment() {
        let nodes = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(locate_bisect(&nodes, 1.0), 1);
        assert_eq!(locate(&nodes, 1.0, 0), 1);
        assert_eq!(locate(&nodes, 0.0, 2), 0);
        assert_eq!(locate(&nodes, 3.0, 0), 2);
        assert_eq!(locate(&nodes, 2.5, 0), 2);
    }

    #[test]
    fn degenerate_segments_are_skipped() {
        let nodes = [0.0, 1.0, 1.0, 2.0, 3.0, 3.0];
        assert_eq!(locate_bisect(&nodes, 1.0), 2);
        assert_eq!(locate(&nodes, 1.0, 1), 2);
        assert_eq!(locate(&nodes, 0.5, 1), 0);
        // last segment has zero length, the one before it is used
        assert_eq!(locate_bisect(&nodes, 3.0), 3);
        assert_eq!(locate(&nodes, 3.0, 4), 3);

        let nodes = [1.0, 1.0, 2.0];
        assert_eq!(locate_bisect(&nodes, 0.0), 1);
        assert_eq!(locate(&nodes, 1.0, 0), 1);
    }

    #[test]
    fn out_of_range_maps_to_boundary_segments() {
        let nodes = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(locate(&nodes, -5.0, 2), 0);
        assert_eq!(locate(&nodes, 10.0, 0), 2);
        assert_eq!(locate(&nodes, f64::NAN, 1), 0);
    }

    #[test]
    fn access_orders() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut nodes = vec![0.0];
        for k in 1..50 {
            let step = if k % 7 == 0 { 0.0 } else { rng.gen_range(0.01..1.0) };
            nodes.push(nodes[k - 1] + step);
        }
        let (lo, hi) = (nodes[0], nodes[nodes.len() - 1]);
        let samples: Vec<f64> = (0..=1000).map(|k| lo + (hi - lo) * k as f64 / 1000.0).collect();

        let cache = SearchCache::single();
        for &x in &samples {
            check(&nodes, x, cache.find(&nodes, x));
        }
        for &x in samples.iter().rev() {
            check(&nodes, x, cache.find(&nodes, x));
        }
        for _ in 0..1000 {
            let x = rng.gen_range(lo..=hi);
            check(&nodes, x, cache.find(&nodes, x));
        }
        for &x in &nodes {
            check(&nodes, x, cache.find(&nodes, x));
        }
    }

    #[test]
    fn per_thread_slots() {
        let nodes: Vec<f64> = (0..200).map(|k| (k as f64).sqrt()).collect();
        let hi = nodes[nodes.len() - 1];
        let cache = SearchCache::per_thread();

        thread::scope(|scope| {
            for t in 0..4 {
                let nodes = &nodes;
                let cache = &cache;
                scope.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(t);
                    for k in 0..2000 {
                        let x = if t % 2 == 0 {
                            hi * k as f64 / 2000.0
                        } else {
                            rng.gen_range(0.0..=hi)
                        };
                        check(nodes, x, cache.find(nodes, x));
                    }
                });
            }
        });
        assert_eq!(cache.contexts(), 4);

        let mut cache = cache;
        cache.reset();
        assert_eq!(cache.contexts(), 0);
        assert_eq!(cache.hint(), 0);
    }

    #[test]
    fn hints_are_private_to_threads() {
        let nodes: Vec<f64> = (0..10).map(|k| k as f64).collect();
        let cache = SearchCache::per_thread();
        assert_eq!(cache.find(&nodes, 8.5), 8);
        thread::scope(|scope| {
            scope.spawn(|| {
                assert_eq!(cache.hint(), 0);
                assert_eq!(cache.find(&nodes, 1.5), 1);
                assert_eq!(cache.hint(), 1);
            });
        });
        assert_eq!(cache.hint(), 8);
    }

    #[test]
    fn released_workers_leave_no_slots() {
        let nodes: Vec<f64> = (0..10).map(|k| k as f64).collect();
        let cache = SearchCache::per_thread();
        for round in 0..7 {
            thread::scope(|scope| {
                scope.spawn(|| {
                    assert_eq!(cache.find(&nodes, 1.5 + round as f64), 1 + round);
                    cache.release();
                });
            });
        }
        assert_eq!(cache.contexts(), 0);

        cache.find(&nodes, 7.5);
        assert_eq!(cache.contexts(), 1);
        cache.release();
        assert_eq!(cache.contexts(), 0);
        assert_eq!(cache.hint(), 0);

        let single = SearchCache::single();
        single.find(&nodes, 4.5);
        single.release();
        assert_eq!(single.hint(), 4);
    }
}
