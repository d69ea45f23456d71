use parking_lot::Mutex;

/// A free-list of reusable instances.
///
/// Encode buffers and stream nesting stacks are recycled through pools so
/// that high-frequency callers do not allocate in the hot path. Instances
/// handed out by [`Pool::get`] keep whatever state they were released with;
/// callers clear them on acquisition.
pub(crate) struct Pool<T> {
    items: Mutex<Vec<T>>,
}

/// Instances beyond this many are dropped on release instead of retained.
const POOL_CAP: usize = 64;

impl<T> Pool<T> {
    pub(crate) const fn new() -> Self {
        Self { items: Mutex::new(Vec::new()) }
    }

    pub(crate) fn get(&self) -> Option<T> {
        self.items.lock().pop()
    }

    pub(crate) fn put(&self, item: T) {
        let mut items = self.items.lock();
        if items.len() < POOL_CAP {
            items.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_put_cycle() {
        let pool: Pool<Vec<u8>> = Pool::new();
        assert!(pool.get().is_none());
        pool.put(vec![1, 2, 3]);
        assert_eq!(pool.get(), Some(vec![1, 2, 3]));
        assert!(pool.get().is_none());
    }

    #[test]
    fn capped() {
        let pool: Pool<u8> = Pool::new();
        for i in 0..200 {
            pool.put(i as u8);
        }
        let mut count = 0;
        while pool.get().is_some() {
            count += 1;
        }
        assert_eq!(count, POOL_CAP);
    }
}
