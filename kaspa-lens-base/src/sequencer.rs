use dashmap::DashMap;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken<K> {
    target: K,
    seq: u64,
}

impl<K> RequestToken<K> {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

// 每个目标单调递增的请求序号，只有最新请求的响应才会被采用
#[derive(Debug)]
pub struct RequestSequencer<K: Eq + Hash> {
    latest: DashMap<K, u64>,
}

impl<K: Eq + Hash> Default for RequestSequencer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> RequestSequencer<K> {
    pub fn new() -> Self {
        RequestSequencer {
            latest: DashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> RequestSequencer<K> {
    pub fn issue(&self, target: impl Into<K>) -> RequestToken<K> {
        let target = target.into();
        let mut entry = self.latest.entry(target.clone()).or_insert(0);
        *entry += 1;

        RequestToken {
            target,
            seq: *entry,
        }
    }

    pub fn is_current(&self, token: &RequestToken<K>) -> bool {
        self.latest
            .get(&token.target)
            .is_some_and(|seq| *seq == token.seq)
    }

    // 使该目标所有未完成的请求失效
    pub fn invalidate(&self, target: &K) {
        if let Some(mut seq) = self.latest.get_mut(target) {
            *seq += 1;
        }
    }

    pub fn apply_if_current<T>(&self, token: &RequestToken<K>, value: T, apply: impl FnOnce(T)) -> bool {
        if self.is_current(token) {
            apply(value);
            true
        } else {
            false
        }
    }
}
