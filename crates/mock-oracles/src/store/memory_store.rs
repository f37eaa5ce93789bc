//! 内存存储
//!
//! 使用 DashMap 实现的并发内存存储，克隆后共享同一份数据。

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;

/// 通用内存存储
#[derive(Debug)]
pub struct MemoryStore<K, V>
where
    K: Eq + Hash,
{
    data: Arc<DashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V: Clone> MemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    /// 插入或覆盖
    pub fn insert(&self, key: K, value: V) {
        self.data.insert(key, value);
    }

    /// 返回数据的克隆，不持有锁
    pub fn get(&self, key: &K) -> Option<V> {
        self.data.get(key).map(|v| v.clone())
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.data.remove(key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.data.contains_key(key)
    }

    /// 按条件筛选
    pub fn list_by<F>(&self, predicate: F) -> Vec<V>
    where
        F: Fn(&V) -> bool,
    {
        self.data
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.data.len()
    }

    pub fn clear(&self) {
        self.data.clear();
    }
}

impl<K: Eq + Hash, V> Clone for MemoryStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}
