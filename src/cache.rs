use std::collections::VecDeque;

use crate::types::CacheEntry;

/// 最近访问的页面片段缓存
///
/// 队尾是最近使用的条目，超出容量时从队首淘汰。
/// 条目很少，按路径线性查找即可。
#[derive(Debug, Clone)]
pub struct PageCache {
    entries: VecDeque<CacheEntry>,
    capacity: usize,
}

impl PageCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// 命中时把条目挪到队尾
    pub fn get(&mut self, path: &str) -> Option<&str> {
        let idx = self.entries.iter().rposition(|entry| entry.path == path)?;
        let entry = self.entries.remove(idx)?;
        self.entries.push_back(entry);
        self.entries.back().map(|entry| entry.content.as_str())
    }

    /// 已存在的路径等价于先删除再追加
    pub fn put(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        if let Some(idx) = self.entries.iter().position(|entry| entry.path == path) {
            self.entries.remove(idx);
        }
        self.entries.push_back(CacheEntry {
            path,
            content: content.into(),
        });
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                log::debug!("[缓存] 淘汰 {}", evicted.path);
            }
        }
    }

    /// 只探测，不改变新旧顺序
    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 从最久未用到最近使用
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn put_then_get_returns_content() {
        let mut cache = PageCache::new(20);
        cache.put("/docs/intro", "Intro\n<p>hi</p>");
        assert_eq!(cache.get("/docs/intro"), Some("Intro\n<p>hi</p>"));
        assert_eq!(cache.get("/docs/missing"), None);
    }

    #[test]
    fn overflow_evicts_least_recently_used() {
        let mut cache = PageCache::new(3);
        cache.put("/a", "a");
        cache.put("/b", "b");
        cache.put("/c", "c");
        assert!(cache.get("/a").is_some());
        cache.put("/d", "d");

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains("/b"));
        assert_eq!(cache.paths().collect::<Vec<_>>(), vec!["/c", "/a", "/d"]);
    }

    #[test]
    fn re_put_replaces_and_promotes() {
        let mut cache = PageCache::new(3);
        cache.put("/a", "old");
        cache.put("/b", "b");
        cache.put("/a", "new");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.paths().collect::<Vec<_>>(), vec!["/b", "/a"]);
        assert_eq!(cache.get("/a"), Some("new"));
    }

    #[test]
    fn zero_capacity_still_holds_one_page() {
        let mut cache = PageCache::new(0);
        cache.put("/a", "a");
        cache.put("/b", "b");
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.paths().collect::<Vec<_>>(), vec!["/b"]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Put(u8),
        Get(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..40).prop_map(Op::Put),
            (0u8..40).prop_map(Op::Get),
        ]
    }

    proptest! {
        /// 与一个朴素的 LRU 模型逐步比对
        #[test]
        fn matches_lru_model(ops in proptest::collection::vec(op_strategy(), 0..200)) {
            let mut cache = PageCache::new(20);
            let mut model: Vec<String> = Vec::new();

            for op in ops {
                match op {
                    Op::Put(n) => {
                        let path = format!("/docs/{n}");
                        cache.put(path.clone(), format!("page {n}"));
                        model.retain(|p| p != &path);
                        model.push(path);
                        if model.len() > 20 {
                            model.remove(0);
                        }
                    }
                    Op::Get(n) => {
                        let path = format!("/docs/{n}");
                        let hit = cache.get(&path).map(str::to_string);
                        if let Some(pos) = model.iter().position(|p| p == &path) {
                            let promoted = model.remove(pos);
                            model.push(promoted);
                            prop_assert_eq!(hit, Some(format!("page {n}")));
                        } else {
                            prop_assert_eq!(hit, None);
                        }
                    }
                }
                prop_assert!(cache.len() <= 20);
                prop_assert_eq!(cache.paths().collect::<Vec<_>>(), model.iter().map(String::as_str).collect::<Vec<_>>());
            }
        }
    }
}
