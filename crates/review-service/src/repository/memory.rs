//! 进程内评价仓储
//!
//! 评价按 ID 存放，另以 `(user_id, event_id)` 建立配对索引。
//! 写入与按对删除都先锁定配对索引的条目，再操作评价表，锁顺序固定。

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};

use super::traits::ReviewRepositoryTrait;
use crate::error::{Result, ReviewError};
use crate::models::{NewReview, Review, ReviewPatch};

/// 进程内评价仓储
pub struct MemoryReviewRepository {
    reviews: DashMap<i64, Review>,
    pairs: DashMap<(i64, i64), i64>,
    next_id: AtomicI64,
}

impl Default for MemoryReviewRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryReviewRepository {
    pub fn new() -> Self {
        Self {
            reviews: DashMap::new(),
            pairs: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    fn collect_sorted<F>(&self, predicate: F) -> Vec<Review>
    where
        F: Fn(&Review) -> bool,
    {
        let mut reviews: Vec<Review> = self
            .reviews
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        reviews.sort_by_key(|r| r.id);
        reviews
    }

    /// 在配对条目锁内删除；`expected_id` 为 Some 时仅当索引指向该 ID 才删除
    fn remove_pair(&self, pair: (i64, i64), expected_id: Option<i64>) -> bool {
        match self.pairs.entry(pair) {
            Entry::Occupied(entry) => {
                let id = *entry.get();
                if expected_id.is_some_and(|expected| expected != id) {
                    return false;
                }
                entry.remove();
                self.reviews.remove(&id);
                true
            }
            Entry::Vacant(_) => false,
        }
    }
}

#[async_trait]
impl ReviewRepositoryTrait for MemoryReviewRepository {
    async fn list_all(&self) -> Result<Vec<Review>> {
        Ok(self.collect_sorted(|_| true))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Review>> {
        Ok(self.reviews.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_event(&self, event_id: i64) -> Result<Vec<Review>> {
        Ok(self.collect_sorted(|r| r.event_id == event_id))
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Review>> {
        Ok(self.collect_sorted(|r| r.user_id == user_id))
    }

    async fn find_by_user_and_event(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> Result<Option<Review>> {
        let id = match self.pairs.get(&(user_id, event_id)) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        self.find_by_id(id).await
    }

    async fn exists_by_user_and_event(&self, user_id: i64, event_id: i64) -> Result<bool> {
        Ok(self.pairs.contains_key(&(user_id, event_id)))
    }

    async fn create(&self, review: &NewReview) -> Result<Review> {
        match self.pairs.entry((review.user_id, review.event_id)) {
            Entry::Occupied(_) => Err(ReviewError::DuplicateReview {
                user_id: review.user_id,
                event_id: review.event_id,
            }),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let now = Utc::now();
                let created = Review {
                    id,
                    event_id: review.event_id,
                    user_id: review.user_id,
                    rating: review.rating,
                    comment: review.comment.clone(),
                    created_at: now,
                    updated_at: now,
                };
                self.reviews.insert(id, created.clone());
                slot.insert(id);
                Ok(created)
            }
        }
    }

    async fn update(&self, id: i64, patch: &ReviewPatch) -> Result<Option<Review>> {
        Ok(self.reviews.get_mut(&id).map(|mut entry| {
            patch.apply_to(entry.value_mut());
            entry.value().clone()
        }))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let pair = match self.reviews.get(&id) {
            Some(entry) => (entry.user_id, entry.event_id),
            None => return Ok(false),
        };
        Ok(self.remove_pair(pair, Some(id)))
    }

    async fn delete_by_user_and_event(&self, user_id: i64, event_id: i64) -> Result<u64> {
        Ok(u64::from(self.remove_pair((user_id, event_id), None)))
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<u64> {
        let pairs: Vec<(i64, i64)> = self
            .pairs
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| *entry.key())
            .collect();

        let deleted = pairs
            .into_iter()
            .filter(|pair| self.remove_pair(*pair, None))
            .count();

        Ok(deleted as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_review(user_id: i64, event_id: i64) -> NewReview {
        NewReview {
            event_id,
            user_id,
            rating: 4,
            comment: Some("nice".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = MemoryReviewRepository::new();
        let created = repo.create(&new_review(42, 7)).await.unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(repo.find_by_id(1).await.unwrap(), Some(created.clone()));
        assert_eq!(
            repo.find_by_user_and_event(42, 7).await.unwrap(),
            Some(created)
        );
        assert!(repo.exists_by_user_and_event(42, 7).await.unwrap());
        assert!(!repo.exists_by_user_and_event(42, 8).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_pair_is_rejected() {
        let repo = MemoryReviewRepository::new();
        repo.create(&new_review(42, 7)).await.unwrap();

        let err = repo.create(&new_review(42, 7)).await.unwrap_err();
        assert!(matches!(
            err,
            ReviewError::DuplicateReview {
                user_id: 42,
                event_id: 7
            }
        ));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_for_same_pair() {
        let repo = Arc::new(MemoryReviewRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.create(&new_review(42, 7)).await })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(ReviewError::DuplicateReview { .. }) => duplicates += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 15);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_scoped_queries_are_sorted() {
        let repo = MemoryReviewRepository::new();
        repo.create(&new_review(1, 7)).await.unwrap();
        repo.create(&new_review(2, 7)).await.unwrap();
        repo.create(&new_review(1, 8)).await.unwrap();

        let by_event: Vec<i64> = repo.find_by_event(7).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(by_event, vec![1, 2]);

        let by_user: Vec<i64> = repo.find_by_user(1).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(by_user, vec![1, 3]);

        assert_eq!(repo.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_patch() {
        let repo = MemoryReviewRepository::new();
        let created = repo.create(&new_review(42, 7)).await.unwrap();

        let patch = ReviewPatch {
            rating: None,
            comment: Some("changed".to_string()),
        };
        let updated = repo.update(created.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.rating, 4);
        assert_eq!(updated.comment.as_deref(), Some("changed"));

        assert!(repo.update(999, &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_paths_free_the_pair() {
        let repo = MemoryReviewRepository::new();
        let first = repo.create(&new_review(42, 7)).await.unwrap();
        repo.create(&new_review(42, 8)).await.unwrap();
        repo.create(&new_review(43, 7)).await.unwrap();

        assert!(repo.delete_by_id(first.id).await.unwrap());
        assert!(!repo.delete_by_id(first.id).await.unwrap());
        assert!(!repo.exists_by_user_and_event(42, 7).await.unwrap());

        // 删除后同一对可以重新评价
        repo.create(&new_review(42, 7)).await.unwrap();

        assert_eq!(repo.delete_by_user_and_event(43, 7).await.unwrap(), 1);
        assert_eq!(repo.delete_by_user_and_event(43, 7).await.unwrap(), 0);

        assert_eq!(repo.delete_by_user(42).await.unwrap(), 2);
        assert!(repo.is_empty());
    }
}
