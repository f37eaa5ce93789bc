//! 共享状态

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::models::{MockBooking, MockEvent, MockUser, Seed};
use crate::store::MemoryStore;

/// 三个上游服务共用的数据
#[derive(Default)]
pub struct OracleState {
    /// 按 Token 索引的用户
    pub users: MemoryStore<String, MockUser>,
    pub events: MemoryStore<i64, MockEvent>,
    pub bookings: MemoryStore<MockBooking, MockBooking>,
    /// 每个上游请求的人为延迟（毫秒），用于演练调用方超时
    delay_ms: AtomicU64,
}

impl OracleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Self {
        let state = Self::new();
        state.apply_seed(seed);
        state
    }

    pub fn apply_seed(&self, seed: Seed) {
        for user in seed.users {
            self.add_user(user);
        }
        for event in seed.events {
            self.add_event(event);
        }
        for booking in seed.bookings {
            self.add_booking(booking);
        }
    }

    pub fn add_user(&self, user: MockUser) {
        self.users.insert(user.token.clone(), user);
    }

    pub fn add_event(&self, event: MockEvent) {
        self.events.insert(event.id, event);
    }

    pub fn add_booking(&self, booking: MockBooking) {
        self.bookings.insert(booking, booking);
    }

    pub fn user_by_token(&self, token: &str) -> Option<MockUser> {
        self.users.get(&token.to_string())
    }

    pub fn has_booking(&self, user_id: i64, event_id: i64) -> bool {
        self.bookings.contains(&MockBooking { user_id, event_id })
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.load(Ordering::Relaxed))
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as u64, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_populates_stores() {
        let state = OracleState::from_seed(Seed {
            users: vec![MockUser {
                id: 42,
                username: "alice".to_string(),
                role: "USER".to_string(),
                token: "t-42".to_string(),
            }],
            events: vec![MockEvent {
                id: 7,
                title: "Jazz".to_string(),
                organizer_id: Some(5),
                archived: false,
            }],
            bookings: vec![MockBooking {
                user_id: 42,
                event_id: 7,
            }],
        });

        assert_eq!(state.user_by_token("t-42").map(|u| u.id), Some(42));
        assert!(state.user_by_token("unknown").is_none());
        assert!(state.events.contains(&7));
        assert!(state.has_booking(42, 7));
        assert!(!state.has_booking(7, 42));
    }

    #[test]
    fn test_delay_roundtrip() {
        let state = OracleState::new();
        assert_eq!(state.delay(), Duration::ZERO);
        state.set_delay(Duration::from_millis(250));
        assert_eq!(state.delay(), Duration::from_millis(250));
    }
}
