//! In-flight request de-duplication.
//!
//! The first caller for a key becomes the leader and does the work; later
//! callers queue a oneshot receiver and get a clone of the leader's result.
//!
//! Flow:
//! 1. Caller calls `join(key)`
//! 2. `Slot::Leader`: do the work, then `LeaderGuard::complete(value)`
//! 3. `Slot::Follower`: await the receiver
//! 4. A leader dropped without completing releases the key; its followers
//!    see a closed channel and may join again

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

type Waiters<V> = Arc<Mutex<HashMap<String, Vec<oneshot::Sender<V>>>>>;

/// Map of in-flight keys to their queued followers.
pub struct InflightMap<V: Clone> {
    waiters: Waiters<V>,
}

impl<V: Clone> Default for InflightMap<V> {
    fn default() -> Self {
        Self {
            waiters: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<V: Clone> Clone for InflightMap<V> {
    fn clone(&self) -> Self {
        Self {
            waiters: Arc::clone(&self.waiters),
        }
    }
}

/// Role of a caller for one key.
pub enum Slot<V: Clone> {
    Leader(LeaderGuard<V>),
    Follower(oneshot::Receiver<V>),
}

impl<V: Clone> InflightMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lead the work for `key`, or queue behind the current leader.
    pub fn join(&self, key: &str) -> Slot<V> {
        let mut waiters = self.waiters.lock();
        if let Some(queue) = waiters.get_mut(key) {
            let (sender, receiver) = oneshot::channel();
            queue.push(sender);
            debug!(queued = queue.len(), "joined in-flight request");
            return Slot::Follower(receiver);
        }

        waiters.insert(key.to_string(), Vec::new());
        Slot::Leader(LeaderGuard {
            key: key.to_string(),
            waiters: Arc::clone(&self.waiters),
            completed: false,
        })
    }

    /// Keys with a leader at work.
    pub fn in_flight(&self) -> usize {
        self.waiters.lock().len()
    }
}

/// Held by the leader of a key.
pub struct LeaderGuard<V: Clone> {
    key: String,
    waiters: Waiters<V>,
    completed: bool,
}

impl<V: Clone> LeaderGuard<V> {
    /// Release the key and hand `value` to every follower.
    ///
    /// Returns the number of followers that received it.
    pub fn complete(mut self, value: V) -> usize {
        self.completed = true;
        let followers = self.waiters.lock().remove(&self.key).unwrap_or_default();

        let mut delivered = 0;
        for sender in followers {
            if sender.send(value.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}

impl<V: Clone> Drop for LeaderGuard<V> {
    fn drop(&mut self) {
        if !self.completed {
            // Dropping the senders closes every follower's channel.
            self.waiters.lock().remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader(slot: Slot<u32>) -> LeaderGuard<u32> {
        match slot {
            Slot::Leader(guard) => guard,
            Slot::Follower(_) => panic!("expected leader"),
        }
    }

    fn follower(slot: Slot<u32>) -> oneshot::Receiver<u32> {
        match slot {
            Slot::Follower(receiver) => receiver,
            Slot::Leader(_) => panic!("expected follower"),
        }
    }

    #[tokio::test]
    async fn test_followers_receive_leader_result() {
        let map = InflightMap::new();
        let guard = leader(map.join("+15555550123"));
        let first = follower(map.join("+15555550123"));
        let second = follower(map.join("+15555550123"));

        assert_eq!(guard.complete(7), 2);
        assert_eq!(first.await.unwrap(), 7);
        assert_eq!(second.await.unwrap(), 7);
        assert_eq!(map.in_flight(), 0);
    }

    #[test]
    fn test_keys_are_independent() {
        let map: InflightMap<u32> = InflightMap::new();
        let _a = leader(map.join("+15555550123"));
        let _b = leader(map.join("+4915112345678"));
        assert_eq!(map.in_flight(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_leader_releases_key() {
        let map = InflightMap::new();
        let guard = leader(map.join("+15555550123"));
        let waiting = follower(map.join("+15555550123"));

        drop(guard);
        assert!(waiting.await.is_err());
        assert_eq!(map.in_flight(), 0);

        let next = leader(map.join("+15555550123"));
        assert_eq!(next.complete(1), 0);
    }

    #[test]
    fn test_key_released_after_completion() {
        let map = InflightMap::new();
        leader(map.join("+15555550123")).complete(3);
        let _again = leader(map.join("+15555550123"));
    }
}
