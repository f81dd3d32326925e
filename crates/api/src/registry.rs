//! Live connection registry.
//!
//! Tracks every open WebSocket split into two pools per event link: voter
//! connections and display connections. The registry owns one bounded
//! channel per connection; the socket task drains the receiver while
//! broadcasts fan out over the senders. Senders live in a per-link map
//! keyed by connection ID, so eviction during a concurrent broadcast never
//! invalidates in-flight iteration: a scan collects the dead connections
//! and removes them in one pass afterwards.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};
use votehall_common::{AppError, AppResult};

/// Per-send timeout during broadcast. One stalled peer delays nobody
/// beyond this bound.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Frames buffered per connection before its sender starts to block.
const CHANNEL_CAPACITY: usize = 64;

/// Which pool a connection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// Voting clients.
    Voter,
    /// Display screens.
    Display,
}

/// Opaque handle for one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

/// A successful subscription: the ID for later unsubscribe and the
/// receiving end the socket task drains.
pub struct Subscription {
    pub id: ConnectionId,
    pub rx: mpsc::Receiver<String>,
}

/// Connection ceilings.
#[derive(Debug, Clone, Copy)]
pub struct RegistryLimits {
    /// Maximum live connections across all events and pools.
    pub max_connections: usize,
    /// Maximum live connections in one pool of one event.
    pub max_per_event: usize,
}

type Pool = HashMap<ConnectionId, mpsc::Sender<String>>;

/// Live connection registry with per-event voter and display pools.
#[derive(Clone)]
pub struct ConnectionRegistry {
    limits: RegistryLimits,
    next_id: Arc<AtomicU64>,
    total: Arc<AtomicUsize>,
    voters: Arc<RwLock<HashMap<String, Pool>>>,
    displays: Arc<RwLock<HashMap<String, Pool>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry with the given ceilings.
    #[must_use]
    pub fn new(limits: RegistryLimits) -> Self {
        Self {
            limits,
            next_id: Arc::new(AtomicU64::new(1)),
            total: Arc::new(AtomicUsize::new(0)),
            voters: Arc::new(RwLock::new(HashMap::new())),
            displays: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    const fn pools(&self, kind: PoolKind) -> &Arc<RwLock<HashMap<String, Pool>>> {
        match kind {
            PoolKind::Voter => &self.voters,
            PoolKind::Display => &self.displays,
        }
    }

    /// Admit a connection into a pool.
    ///
    /// Rejects with [`AppError::Overloaded`] when either the global ceiling
    /// or the per-event pool ceiling is reached.
    pub async fn subscribe(&self, kind: PoolKind, link: &str) -> AppResult<Subscription> {
        let mut pools = self.pools(kind).write().await;

        if pools.get(link).map_or(0, HashMap::len) >= self.limits.max_per_event {
            return Err(AppError::Overloaded);
        }
        if self
            .total
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.limits.max_connections).then_some(n + 1)
            })
            .is_err()
        {
            return Err(AppError::Overloaded);
        }

        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        pools.entry(link.to_string()).or_default().insert(id, tx);

        debug!(?kind, link, ?id, "Connection subscribed");

        Ok(Subscription { id, rx })
    }

    /// Remove a connection; empty pool entries are dropped so the map
    /// stays bounded by the set of live events.
    pub async fn unsubscribe(&self, kind: PoolKind, link: &str, id: ConnectionId) {
        let mut pools = self.pools(kind).write().await;
        if let Some(pool) = pools.get_mut(link) {
            if pool.remove(&id).is_some() {
                self.total.fetch_sub(1, Ordering::SeqCst);
            }
            if pool.is_empty() {
                pools.remove(link);
            }
        }

        debug!(?kind, link, ?id, "Connection unsubscribed");
    }

    /// Broadcast a pre-serialized frame to every connection in a pool.
    ///
    /// Sends run concurrently, each bounded by [`SEND_TIMEOUT`]; the call
    /// returns once all of them have resolved. Connections that error or
    /// time out are evicted after the scan completes. Failures never
    /// propagate to the caller: the triggering action already committed.
    pub async fn broadcast(&self, kind: PoolKind, link: &str, message: &str) {
        let targets: Vec<(ConnectionId, mpsc::Sender<String>)> = {
            let pools = self.pools(kind).read().await;
            let Some(pool) = pools.get(link) else {
                return;
            };
            pool.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };

        let sends = targets.into_iter().map(|(id, tx)| {
            let frame = message.to_owned();
            async move {
                match tokio::time::timeout(SEND_TIMEOUT, tx.send(frame)).await {
                    Ok(Ok(())) => None,
                    Ok(Err(_)) | Err(_) => Some(id),
                }
            }
        });

        let dead: Vec<ConnectionId> = join_all(sends).await.into_iter().flatten().collect();
        if dead.is_empty() {
            return;
        }

        warn!(?kind, link, evicted = dead.len(), "Evicting dead connections");
        let mut pools = self.pools(kind).write().await;
        if let Some(pool) = pools.get_mut(link) {
            for id in &dead {
                if pool.remove(id).is_some() {
                    self.total.fetch_sub(1, Ordering::SeqCst);
                }
            }
            if pool.is_empty() {
                pools.remove(link);
            }
        }
    }

    /// Total live connections across all pools.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Live connections in one pool of one event.
    pub async fn pool_size(&self, kind: PoolKind, link: &str) -> usize {
        self.pools(kind)
            .read()
            .await
            .get(link)
            .map_or(0, HashMap::len)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registry(max_connections: usize, max_per_event: usize) -> ConnectionRegistry {
        ConnectionRegistry::new(RegistryLimits {
            max_connections,
            max_per_event,
        })
    }

    #[tokio::test]
    async fn test_subscribe_and_unsubscribe() {
        let registry = registry(10, 10);

        let sub = registry.subscribe(PoolKind::Voter, "link1").await.unwrap();
        assert_eq!(registry.connection_count(), 1);
        assert_eq!(registry.pool_size(PoolKind::Voter, "link1").await, 1);

        registry.unsubscribe(PoolKind::Voter, "link1", sub.id).await;
        assert_eq!(registry.connection_count(), 0);
        // Empty pool entry is gone entirely.
        assert_eq!(registry.pool_size(PoolKind::Voter, "link1").await, 0);
    }

    #[tokio::test]
    async fn test_per_event_ceiling() {
        let registry = registry(10, 2);

        let _a = registry.subscribe(PoolKind::Voter, "link1").await.unwrap();
        let _b = registry.subscribe(PoolKind::Voter, "link1").await.unwrap();
        let result = registry.subscribe(PoolKind::Voter, "link1").await;
        assert!(matches!(result, Err(AppError::Overloaded)));

        // Another event and another pool are unaffected.
        assert!(registry.subscribe(PoolKind::Voter, "link2").await.is_ok());
        assert!(registry.subscribe(PoolKind::Display, "link1").await.is_ok());
    }

    #[tokio::test]
    async fn test_global_ceiling() {
        let registry = registry(2, 10);

        let _a = registry.subscribe(PoolKind::Voter, "link1").await.unwrap();
        let _b = registry.subscribe(PoolKind::Display, "link2").await.unwrap();
        let result = registry.subscribe(PoolKind::Voter, "link3").await;
        assert!(matches!(result, Err(AppError::Overloaded)));
    }

    #[tokio::test]
    async fn test_broadcast_delivers_to_all() {
        let registry = registry(10, 10);

        let mut a = registry.subscribe(PoolKind::Voter, "link1").await.unwrap();
        let mut b = registry.subscribe(PoolKind::Voter, "link1").await.unwrap();

        registry.broadcast(PoolKind::Voter, "link1", "hello").await;

        assert_eq!(a.rx.recv().await.unwrap(), "hello");
        assert_eq!(b.rx.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_broadcast_evicts_dropped_receiver() {
        let registry = registry(10, 10);

        let mut alive = registry.subscribe(PoolKind::Voter, "link1").await.unwrap();
        let dead = registry.subscribe(PoolKind::Voter, "link1").await.unwrap();
        drop(dead.rx);

        registry.broadcast(PoolKind::Voter, "link1", "hello").await;

        assert_eq!(alive.rx.recv().await.unwrap(), "hello");
        assert_eq!(registry.pool_size(PoolKind::Voter, "link1").await, 1);
        assert_eq!(registry.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_to_unknown_link_is_noop() {
        let registry = registry(10, 10);
        registry.broadcast(PoolKind::Display, "missing", "hello").await;
        assert_eq!(registry.connection_count(), 0);
    }
}
