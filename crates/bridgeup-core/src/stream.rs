//! Async view of the snapshot store for subscribers that want to await
//! changes rather than poll.

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Snapshot;

/// A subscription to snapshot updates.
///
/// Wraps a `watch` receiver: only the latest value is retained, so a
/// slow consumer observes the freshest snapshot rather than a backlog.
#[derive(Debug)]
pub struct SnapshotStream {
    rx: watch::Receiver<Snapshot>,
}

impl SnapshotStream {
    pub(crate) fn new(rx: watch::Receiver<Snapshot>) -> Self {
        Self { rx }
    }

    /// The most recently observed snapshot, without waiting.
    pub fn current(&self) -> Snapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next change and return the new snapshot.
    ///
    /// Returns `None` once the synchronizer has shut down and no
    /// further updates can arrive.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Convert into a `futures_core::Stream` of snapshots.
    ///
    /// The stream yields the current value first, then every
    /// subsequent change.
    pub fn into_stream(self) -> WatchStream<Snapshot> {
        WatchStream::new(self.rx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ConnectionStatus;
    use crate::store::SnapshotStore;

    #[tokio::test]
    async fn changed_yields_the_latest_snapshot() {
        let store = SnapshotStore::new();
        let mut stream = SnapshotStream::new(store.subscribe());

        assert!(stream.current().loading);

        store.set_connection(ConnectionStatus::Connected);
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.connection, ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn changed_returns_none_after_the_store_is_dropped() {
        let store = SnapshotStore::new();
        let mut stream = SnapshotStream::new(store.subscribe());
        drop(store);
        assert!(stream.changed().await.is_none());
    }

    #[tokio::test]
    async fn intermediate_values_are_coalesced() {
        let store = SnapshotStore::new();
        let mut stream = SnapshotStream::new(store.subscribe());

        store.set_connection(ConnectionStatus::Connected);
        store.set_connection(ConnectionStatus::Error);

        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.connection, ConnectionStatus::Error);
    }
}
