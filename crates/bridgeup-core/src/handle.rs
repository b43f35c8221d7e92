//! Read-only snapshot accessor that is safe to hold anywhere.

use tokio::sync::watch;

use crate::model::Snapshot;

/// A cheap, cloneable read handle onto the snapshot store.
///
/// A handle obtained from a running [`Synchronizer`] reads live data;
/// a [`detached`] handle reads the default (loading) snapshot. Either
/// way every read succeeds, so callers never need to guard against a
/// missing data source.
///
/// [`Synchronizer`]: crate::sync::Synchronizer
/// [`detached`]: SnapshotHandle::detached
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    rx: Option<watch::Receiver<Snapshot>>,
}

impl SnapshotHandle {
    pub(crate) fn attached(rx: watch::Receiver<Snapshot>) -> Self {
        Self { rx: Some(rx) }
    }

    /// A handle bound to no synchronizer. Reads return the default
    /// snapshot; in debug builds each read logs a warning since this
    /// usually indicates a wiring mistake.
    pub fn detached() -> Self {
        Self { rx: None }
    }

    pub fn is_detached(&self) -> bool {
        self.rx.is_none()
    }

    /// The current snapshot.
    pub fn get(&self) -> Snapshot {
        match &self.rx {
            Some(rx) => rx.borrow().clone(),
            None => {
                if cfg!(debug_assertions) {
                    tracing::warn!("snapshot read through a detached handle");
                }
                Snapshot::default()
            }
        }
    }

    /// Wait for the next snapshot change.
    ///
    /// Detached handles never resolve; a handle whose synchronizer has
    /// shut down returns `None`.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        match &mut self.rx {
            Some(rx) => {
                rx.changed().await.ok()?;
                Some(rx.borrow_and_update().clone())
            }
            None => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ConnectionStatus;
    use crate::store::SnapshotStore;

    #[test]
    fn detached_handle_reads_the_default_snapshot() {
        let handle = SnapshotHandle::detached();
        assert!(handle.is_detached());

        let snap = handle.get();
        assert!(snap.loading);
        assert!(snap.bridges.is_empty());
        assert!(snap.vessels.is_empty());
        assert_eq!(snap.connection, ConnectionStatus::Connecting);
    }

    #[tokio::test]
    async fn attached_handle_tracks_the_store() {
        let store = SnapshotStore::new();
        let mut handle = SnapshotHandle::attached(store.subscribe());
        assert!(!handle.is_detached());

        store.set_connection(ConnectionStatus::Connected);
        let snap = handle.changed().await.unwrap();
        assert_eq!(snap.connection, ConnectionStatus::Connected);
    }
}
