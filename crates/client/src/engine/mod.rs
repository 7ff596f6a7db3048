//! Cart and wishlist engines.
//!
//! An engine routes each operation to the store set of the current identity
//! and keeps the last aggregate it saw as a last-known-good snapshot. Reads
//! that hit an outage fall back to that snapshot; mutations are serialized
//! per engine by holding the snapshot lock across the whole round trip.

mod cart;
mod wishlist;

use std::future::Future;

use tokio::sync::Mutex;
use tracing::{debug, warn};

pub use cart::CartEngine;
pub use wishlist::WishlistEngine;

use crate::error::StoreError;
use crate::session::Session;
use crate::store::Stores;

struct Snapshot<T> {
    epoch: u64,
    value: T,
}

/// Shared snapshot bookkeeping for both engines.
struct Tracked<T> {
    session: Session,
    snapshot: Mutex<Snapshot<T>>,
}

impl<T> Tracked<T>
where
    T: Clone + Default + Send,
{
    fn new(session: Session) -> Self {
        Self {
            session,
            snapshot: Mutex::new(Snapshot {
                epoch: 0,
                value: T::default(),
            }),
        }
    }

    /// Load from the current store. `NotFound` reads as empty and
    /// `Unavailable` falls back to the snapshot of the current identity.
    async fn read<F, Fut>(&self, what: &'static str, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(Stores) -> Fut + Send,
        Fut: Future<Output = Result<T, StoreError>> + Send,
    {
        let mut snapshot = self.snapshot.lock().await;
        let ctx = self.session.context().await;
        match op(ctx.stores).await {
            Ok(value) => {
                *snapshot = Snapshot {
                    epoch: ctx.epoch,
                    value: value.clone(),
                };
                Ok(value)
            }
            Err(StoreError::NotFound(_)) => {
                debug!(what, "No stored document, starting empty");
                *snapshot = Snapshot {
                    epoch: ctx.epoch,
                    value: T::default(),
                };
                Ok(T::default())
            }
            Err(StoreError::Unavailable(reason)) => {
                warn!(what, reason = %reason, "Store unavailable, serving last known state");
                Ok(current(&snapshot, ctx.epoch))
            }
            Err(e) => Err(e),
        }
    }

    /// Run a mutation against the current store and record its result.
    ///
    /// A failure leaves the snapshot untouched. `Unauthorized` while signed
    /// in signs the session out before the error is returned; `Forbidden`
    /// does not.
    async fn write<F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(Stores) -> Fut + Send,
        Fut: Future<Output = Result<T, StoreError>> + Send,
    {
        let mut snapshot = self.snapshot.lock().await;
        let ctx = self.session.context().await;
        match op(ctx.stores).await {
            Ok(value) => {
                *snapshot = Snapshot {
                    epoch: ctx.epoch,
                    value: value.clone(),
                };
                Ok(value)
            }
            Err(e) => {
                if e.is_unauthorized() && ctx.authenticated {
                    self.session.expire(ctx.epoch).await;
                }
                Err(e)
            }
        }
    }

    /// The snapshot, or empty if it belongs to an earlier identity.
    async fn peek(&self) -> T {
        let snapshot = self.snapshot.lock().await;
        let epoch = self.session.epoch().await;
        current(&snapshot, epoch)
    }

    /// Replace the snapshot for the current identity.
    async fn reset(&self, value: T) {
        let mut snapshot = self.snapshot.lock().await;
        let epoch = self.session.epoch().await;
        *snapshot = Snapshot { epoch, value };
    }
}

fn current<T: Clone + Default>(snapshot: &Snapshot<T>, epoch: u64) -> T {
    if snapshot.epoch == epoch {
        snapshot.value.clone()
    } else {
        T::default()
    }
}
