//! Tracked-resource lifecycle: each operation pairs one reconciler call with
//! the matching change to the local state store.
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::db::Db;
use crate::db::state_repo::{self, ResourceKind, TrackedResource};
use crate::error::StateError;
use crate::lister::{AssetLister, ZoneLister};
use crate::panop::types::{Asset, NewAsset, NewZone, Zone};
use crate::panop::{HttpTransport, Transport};
use crate::reconcile::{AssetReconciler, ZoneReconciler};

/// Everything one caller invocation needs. Configured once, then only read.
pub struct Session<T = HttpTransport> {
    pub transport: T,
    pub db: Db,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, db: Db) -> Self {
        Self { transport, db }
    }

    pub fn zones(&self) -> ZoneReconciler<'_, T> {
        ZoneReconciler::new(&self.transport)
    }

    pub fn assets(&self) -> AssetReconciler<'_, T> {
        AssetReconciler::new(&self.transport)
    }

    pub fn zone_lister(&self) -> ZoneLister<'_, T> {
        ZoneLister::new(&self.transport)
    }

    pub fn asset_lister(&self) -> AssetLister<'_, T> {
        AssetLister::new(&self.transport)
    }

    /// Create remotely, then track under `address`. An address that is
    /// already tracked is refused before any request is sent.
    pub async fn create_zone(&self, address: &str, desired: &NewZone) -> Result<Zone, StateError> {
        self.ensure_untracked(ResourceKind::Zone, address).await?;
        let zone = self.zones().create(desired).await?;
        state_repo::upsert(&self.db, ResourceKind::Zone, address, zone.id, &zone, desired)
            .await?;
        Ok(zone)
    }

    /// Refresh the tracked zone. `Ok(None)` means it vanished remotely and
    /// has been dropped from state.
    pub async fn read_zone(&self, address: &str) -> Result<Option<Zone>, StateError> {
        let (tracked, current) = self.load::<Zone>(ResourceKind::Zone, address).await?;
        let declared = self
            .declared::<NewZone>(&tracked)?
            .unwrap_or_else(|| current.declaration());

        let Some(zone) = self.zones().read(&current).await? else {
            self.forget(ResourceKind::Zone, address, current.id).await?;
            return Ok(None);
        };
        state_repo::upsert(&self.db, ResourceKind::Zone, address, zone.id, &zone, &declared)
            .await?;
        Ok(Some(zone))
    }

    pub async fn update_zone(&self, address: &str, desired: &NewZone) -> Result<Zone, StateError> {
        let (tracked, current) = self.load::<Zone>(ResourceKind::Zone, address).await?;
        let declared = self
            .declared::<NewZone>(&tracked)?
            .unwrap_or_else(|| current.declaration());

        let zone = self.zones().update(&current, &declared, desired)?;
        state_repo::upsert(&self.db, ResourceKind::Zone, address, zone.id, &zone, &declared)
            .await?;
        Ok(zone)
    }

    /// Delete remotely; the row is only dropped once the remote acknowledged.
    pub async fn delete_zone(&self, address: &str) -> Result<(), StateError> {
        let (_, current) = self.load::<Zone>(ResourceKind::Zone, address).await?;
        self.zones().delete(&current).await?;
        state_repo::remove(&self.db, ResourceKind::Zone, address).await?;
        info!(address, "zone removed from state");
        Ok(())
    }

    /// Track an existing remote zone. Its observed state doubles as the
    /// declaration until the caller declares otherwise.
    pub async fn import_zone(&self, address: &str, external_id: &str) -> Result<Zone, StateError> {
        self.ensure_untracked(ResourceKind::Zone, address).await?;
        let seeded = self.zones().import(external_id)?;
        let Some(zone) = self.zones().read(&seeded).await? else {
            return Err(StateError::Vanished {
                kind: ResourceKind::Zone,
                remote_id: seeded.id,
            });
        };
        state_repo::upsert(
            &self.db,
            ResourceKind::Zone,
            address,
            zone.id,
            &zone,
            &zone.declaration(),
        )
        .await?;
        Ok(zone)
    }

    pub async fn create_asset(
        &self,
        address: &str,
        desired: &NewAsset,
    ) -> Result<Asset, StateError> {
        self.ensure_untracked(ResourceKind::Asset, address).await?;
        let asset = self.assets().create(desired).await?;
        state_repo::upsert(&self.db, ResourceKind::Asset, address, asset.id, &asset, desired)
            .await?;
        Ok(asset)
    }

    pub async fn read_asset(&self, address: &str) -> Result<Option<Asset>, StateError> {
        let (tracked, current) = self.load::<Asset>(ResourceKind::Asset, address).await?;
        let declared = self
            .declared::<NewAsset>(&tracked)?
            .unwrap_or_else(|| current.declaration());

        let Some(asset) = self.assets().read(&current).await? else {
            self.forget(ResourceKind::Asset, address, current.id).await?;
            return Ok(None);
        };
        state_repo::upsert(&self.db, ResourceKind::Asset, address, asset.id, &asset, &declared)
            .await?;
        Ok(Some(asset))
    }

    pub async fn update_asset(
        &self,
        address: &str,
        desired: &NewAsset,
    ) -> Result<Asset, StateError> {
        let (tracked, current) = self.load::<Asset>(ResourceKind::Asset, address).await?;
        let declared = self
            .declared::<NewAsset>(&tracked)?
            .unwrap_or_else(|| current.declaration());

        let asset = self.assets().update(&current, &declared, desired)?;
        state_repo::upsert(&self.db, ResourceKind::Asset, address, asset.id, &asset, &declared)
            .await?;
        Ok(asset)
    }

    pub async fn delete_asset(&self, address: &str) -> Result<(), StateError> {
        let (_, current) = self.load::<Asset>(ResourceKind::Asset, address).await?;
        self.assets().delete(&current).await?;
        state_repo::remove(&self.db, ResourceKind::Asset, address).await?;
        info!(address, "asset removed from state");
        Ok(())
    }

    pub async fn import_asset(
        &self,
        address: &str,
        external_id: &str,
    ) -> Result<Asset, StateError> {
        self.ensure_untracked(ResourceKind::Asset, address).await?;
        let seeded = self.assets().import(external_id)?;
        let Some(asset) = self.assets().read(&seeded).await? else {
            return Err(StateError::Vanished {
                kind: ResourceKind::Asset,
                remote_id: seeded.id,
            });
        };
        state_repo::upsert(
            &self.db,
            ResourceKind::Asset,
            address,
            asset.id,
            &asset,
            &asset.declaration(),
        )
        .await?;
        Ok(asset)
    }

    async fn ensure_untracked(&self, kind: ResourceKind, address: &str) -> Result<(), StateError> {
        match state_repo::find(&self.db, kind, address).await? {
            Some(existing) => Err(StateError::AlreadyTracked {
                kind,
                address: address.to_string(),
                remote_id: existing.remote_id,
            }),
            None => Ok(()),
        }
    }

    async fn load<O: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        address: &str,
    ) -> Result<(TrackedResource, O), StateError> {
        let tracked = state_repo::find(&self.db, kind, address)
            .await?
            .ok_or_else(|| StateError::NotTracked {
                kind,
                address: address.to_string(),
            })?;
        let observed = tracked.observed().map_err(|source| StateError::Corrupt {
            kind,
            address: address.to_string(),
            source,
        })?;
        Ok((tracked, observed))
    }

    // Rows written before declarations were stored come back as None.
    fn declared<D: DeserializeOwned>(
        &self,
        tracked: &TrackedResource,
    ) -> Result<Option<D>, StateError> {
        tracked.declared().map_err(|source| StateError::Corrupt {
            kind: tracked.kind,
            address: tracked.address.clone(),
            source,
        })
    }

    async fn forget(
        &self,
        kind: ResourceKind,
        address: &str,
        remote_id: i64,
    ) -> Result<(), StateError> {
        warn!(%kind, address, remote_id, "resource no longer exists remotely; dropping it from state");
        state_repo::remove(&self.db, kind, address).await?;
        Ok(())
    }
}
