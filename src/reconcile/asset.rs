use reqwest::{Method, StatusCode};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::panop::client::{decode, encode, exchange};
use crate::panop::types::{ASSETS_PATH, Asset, AssetInput, AssetResponse, NewAsset};
use crate::panop::Transport;
use crate::validation::{parse_import_id, validate_resource_name};

/// Drives the lifecycle of one asset against `/api/assets`.
///
/// The parent `zone_id` is carried verbatim; whether it names an existing
/// zone is for the remote to decide.
pub struct AssetReconciler<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> AssetReconciler<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    pub async fn create(&self, desired: &NewAsset) -> Result<Asset, ApiError> {
        const OP: &str = "create asset";
        validate_resource_name(&desired.name).map_err(|e| ApiError::invalid("asset name", e))?;

        // type is not part of the create contract
        let body = encode(
            OP,
            &AssetInput {
                asset_name: &desired.name,
                zone_id: desired.zone_id,
            },
        )?;
        let bytes = exchange(
            self.transport,
            OP,
            Method::POST,
            ASSETS_PATH,
            Some(body),
            StatusCode::CREATED,
        )
        .await?;
        let created: AssetResponse = decode(OP, &bytes)?;
        let id = created
            .identifier()
            .ok_or(ApiError::MissingField { op: OP, field: "id" })?;

        info!(asset_id = id, zone_id = desired.zone_id, name = %desired.name, "created asset");
        Ok(Asset {
            id,
            name: created
                .asset_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| desired.name.clone()),
            asset_type: desired.asset_type.clone(),
            zone_id: desired.zone_id,
        })
    }

    /// Same list-then-scan strategy as zones: first matching id wins,
    /// `Ok(None)` when the asset is gone.
    pub async fn read(&self, current: &Asset) -> Result<Option<Asset>, ApiError> {
        const OP: &str = "read asset";
        let bytes = exchange(
            self.transport,
            OP,
            Method::GET,
            ASSETS_PATH,
            None,
            StatusCode::OK,
        )
        .await?;
        let assets: Vec<AssetResponse> = decode(OP, &bytes)?;

        let Some(found) = assets
            .into_iter()
            .find(|a| a.identifier() == Some(current.id))
        else {
            warn!(asset_id = current.id, "asset not found on refresh");
            return Ok(None);
        };

        let mut asset = current.clone();
        if let Some(name) = found.asset_name {
            asset.name = name;
        }
        if let Some(zone_id) = found.zone_id {
            asset.zone_id = zone_id;
        }
        if found.asset_type.is_some() {
            asset.asset_type = found.asset_type;
        }
        Ok(Some(asset))
    }

    /// No remote call; see [`crate::reconcile::ZoneReconciler::update`].
    pub fn update(
        &self,
        current: &Asset,
        declared: &NewAsset,
        desired: &NewAsset,
    ) -> Result<Asset, ApiError> {
        validate_resource_name(&desired.name).map_err(|e| ApiError::invalid("asset name", e))?;
        if declared == desired {
            return Ok(current.clone());
        }
        Err(ApiError::UpdateUnsupported { kind: "asset" })
    }

    pub async fn delete(&self, current: &Asset) -> Result<(), ApiError> {
        exchange(
            self.transport,
            "delete asset",
            Method::DELETE,
            &format!("{ASSETS_PATH}/{}", current.id),
            None,
            StatusCode::OK,
        )
        .await?;
        info!(asset_id = current.id, "deleted asset");
        Ok(())
    }

    pub fn import(&self, external_id: &str) -> Result<Asset, ApiError> {
        let id = parse_import_id(external_id)
            .ok_or_else(|| ApiError::InvalidImportId(external_id.to_string()))?;
        info!(asset_id = id, "imported asset");
        Ok(Asset::imported(id))
    }
}
