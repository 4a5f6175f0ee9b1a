//! Read-only collection queries. Results keep the order the remote returns.
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::error::ApiError;
use crate::panop::client::{decode, exchange};
use crate::panop::types::{
    ASSETS_PATH, Asset, AssetResponse, DEFAULT_ZONE_TYPE, ZONES_PATH, Zone, ZoneResponse,
};
use crate::panop::Transport;

pub struct ZoneLister<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> ZoneLister<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    pub async fn list(&self) -> Result<Vec<Zone>, ApiError> {
        const OP: &str = "list zones";
        let bytes = exchange(
            self.transport,
            OP,
            Method::GET,
            ZONES_PATH,
            None,
            StatusCode::OK,
        )
        .await?;
        let entries: Vec<ZoneResponse> = decode(OP, &bytes)?;

        let zones = entries
            .into_iter()
            .map(|z| -> Result<Zone, ApiError> {
                Ok(Zone {
                    id: z.identifier().ok_or(ApiError::MissingField { op: OP, field: "id" })?,
                    name: z
                        .zone_name
                        .ok_or(ApiError::MissingField { op: OP, field: "zone_name" })?,
                    zone_type: z
                        .zone_type
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| DEFAULT_ZONE_TYPE.to_string()),
                    token: z.token,
                    tenant_id: z.tenant_id,
                    validated: z.validated.unwrap_or(false),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = zones.len(), "listed zones");
        Ok(zones)
    }
}

/// Optional narrowing of an asset listing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssetFilter {
    pub zone_id: Option<i64>,
}

impl AssetFilter {
    pub fn by_zone(zone_id: i64) -> Self {
        Self {
            zone_id: Some(zone_id),
        }
    }

    pub fn matches(&self, asset: &Asset) -> bool {
        self.zone_id.is_none_or(|zone_id| asset.zone_id == zone_id)
    }
}

pub struct AssetLister<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> AssetLister<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Fetch every asset, then keep those accepted by `filter`.
    pub async fn list(&self, filter: &AssetFilter) -> Result<Vec<Asset>, ApiError> {
        const OP: &str = "list assets";
        let bytes = exchange(
            self.transport,
            OP,
            Method::GET,
            ASSETS_PATH,
            None,
            StatusCode::OK,
        )
        .await?;
        let entries: Vec<AssetResponse> = decode(OP, &bytes)?;

        let mut assets = Vec::with_capacity(entries.len());
        for a in entries {
            let asset = Asset {
                id: a.identifier().ok_or(ApiError::MissingField { op: OP, field: "id" })?,
                name: a
                    .asset_name
                    .ok_or(ApiError::MissingField { op: OP, field: "asset_name" })?,
                asset_type: a.asset_type,
                zone_id: a
                    .zone_id
                    .ok_or(ApiError::MissingField { op: OP, field: "zone_id" })?,
            };
            if filter.matches(&asset) {
                assets.push(asset);
            }
        }

        debug!(count = assets.len(), zone_id = ?filter.zone_id, "listed assets");
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panop::client::testing::FakeTransport;
    use serde_json::json;

    fn three_assets() -> serde_json::Value {
        json!([
            {"id": 1, "asset_name": "www", "zone_id": 1},
            {"id": 2, "asset_name": "api", "zone_id": 2},
            {"id": 3, "asset_name": "mail", "zone_id": 1}
        ])
    }

    #[tokio::test]
    async fn asset_filter_keeps_matching_zone() {
        let transport = FakeTransport::default().reply(200, three_assets());
        let lister = AssetLister::new(&transport);

        let assets = lister.list(&AssetFilter::by_zone(1)).await.unwrap();
        let ids: Vec<i64> = assets.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn no_filter_returns_everything_in_remote_order() {
        let transport = FakeTransport::default().reply(200, three_assets());
        let lister = AssetLister::new(&transport);

        let assets = lister.list(&AssetFilter::default()).await.unwrap();
        let names: Vec<&str> = assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["www", "api", "mail"]);
    }

    #[tokio::test]
    async fn malformed_entry_aborts_listing() {
        let transport = FakeTransport::default()
            .reply(200, json!([{"id": 1, "asset_name": "www", "zone_id": "one"}]));
        let lister = AssetLister::new(&transport);

        let err = lister.list(&AssetFilter::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { op: "list assets", .. }));
    }

    #[tokio::test]
    async fn entry_without_zone_id_is_rejected() {
        let transport =
            FakeTransport::default().reply(200, json!([{"id": 1, "asset_name": "www"}]));
        let lister = AssetLister::new(&transport);

        let err = lister.list(&AssetFilter::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingField { field: "zone_id", .. }));
    }

    #[tokio::test]
    async fn lists_zones_with_defaults() {
        let transport = FakeTransport::default().reply(
            200,
            json!([
                {"id": 1, "zone_name": "a.com", "zone_type": "dns", "validated": true, "token": "t1", "tenant_id": 5},
                {"id": 2, "zone_name": "b.com"},
                {"id": 3, "zone_name": "c.com", "validated": null}
            ]),
        );
        let lister = ZoneLister::new(&transport);

        let zones = lister.list().await.unwrap();
        assert_eq!(zones.len(), 3);
        assert!(zones[0].validated);
        assert_eq!(zones[0].tenant_id, Some(5));
        assert_eq!(zones[1].zone_type, "dns");
        assert_eq!(zones[1].token, None);
        assert!(!zones[2].validated);
    }

    #[tokio::test]
    async fn zone_listing_requires_ok() {
        let transport = FakeTransport::default().reply(401, json!({"error": "unauthorized"}));
        let lister = ZoneLister::new(&transport);

        let err = lister.list().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }
}
