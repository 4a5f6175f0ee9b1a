use reqwest::{Method, StatusCode};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::panop::client::{decode, encode, exchange};
use crate::panop::types::{NewZone, ZONES_PATH, Zone, ZoneInput, ZoneResponse};
use crate::panop::Transport;
use crate::validation::{parse_import_id, validate_resource_name};

/// Drives the lifecycle of one zone against `/api/zones`.
pub struct ZoneReconciler<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> ZoneReconciler<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// POST the zone. Only 201 counts as success; the identifier and token
    /// come from the response, the name from the desired state.
    pub async fn create(&self, desired: &NewZone) -> Result<Zone, ApiError> {
        const OP: &str = "create zone";
        validate_resource_name(&desired.name).map_err(|e| ApiError::invalid("zone name", e))?;

        let body = encode(OP, &ZoneInput { zone_name: &desired.name })?;
        let bytes = exchange(
            self.transport,
            OP,
            Method::POST,
            ZONES_PATH,
            Some(body),
            StatusCode::CREATED,
        )
        .await?;
        let created: ZoneResponse = decode(OP, &bytes)?;
        let id = created
            .identifier()
            .ok_or(ApiError::MissingField { op: OP, field: "id" })?;

        let zone_type = created
            .zone_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| desired.zone_type().to_string());

        info!(zone_id = id, name = %desired.name, "created zone");
        Ok(Zone {
            id,
            name: desired.name.clone(),
            zone_type,
            token: created.token,
            tenant_id: created.tenant_id,
            validated: created.validated.unwrap_or(false),
        })
    }

    /// Refresh `current` from the zone collection; there is no per-id GET.
    ///
    /// The scan is linear and the first entry with a matching id wins.
    /// `Ok(None)` means the zone no longer exists remotely.
    pub async fn read(&self, current: &Zone) -> Result<Option<Zone>, ApiError> {
        const OP: &str = "read zone";
        let bytes = exchange(
            self.transport,
            OP,
            Method::GET,
            ZONES_PATH,
            None,
            StatusCode::OK,
        )
        .await?;
        let zones: Vec<ZoneResponse> = decode(OP, &bytes)?;

        let Some(found) = zones
            .into_iter()
            .find(|z| z.identifier() == Some(current.id))
        else {
            warn!(zone_id = current.id, "zone not found on refresh");
            return Ok(None);
        };

        let mut zone = current.clone();
        if let Some(name) = found.zone_name {
            zone.name = name;
        }
        if let Some(zone_type) = found.zone_type.filter(|t| !t.is_empty()) {
            zone.zone_type = zone_type;
        }
        if found.token.is_some() {
            zone.token = found.token;
        }
        if found.tenant_id.is_some() {
            zone.tenant_id = found.tenant_id;
        }
        if let Some(validated) = found.validated {
            zone.validated = validated;
        }
        Ok(Some(zone))
    }

    /// No remote call is made. `declared` is the declaration `current` was
    /// last reconciled from; if `desired` matches it the held record is
    /// returned as is, anything else is rejected since the API cannot
    /// modify a zone. Observed fields are not compared: the server may
    /// report a different type or a normalised name.
    pub fn update(
        &self,
        current: &Zone,
        declared: &NewZone,
        desired: &NewZone,
    ) -> Result<Zone, ApiError> {
        validate_resource_name(&desired.name).map_err(|e| ApiError::invalid("zone name", e))?;
        if declared.same_declaration(desired) {
            return Ok(current.clone());
        }
        Err(ApiError::UpdateUnsupported { kind: "zone" })
    }

    /// DELETE the zone; only 200 counts as acknowledged.
    pub async fn delete(&self, current: &Zone) -> Result<(), ApiError> {
        exchange(
            self.transport,
            "delete zone",
            Method::DELETE,
            &format!("{ZONES_PATH}/{}", current.id),
            None,
            StatusCode::OK,
        )
        .await?;
        info!(zone_id = current.id, "deleted zone");
        Ok(())
    }

    /// Seed a tracking record from an existing remote identifier.
    pub fn import(&self, external_id: &str) -> Result<Zone, ApiError> {
        let id = parse_import_id(external_id)
            .ok_or_else(|| ApiError::InvalidImportId(external_id.to_string()))?;
        info!(zone_id = id, "imported zone");
        Ok(Zone::imported(id))
    }
}
