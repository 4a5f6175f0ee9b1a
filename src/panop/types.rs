use serde::{Deserialize, Serialize};

/// Zone type assumed when the caller declares none.
pub const DEFAULT_ZONE_TYPE: &str = "dns";

pub const ZONES_PATH: &str = "/api/zones";
pub const ASSETS_PATH: &str = "/api/assets";

// Outbound payloads. `tenant_id` and `token` are never sent: the server
// derives the tenant from the credential and issues the token itself.

#[derive(Debug, Serialize)]
pub struct ZoneInput<'a> {
    pub zone_name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AssetInput<'a> {
    pub asset_name: &'a str,
    pub zone_id: i64,
}

// Inbound payloads. Create responses name the identifier `zone_id`/`asset_id`
// while collection entries use `id`, so both are accepted.

#[derive(Debug, Deserialize)]
pub struct ZoneResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub zone_id: Option<i64>,
    #[serde(default)]
    pub zone_name: Option<String>,
    #[serde(default)]
    pub zone_type: Option<String>,
    #[serde(default)]
    pub validated: Option<bool>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<i64>,
}

impl ZoneResponse {
    pub fn identifier(&self) -> Option<i64> {
        self.id.or(self.zone_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct AssetResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub asset_id: Option<i64>,
    #[serde(default)]
    pub asset_name: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub zone_id: Option<i64>,
}

impl AssetResponse {
    pub fn identifier(&self) -> Option<i64> {
        self.id.or(self.asset_id)
    }
}

/// Desired state of a zone as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewZone {
    pub name: String,
    #[serde(rename = "type", default)]
    pub zone_type: Option<String>,
}

impl NewZone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone_type: None,
        }
    }

    pub fn zone_type(&self) -> &str {
        self.zone_type.as_deref().unwrap_or(DEFAULT_ZONE_TYPE)
    }

    /// Equal once the type default is applied.
    pub fn same_declaration(&self, other: &NewZone) -> bool {
        self.name == other.name && self.zone_type() == other.zone_type()
    }
}

/// Observed state of a zone.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: String,
    /// Issued by the server on creation. Sensitive, never sent back.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub validated: bool,
}

impl Zone {
    /// Record seeded from an imported identifier, pending a refresh.
    pub fn imported(id: i64) -> Self {
        Self {
            id,
            name: String::new(),
            zone_type: DEFAULT_ZONE_TYPE.to_string(),
            token: None,
            tenant_id: None,
            validated: false,
        }
    }

    /// Declaration matching what was observed, for records that were
    /// imported rather than created.
    pub fn declaration(&self) -> NewZone {
        NewZone {
            name: self.name.clone(),
            zone_type: Some(self.zone_type.clone()),
        }
    }

    /// Copy with the token masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            token: self.token.as_ref().map(|_| "(sensitive)".to_string()),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zone")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("zone_type", &self.zone_type)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("tenant_id", &self.tenant_id)
            .field("validated", &self.validated)
            .finish()
    }
}

/// Desired state of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAsset {
    pub name: String,
    #[serde(rename = "type", default)]
    pub asset_type: Option<String>,
    /// Parent zone. Passed through untouched; the remote validates it.
    pub zone_id: i64,
}

impl NewAsset {
    pub fn new(name: impl Into<String>, zone_id: i64) -> Self {
        Self {
            name: name.into(),
            asset_type: None,
            zone_id,
        }
    }
}

/// Observed state of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub asset_type: Option<String>,
    pub zone_id: i64,
}

impl Asset {
    /// Record seeded from an imported identifier, pending a refresh.
    /// `zone_id` stays 0 until the refresh fills it in.
    pub fn imported(id: i64) -> Self {
        Self {
            id,
            name: String::new(),
            asset_type: None,
            zone_id: 0,
        }
    }

    pub fn declaration(&self) -> NewAsset {
        NewAsset {
            name: self.name.clone(),
            asset_type: self.asset_type.clone(),
            zone_id: self.zone_id,
        }
    }
}
