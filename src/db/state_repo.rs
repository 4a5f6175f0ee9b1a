//! Repository functions for the `resources` table: one row per tracked entity,
//! mapping the caller's local address to the remote identifier.
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::types::Json;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Zone,
    Asset,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Zone => "zone",
            ResourceKind::Asset => "asset",
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zone" => Ok(ResourceKind::Zone),
            "asset" => Ok(ResourceKind::Asset),
            other => Err(format!("unknown resource kind '{other}'")),
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored entity together with its last observed attributes.
#[derive(Debug, Clone)]
pub struct TrackedResource {
    pub kind: ResourceKind,
    pub address: String,
    pub remote_id: i64,
    pub attributes: serde_json::Value,
    /// What the caller asked for, as opposed to what the server reported.
    pub declared: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrackedResource {
    /// Deserialize the stored attributes into an observed-state record.
    pub fn observed<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.attributes.clone())
    }

    /// Deserialize the stored declaration, if one was recorded.
    pub fn declared<T: DeserializeOwned>(&self) -> serde_json::Result<Option<T>> {
        self.declared
            .clone()
            .map(serde_json::from_value)
            .transpose()
    }
}

fn from_row(row: SqliteRow) -> sqlx::Result<TrackedResource> {
    let kind: String = row.try_get("kind")?;
    let kind = kind
        .parse::<ResourceKind>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;
    let Json(attributes) = row.try_get::<Json<serde_json::Value>, _>("attributes")?;
    let declared = row
        .try_get::<Option<Json<serde_json::Value>>, _>("declared")?
        .map(|Json(v)| v);

    Ok(TrackedResource {
        kind,
        address: row.try_get("address")?,
        remote_id: row.try_get("remote_id")?,
        attributes,
        declared,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

/// Insert or replace the record stored under `(kind, address)`.
pub async fn upsert<T: Serialize, D: Serialize>(
    db: &SqlitePool,
    kind: ResourceKind,
    address: &str,
    remote_id: i64,
    observed: &T,
    declared: &D,
) -> anyhow::Result<()> {
    let attributes = serde_json::to_value(observed)?;
    let declared = serde_json::to_value(declared)?;
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO resources (kind, address, remote_id, attributes, declared, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (kind, address) DO UPDATE SET
            remote_id = excluded.remote_id,
            attributes = excluded.attributes,
            declared = excluded.declared,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(kind.as_str())
    .bind(address)
    .bind(remote_id)
    .bind(Json(attributes))
    .bind(Json(declared))
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn find(
    db: &SqlitePool,
    kind: ResourceKind,
    address: &str,
) -> sqlx::Result<Option<TrackedResource>> {
    let row = sqlx::query(
        r#"
        SELECT kind, address, remote_id, attributes, declared, created_at, updated_at
        FROM resources
        WHERE kind = ? AND address = ?
        "#,
    )
    .bind(kind.as_str())
    .bind(address)
    .fetch_optional(db)
    .await?;

    row.map(from_row).transpose()
}

/// Drop the record; returns whether a row existed.
pub async fn remove(db: &SqlitePool, kind: ResourceKind, address: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM resources WHERE kind = ? AND address = ?")
        .bind(kind.as_str())
        .bind(address)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Every tracked record, optionally restricted to one kind.
pub async fn list(
    db: &SqlitePool,
    kind: Option<ResourceKind>,
) -> sqlx::Result<Vec<TrackedResource>> {
    let rows = sqlx::query(
        r#"
        SELECT kind, address, remote_id, attributes, declared, created_at, updated_at
        FROM resources
        WHERE ? IS NULL OR kind = ?
        ORDER BY kind, address
        "#,
    )
    .bind(kind.map(ResourceKind::as_str))
    .bind(kind.map(ResourceKind::as_str))
    .fetch_all(db)
    .await?;

    rows.into_iter().map(from_row).collect()
}
