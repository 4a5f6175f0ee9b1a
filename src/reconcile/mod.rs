//! Per-entity lifecycle operations: create, read, update, delete, import.

pub mod asset;
pub mod zone;

pub use asset::AssetReconciler;
pub use zone::ZoneReconciler;
