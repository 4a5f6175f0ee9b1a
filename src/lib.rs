//! Crate entrypoint wiring together configuration, the API transport,
//! reconcilers, listers and the local state store.

pub mod config;
pub mod db;
pub mod error;
pub mod lister;
pub mod panop;
pub mod reconcile;
pub mod session;
pub mod validation;

pub use error::{ApiError, StateError, TransportError};
pub use lister::{AssetFilter, AssetLister, ZoneLister};
pub use panop::types::{Asset, NewAsset, NewZone, Zone};
pub use reconcile::{AssetReconciler, ZoneReconciler};
pub use session::Session;
