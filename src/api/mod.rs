//! Remote API channel for the travel backend
//!
//! Screens and form controllers talk to the backend exclusively through the
//! [`AdminApi`] trait so they can be exercised against an in-memory fake.

pub mod client;
pub mod errors;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use std::fmt;

use crate::models::{Driver, DriverPayload, Travel, TravelPayload};

pub use client::HttpAdminApi;
pub use errors::ApiError;

/// Entity families managed by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Travel,
    Driver,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Travel => "travel",
            EntityKind::Driver => "driver",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Travel => "Travel",
            EntityKind::Driver => "Driver",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create/read/update/delete calls against the backend
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_travels(&self) -> Result<Vec<Travel>, ApiError>;
    async fn get_travel(&self, id: u64) -> Result<Travel, ApiError>;
    async fn create_travel(&self, payload: &TravelPayload) -> Result<(), ApiError>;
    async fn update_travel(&self, id: u64, payload: &TravelPayload) -> Result<(), ApiError>;
    async fn delete_travel(&self, id: u64) -> Result<(), ApiError>;

    async fn list_drivers(&self) -> Result<Vec<Driver>, ApiError>;
    async fn get_driver(&self, id: u64) -> Result<Driver, ApiError>;
    async fn create_driver(&self, payload: &DriverPayload) -> Result<(), ApiError>;
    async fn update_driver(&self, id: u64, payload: &DriverPayload) -> Result<(), ApiError>;
    async fn delete_driver(&self, id: u64) -> Result<(), ApiError>;
}

/// Delete any entity by kind
pub async fn delete_entity(api: &dyn AdminApi, kind: EntityKind, id: u64) -> Result<(), ApiError> {
    match kind {
        EntityKind::Travel => api.delete_travel(id).await,
        EntityKind::Driver => api.delete_driver(id).await,
    }
}
