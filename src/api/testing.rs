//! In-memory admin API used by unit tests

use async_trait::async_trait;
use std::sync::Mutex;

use super::{AdminApi, ApiError};
use crate::models::{Driver, DriverPayload, Role, Travel, TravelPayload, TravelType, User};

#[derive(Default)]
pub(crate) struct FakeApi {
    travels: Mutex<Vec<Travel>>,
    drivers: Mutex<Vec<Driver>>,
    calls: Mutex<Vec<String>>,
    payloads: Mutex<Vec<serde_json::Value>>,
    fail_next: Mutex<Option<ApiError>>,
}

impl FakeApi {
    pub(crate) fn with_travels(travels: Vec<Travel>) -> Self {
        let api = Self::default();
        *api.travels.lock().unwrap() = travels;
        api
    }

    pub(crate) fn with_drivers(drivers: Vec<Driver>) -> Self {
        let api = Self::default();
        *api.drivers.lock().unwrap() = drivers;
        api
    }

    /// Make the next call fail with `error`
    pub(crate) fn fail_next(&self, error: ApiError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn payloads(&self) -> Vec<serde_json::Value> {
        self.payloads.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn record_payload<T: serde::Serialize>(&self, payload: &T) {
        self.payloads
            .lock()
            .unwrap()
            .push(serde_json::to_value(payload).unwrap());
    }
}

pub(crate) fn travel(id: u64, title: &str) -> Travel {
    Travel {
        id,
        travel_type: TravelType::Tourism,
        title: title.to_string(),
        description: Some("Three days around the island".to_string()),
        city_from: None,
        city_to: None,
        price: 500000.0,
        departure_date: "2025-01-10".to_string(),
        return_date: None,
        capacity: 4,
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn driver(id: u64, name: &str) -> Driver {
    Driver::try_from(User {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role: Role::Driver,
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
        profile: None,
    })
    .unwrap()
}

fn travel_from_payload(id: u64, payload: &TravelPayload) -> Travel {
    Travel {
        id,
        travel_type: payload.travel_type,
        title: payload.title.clone(),
        description: payload.description.clone(),
        city_from: payload.city_from.clone(),
        city_to: payload.city_to.clone(),
        price: payload.price.as_f64().unwrap_or_default(),
        departure_date: payload.departure_date.clone(),
        return_date: payload.return_date.clone(),
        capacity: payload.capacity,
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn list_travels(&self) -> Result<Vec<Travel>, ApiError> {
        self.record("GET /travel".to_string())?;
        Ok(self.travels.lock().unwrap().clone())
    }

    async fn get_travel(&self, id: u64) -> Result<Travel, ApiError> {
        self.record(format!("GET /admin/travel/{}", id))?;
        self.travels
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/admin/travel/{}", id)))
    }

    async fn create_travel(&self, payload: &TravelPayload) -> Result<(), ApiError> {
        self.record("POST /admin/travel".to_string())?;
        self.record_payload(payload);
        let mut travels = self.travels.lock().unwrap();
        let id = travels.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        travels.push(travel_from_payload(id, payload));
        Ok(())
    }

    async fn update_travel(&self, id: u64, payload: &TravelPayload) -> Result<(), ApiError> {
        self.record(format!("PUT /admin/travel/{}", id))?;
        self.record_payload(payload);
        let mut travels = self.travels.lock().unwrap();
        match travels.iter_mut().find(|t| t.id == id) {
            Some(existing) => {
                *existing = travel_from_payload(id, payload);
                Ok(())
            }
            None => Err(ApiError::NotFound(format!("/admin/travel/{}", id))),
        }
    }

    async fn delete_travel(&self, id: u64) -> Result<(), ApiError> {
        self.record(format!("DELETE /admin/travel/{}", id))?;
        self.travels.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn list_drivers(&self) -> Result<Vec<Driver>, ApiError> {
        self.record("GET /driver".to_string())?;
        Ok(self.drivers.lock().unwrap().clone())
    }

    async fn get_driver(&self, id: u64) -> Result<Driver, ApiError> {
        self.record(format!("GET /driver/{}", id))?;
        self.drivers
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/driver/{}", id)))
    }

    async fn create_driver(&self, payload: &DriverPayload) -> Result<(), ApiError> {
        self.record("POST /driver".to_string())?;
        self.record_payload(payload);
        Ok(())
    }

    async fn update_driver(&self, id: u64, payload: &DriverPayload) -> Result<(), ApiError> {
        self.record(format!("PUT /driver/{}", id))?;
        self.record_payload(payload);
        Ok(())
    }

    async fn delete_driver(&self, id: u64) -> Result<(), ApiError> {
        self.record(format!("DELETE /driver/{}", id))?;
        self.drivers.lock().unwrap().retain(|d| d.id != id);
        Ok(())
    }
}
