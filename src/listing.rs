//! Row records shown on the travel and driver list screens
//!
//! Rows are rebuilt from every list fetch and never edited in place. The list
//! itself lives in the [`QueryCache`] under `(kind, list)`.

use async_trait::async_trait;
use ratatui::style::Color;
use ratatui::text::Span;
use tracing::{info, warn};

use crate::admin_tui::ui::Styles;
use crate::api::{delete_entity, AdminApi, ApiError, EntityKind};
use crate::cache::{CacheKey, QueryCache};
use crate::models::{Driver, Travel, TravelType};
use crate::navigation::{Navigation, SuccessReason};
use crate::table::{CellValue, Column, TableRecord};

const MISSING: &str = "-";

/// A row type backed by one entity family
#[async_trait]
pub trait EntityListing: TableRecord + Clone + Send + Sync + Sized + 'static {
    type Entity: Clone + Send + Sync + 'static;

    const KIND: EntityKind;

    fn columns() -> Vec<Column<Self>>;

    /// Number rows from 1 in backend order
    fn rows(entities: &[Self::Entity]) -> Vec<Self>;

    fn id(&self) -> u64;

    /// Text naming the row in the delete prompt
    fn delete_label(&self) -> String;

    async fn fetch_all(api: &dyn AdminApi) -> Result<Vec<Self::Entity>, ApiError>;
}

/// Read the entity list through the cache and project it into rows
pub async fn load_rows<L: EntityListing>(
    api: &dyn AdminApi,
    cache: &QueryCache,
) -> Result<Vec<L>, ApiError> {
    let entities = cache
        .get_or_fetch(CacheKey::list(L::KIND), || L::fetch_all(api))
        .await?;
    Ok(L::rows(&entities))
}

pub async fn load_travel_rows(api: &dyn AdminApi, cache: &QueryCache) -> Result<Vec<TravelRow>, ApiError> {
    load_rows::<TravelRow>(api, cache).await
}

pub async fn load_driver_rows(api: &dyn AdminApi, cache: &QueryCache) -> Result<Vec<DriverRow>, ApiError> {
    load_rows::<DriverRow>(api, cache).await
}

fn action_hints<R>(_: &CellValue, _: &R) -> Span<'static> {
    Span::styled("[e] Update  [d] Delete", Styles::hint())
}

fn travel_type_badge(travel_type: TravelType) -> Span<'static> {
    let color = match travel_type {
        TravelType::InterCity => Color::Blue,
        TravelType::Tourism => Color::Green,
    };
    Span::styled(
        format!(" {} ", travel_type.label()),
        Styles::badge(color),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct TravelRow {
    pub no: usize,
    pub travel: Travel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelField {
    No,
    Title,
    Description,
    DepartureDate,
    ReturnDate,
    Type,
    Price,
    Capacity,
    Actions,
}

impl TableRecord for TravelRow {
    type Field = TravelField;

    fn value(&self, field: TravelField) -> CellValue {
        let travel = &self.travel;
        match field {
            TravelField::No => self.no.into(),
            TravelField::Title => travel.title.as_str().into(),
            TravelField::Description => travel.description.clone().into(),
            TravelField::DepartureDate => travel.departure_date.as_str().into(),
            TravelField::ReturnDate => travel.return_date.clone().into(),
            TravelField::Type => travel.travel_type.as_str().into(),
            TravelField::Price => travel.price.into(),
            TravelField::Capacity => travel.capacity.into(),
            TravelField::Actions => CellValue::Null,
        }
    }
}

#[async_trait]
impl EntityListing for TravelRow {
    type Entity = Travel;

    const KIND: EntityKind = EntityKind::Travel;

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("No", TravelField::No),
            Column::new("Title", TravelField::Title),
            Column::new("Description", TravelField::Description),
            Column::new("Departure Date", TravelField::DepartureDate),
            Column::new("Return Date", TravelField::ReturnDate),
            Column::new("Type", TravelField::Type)
                .with_render(|_, row: &TravelRow| travel_type_badge(row.travel.travel_type)),
            Column::new("Price", TravelField::Price),
            Column::new("Capacity", TravelField::Capacity),
            Column::new("Actions", TravelField::Actions).with_render(action_hints::<TravelRow>),
        ]
    }

    fn rows(travels: &[Travel]) -> Vec<Self> {
        travels
            .iter()
            .enumerate()
            .map(|(i, travel)| TravelRow {
                no: i + 1,
                travel: travel.clone(),
            })
            .collect()
    }

    fn id(&self) -> u64 {
        self.travel.id
    }

    fn delete_label(&self) -> String {
        self.travel.title.clone()
    }

    async fn fetch_all(api: &dyn AdminApi) -> Result<Vec<Travel>, ApiError> {
        api.list_travels().await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverRow {
    pub no: usize,
    pub driver: Driver,
    pub phone: String,
    pub address: String,
}

impl DriverRow {
    pub fn new(no: usize, driver: &Driver) -> Self {
        let or_missing = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(MISSING)
                .to_string()
        };
        Self {
            no,
            phone: or_missing(driver.phone()),
            address: or_missing(driver.address()),
            driver: driver.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverField {
    No,
    Name,
    Email,
    Phone,
    Address,
    Actions,
}

impl TableRecord for DriverRow {
    type Field = DriverField;

    fn value(&self, field: DriverField) -> CellValue {
        match field {
            DriverField::No => self.no.into(),
            DriverField::Name => self.driver.name.as_str().into(),
            DriverField::Email => self.driver.email.as_str().into(),
            DriverField::Phone => self.phone.as_str().into(),
            DriverField::Address => self.address.as_str().into(),
            DriverField::Actions => CellValue::Null,
        }
    }
}

#[async_trait]
impl EntityListing for DriverRow {
    type Entity = Driver;

    const KIND: EntityKind = EntityKind::Driver;

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("No", DriverField::No),
            Column::new("Name", DriverField::Name),
            Column::new("Email", DriverField::Email),
            Column::new("Phone", DriverField::Phone),
            Column::new("Address", DriverField::Address),
            Column::new("Action", DriverField::Actions).with_render(action_hints::<DriverRow>),
        ]
    }

    fn rows(drivers: &[Driver]) -> Vec<Self> {
        drivers
            .iter()
            .enumerate()
            .map(|(i, driver)| DriverRow::new(i + 1, driver))
            .collect()
    }

    fn id(&self) -> u64 {
        self.driver.id
    }

    fn delete_label(&self) -> String {
        self.driver.name.clone()
    }

    async fn fetch_all(api: &dyn AdminApi) -> Result<Vec<Driver>, ApiError> {
        api.list_drivers().await
    }
}

/// Pending "are you sure?" question for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub kind: EntityKind,
    pub id: u64,
    pub label: String,
}

impl DeleteConfirmation {
    pub fn for_row<L: EntityListing>(row: &L) -> Self {
        Self {
            kind: L::KIND,
            id: row.id(),
            label: row.delete_label(),
        }
    }

    pub fn prompt(&self) -> String {
        format!("Delete {} \"{}\"?", self.kind, self.label)
    }

    /// `None` when the user declined
    pub fn answer(self, confirmed: bool) -> Option<DeleteRequest> {
        confirmed.then_some(DeleteRequest {
            kind: self.kind,
            id: self.id,
        })
    }
}

/// A confirmed delete, ready to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRequest {
    pub kind: EntityKind,
    pub id: u64,
}

impl DeleteRequest {
    /// Delete, then drop every cached entry of the deleted entity's kind
    pub async fn send(self, api: &dyn AdminApi, cache: &QueryCache) -> Result<Navigation, String> {
        match delete_entity(api, self.kind, self.id).await {
            Ok(()) => {
                cache.invalidate_kind(self.kind);
                info!("Deleted {} {}", self.kind, self.id);
                Ok(Navigation::to_list(self.kind, SuccessReason::Deleted))
            }
            Err(err) => {
                warn!("Failed to delete {} {}: {}", self.kind, self.id, err);
                Err(err.user_message(|| format!("Failed to delete {}. Please try again.", self.kind)))
            }
        }
    }
}
