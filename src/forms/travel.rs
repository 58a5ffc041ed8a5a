//! Travel create/edit form

use async_trait::async_trait;

use super::controller::EntityForm;
use super::validation::{parse_number, Candidate, Check, Pattern, Rule, RuleSet, ValidationErrors};
use super::FormValues;
use crate::api::{AdminApi, ApiError, EntityKind};
use crate::models::{Travel, TravelPayload, TravelType};
use crate::table::format_number;

pub mod fields {
    pub const TYPE: &str = "type";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const CITY_FROM: &str = "city_from";
    pub const CITY_TO: &str = "city_to";
    pub const PRICE: &str = "price";
    pub const DEPARTURE_DATE: &str = "departure_date";
    pub const RETURN_DATE: &str = "return_date";
    pub const CAPACITY: &str = "capacity";
}

const TRAVEL_TYPES: &[&str] = &["inter_city", "tourism"];
const DATE_FORMAT_MESSAGE: &str = "Date format must be YYYY-MM-DD";

fn is_inter_city(candidate: &Candidate<'_>) -> bool {
    candidate.value(fields::TYPE) == TravelType::InterCity.as_str()
}

fn has_both_cities(candidate: &Candidate<'_>) -> bool {
    candidate.is_supplied(fields::CITY_FROM) && candidate.is_supplied(fields::CITY_TO)
}

pub struct TravelForm;

impl TravelForm {
    /// Whether the origin/destination inputs should be shown for `values`
    pub fn shows_cities(values: &FormValues) -> bool {
        values.get(fields::TYPE) == TravelType::InterCity.as_str()
    }
}

#[async_trait]
impl EntityForm for TravelForm {
    type Entity = Travel;
    type Payload = TravelPayload;

    const KIND: EntityKind = EntityKind::Travel;

    fn defaults() -> FormValues {
        FormValues::new()
            .with(fields::TYPE, TravelType::Tourism.as_str())
            .with(fields::TITLE, "")
            .with(fields::DESCRIPTION, "")
            .with(fields::CITY_FROM, "")
            .with(fields::CITY_TO, "")
            .with(fields::PRICE, "")
            .with(fields::DEPARTURE_DATE, "")
            .with(fields::RETURN_DATE, "")
            .with(fields::CAPACITY, "1")
    }

    fn values_from(travel: &Travel) -> FormValues {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        FormValues::new()
            .with(fields::TYPE, travel.travel_type.as_str())
            .with(fields::TITLE, travel.title.clone())
            .with(fields::DESCRIPTION, text(&travel.description))
            .with(fields::CITY_FROM, text(&travel.city_from))
            .with(fields::CITY_TO, text(&travel.city_to))
            .with(fields::PRICE, format_number(travel.price))
            .with(fields::DEPARTURE_DATE, travel.departure_date.clone())
            .with(fields::RETURN_DATE, text(&travel.return_date))
            .with(fields::CAPACITY, travel.capacity.to_string())
    }

    fn rules() -> RuleSet {
        RuleSet::new()
            .rule(Rule::new(fields::TYPE, Check::OneOf(TRAVEL_TYPES), "Please select a travel type"))
            .rule(Rule::new(
                fields::TITLE,
                Check::MinLength(3),
                "Title must be at least 3 characters",
            ))
            .rule(
                Rule::new(
                    fields::DESCRIPTION,
                    Check::MinLength(10),
                    "Description must be at least 10 characters",
                )
                .if_present(),
            )
            .rule(Rule::new(fields::PRICE, Check::Number, "Price must be a number").if_present())
            .rule(Rule::new(fields::PRICE, Check::MinNumber(1.0), "Price must be greater than 0"))
            .rule(Rule::new(
                fields::DEPARTURE_DATE,
                Check::Pattern(Pattern::IsoDate),
                DATE_FORMAT_MESSAGE,
            ))
            .rule(
                Rule::new(fields::RETURN_DATE, Check::Pattern(Pattern::IsoDate), DATE_FORMAT_MESSAGE)
                    .if_present(),
            )
            .rule(Rule::new(
                fields::CAPACITY,
                Check::WholeNumber,
                "Capacity must be a whole number",
            ))
            .rule(Rule::new(fields::CAPACITY, Check::MinNumber(1.0), "Capacity must be at least 1"))
            .rule(
                Rule::new(
                    fields::CITY_FROM,
                    Check::Satisfies(has_both_cities),
                    "City From and City To are required for inter city travel",
                )
                .when(is_inter_city),
            )
    }

    fn payload(values: &FormValues) -> Result<TravelPayload, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let travel_type = TravelType::parse(values.get(fields::TYPE));
        if travel_type.is_none() {
            errors.insert(fields::TYPE, "Please select a travel type");
        }

        let price = parse_number(values.get(fields::PRICE)).and_then(price_number);
        if price.is_none() {
            errors.insert(fields::PRICE, "Price must be a number");
        }

        let capacity = values
            .get(fields::CAPACITY)
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| u32::try_from(n).ok());
        if capacity.is_none() {
            errors.insert(fields::CAPACITY, "Capacity is too large");
        }

        let (Some(travel_type), Some(price), Some(capacity)) = (travel_type, price, capacity) else {
            return Err(errors);
        };

        let (city_from, city_to) = match travel_type {
            TravelType::InterCity => (values.non_blank(fields::CITY_FROM), values.non_blank(fields::CITY_TO)),
            TravelType::Tourism => (None, None),
        };

        Ok(TravelPayload {
            travel_type,
            title: values.get(fields::TITLE).trim().to_string(),
            description: values.non_blank(fields::DESCRIPTION),
            city_from,
            city_to,
            price,
            departure_date: values.get(fields::DEPARTURE_DATE).trim().to_string(),
            return_date: values.non_blank(fields::RETURN_DATE),
            capacity,
        })
    }

    async fn fetch(api: &dyn AdminApi, id: u64) -> Result<Travel, ApiError> {
        api.get_travel(id).await
    }

    async fn create(api: &dyn AdminApi, payload: &TravelPayload) -> Result<(), ApiError> {
        api.create_travel(payload).await
    }

    async fn update(api: &dyn AdminApi, id: u64, payload: &TravelPayload) -> Result<(), ApiError> {
        api.update_travel(id, payload).await
    }
}

/// Whole prices go out as JSON integers, fractional ones as floats
fn price_number(price: f64) -> Option<serde_json::Number> {
    if price.fract() == 0.0 && price.abs() < 9.0e15 {
        Some(serde_json::Number::from(price as i64))
    } else {
        serde_json::Number::from_f64(price)
    }
}
