use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::Deref;

/// Kind of trip a travel offering represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelType {
    InterCity,
    Tourism,
}

impl TravelType {
    pub const ALL: [TravelType; 2] = [TravelType::InterCity, TravelType::Tourism];

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelType::InterCity => "inter_city",
            TravelType::Tourism => "tourism",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TravelType::InterCity => "Inter City",
            TravelType::Tourism => "Tourism",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Travel {
    pub id: u64,
    #[serde(rename = "type")]
    pub travel_type: TravelType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city_from: Option<String>,
    #[serde(default)]
    pub city_to: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub price: f64,
    pub departure_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    pub capacity: u32,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Accepts `500000`, `500000.5` or `"500000.00"` (decimal columns arrive as strings)
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid number '{}'", s))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Driver,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Driver => "driver",
            Role::Customer => "customer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub user_id: u64,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// A user whose role is known to be `driver`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "User", into = "User")]
pub struct Driver(User);

impl Driver {
    pub fn into_user(self) -> User {
        self.0
    }

    pub fn phone(&self) -> Option<&str> {
        self.0.profile.as_ref().and_then(|p| p.phone.as_deref())
    }

    pub fn address(&self) -> Option<&str> {
        self.0.profile.as_ref().and_then(|p| p.address.as_deref())
    }
}

impl Deref for Driver {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl TryFrom<User> for Driver {
    type Error = String;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        if user.role == Role::Driver {
            Ok(Driver(user))
        } else {
            Err(format!(
                "user {} has role '{}', expected 'driver'",
                user.id,
                user.role.as_str()
            ))
        }
    }
}

impl From<Driver> for User {
    fn from(driver: Driver) -> Self {
        driver.0
    }
}

/// Envelope used by the travel endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: u16,
}

/// Raw payload returned by `GET /driver`
#[derive(Debug, Clone, Deserialize)]
pub struct DriverListPayload {
    #[serde(default)]
    pub drivers: Vec<Driver>,
}

/// Raw payload returned by `GET /driver/{id}`; the backend has used all three shapes
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DriverPayloadBody {
    Wrapped { driver: Driver },
    Data { data: Driver },
    Bare(Driver),
}

impl DriverPayloadBody {
    pub fn into_driver(self) -> Driver {
        match self {
            DriverPayloadBody::Wrapped { driver } => driver,
            DriverPayloadBody::Data { data } => data,
            DriverPayloadBody::Bare(driver) => driver,
        }
    }
}

/// Body of `POST /admin/travel` and `PUT /admin/travel/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelPayload {
    #[serde(rename = "type")]
    pub travel_type: TravelType,
    pub title: String,
    pub description: Option<String>,
    pub city_from: Option<String>,
    pub city_to: Option<String>,
    pub price: serde_json::Number,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub capacity: u32,
}

/// Body of `POST /driver` and `PUT /driver/{id}`; absent keys are left unchanged by the backend
#[derive(Clone, PartialEq, Serialize)]
pub struct DriverPayload {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_confirmation: Option<String>,
}

impl fmt::Debug for DriverPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("DriverPayload")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("phone", &self.phone)
            .field("address", &self.address)
            .field("password", &redact(&self.password))
            .field("password_confirmation", &redact(&self.password_confirmation))
            .finish()
    }
}
