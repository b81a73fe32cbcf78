use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::error::FieldError;

pub const MAX_PAGE_LIMIT: i64 = 100;

/// A stored hero. Always carries the id the store assigned to it.
#[derive(Clone, FromRow)]
pub struct Hero {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub secret_name: String,
}

impl Hero {
    /// Merges explicitly-set fields; everything else keeps its stored value.
    pub fn apply(&mut self, changes: &[HeroChange]) {
        for change in changes {
            match change {
                HeroChange::Name(name) => self.name = name.clone(),
                HeroChange::Age(age) => self.age = *age,
                HeroChange::Gender(gender) => self.gender = gender.clone(),
                HeroChange::SecretName(secret_name) => self.secret_name = secret_name.clone(),
            }
        }
    }
}

impl PartialEq for Hero {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Hero {}

impl fmt::Debug for Hero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hero")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("age", &self.age)
            .field("gender", &self.gender)
            .field("secret_name", &"<redacted>")
            .finish()
    }
}

/// A hero that has not been persisted yet, so it has no id.
#[derive(Clone, PartialEq, Eq)]
pub struct NewHero {
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub secret_name: String,
}

impl From<HeroCreate> for NewHero {
    fn from(input: HeroCreate) -> Self {
        Self {
            name: input.name,
            age: input.age,
            gender: input.gender,
            secret_name: input.secret_name,
        }
    }
}

impl fmt::Debug for NewHero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewHero")
            .field("name", &self.name)
            .field("age", &self.age)
            .field("gender", &self.gender)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroCreate {
    pub name: String,
    #[serde(alias = "secret_name")]
    pub secret_name: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// PATCH body. `None` means the caller omitted the field, `Some(None)` means
/// an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroUpdate {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, alias = "secret_name", deserialize_with = "present")]
    pub secret_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub age: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub gender: Option<Option<String>>,
}

impl HeroUpdate {
    /// `name` and `secretName` are NOT NULL columns, so an explicit null is rejected.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if matches!(self.name, Some(None)) {
            errors.push(FieldError::new(
                &["body", "name"],
                "Input should be a valid string",
                "string_type",
            ));
        }
        if matches!(self.secret_name, Some(None)) {
            errors.push(FieldError::new(
                &["body", "secretName"],
                "Input should be a valid string",
                "string_type",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The explicitly-set fields, in column order.
    pub fn changes(&self) -> Vec<HeroChange> {
        let mut changes = Vec::new();

        if let Some(Some(name)) = &self.name {
            changes.push(HeroChange::Name(name.clone()));
        }
        if let Some(age) = self.age {
            changes.push(HeroChange::Age(age));
        }
        if let Some(gender) = &self.gender {
            changes.push(HeroChange::Gender(gender.clone()));
        }
        if let Some(Some(secret_name)) = &self.secret_name {
            changes.push(HeroChange::SecretName(secret_name.clone()));
        }

        changes
    }
}

/// One field a caller explicitly set in an update.
#[derive(Clone, PartialEq, Eq)]
pub enum HeroChange {
    Name(String),
    Age(Option<i64>),
    Gender(Option<String>),
    SecretName(String),
}

impl HeroChange {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Age(_) => "age",
            Self::Gender(_) => "gender",
            Self::SecretName(_) => "secret_name",
        }
    }
}

impl fmt::Debug for HeroChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Age(age) => f.debug_tuple("Age").field(age).finish(),
            Self::Gender(gender) => f.debug_tuple("Gender").field(gender).finish(),
            Self::SecretName(_) => f.debug_tuple("SecretName").field(&"<redacted>").finish(),
        }
    }
}

/// The only shape a hero is ever serialized in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroPublic {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
}

impl From<Hero> for HeroPublic {
    fn from(hero: Hero) -> Self {
        Self {
            id: hero.id,
            name: hero.name,
            age: hero.age,
            gender: hero.gender,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListHeroesQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for ListHeroesQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: default_limit(),
        }
    }
}

impl ListHeroesQuery {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.offset < 0 {
            errors.push(FieldError::new(
                &["query", "offset"],
                "Input should be greater than or equal to 0",
                "greater_than_equal",
            ));
        }
        if self.limit > MAX_PAGE_LIMIT {
            errors.push(FieldError::new(
                &["query", "limit"],
                format!("Input should be less than or equal to {MAX_PAGE_LIMIT}"),
                "less_than_equal",
            ));
        } else if self.limit < 0 {
            errors.push(FieldError::new(
                &["query", "limit"],
                "Input should be greater than or equal to 0",
                "greater_than_equal",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeleteAck {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
}

const fn default_limit() -> i64 {
    MAX_PAGE_LIMIT
}

/// Wraps any value that was present in the payload, `null` included.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
