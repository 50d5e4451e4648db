//! Ancillary-store projections of the cached record types.

use std::str::FromStr;

use crate::domain::company::Company;
use crate::domain::foundation::{CompanyId, Email, PromoId, UserId, ValidationError};
use crate::domain::promo::PromoSummary;
use crate::domain::user::User;
use crate::ports::{CacheRecord, RecordFields};

fn field<'a>(fields: &'a RecordFields, name: &str) -> Result<&'a str, ValidationError> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ValidationError::empty_field(name))
}

fn parse<T>(fields: &RecordFields, name: &str) -> Result<T, ValidationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    field(fields, name)?
        .parse()
        .map_err(|e: T::Err| ValidationError::invalid_format(name, e.to_string()))
}

fn fields_of<const N: usize>(pairs: [(&str, String); N]) -> RecordFields {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

impl CacheRecord for Company {
    type Id = CompanyId;
    const NAMESPACE: &'static str = "company";

    fn record_id(&self) -> CompanyId {
        self.id
    }

    fn to_fields(&self) -> RecordFields {
        fields_of([
            ("id", self.id.to_string()),
            ("name", self.name.clone()),
            ("email", self.email.to_string()),
            ("password_hash", self.password_hash.clone()),
        ])
    }

    fn from_fields(fields: &RecordFields) -> Result<Self, ValidationError> {
        Ok(Self {
            id: parse(fields, "id")?,
            name: field(fields, "name")?.to_string(),
            email: Email::parse(field(fields, "email")?)?,
            password_hash: field(fields, "password_hash")?.to_string(),
        })
    }
}

impl CacheRecord for User {
    type Id = UserId;
    const NAMESPACE: &'static str = "user";

    fn record_id(&self) -> UserId {
        self.id
    }

    fn to_fields(&self) -> RecordFields {
        let mut fields = fields_of([
            ("id", self.id.to_string()),
            ("name", self.name.clone()),
            ("surname", self.surname.clone()),
            ("email", self.email.to_string()),
            ("age", self.age.to_string()),
            ("country", self.country.clone()),
            ("password_hash", self.password_hash.clone()),
        ]);
        if let Some(avatar_url) = &self.avatar_url {
            fields.insert("avatar_url".to_string(), avatar_url.clone());
        }
        fields
    }

    fn from_fields(fields: &RecordFields) -> Result<Self, ValidationError> {
        Ok(Self {
            id: parse(fields, "id")?,
            name: field(fields, "name")?.to_string(),
            surname: field(fields, "surname")?.to_string(),
            email: Email::parse(field(fields, "email")?)?,
            avatar_url: fields.get("avatar_url").cloned(),
            age: parse(fields, "age")?,
            country: field(fields, "country")?.to_string(),
            password_hash: field(fields, "password_hash")?.to_string(),
        })
    }
}

impl CacheRecord for PromoSummary {
    type Id = PromoId;
    const NAMESPACE: &'static str = "promo";

    fn record_id(&self) -> PromoId {
        self.promo_id
    }

    fn to_fields(&self) -> RecordFields {
        fields_of([
            ("promo_id", self.promo_id.to_string()),
            ("company_id", self.company_id.to_string()),
            ("like_count", self.like_count.to_string()),
            ("used_count", self.used_count.to_string()),
            ("active", self.active.to_string()),
        ])
    }

    fn from_fields(fields: &RecordFields) -> Result<Self, ValidationError> {
        Ok(Self {
            promo_id: parse(fields, "promo_id")?,
            company_id: parse(fields, "company_id")?,
            like_count: parse(fields, "like_count")?,
            used_count: parse(fields, "used_count")?,
            active: parse(fields, "active")?,
        })
    }
}
