//! Typed response schemas for the backend resources.
//!
//! Each model names the fields the client relies on and keeps everything else
//! the backend sends in `extra`, so payloads round-trip without loss while
//! missing or mistyped required fields fail decoding at the request boundary.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Backend primary key.
pub type Id = u64;

/// Unknown fields preserved from the payload.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Deserialize `null` as the type's default, for fields the backend may null out.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept RFC 3339 timestamps and naive ones (`T` or space separated), the
/// latter read as UTC.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// Common view over every resource model.
pub trait Record {
    fn id(&self) -> Id;

    /// Short human-readable name for listings.
    fn label(&self) -> String;

    fn status(&self) -> Option<&str> {
        None
    }
}

/// Implement [`Record`] for a model from its label field and optional status field.
/// Defined ahead of the submodules so they see it.
macro_rules! impl_record {
    ($model:ty, $label:ident) => {
        impl $crate::models::Record for $model {
            fn id(&self) -> $crate::models::Id {
                self.id
            }

            fn label(&self) -> String {
                self.$label.clone()
            }
        }
    };
    ($model:ty, $label:ident, $status:ident) => {
        impl $crate::models::Record for $model {
            fn id(&self) -> $crate::models::Id {
                self.id
            }

            fn label(&self) -> String {
                self.$label.clone()
            }

            fn status(&self) -> Option<&str> {
                self.$status.as_deref()
            }
        }
    };
}

mod activity;
mod organization;
mod page;
mod quality;

pub use activity::{HistoryEntry, Todo};
pub use organization::{Authorization, Client, Contact, Department, Person, Team, User};
pub use page::{ListPayload, Page};
pub use quality::{
    Document, Element, Output, OutputTemplate, Phase, PhaseTemplate, Ppap, Project,
};
