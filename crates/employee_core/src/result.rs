//! Uniform outcome of every lookup and use case.
//!
//! A [`ResultModel`] is exactly one of success-with-payload, domain
//! not-found, or infrastructure failure. The enum shape makes "payload iff
//! Ok" impossible to violate.

use serde::{Deserialize, Serialize};

/// Status classification of a [`ResultModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Ok,
    NotFound,
    InternalServerError,
}

/// Outcome container returned to callers.
///
/// Serializes as `{"status":"ok","payload":..}`, `{"status":"not_found"}` or
/// `{"status":"internal_server_error"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
#[must_use]
pub enum ResultModel<T> {
    Ok(T),
    NotFound,
    InternalServerError,
}

impl<T> ResultModel<T> {
    pub fn ok(value: T) -> Self {
        Self::Ok(value)
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn internal_server_error() -> Self {
        Self::InternalServerError
    }

    /// `Some` becomes `Ok`, `None` becomes `NotFound`.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::NotFound, Self::Ok)
    }

    pub fn status(&self) -> ResultStatus {
        match self {
            Self::Ok(_) => ResultStatus::Ok,
            Self::NotFound => ResultStatus::NotFound,
            Self::InternalServerError => ResultStatus::InternalServerError,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::NotFound | Self::InternalServerError => None,
        }
    }

    pub fn into_payload(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::NotFound | Self::InternalServerError => None,
        }
    }

    /// Transforms the payload, keeping non-Ok statuses as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultModel<U> {
        match self {
            Self::Ok(value) => ResultModel::Ok(f(value)),
            Self::NotFound => ResultModel::NotFound,
            Self::InternalServerError => ResultModel::InternalServerError,
        }
    }
}
