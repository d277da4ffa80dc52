//! # Response Envelope
//!
//! Every backend response has the shape `{success, data, message}`; list
//! responses may add `total`.

use crate::{Error, GENERIC_ERROR};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub total: Option<u64>,
}

impl<T> Envelope<T> {
    /// Pass a successful envelope through, map `success: false` to
    /// [`Error::Server`] with the backend's message.
    pub fn into_success(self, service: &'static str) -> Result<Self, Error> {
        if self.success {
            return Ok(self);
        }
        let message = self
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_ERROR.to_string());
        tracing::error!(service, "{}", message);
        Err(Error::Server(message))
    }

    /// The payload, which must be present.
    pub fn into_data(self) -> Result<T, Error> {
        self.data
            .ok_or_else(|| Error::Server("response carried no data".to_string()))
    }
}

impl<T> Envelope<Vec<T>> {
    /// The payload of a list response; a missing list is empty.
    pub fn into_list(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}
