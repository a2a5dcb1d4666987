// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use crate::service::QueryService;
use ::rocket::{
    config::Shutdown,
    http::Status,
    Config,
};
use serde::Serialize;
use std::borrow::Cow;
use tally_common::{
    config::ApiConfig,
    types::QueryResponse,
};
use thiserror::Error;

mod rocket;

pub use self::rocket::construct_rocket;

#[derive(Error, Debug)]
pub(crate) enum ListenerError {
    #[error("request body cannot be empty")]
    EmptyBody,
    #[error("query param cannot be empty")]
    EmptyQueryParam,
    #[error("Key not found")]
    KeyNotFound,
    #[error("No endpoint found!")]
    NotFound,
    #[error(transparent)]
    BadParse(anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ListenerError {
    pub fn status(&self) -> Status {
        match self {
            ListenerError::KeyNotFound | ListenerError::NotFound => Status::NotFound,
            ListenerError::EmptyBody | ListenerError::EmptyQueryParam | ListenerError::BadParse(_) => {
                Status::BadRequest
            }
            _ => Status::InternalServerError,
        }
    }

    pub fn code(&self) -> u16 {
        self.status().code
    }
}

#[derive(Clone, Debug, Serialize)]
struct ErrorBody {
    #[serde(skip_serializing)]
    status: Status,
    code: u16,
    message: Cow<'static, str>,
}

impl From<ListenerError> for ErrorBody {
    fn from(err: ListenerError) -> Self {
        Self {
            status: err.status(),
            code: err.code(),
            message: err.to_string().into(),
        }
    }
}

/// A query envelope on its way out. Answered with `200` on success and
/// with the envelope code as HTTP status otherwise.
#[derive(Clone, Debug)]
pub(crate) struct Envelope(QueryResponse);

impl Envelope {
    fn status(&self) -> Status {
        if self.0.is_success() {
            Status::Ok
        } else {
            Status::from_code(self.0.code).unwrap_or(Status::InternalServerError)
        }
    }
}

impl From<QueryResponse> for Envelope {
    fn from(response: QueryResponse) -> Self {
        Self(response)
    }
}

/// Rocket configuration for the listener described by `config`
pub fn rocket_config(config: &ApiConfig) -> Config {
    Config {
        address: config.address,
        port: config.port,
        shutdown: Shutdown {
            grace: config.shutdown_grace,
            mercy: config.shutdown_mercy,
            ..Default::default()
        },
        ..Config::default()
    }
}
