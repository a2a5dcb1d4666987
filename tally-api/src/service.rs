// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use ::rocket::http::Status;
use std::sync::Arc;
use tally_common::types::{
    QueryRequest,
    QueryResponse,
    Record,
    DATABASE_ERROR_MESSAGE,
};
use tally_storage::repository::CountRepository;

/// Validates count queries, runs them against a repository and wraps the
/// outcome in a response envelope.
#[derive(Clone)]
pub struct QueryService {
    repository: Arc<dyn CountRepository>,
}

impl QueryService {
    #[allow(missing_docs)]
    pub fn new(repository: Arc<dyn CountRepository>) -> Self {
        Self { repository }
    }

    /// Answer a count query. Every failure is reported inside the envelope.
    pub async fn get_info(&self, request: &QueryRequest) -> QueryResponse {
        let query = match request.validate() {
            Ok(query) => query,
            Err(e) => {
                log::debug!("Rejected {:?}: {}", request, e);
                return QueryResponse::failure(Status::BadRequest.code, e.to_string());
            }
        };
        match self.repository.aggregate_counts(&query).await {
            Ok(records) => QueryResponse::success(records.into_iter().map(Record::from).collect()),
            Err(e) => {
                log::error!("{}: {}", DATABASE_ERROR_MESSAGE, e);
                QueryResponse::failure(Status::InternalServerError.code, DATABASE_ERROR_MESSAGE)
            }
        }
    }

    /// Whether the repository currently answers
    pub async fn is_healthy(&self) -> bool {
        match self.repository.ping().await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Store ping failed: {}", e);
                false
            }
        }
    }
}
