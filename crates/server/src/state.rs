//! Application state shared across request handlers.

use std::sync::Arc;

use axum::http::StatusCode;
use scholar_service::{Locale, Message, MutationService, QueryService, ServiceError};
use scholar_storage::RecordStore;

use crate::config::ServerConfig;
use crate::envelope::ApiError;

pub struct AppState {
    pub query: QueryService,
    pub mutation: MutationService,
    /// Optional API key for mutating routes. None = no auth required.
    pub api_key: Option<String>,
    pub locale: Locale,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: &ServerConfig) -> Self {
        AppState {
            query: QueryService::new(store.clone()).with_max_page_limit(config.max_page_limit),
            mutation: MutationService::new(store),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            locale: config.locale,
        }
    }

    pub(crate) fn fail(&self, err: ServiceError) -> ApiError {
        ApiError::from_service(err, self.locale)
    }

    pub(crate) fn reject(&self, status: StatusCode, message: Message) -> ApiError {
        ApiError::from_message(status, message, self.locale)
    }

    pub(crate) fn text(&self, message: Message) -> &'static str {
        message.text(self.locale)
    }
}
