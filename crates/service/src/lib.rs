//! scholar-service: the query and mutation services behind the HTTP API.
//!
//! Both services hold an `Arc<dyn RecordStore>` and are cheap to clone.
//! Input validation happens here, before anything reaches the store.

mod error;
mod messages;
mod mutation;
mod query;

pub use error::ServiceError;
pub use messages::{Locale, Message};
pub use mutation::{ImportFailure, ImportReport, MutationService};
pub use query::{ExpandedResult, ListParams, QueryService, ResultPage};

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
