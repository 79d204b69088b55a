pub mod backend;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod index_store;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod navigator;
pub mod runtime;
pub mod search;
pub mod selection;
pub mod timer;
pub mod transport;
pub mod view;

pub use backend::{FetchError, LookupBackend, LookupRequest, RequestId, SearchError, SearchRequest};
pub use config::LookupConfig;
pub use lookup::{Lookup, LookupEffect, Notification, NotifyVariant};
pub use model::Record;
pub use navigator::NavKey;
