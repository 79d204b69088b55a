use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::backend::LookupBackend;
use crate::config::{validate, ConfigError, LookupConfig};
use crate::contract::{HostEvent, WidgetRequest, WidgetResponse};
use crate::index_store::{RecordStore, StoreError};
use crate::lookup::{CreationState, Lookup, LookupEffect};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Saves records created through the lookup's create form.
pub trait RecordCreator {
    fn create_record(
        &self,
        object_name: &str,
        fields: &std::collections::BTreeMap<String, String>,
    ) -> Result<String, StoreError>;
}

impl RecordCreator for RecordStore {
    fn create_record(
        &self,
        object_name: &str,
        fields: &std::collections::BTreeMap<String, String>,
    ) -> Result<String, StoreError> {
        RecordStore::create_record(self, object_name, fields)
    }
}

/// Drives one [`Lookup`] against a synchronous backend. Remote requests the
/// lookup emits are executed immediately and their completions fed back, so a
/// request returns only once the lookup is quiescent. Time is virtual and
/// only advances through [`WidgetRequest::Tick`].
pub struct LookupService<B> {
    lookup: Lookup,
    backend: B,
    now: Instant,
}

impl<B: LookupBackend> LookupService<B> {
    pub fn new(config: LookupConfig, backend: B) -> Result<Self, ServiceError> {
        validate(&config)?;
        Ok(Self {
            lookup: Lookup::new(config),
            backend,
            now: Instant::now(),
        })
    }

    pub fn lookup(&self) -> &Lookup {
        &self.lookup
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn reconfigure(&mut self, config: LookupConfig) -> Result<Vec<HostEvent>, ServiceError> {
        validate(&config)?;
        self.lookup.reconfigure(config);
        Ok(self.pump())
    }

    pub fn advance(&mut self, elapsed: Duration) -> Vec<HostEvent> {
        self.now += elapsed;
        self.lookup.tick(self.now);
        self.pump()
    }

    /// Runs queued remote requests through the backend until none are left
    /// and returns the host-facing events in emission order.
    pub fn pump(&mut self) -> Vec<HostEvent> {
        let mut events = Vec::new();
        loop {
            let effects = self.lookup.drain_effects();
            if effects.is_empty() {
                break;
            }
            for effect in effects {
                match effect {
                    LookupEffect::Search(request) => {
                        let outcome = self.backend.search(&request);
                        self.lookup.complete_search(request.request_id, outcome);
                    }
                    LookupEffect::FetchRecord(request) => {
                        let outcome = self.backend.fetch_record_by_lookup(&request);
                        self.lookup.complete_fetch(request.request_id, outcome);
                    }
                    other => events.extend(HostEvent::from_effect(other)),
                }
            }
        }
        events
    }
}

impl<B: LookupBackend + RecordCreator> LookupService<B> {
    pub fn handle(&mut self, request: WidgetRequest) -> Result<WidgetResponse, ServiceError> {
        debug!(?request, "lookup request");
        let mut events = Vec::new();

        match request {
            WidgetRequest::Input { text } => self.lookup.update_query(&text, self.now),
            WidgetRequest::Focus => self.lookup.focus(),
            WidgetRequest::Blur => self.lookup.blur(self.now),
            WidgetRequest::Key { key } => self.lookup.key_down(key),
            WidgetRequest::ClickRow { id } => self.lookup.click_row(&id),
            WidgetRequest::ClickDropdown => self.lookup.click_dropdown(),
            WidgetRequest::Tick { elapsed_ms } => {
                events.extend(self.advance(Duration::from_millis(elapsed_ms)));
            }
            WidgetRequest::SetValue { records } => self.lookup.set_selection(records.as_deref()),
            WidgetRequest::GetSelection | WidgetRequest::View => {}
            WidgetRequest::Remove { id } => self.lookup.remove_record(&id),
            WidgetRequest::Clear => self.lookup.clear_selection(),
            WidgetRequest::CreateRecord { fields } => self.create_record(&fields)?,
            WidgetRequest::CreationFailed { message } => self.lookup.creation_failed(&message),
            WidgetRequest::CloseCreateForm => self.lookup.close_create_form(),
            WidgetRequest::Configure { config } => events.extend(self.reconfigure(config)?),
        }

        events.extend(self.pump());
        Ok(WidgetResponse {
            events,
            view: self.lookup.view(),
        })
    }

    fn create_record(
        &mut self,
        fields: &std::collections::BTreeMap<String, String>,
    ) -> Result<(), ServiceError> {
        if self.lookup.creation_state() != CreationState::FormOpen {
            return Err(ServiceError::InvalidRequest(
                "create form is not open".to_string(),
            ));
        }
        let object_name = self.lookup.config().object_api_name.clone();
        match self.backend.create_record(&object_name, fields) {
            Ok(id) => self.lookup.record_created(&id),
            Err(error) => self.lookup.creation_failed(&error.to_string()),
        }
        Ok(())
    }
}
