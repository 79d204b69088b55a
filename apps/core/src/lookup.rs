//! The lookup state machine.
//!
//! A [`Lookup`] owns the query, the last search results, the selection, the
//! field focus and the two timers (search debounce and delayed blur-hide).
//! It never performs I/O: remote work and host notifications are queued as
//! [`LookupEffect`]s which the host drains with [`Lookup::drain_effects`].
//! Remote completions are fed back through [`Lookup::complete_search`] and
//! [`Lookup::complete_fetch`] and are dropped when they are no longer the
//! latest request of their kind.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{FetchError, LookupRequest, RequestId, SearchError, SearchRequest};
use crate::config::LookupConfig;
use crate::model::{normalize_query, Record, CREATE_NEW_ID};
use crate::navigator::{NavKey, NavPhase, Navigator};
use crate::selection::Selection;
use crate::timer::TimerSlot;

pub const SEARCH_ERROR_TITLE: &str = "Lookup Error";
pub const SEARCH_ERROR_MESSAGE: &str = "An error occurred while searching with the lookup field.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyVariant {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub variant: NotifyVariant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupEffect {
    Search(SearchRequest),
    FetchRecord(LookupRequest),
    SelectionChanged(Vec<Record>),
    Notify(Notification),
    /// The host should drop keyboard focus from the input element.
    BlurInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationState {
    Closed,
    FormOpen,
    Fetching(RequestId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationPhase {
    Closed,
    FormOpen,
    Fetching,
}

impl From<CreationState> for CreationPhase {
    fn from(value: CreationState) -> Self {
        match value {
            CreationState::Closed => Self::Closed,
            CreationState::FormOpen => Self::FormOpen,
            CreationState::Fetching(_) => Self::Fetching,
        }
    }
}

/// A dropdown row: a search result, or the trailing "create new" row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row<'a> {
    Result(&'a Record),
    CreateNew,
}

impl Row<'_> {
    pub fn id(&self) -> &str {
        match self {
            Row::Result(record) => &record.id,
            Row::CreateNew => CREATE_NEW_ID,
        }
    }
}

#[derive(Debug)]
pub struct Lookup {
    config: LookupConfig,
    query: String,
    clean_query: String,
    results: Vec<Record>,
    no_results: bool,
    errors: Vec<String>,
    selection: Selection,
    nav: Navigator,
    search_timer: TimerSlot,
    blur_timer: TimerSlot,
    latest_search: Option<RequestId>,
    creation: CreationState,
    next_request: u64,
    effects: Vec<LookupEffect>,
}

impl Lookup {
    pub fn new(config: LookupConfig) -> Self {
        Self {
            config,
            query: String::new(),
            clean_query: String::new(),
            results: Vec::new(),
            no_results: false,
            errors: Vec::new(),
            selection: Selection::default(),
            nav: Navigator::default(),
            search_timer: TimerSlot::default(),
            blur_timer: TimerSlot::default(),
            latest_search: None,
            creation: CreationState::Closed,
            next_request: 0,
            effects: Vec::new(),
        }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Applies a new configuration immediately. Dropping to single-select with
    /// several records keeps the first one and reports the change.
    pub fn reconfigure(&mut self, config: LookupConfig) {
        self.config = config;
        if !self.config.multi_select && self.selection.truncate_to_single() {
            self.emit_selection_changed();
        }
        if self.nav.valid_index(self.row_count()).is_none() {
            self.nav.clear_focus_index();
        }
    }

    // Accessors

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn clean_query(&self) -> &str {
        &self.clean_query
    }

    pub fn results(&self) -> &[Record] {
        &self.results
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn no_results(&self) -> bool {
        self.no_results
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn selection(&self) -> &[Record] {
        self.selection.records()
    }

    pub fn selection_ids(&self) -> Vec<String> {
        self.selection.ids()
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn has_focus(&self) -> bool {
        self.nav.has_focus()
    }

    pub fn focus_index(&self) -> Option<usize> {
        self.nav.focus_index()
    }

    pub fn phase(&self) -> NavPhase {
        self.nav.phase(self.has_results())
    }

    pub fn creation_state(&self) -> CreationState {
        self.creation
    }

    pub fn is_search_pending(&self) -> bool {
        self.search_timer.is_pending()
    }

    pub fn is_blur_pending(&self) -> bool {
        self.blur_timer.is_pending()
    }

    pub fn is_selection_allowed(&self) -> bool {
        self.selection.is_selection_allowed(self.config.multi_select)
    }

    pub fn is_dropdown_open(&self) -> bool {
        self.nav.has_focus() && (self.has_results() || self.no_results)
    }

    pub fn rows(&self) -> Vec<Row<'_>> {
        let mut rows: Vec<Row<'_>> = self.results.iter().map(Row::Result).collect();
        if self.config.creatable {
            rows.push(Row::CreateNew);
        }
        rows
    }

    pub fn row_count(&self) -> usize {
        self.results.len() + usize::from(self.config.creatable)
    }

    pub fn drain_effects(&mut self) -> Vec<LookupEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Earliest instant at which [`Lookup::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.search_timer.deadline(), self.blur_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // Input/search controller

    pub fn update_query(&mut self, raw: &str, now: Instant) {
        if !self.accepts_input() {
            debug!("lookup input ignored: selection not allowed");
            return;
        }
        self.no_results = false;
        self.nav.clear_focus_index();
        self.query = raw.to_string();

        let clean = normalize_query(raw);
        if clean == self.clean_query {
            return;
        }
        self.clean_query = clean;

        if self.clean_query.chars().count() < self.config.min_search_length {
            self.results.clear();
            self.search_timer.cancel();
            self.latest_search = None;
            return;
        }

        self.search_timer.schedule(now, self.config.search_delay());
    }

    /// Fires every timer whose deadline is at or before `now`, earliest first.
    pub fn tick(&mut self, now: Instant) {
        loop {
            let search_due = self.search_timer.deadline().filter(|at| *at <= now);
            let blur_due = self.blur_timer.deadline().filter(|at| *at <= now);
            match (search_due, blur_due) {
                (Some(search_at), Some(blur_at)) if blur_at < search_at => self.fire_blur(now),
                (Some(_), _) => self.fire_search(now),
                (None, Some(_)) => self.fire_blur(now),
                (None, None) => break,
            }
        }
    }

    fn fire_search(&mut self, now: Instant) {
        if self.search_timer.fire_if_due(now).is_none() {
            return;
        }
        if !self.accepts_input() {
            debug!("debounced search dropped: selection no longer allowed");
            return;
        }
        if self.clean_query.chars().count() < self.config.min_search_length {
            return;
        }

        let request_id = self.next_request_id();
        self.latest_search = Some(request_id);
        info!(%request_id, query = %self.clean_query, "lookup search issued");
        self.effects.push(LookupEffect::Search(SearchRequest {
            request_id,
            query: self.clean_query.clone(),
            exclude_ids: self.selection_ids(),
            object_name: self.config.object_api_name.clone(),
            primary_field: self.config.field_api_name.clone(),
            secondary_field: self.config.sub_field_api_name.clone(),
            max_results: self.config.limit,
        }));
    }

    fn fire_blur(&mut self, now: Instant) {
        if self.blur_timer.fire_if_due(now).is_some() {
            self.nav.on_focus_lost();
        }
    }

    pub fn complete_search(
        &mut self,
        request_id: RequestId,
        outcome: Result<Vec<Record>, SearchError>,
    ) {
        if self.latest_search != Some(request_id) {
            debug!(%request_id, "stale search completion dropped");
            return;
        }
        self.latest_search = None;

        match outcome {
            Ok(records) => {
                debug!(%request_id, count = records.len(), "lookup search completed");
                self.no_results = records.is_empty();
                self.results = records;
                self.nav.clear_focus_index();
            }
            Err(error) => {
                warn!(%request_id, %error, "lookup search failed");
                self.errors = vec![error.to_string()];
                self.notify(SEARCH_ERROR_TITLE, SEARCH_ERROR_MESSAGE, NotifyVariant::Error);
            }
        }
    }

    // Focus/keyboard navigator

    pub fn focus(&mut self) {
        if !self.accepts_input() {
            return;
        }
        self.blur_timer.cancel();
        self.nav.on_focus();
    }

    /// The field lost focus. Hiding is delayed so a click on a dropdown row
    /// can still land.
    pub fn blur(&mut self, now: Instant) {
        if !self.nav.has_focus() {
            return;
        }
        self.blur_timer.schedule(now, self.config.blur_delay());
    }

    /// A pointer interaction on the dropdown: cancels the pending hide and
    /// closes the dropdown right away.
    pub fn click_dropdown(&mut self) {
        self.blur_timer.cancel();
        self.nav.on_focus_lost();
    }

    pub fn click_row(&mut self, id: &str) {
        self.click_dropdown();
        self.select_record(id);
    }

    pub fn key_down(&mut self, key: NavKey) {
        if !self.accepts_input() || !self.is_dropdown_open() {
            return;
        }
        let row_count = self.row_count();

        match key {
            NavKey::ArrowDown => {
                self.nav.move_down(row_count);
            }
            NavKey::ArrowUp => {
                self.nav.move_up(row_count);
            }
            NavKey::Enter => {
                let Some(index) = self.nav.valid_index(row_count) else {
                    return;
                };
                let id = self.rows()[index].id().to_string();
                self.effects.push(LookupEffect::BlurInput);
                self.click_dropdown();
                self.select_record(&id);
            }
        }
    }

    // Selection manager

    pub fn select_record(&mut self, id: &str) {
        if id == CREATE_NEW_ID {
            self.open_create_form();
            return;
        }
        if !self.accepts_input() {
            debug!(id, "selection ignored: not allowed");
            return;
        }
        let Some(record) = self.results.iter().find(|record| record.id == id).cloned() else {
            debug!(id, "selection ignored: id not in current results");
            return;
        };
        if !self.selection.push(record, self.config.multi_select) {
            return;
        }
        self.reset_search();
        self.emit_selection_changed();
    }

    pub fn remove_record(&mut self, id: &str) {
        if self.config.read_only {
            return;
        }
        if self.selection.remove(id) {
            self.emit_selection_changed();
        }
    }

    pub fn clear_selection(&mut self) {
        if self.config.read_only {
            return;
        }
        self.selection.clear();
        self.emit_selection_changed();
    }

    /// Programmatic value from the host. Stored as an owned copy; emits
    /// nothing.
    pub fn set_selection(&mut self, records: Option<&[Record]>) {
        self.selection.replace(records, self.config.multi_select);
    }

    // Record creation

    fn open_create_form(&mut self) {
        if !self.config.creatable {
            self.creation = CreationState::Closed;
            return;
        }
        if !self.accepts_input() || self.creation != CreationState::Closed {
            return;
        }
        debug!("create form opened");
        self.creation = CreationState::FormOpen;
    }

    pub fn close_create_form(&mut self) {
        self.creation = CreationState::Closed;
    }

    /// The host's create form saved a new record with `record_id`.
    pub fn record_created(&mut self, record_id: &str) {
        if self.creation != CreationState::FormOpen {
            debug!(record_id, "record creation ignored: form not open");
            return;
        }
        let message = format!("Successfully created {}", self.config.label_of_object());
        self.notify("Success", &message, NotifyVariant::Success);

        let request_id = self.next_request_id();
        self.creation = CreationState::Fetching(request_id);
        self.effects.push(LookupEffect::FetchRecord(LookupRequest {
            request_id,
            object_name: self.config.object_api_name.clone(),
            record_id: record_id.to_string(),
            primary_field: self.config.field_api_name.clone(),
            secondary_field: self.config.sub_field_api_name.clone(),
        }));
    }

    pub fn complete_fetch(&mut self, request_id: RequestId, outcome: Result<Record, FetchError>) {
        if self.creation != CreationState::Fetching(request_id) {
            debug!(%request_id, "stale lookup completion dropped");
            return;
        }
        self.creation = CreationState::Closed;

        match outcome {
            Ok(record) => {
                let id = record.id.clone();
                if self.selection.push(record, self.config.multi_select) {
                    self.reset_search();
                    self.emit_selection_changed();
                } else {
                    warn!(id = %id, "created record not added: selection full or duplicate");
                    let message = format!(
                        "{} {id} was created but could not be selected",
                        self.config.label_of_object()
                    );
                    self.notify("Error", &message, NotifyVariant::Error);
                }
            }
            Err(error) => {
                warn!(%request_id, %error, "created record lookup failed");
                self.notify("Error", &error.to_string(), NotifyVariant::Error);
            }
        }
    }

    pub fn creation_failed(&mut self, message: &str) {
        if self.creation == CreationState::Closed {
            return;
        }
        warn!(reason = message, "record creation failed");
        self.creation = CreationState::Closed;
        self.notify("Error", message, NotifyVariant::Error);
    }

    // Internals

    fn accepts_input(&self) -> bool {
        !self.config.read_only && self.is_selection_allowed()
    }

    fn reset_search(&mut self) {
        self.query.clear();
        self.clean_query.clear();
        self.results.clear();
        self.no_results = false;
        self.nav.clear_focus_index();
        self.search_timer.cancel();
        self.latest_search = None;
    }

    fn emit_selection_changed(&mut self) {
        self.errors.clear();
        info!(count = self.selection.len(), "lookup selection changed");
        self.effects
            .push(LookupEffect::SelectionChanged(self.selection.snapshot()));
    }

    fn notify(&mut self, title: &str, message: &str, variant: NotifyVariant) {
        self.effects.push(LookupEffect::Notify(Notification {
            title: title.to_string(),
            message: message.to_string(),
            variant,
        }));
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }
}
