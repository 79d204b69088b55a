use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::LookupConfig;
use crate::lookup::{LookupEffect, Notification};
use crate::model::Record;
use crate::navigator::NavKey;
use crate::view::LookupView;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum WidgetRequest {
    Input { text: String },
    Focus,
    Blur,
    Key { key: NavKey },
    ClickRow { id: String },
    ClickDropdown,
    /// Advances the service clock and fires any due timers.
    Tick { elapsed_ms: u64 },
    SetValue { records: Option<Vec<Record>> },
    GetSelection,
    Remove { id: String },
    Clear,
    /// Saves the open create form with the given field values.
    CreateRecord { fields: BTreeMap<String, String> },
    CreationFailed { message: String },
    CloseCreateForm,
    /// Replaces the field configuration; missing keys take their defaults.
    Configure { config: LookupConfig },
    View,
}

/// Effects that leave the service for the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum HostEvent {
    SelectionChanged { selection: Vec<Record> },
    Notify(Notification),
    BlurInput,
}

impl HostEvent {
    /// Host-facing form of an effect; remote requests stay inside the service.
    pub fn from_effect(effect: LookupEffect) -> Option<Self> {
        match effect {
            LookupEffect::SelectionChanged(selection) => Some(Self::SelectionChanged { selection }),
            LookupEffect::Notify(notification) => Some(Self::Notify(notification)),
            LookupEffect::BlurInput => Some(Self::BlurInput),
            LookupEffect::Search(_) | LookupEffect::FetchRecord(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WidgetResponse {
    pub events: Vec<HostEvent>,
    pub view: LookupView,
}
