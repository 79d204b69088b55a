use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_ICON;
use crate::lookup::{CreationPhase, Lookup, Row};
use crate::model::Record;
use crate::navigator::NavPhase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowView {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub icon: String,
    pub highlighted: bool,
    pub create_row: bool,
}

/// Render-ready snapshot of a [`Lookup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupView {
    pub label: String,
    pub placeholder: String,
    pub input_value: String,
    pub input_readonly: bool,
    pub dropdown_open: bool,
    pub phase: NavPhase,
    pub rows: Vec<RowView>,
    pub no_results: bool,
    pub errors: Vec<String>,
    pub selection: Vec<Record>,
    pub show_pills: bool,
    pub selection_icon: String,
    pub creation: CreationPhase,
    pub required_missing: bool,
}

impl Lookup {
    pub fn view(&self) -> LookupView {
        let config = self.config();
        let has_selection = self.has_selection();

        let input_value = match self.selection().first() {
            Some(record) if !config.multi_select => record.title.clone(),
            _ => self.query().to_string(),
        };

        let rows = if self.is_dropdown_open() {
            self.rows()
                .iter()
                .enumerate()
                .map(|(index, row)| self.row_view(index, row))
                .collect()
        } else {
            Vec::new()
        };

        LookupView {
            label: config.label.clone(),
            placeholder: config.placeholder.clone(),
            input_value,
            input_readonly: config.read_only || (!config.multi_select && has_selection),
            dropdown_open: self.is_dropdown_open(),
            phase: self.phase(),
            rows,
            no_results: self.no_results(),
            errors: self.errors().to_vec(),
            selection: self.selection().to_vec(),
            show_pills: config.multi_select && has_selection,
            selection_icon: if has_selection {
                config.icon_name.clone()
            } else {
                DEFAULT_ICON.to_string()
            },
            creation: self.creation_state().into(),
            required_missing: config.required && !has_selection,
        }
    }

    fn row_view(&self, index: usize, row: &Row<'_>) -> RowView {
        let highlighted = self.focus_index() == Some(index);
        match row {
            Row::Result(record) => RowView {
                id: record.id.clone(),
                title: record.title.clone(),
                subtitle: record.subtitle.clone(),
                icon: record
                    .icon
                    .clone()
                    .unwrap_or_else(|| self.config().icon_name.clone()),
                highlighted,
                create_row: false,
            },
            Row::CreateNew => RowView {
                id: row.id().to_string(),
                title: format!("New {}", self.config().label_of_object()),
                subtitle: None,
                icon: "utility:add".to_string(),
                highlighted,
                create_row: true,
            },
        }
    }
}
