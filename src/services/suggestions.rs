//! Autocomplete suggestions for the vendor/client/manager filter fields
//!
//! The HTTP API serves `SuggestionIndex` directly. `FieldAutocomplete` and
//! `FilterSession` are library API for clients that drive the filter panel
//! themselves and turn it into `FilterCriteria`.

use chrono::NaiveDate;
use indexmap::IndexSet;

use crate::models::visit::{FilterCriteria, SuggestionField, Suggestions, Visit};

use super::filter::contains;

/// Distinct field values, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionIndex {
    vendors: IndexSet<String>,
    clients: IndexSet<String>,
    managers: IndexSet<String>,
}

impl SuggestionIndex {
    /// Collect the distinct vendors, clients and managers of a visit list
    pub fn derive<'a>(visits: impl IntoIterator<Item = &'a Visit>) -> Self {
        let mut index = Self::default();
        for visit in visits {
            insert_non_empty(&mut index.vendors, &visit.vendor);
            insert_non_empty(&mut index.clients, &visit.client);
            insert_non_empty(&mut index.managers, &visit.manager);
        }
        index
    }

    /// Full distinct set for one field
    pub fn values(&self, field: SuggestionField) -> &IndexSet<String> {
        match field {
            SuggestionField::Vendor => &self.vendors,
            SuggestionField::Client => &self.clients,
            SuggestionField::Manager => &self.managers,
        }
    }

    /// Candidates for what has been typed so far.
    ///
    /// Always computed from the full set, so deleting characters brings
    /// candidates back. Nothing is suggested while the field is empty.
    pub fn narrow(&self, field: SuggestionField, typed: &str) -> Vec<String> {
        if typed.is_empty() {
            return Vec::new();
        }
        self.values(field)
            .iter()
            .filter(|value| contains(value, Some(typed)))
            .cloned()
            .collect()
    }

    pub fn to_suggestions(&self) -> Suggestions {
        Suggestions {
            vendors: self.vendors.iter().cloned().collect(),
            clients: self.clients.iter().cloned().collect(),
            managers: self.managers.iter().cloned().collect(),
        }
    }
}

fn insert_non_empty(set: &mut IndexSet<String>, value: &str) {
    if !value.is_empty() && !set.contains(value) {
        set.insert(value.to_string());
    }
}

/// State of one autocompleted filter field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldState {
    #[default]
    Idle,
    Typing {
        text: String,
        candidates: Vec<String>,
    },
    Selected(String),
}

/// One autocompleted filter input
#[derive(Debug, Clone)]
pub struct FieldAutocomplete {
    field: SuggestionField,
    state: FieldState,
}

impl FieldAutocomplete {
    pub fn new(field: SuggestionField) -> Self {
        Self {
            field,
            state: FieldState::Idle,
        }
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    /// Replace the field text; clearing it returns to `Idle`
    pub fn type_text(&mut self, index: &SuggestionIndex, text: &str) {
        self.state = if text.is_empty() {
            FieldState::Idle
        } else {
            FieldState::Typing {
                text: text.to_string(),
                candidates: index.narrow(self.field, text),
            }
        };
    }

    /// Pick a suggestion: the field takes that exact value and the list closes
    pub fn select(&mut self, value: &str) {
        self.state = FieldState::Selected(value.to_string());
    }

    pub fn clear(&mut self) {
        self.state = FieldState::Idle;
    }

    /// Current candidates, empty unless typing
    pub fn candidates(&self) -> &[String] {
        match &self.state {
            FieldState::Typing { candidates, .. } => candidates,
            _ => &[],
        }
    }

    /// Current field text
    pub fn value(&self) -> Option<&str> {
        match &self.state {
            FieldState::Idle => None,
            FieldState::Typing { text, .. } => Some(text),
            FieldState::Selected(value) => Some(value),
        }
    }
}

/// The filter modal: three autocompleted fields and a date range.
///
/// Lives only while the modal is open; `apply` hands back the criteria.
#[derive(Debug, Clone)]
pub struct FilterSession {
    index: SuggestionIndex,
    pub vendor: FieldAutocomplete,
    pub client: FieldAutocomplete,
    pub manager: FieldAutocomplete,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FilterSession {
    pub fn open(index: SuggestionIndex) -> Self {
        Self {
            index,
            vendor: FieldAutocomplete::new(SuggestionField::Vendor),
            client: FieldAutocomplete::new(SuggestionField::Client),
            manager: FieldAutocomplete::new(SuggestionField::Manager),
            date_from: None,
            date_to: None,
        }
    }

    pub fn type_text(&mut self, field: SuggestionField, text: &str) {
        let input = match field {
            SuggestionField::Vendor => &mut self.vendor,
            SuggestionField::Client => &mut self.client,
            SuggestionField::Manager => &mut self.manager,
        };
        input.type_text(&self.index, text);
    }

    pub fn select(&mut self, field: SuggestionField, value: &str) {
        match field {
            SuggestionField::Vendor => self.vendor.select(value),
            SuggestionField::Client => self.client.select(value),
            SuggestionField::Manager => self.manager.select(value),
        }
    }

    /// Close the session and produce the criteria to filter with
    pub fn apply(self) -> FilterCriteria {
        let text = |f: &FieldAutocomplete| f.value().map(str::to_string);
        FilterCriteria {
            vendor: text(&self.vendor),
            client: text(&self.client),
            manager: text(&self.manager),
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}
