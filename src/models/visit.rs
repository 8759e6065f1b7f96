//! Visit model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Date format used by the dashboard date inputs
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Kind of commercial interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VisitType {
    /// On-site visit to the client
    #[serde(alias = "física", alias = "fisica")]
    Physical,
    /// Video call
    Online,
    #[serde(alias = "telefónica", alias = "telefonica")]
    Phone,
    #[serde(alias = "WhatsApp")]
    Whatsapp,
    /// Type left blank or not recognised in stored data
    #[serde(rename = "", other)]
    Unspecified,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum VisitStatus {
    #[default]
    #[serde(alias = "Pendiente")]
    Pending,
    #[serde(alias = "Completada")]
    Completed,
}

/// Free-text details captured with a visit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitDetails {
    pub subject: String,
    pub requested_products: Vec<String>,
    pub offered_products: Vec<String>,
    pub incidents: String,
    pub additional_info: String,
}

/// Logged commercial visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: i32,
    /// Calendar date (YYYY-MM-DD), kept as entered
    pub date: String,
    #[serde(rename = "type")]
    pub visit_type: VisitType,
    pub client: String,
    /// Salesperson who performed the visit
    pub vendor: String,
    /// Responsible party
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub status: VisitStatus,
    #[serde(default)]
    pub details: VisitDetails,
}

impl Visit {
    /// Parsed visit date, `None` when the stored text is not a calendar date
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()
    }
}

/// Create visit request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateVisit {
    /// Visit date (YYYY-MM-DD)
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    #[serde(rename = "type")]
    #[validate(required(message = "Visit type is required"))]
    pub visit_type: Option<VisitType>,
    #[validate(length(min = 1, message = "Client is required"))]
    pub client: String,
    /// Ignored for salespeople, their own name is recorded instead
    pub vendor: Option<String>,
    pub manager: String,
    pub division: String,
    pub status: Option<VisitStatus>,
    pub details: VisitDetails,
}

/// Query parameters of the visit list (filter modal fields)
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct VisitQuery {
    /// Vendor name contains (case-insensitive)
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub vendor: Option<String>,
    /// Client name contains (case-insensitive)
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub client: Option<String>,
    /// Manager name contains (case-insensitive)
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub manager: Option<String>,
    /// Inclusive lower bound (YYYY-MM-DD)
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub date_from: Option<String>,
    /// Inclusive upper bound (YYYY-MM-DD)
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub date_to: Option<String>,
}

impl VisitQuery {
    /// Parse the raw query into filter criteria
    pub fn into_criteria(self) -> AppResult<FilterCriteria> {
        Ok(FilterCriteria {
            vendor: non_blank(self.vendor),
            client: non_blank(self.client),
            manager: non_blank(self.manager),
            date_from: parse_bound("dateFrom", self.date_from)?,
            date_to: parse_bound("dateTo", self.date_to)?,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bound(name: &str, value: Option<String>) -> AppResult<Option<NaiveDate>> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| AppError::Validation(format!("Invalid {} date: {}", name, raw))),
    }
}

/// Filter criteria applied after role restriction. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub vendor: Option<String>,
    pub client: Option<String>,
    pub manager: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn has_date_bounds(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }
}

/// Autocompleted filter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionField {
    Vendor,
    Client,
    Manager,
}

/// Distinct names for filter autocomplete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Suggestions {
    pub vendors: Vec<String>,
    pub clients: Vec<String>,
    pub managers: Vec<String>,
}

/// Query parameters for narrowing one suggestion field
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestionQuery {
    /// Text typed so far
    pub q: Option<String>,
}

/// Visit counters shown on the dashboard cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VisitStats {
    pub total: usize,
    pub physical: usize,
    pub online: usize,
    pub phone: usize,
    pub whatsapp: usize,
    pub pending: usize,
    pub completed: usize,
}

impl VisitStats {
    pub fn from_visits<'a>(visits: impl IntoIterator<Item = &'a Visit>) -> Self {
        visits.into_iter().fold(Self::default(), |mut stats, visit| {
            stats.total += 1;
            match visit.visit_type {
                VisitType::Physical => stats.physical += 1,
                VisitType::Online => stats.online += 1,
                VisitType::Phone => stats.phone += 1,
                VisitType::Whatsapp => stats.whatsapp += 1,
                VisitType::Unspecified => {}
            }
            match visit.status {
                VisitStatus::Pending => stats.pending += 1,
                VisitStatus::Completed => stats.completed += 1,
            }
            stats
        })
    }
}
