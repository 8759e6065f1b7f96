//! Visit filtering: role restriction, then user criteria

use crate::models::{
    user::{Role, UserClaims},
    visit::{FilterCriteria, Visit},
};

/// Visits the viewer is allowed to see.
///
/// Admins see everything; a salesperson sees only visits whose vendor is
/// exactly their display name.
pub fn visible_to<'a>(visits: &'a [Visit], viewer: &UserClaims) -> Vec<&'a Visit> {
    match viewer.role {
        Role::Admin => visits.iter().collect(),
        Role::Vendor => visits.iter().filter(|v| v.vendor == viewer.name).collect(),
    }
}

/// Keep the visits matching every set criterion, in their original order
pub fn apply<'a>(
    visits: impl IntoIterator<Item = &'a Visit>,
    criteria: &FilterCriteria,
) -> Vec<&'a Visit> {
    visits
        .into_iter()
        .filter(|visit| matches(visit, criteria))
        .collect()
}

/// Whether one visit passes all criteria
pub fn matches(visit: &Visit, criteria: &FilterCriteria) -> bool {
    contains(&visit.vendor, criteria.vendor.as_deref())
        && contains(&visit.client, criteria.client.as_deref())
        && contains(&visit.manager, criteria.manager.as_deref())
        && within_dates(visit, criteria)
}

/// Case-insensitive substring test, an unset needle matches everything
pub fn contains(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}

fn within_dates(visit: &Visit, criteria: &FilterCriteria) -> bool {
    if !criteria.has_date_bounds() {
        return true;
    }
    // An unreadable visit date never satisfies a date bound
    let Some(date) = visit.parsed_date() else {
        return false;
    };
    criteria.date_from.map_or(true, |from| date >= from)
        && criteria.date_to.map_or(true, |to| date <= to)
}
