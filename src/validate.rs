//! Field-addressable form validation.
//!
//! Pure functions from form values to error messages: no I/O, no engine
//! state. Each field can be validated alone (so a screen can clear one
//! error on change and re-validate it on blur without touching the rest),
//! and a whole-form pass returns the complete error map that replaces the
//! previous one atomically. A submit with a non-empty map never reaches
//! the network.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::models::{OfferFields, SearchQuery};

/// Per-field error map; contains only fields that fail.
pub type ErrorMap = BTreeMap<&'static str, String>;

/// The search form: the structured query plus the contact fields the
/// service requires before running a search on a user's behalf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchForm {
    #[serde(flatten)]
    pub query: SearchQuery,

    pub name: String,

    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    TransactionKind,
    PropertyTypes,
    Name,
    Phone,
    BudgetMin,
    BudgetMax,
}

impl SearchField {
    const ALL: [Self; 6] = [
        Self::TransactionKind,
        Self::PropertyTypes,
        Self::Name,
        Self::Phone,
        Self::BudgetMin,
        Self::BudgetMax,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TransactionKind => "transaction_kind",
            Self::PropertyTypes => "property_types",
            Self::Name => "name",
            Self::Phone => "phone",
            Self::BudgetMin => "budget_min",
            Self::BudgetMax => "budget_max",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferField {
    TransactionKind,
    PropertyType,
    Address,
    Name,
    Phone,
}

impl OfferField {
    const ALL: [Self; 5] = [
        Self::TransactionKind,
        Self::PropertyType,
        Self::Address,
        Self::Name,
        Self::Phone,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TransactionKind => "transaction_kind",
            Self::PropertyType => "property_type",
            Self::Address => "address",
            Self::Name => "name",
            Self::Phone => "phone",
        }
    }
}

fn phone_regex() -> Option<&'static Regex> {
    static INSTANCE: OnceLock<Option<Regex>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| Regex::new(r"^\+?\d{10,15}$").ok())
        .as_ref()
}

/// Strips whitespace, hyphens, and parentheses before matching.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

fn phone_error(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return Some("Phone number is required".to_string());
    }
    let normalized = normalize_phone(raw);
    let valid = phone_regex().is_some_and(|re| re.is_match(&normalized));
    if valid {
        None
    } else {
        Some("Enter a valid phone number (10-15 digits)".to_string())
    }
}

fn required_text(value: &str, message: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(message.to_string())
    } else {
        None
    }
}

fn non_negative(value: Option<f64>, message: &str) -> Option<String> {
    match value {
        Some(v) if v < 0.0 => Some(message.to_string()),
        _ => None,
    }
}

/// Validate one search-form field against its siblings.
#[must_use]
pub fn search_field_error(form: &SearchForm, field: SearchField) -> Option<String> {
    match field {
        SearchField::TransactionKind => form
            .query
            .transaction_kind
            .is_none()
            .then(|| "Choose buy or rent".to_string()),
        SearchField::PropertyTypes => form
            .query
            .property_types
            .is_empty()
            .then(|| "Select at least one property type".to_string()),
        SearchField::Name => required_text(&form.name, "Name is required"),
        SearchField::Phone => phone_error(&form.phone),
        SearchField::BudgetMin => {
            non_negative(form.query.budget_min, "Minimum budget cannot be negative")
        }
        SearchField::BudgetMax => {
            if let Some(err) = non_negative(form.query.budget_max, "Maximum budget cannot be negative")
            {
                return Some(err);
            }
            match (form.query.budget_min, form.query.budget_max) {
                (Some(min), Some(max)) if max <= min => {
                    Some("Maximum budget must exceed the minimum".to_string())
                }
                _ => None,
            }
        }
    }
}

/// Validate the whole search form; the result contains only failing fields.
#[must_use]
pub fn validate_search(form: &SearchForm) -> ErrorMap {
    SearchField::ALL
        .into_iter()
        .filter_map(|field| search_field_error(form, field).map(|err| (field.name(), err)))
        .collect()
}

/// Validate one offer-form field.
#[must_use]
pub fn offer_field_error(fields: &OfferFields, field: OfferField) -> Option<String> {
    match field {
        OfferField::TransactionKind => fields
            .transaction_kind
            .is_none()
            .then(|| "Choose sell or rent out".to_string()),
        OfferField::PropertyType => fields
            .property_type
            .is_none()
            .then(|| "Select the property type".to_string()),
        OfferField::Address => required_text(&fields.address, "Address is required"),
        OfferField::Name => required_text(&fields.name, "Name is required"),
        OfferField::Phone => phone_error(&fields.phone),
    }
}

/// Validate the whole offer form; the result contains only failing fields.
#[must_use]
pub fn validate_offer(fields: &OfferFields) -> ErrorMap {
    OfferField::ALL
        .into_iter()
        .filter_map(|field| offer_field_error(fields, field).map(|err| (field.name(), err)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PropertyType, TransactionKind};

    fn valid_search_form() -> SearchForm {
        let mut form = SearchForm {
            name: "Ivan".to_string(),
            phone: "+380 (63) 123-45-67".to_string(),
            ..SearchForm::default()
        };
        form.query.transaction_kind = Some(TransactionKind::Buy);
        form.query.property_types.insert(PropertyType::Apartment);
        form
    }

    #[test]
    fn valid_form_produces_empty_map() {
        assert!(validate_search(&valid_search_form()).is_empty());
    }

    #[test]
    fn phone_is_normalized_before_matching() {
        let mut form = valid_search_form();
        form.phone = "+380 (63) 123-45-67".to_string();
        assert_eq!(search_field_error(&form, SearchField::Phone), None);

        form.phone = "12345".to_string();
        assert!(search_field_error(&form, SearchField::Phone).is_some());

        form.phone = "not a phone".to_string();
        assert!(search_field_error(&form, SearchField::Phone).is_some());
    }

    #[test]
    fn budget_max_must_strictly_exceed_min() {
        let mut form = valid_search_form();
        form.query.budget_min = Some(100_000.0);
        form.query.budget_max = Some(90_000.0);
        assert!(search_field_error(&form, SearchField::BudgetMax).is_some());

        form.query.budget_max = Some(100_000.0);
        assert!(search_field_error(&form, SearchField::BudgetMax).is_some());

        form.query.budget_max = Some(150_000.0);
        assert_eq!(search_field_error(&form, SearchField::BudgetMax), None);
    }

    #[test]
    fn single_bound_is_accepted() {
        let mut form = valid_search_form();
        form.query.budget_max = Some(90_000.0);
        assert_eq!(search_field_error(&form, SearchField::BudgetMax), None);
    }

    #[test]
    fn error_map_contains_only_failing_fields() {
        let mut form = valid_search_form();
        form.name.clear();
        form.query.property_types.clear();

        let errors = validate_search(&form);
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("property_types"));
    }

    #[test]
    fn offer_form_requires_address_and_contact() {
        let fields = OfferFields {
            transaction_kind: Some(TransactionKind::Buy),
            property_type: Some(PropertyType::House),
            address: "  ".to_string(),
            name: "Olha".to_string(),
            phone: "0631234567".to_string(),
            ..OfferFields::default()
        };

        let errors = validate_offer(&fields);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("address"));
    }
}
