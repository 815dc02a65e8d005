use crate::notify::{Notice, Notifier};
use serde::{Deserialize, Serialize};

/// Menu item form as the dashboard submits it: camelCase field names,
/// no identity or timestamps. Exists only while an item is being edited.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemFormData {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub is_available: bool,
    pub stock_count: i32,
    pub low_stock_alert: i32,
    pub allergens: Vec<String>,
    pub modifiers: Vec<i64>,
    pub preparation_time: i32,
    pub calories: i32,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
}

/// Persistence-shaped mirror of the form. Same fields, snake_case names.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuItemRecord {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub is_available: bool,
    pub stock_count: i32,
    pub low_stock_alert: i32,
    pub allergens: Vec<String>,
    pub modifiers: Vec<i64>,
    pub preparation_time: i32,
    pub calories: i32,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
}

/// Pure field-for-field reshape of the form into the persistence record.
/// Total: no validation, no side effects, every input field maps to
/// exactly one output field.
pub fn convert_form_data_to_record(form: &MenuItemFormData) -> MenuItemRecord {
    MenuItemRecord {
        name: form.name.clone(),
        description: form.description.clone(),
        price: form.price,
        category: form.category.clone(),
        is_available: form.is_available,
        stock_count: form.stock_count,
        low_stock_alert: form.low_stock_alert,
        allergens: form.allergens.clone(),
        modifiers: form.modifiers.clone(),
        preparation_time: form.preparation_time,
        calories: form.calories,
        is_vegetarian: form.is_vegetarian,
        is_vegan: form.is_vegan,
        is_gluten_free: form.is_gluten_free,
    }
}

/// Pre-submit validation. Rules run in order and the first failure
/// short-circuits: non-empty trimmed name, non-empty trimmed category,
/// price strictly greater than 0 (a NaN price fails the comparison and
/// is rejected). A failure emits exactly one notice through the
/// collaborator; passing emits nothing.
pub fn validate_menu_item_form(form: &MenuItemFormData, notifier: &dyn Notifier) -> bool {
    if form.name.trim().is_empty() {
        notifier.notify(&Notice::validation_error("Item name is required."));
        return false;
    }

    if form.category.trim().is_empty() {
        notifier.notify(&Notice::validation_error("Category is required."));
        return false;
    }

    if !(form.price > 0.0) {
        notifier.notify(&Notice::validation_error("Price must be greater than 0."));
        return false;
    }

    true
}
