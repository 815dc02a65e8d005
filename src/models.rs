use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub is_available: bool,
    pub stock_count: i32,
    pub low_stock_alert: i32,
    pub allergens: Vec<String>,
    pub modifier_ids: Vec<i64>,
    pub preparation_time: i32,
    pub calories: i32,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Modifier {
    pub id: i64,
    pub name: String,
    pub price_adjustment: f64,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateModifier {
    pub name: String,
    pub price_adjustment: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateModifier {
    pub id: i64,
    pub name: String,
    pub price_adjustment: f64,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub current_stock: f64,
    pub min_stock_level: f64,
    pub cost_per_unit: f64,
    pub supplier: Option<String>,
    pub expiry_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateIngredient {
    pub name: String,
    pub unit: String,
    pub current_stock: f64,
    pub min_stock_level: f64,
    pub cost_per_unit: f64,
    pub supplier: Option<String>,
    pub expiry_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateIngredient {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub min_stock_level: f64,
    pub cost_per_unit: f64,
    pub supplier: Option<String>,
    pub expiry_date: Option<String>,
}

/// One line of a menu item's recipe. The full set of lines for an item
/// is replaced wholesale on save.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuItemIngredient {
    pub id: i64,
    pub menu_item_id: i64,
    pub ingredient_id: i64,
    pub ingredient_name: Option<String>,
    pub quantity_required: f64,
    pub unit: String,
}

/// Append-only inventory movement. Rows are never updated or deleted;
/// applying one shifts the ingredient's current_stock by quantity_change.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StockAdjustment {
    pub id: i64,
    pub ingredient_id: i64,
    pub ingredient_name: Option<String>,
    pub adjustment_type: String, // "restock", "waste", "correction" or "transfer"
    pub quantity_change: f64,
    pub unit_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub staff_name: Option<String>,
    pub supplier: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateStockAdjustment {
    pub ingredient_id: i64,
    pub adjustment_type: String,
    pub quantity_change: f64,
    pub unit_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub staff_name: Option<String>,
    pub supplier: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Derived signal, not a stored row. Ids are stable across listings
/// ("kind:scope:rowid") so dismissals recorded against them stick.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StockAlert {
    pub id: String,
    pub alert_type: String, // "low_stock", "out_of_stock" or "expiring"
    pub severity: String,   // "warning" or "critical"
    pub ingredient_id: Option<i64>,
    pub menu_item_id: Option<i64>,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BusinessInfo {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total: f64,
}

/// Immutable snapshot of a completed order, captured at checkout.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReceiptData {
    pub order_number: String,
    pub created_at: String,
    pub business: BusinessInfo,
    pub items: Vec<ReceiptLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub tip: Option<f64>,
    pub total: f64,
    pub payment_method: String,
    pub cash_received: Option<f64>,
    pub change_due: Option<f64>,
    pub staff_name: Option<String>,
    pub table_number: Option<i32>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Receipt {
    pub id: i64,
    #[serde(flatten)]
    pub data: ReceiptData,
    pub printed_at: Option<String>,
}
