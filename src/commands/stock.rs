use crate::alerts::{collect_stock_alerts, forward_alert_action};
use crate::db::DatabaseExt;
use crate::models::{
    CreateIngredient, CreateStockAdjustment, Ingredient, StockAdjustment, StockAlert,
    UpdateIngredient,
};
use rusqlite::Connection;
use tauri::AppHandle;

const INGREDIENT_SELECT: &str =
    "SELECT id, name, unit, current_stock, min_stock_level, cost_per_unit, supplier, expiry_date,
            created_at, updated_at
     FROM ingredients";

const ADJUSTMENT_SELECT: &str =
    "SELECT a.id, a.ingredient_id, i.name, a.adjustment_type, a.quantity_change, a.unit_cost,
            a.total_cost, a.staff_name, a.supplier, a.reference, a.notes, a.created_at
     FROM stock_adjustments a
     LEFT JOIN ingredients i ON a.ingredient_id = i.id";

const ADJUSTMENT_TYPES: [&str; 4] = ["restock", "waste", "correction", "transfer"];

fn map_ingredient(row: &rusqlite::Row) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get(0)?,
        name: row.get(1)?,
        unit: row.get(2)?,
        current_stock: row.get(3)?,
        min_stock_level: row.get(4)?,
        cost_per_unit: row.get(5)?,
        supplier: row.get(6)?,
        expiry_date: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn map_adjustment(row: &rusqlite::Row) -> rusqlite::Result<StockAdjustment> {
    Ok(StockAdjustment {
        id: row.get(0)?,
        ingredient_id: row.get(1)?,
        ingredient_name: row.get(2)?,
        adjustment_type: row.get(3)?,
        quantity_change: row.get(4)?,
        unit_cost: row.get(5)?,
        total_cost: row.get(6)?,
        staff_name: row.get(7)?,
        supplier: row.get(8)?,
        reference: row.get(9)?,
        notes: row.get(10)?,
        created_at: row.get(11)?,
    })
}

/// Derives the cost of an adjustment when the caller supplied a unit
/// cost but no total. An explicit total always wins.
pub(crate) fn adjustment_total_cost(
    unit_cost: Option<f64>,
    total_cost: Option<f64>,
    quantity_change: f64,
) -> Option<f64> {
    total_cost.or_else(|| unit_cost.map(|cost| cost * quantity_change.abs()))
}

/// Inserts the append-only record and applies the signed change to the
/// ingredient's current stock in one transaction. The record itself is
/// never mutated afterwards.
pub(crate) fn apply_adjustment(
    conn: &mut Connection,
    adjustment: &CreateStockAdjustment,
) -> Result<StockAdjustment, String> {
    if !ADJUSTMENT_TYPES.contains(&adjustment.adjustment_type.as_str()) {
        return Err(format!(
            "Unknown adjustment type: {}",
            adjustment.adjustment_type
        ));
    }

    if adjustment.quantity_change == 0.0 {
        return Err("Quantity change must not be zero".to_string());
    }

    let total_cost = adjustment_total_cost(
        adjustment.unit_cost,
        adjustment.total_cost,
        adjustment.quantity_change,
    );

    let tx = conn.transaction().map_err(|e| e.to_string())?;

    let changed = tx
        .execute(
            "UPDATE ingredients SET current_stock = current_stock + ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            rusqlite::params![adjustment.quantity_change, adjustment.ingredient_id],
        )
        .map_err(|e| e.to_string())?;

    if changed == 0 {
        return Err("Ingredient not found".to_string());
    }

    tx.execute(
        "INSERT INTO stock_adjustments (ingredient_id, adjustment_type, quantity_change, unit_cost,
                                        total_cost, staff_name, supplier, reference, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            adjustment.ingredient_id,
            adjustment.adjustment_type,
            adjustment.quantity_change,
            adjustment.unit_cost,
            total_cost,
            adjustment.staff_name,
            adjustment.supplier,
            adjustment.reference,
            adjustment.notes
        ],
    )
    .map_err(|e| e.to_string())?;

    let id = tx.last_insert_rowid();

    tx.commit().map_err(|e| e.to_string())?;

    conn.query_row(&format!("{} WHERE a.id = ?1", ADJUSTMENT_SELECT), [id], map_adjustment)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_ingredients(app: AppHandle) -> Result<Vec<Ingredient>, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    let mut stmt = conn
        .prepare(&format!("{} ORDER BY name", INGREDIENT_SELECT))
        .map_err(|e| e.to_string())?;

    let ingredients = stmt
        .query_map([], map_ingredient)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    Ok(ingredients)
}

#[tauri::command]
pub fn create_ingredient(app: AppHandle, ingredient: CreateIngredient) -> Result<Ingredient, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    conn.execute(
        "INSERT INTO ingredients (name, unit, current_stock, min_stock_level, cost_per_unit, supplier, expiry_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            ingredient.name,
            ingredient.unit,
            ingredient.current_stock,
            ingredient.min_stock_level,
            ingredient.cost_per_unit,
            ingredient.supplier,
            ingredient.expiry_date
        ],
    )
    .map_err(|e| e.to_string())?;

    let id = conn.last_insert_rowid();

    conn.query_row(&format!("{} WHERE id = ?1", INGREDIENT_SELECT), [id], map_ingredient)
        .map_err(|e| e.to_string())
}

/// Stock levels are not editable here; they move only through recorded
/// adjustments.
#[tauri::command]
pub fn update_ingredient(app: AppHandle, ingredient: UpdateIngredient) -> Result<Ingredient, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    conn.execute(
        "UPDATE ingredients SET name = ?1, unit = ?2, min_stock_level = ?3, cost_per_unit = ?4,
                                supplier = ?5, expiry_date = ?6, updated_at = CURRENT_TIMESTAMP
         WHERE id = ?7",
        rusqlite::params![
            ingredient.name,
            ingredient.unit,
            ingredient.min_stock_level,
            ingredient.cost_per_unit,
            ingredient.supplier,
            ingredient.expiry_date,
            ingredient.id
        ],
    )
    .map_err(|e| e.to_string())?;

    conn.query_row(
        &format!("{} WHERE id = ?1", INGREDIENT_SELECT),
        [ingredient.id],
        map_ingredient,
    )
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn delete_ingredient(app: AppHandle, id: i64) -> Result<(), String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    // Check if the ingredient is still part of a recipe
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM menu_item_ingredients WHERE ingredient_id = ?1",
            [id],
            |row| row.get(0),
        )
        .map_err(|e| e.to_string())?;

    if count > 0 {
        return Err("Cannot delete an ingredient used by a recipe".to_string());
    }

    conn.execute("DELETE FROM ingredients WHERE id = ?1", [id])
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[tauri::command]
pub fn record_stock_adjustment(
    app: AppHandle,
    adjustment: CreateStockAdjustment,
) -> Result<StockAdjustment, String> {
    let db = app.db();
    let mut conn = db.conn.lock().map_err(|e| e.to_string())?;

    apply_adjustment(&mut conn, &adjustment)
}

#[tauri::command]
pub fn get_stock_adjustments(
    app: AppHandle,
    ingredient_id: Option<i64>,
    limit: Option<i32>,
) -> Result<Vec<StockAdjustment>, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    let limit = limit.unwrap_or(50);

    let adjustments = match ingredient_id {
        Some(ingredient_id) => {
            let mut stmt = conn
                .prepare(&format!(
                    "{} WHERE a.ingredient_id = ?1 ORDER BY a.created_at DESC, a.id DESC LIMIT ?2",
                    ADJUSTMENT_SELECT
                ))
                .map_err(|e| e.to_string())?;
            let rows = stmt
                .query_map(rusqlite::params![ingredient_id, limit], map_adjustment)
                .map_err(|e| e.to_string())?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?;
            rows
        }
        None => {
            let mut stmt = conn
                .prepare(&format!(
                    "{} ORDER BY a.created_at DESC, a.id DESC LIMIT ?1",
                    ADJUSTMENT_SELECT
                ))
                .map_err(|e| e.to_string())?;
            let rows = stmt
                .query_map([limit], map_adjustment)
                .map_err(|e| e.to_string())?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?;
            rows
        }
    };

    Ok(adjustments)
}

#[tauri::command]
pub fn get_stock_alerts(app: AppHandle) -> Result<Vec<StockAlert>, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    collect_stock_alerts(&conn)
}

/// Routes a user-initiated alert action to the collaborator verbatim.
#[tauri::command]
pub fn alert_action(app: AppHandle, notification_id: String, action: String) -> Result<(), String> {
    let db = app.db();

    forward_alert_action(&*db, &notification_id, &action)
}
