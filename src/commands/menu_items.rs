use crate::db::DatabaseExt;
use crate::forms::{convert_form_data_to_record, validate_menu_item_form, MenuItemFormData, MenuItemRecord};
use crate::models::MenuItem;
use crate::notify::Notifier;
use rusqlite::Connection;
use tauri::AppHandle;

const MENU_ITEM_SELECT: &str =
    "SELECT m.id, m.name, m.description, m.price, m.category_id, c.name, m.is_available,
            m.stock_count, m.low_stock_alert, m.allergens, m.preparation_time, m.calories,
            m.is_vegetarian, m.is_vegan, m.is_gluten_free, m.created_at, m.updated_at
     FROM menu_items m
     LEFT JOIN categories c ON m.category_id = c.id";

fn map_menu_item(row: &rusqlite::Row) -> rusqlite::Result<MenuItem> {
    let allergens_json: String = row.get(9)?;

    Ok(MenuItem {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category_id: row.get(4)?,
        category_name: row.get(5)?,
        is_available: row.get(6)?,
        stock_count: row.get(7)?,
        low_stock_alert: row.get(8)?,
        allergens: serde_json::from_str(&allergens_json).unwrap_or_default(),
        modifier_ids: Vec::new(), // filled in afterwards from the join table
        preparation_time: row.get(10)?,
        calories: row.get(11)?,
        is_vegetarian: row.get(12)?,
        is_vegan: row.get(13)?,
        is_gluten_free: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

fn load_modifier_ids(conn: &Connection, item_id: i64) -> Result<Vec<i64>, String> {
    let mut stmt = conn
        .prepare("SELECT modifier_id FROM menu_item_modifiers WHERE menu_item_id = ?1 ORDER BY modifier_id")
        .map_err(|e| e.to_string())?;

    let result = stmt
        .query_map([item_id], |row| row.get(0))
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string());
    result
}

pub(crate) fn fetch_menu_item(conn: &Connection, id: i64) -> Result<MenuItem, String> {
    let mut item = conn
        .query_row(&format!("{} WHERE m.id = ?1", MENU_ITEM_SELECT), [id], map_menu_item)
        .map_err(|e| e.to_string())?;

    item.modifier_ids = load_modifier_ids(conn, id)?;

    Ok(item)
}

/// Looks up a category by name, creating it on first use so a menu item
/// can be filed under a category typed straight into the form.
pub(crate) fn resolve_category(conn: &Connection, name: &str) -> Result<i64, String> {
    let existing: Option<i64> = conn
        .query_row("SELECT id FROM categories WHERE name = ?1", [name], |row| row.get(0))
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })
        .map_err(|e| e.to_string())?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])
        .map_err(|e| e.to_string())?;

    Ok(conn.last_insert_rowid())
}

fn replace_modifier_joins(conn: &Connection, item_id: i64, modifier_ids: &[i64]) -> Result<(), String> {
    conn.execute(
        "DELETE FROM menu_item_modifiers WHERE menu_item_id = ?1",
        [item_id],
    )
    .map_err(|e| e.to_string())?;

    for modifier_id in modifier_ids {
        conn.execute(
            "INSERT INTO menu_item_modifiers (menu_item_id, modifier_id) VALUES (?1, ?2)",
            rusqlite::params![item_id, modifier_id],
        )
        .map_err(|e| e.to_string())?;
    }

    Ok(())
}

pub(crate) fn insert_menu_item(conn: &Connection, record: &MenuItemRecord) -> Result<MenuItem, String> {
    let category_id = resolve_category(conn, &record.category)?;
    let allergens = serde_json::to_string(&record.allergens).map_err(|e| e.to_string())?;

    conn.execute(
        "INSERT INTO menu_items (name, description, price, category_id, is_available, stock_count,
                                 low_stock_alert, allergens, preparation_time, calories,
                                 is_vegetarian, is_vegan, is_gluten_free)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        rusqlite::params![
            record.name,
            record.description,
            record.price,
            category_id,
            record.is_available,
            record.stock_count,
            record.low_stock_alert,
            allergens,
            record.preparation_time,
            record.calories,
            record.is_vegetarian,
            record.is_vegan,
            record.is_gluten_free
        ],
    )
    .map_err(|e| e.to_string())?;

    let id = conn.last_insert_rowid();

    replace_modifier_joins(conn, id, &record.modifiers)?;

    fetch_menu_item(conn, id)
}

pub(crate) fn update_menu_item_record(
    conn: &Connection,
    id: i64,
    record: &MenuItemRecord,
) -> Result<MenuItem, String> {
    let category_id = resolve_category(conn, &record.category)?;
    let allergens = serde_json::to_string(&record.allergens).map_err(|e| e.to_string())?;

    let changed = conn
        .execute(
            "UPDATE menu_items SET name = ?1, description = ?2, price = ?3, category_id = ?4,
                                   is_available = ?5, stock_count = ?6, low_stock_alert = ?7,
                                   allergens = ?8, preparation_time = ?9, calories = ?10,
                                   is_vegetarian = ?11, is_vegan = ?12, is_gluten_free = ?13,
                                   updated_at = CURRENT_TIMESTAMP
             WHERE id = ?14",
            rusqlite::params![
                record.name,
                record.description,
                record.price,
                category_id,
                record.is_available,
                record.stock_count,
                record.low_stock_alert,
                allergens,
                record.preparation_time,
                record.calories,
                record.is_vegetarian,
                record.is_vegan,
                record.is_gluten_free,
                id
            ],
        )
        .map_err(|e| e.to_string())?;

    if changed == 0 {
        return Err("Menu item not found".to_string());
    }

    replace_modifier_joins(conn, id, &record.modifiers)?;

    fetch_menu_item(conn, id)
}

#[tauri::command]
pub fn get_menu_items(app: AppHandle) -> Result<Vec<MenuItem>, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    let mut stmt = conn
        .prepare(&format!("{} ORDER BY m.name", MENU_ITEM_SELECT))
        .map_err(|e| e.to_string())?;

    let mut items = stmt
        .query_map([], map_menu_item)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    for item in &mut items {
        item.modifier_ids = load_modifier_ids(&conn, item.id)?;
    }

    Ok(items)
}

#[tauri::command]
pub fn get_low_stock_items(app: AppHandle) -> Result<Vec<MenuItem>, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    let mut stmt = conn
        .prepare(&format!(
            "{} WHERE m.stock_count <= m.low_stock_alert ORDER BY m.stock_count ASC",
            MENU_ITEM_SELECT
        ))
        .map_err(|e| e.to_string())?;

    let mut items = stmt
        .query_map([], map_menu_item)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    for item in &mut items {
        item.modifier_ids = load_modifier_ids(&conn, item.id)?;
    }

    Ok(items)
}

/// Returns `Ok(None)` when the form was rejected; the validator has
/// already emitted the user-facing notice in that case.
#[tauri::command]
pub fn create_menu_item(app: AppHandle, form: MenuItemFormData) -> Result<Option<MenuItem>, String> {
    if !validate_menu_item_form(&form, &app as &dyn Notifier) {
        return Ok(None);
    }

    let record = convert_form_data_to_record(&form);

    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    insert_menu_item(&conn, &record).map(Some)
}

/// Same pipeline as `create_menu_item`; `Ok(None)` means rejected.
#[tauri::command]
pub fn update_menu_item(
    app: AppHandle,
    id: i64,
    form: MenuItemFormData,
) -> Result<Option<MenuItem>, String> {
    if !validate_menu_item_form(&form, &app as &dyn Notifier) {
        return Ok(None);
    }

    let record = convert_form_data_to_record(&form);

    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    update_menu_item_record(&conn, id, &record).map(Some)
}

#[tauri::command]
pub fn delete_menu_item(app: AppHandle, id: i64) -> Result<(), String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    conn.execute(
        "DELETE FROM menu_item_modifiers WHERE menu_item_id = ?1",
        [id],
    )
    .map_err(|e| e.to_string())?;

    conn.execute(
        "DELETE FROM menu_item_ingredients WHERE menu_item_id = ?1",
        [id],
    )
    .map_err(|e| e.to_string())?;

    conn.execute("DELETE FROM menu_items WHERE id = ?1", [id])
        .map_err(|e| e.to_string())?;

    Ok(())
}
