use crate::db::DatabaseExt;
use crate::models::{Category, CreateCategory, UpdateCategory};
use tauri::AppHandle;

const CATEGORY_SELECT: &str =
    "SELECT id, name, description, color, is_active, created_at, updated_at FROM categories";

fn map_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[tauri::command]
pub fn get_categories(app: AppHandle) -> Result<Vec<Category>, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    let mut stmt = conn
        .prepare(&format!("{} ORDER BY name", CATEGORY_SELECT))
        .map_err(|e| e.to_string())?;

    let categories = stmt
        .query_map([], map_category)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    Ok(categories)
}

#[tauri::command]
pub fn create_category(app: AppHandle, category: CreateCategory) -> Result<Category, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    conn.execute(
        "INSERT INTO categories (name, description, color) VALUES (?1, ?2, ?3)",
        rusqlite::params![category.name, category.description, category.color],
    )
    .map_err(|e| e.to_string())?;

    let id = conn.last_insert_rowid();

    conn.query_row(&format!("{} WHERE id = ?1", CATEGORY_SELECT), [id], map_category)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn update_category(app: AppHandle, category: UpdateCategory) -> Result<Category, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    conn.execute(
        "UPDATE categories SET name = ?1, description = ?2, color = ?3, is_active = ?4, updated_at = CURRENT_TIMESTAMP WHERE id = ?5",
        rusqlite::params![
            category.name,
            category.description,
            category.color,
            category.is_active,
            category.id
        ],
    )
    .map_err(|e| e.to_string())?;

    conn.query_row(
        &format!("{} WHERE id = ?1", CATEGORY_SELECT),
        [category.id],
        map_category,
    )
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn delete_category(app: AppHandle, id: i64) -> Result<(), String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    // Detach menu items in this category
    conn.execute(
        "UPDATE menu_items SET category_id = NULL WHERE category_id = ?1",
        [id],
    )
    .map_err(|e| e.to_string())?;

    conn.execute("DELETE FROM categories WHERE id = ?1", [id])
        .map_err(|e| e.to_string())?;

    Ok(())
}
