use crate::db::DatabaseExt;
use crate::models::{CreateModifier, Modifier, UpdateModifier};
use tauri::AppHandle;

const MODIFIER_SELECT: &str =
    "SELECT id, name, price_adjustment, is_active, created_at FROM modifiers";

fn map_modifier(row: &rusqlite::Row) -> rusqlite::Result<Modifier> {
    Ok(Modifier {
        id: row.get(0)?,
        name: row.get(1)?,
        price_adjustment: row.get(2)?,
        is_active: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[tauri::command]
pub fn get_modifiers(app: AppHandle) -> Result<Vec<Modifier>, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    let mut stmt = conn
        .prepare(&format!("{} ORDER BY name", MODIFIER_SELECT))
        .map_err(|e| e.to_string())?;

    let modifiers = stmt
        .query_map([], map_modifier)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    Ok(modifiers)
}

#[tauri::command]
pub fn create_modifier(app: AppHandle, modifier: CreateModifier) -> Result<Modifier, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    conn.execute(
        "INSERT INTO modifiers (name, price_adjustment) VALUES (?1, ?2)",
        rusqlite::params![modifier.name, modifier.price_adjustment],
    )
    .map_err(|e| e.to_string())?;

    let id = conn.last_insert_rowid();

    conn.query_row(&format!("{} WHERE id = ?1", MODIFIER_SELECT), [id], map_modifier)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn update_modifier(app: AppHandle, modifier: UpdateModifier) -> Result<Modifier, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    conn.execute(
        "UPDATE modifiers SET name = ?1, price_adjustment = ?2, is_active = ?3 WHERE id = ?4",
        rusqlite::params![
            modifier.name,
            modifier.price_adjustment,
            modifier.is_active,
            modifier.id
        ],
    )
    .map_err(|e| e.to_string())?;

    conn.query_row(
        &format!("{} WHERE id = ?1", MODIFIER_SELECT),
        [modifier.id],
        map_modifier,
    )
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn delete_modifier(app: AppHandle, id: i64) -> Result<(), String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    conn.execute(
        "DELETE FROM menu_item_modifiers WHERE modifier_id = ?1",
        [id],
    )
    .map_err(|e| e.to_string())?;

    conn.execute("DELETE FROM modifiers WHERE id = ?1", [id])
        .map_err(|e| e.to_string())?;

    Ok(())
}
