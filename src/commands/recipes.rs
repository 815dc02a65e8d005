use crate::db::DatabaseExt;
use crate::models::MenuItemIngredient;
use crate::recipe::{RecipeEditor, RecipeEditorSnapshot, RecipeFormData, RecipeStore};
use rusqlite::Connection;
use tauri::{AppHandle, Manager};

/// Estimated cost to produce one unit of the item: the sum of
/// quantity_required times each ingredient's cost_per_unit.
pub(crate) fn recipe_cost(conn: &Connection, item_id: i64) -> Result<f64, String> {
    conn.query_row(
        "SELECT COALESCE(SUM(mi.quantity_required * i.cost_per_unit), 0)
         FROM menu_item_ingredients mi
         JOIN ingredients i ON mi.ingredient_id = i.id
         WHERE mi.menu_item_id = ?1",
        [item_id],
        |row| row.get(0),
    )
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_menu_item_recipe(app: AppHandle, item_id: i64) -> Result<Vec<MenuItemIngredient>, String> {
    app.db().get_menu_item_recipe(item_id)
}

/// Binds the editor flow to a menu item; the recipe fetch runs on first
/// binding and whenever the bound identity changes.
#[tauri::command]
pub fn open_recipe_editor(app: AppHandle, item_id: i64) -> Result<RecipeEditorSnapshot, String> {
    let editor = app.state::<RecipeEditor>();
    let mut flow = editor.lock().map_err(|e| e.to_string())?;

    flow.bind(item_id)?;

    Ok(flow.snapshot())
}

#[tauri::command]
pub fn recipe_editor_state(app: AppHandle) -> Result<RecipeEditorSnapshot, String> {
    let editor = app.state::<RecipeEditor>();
    let flow = editor.lock().map_err(|e| e.to_string())?;

    Ok(flow.snapshot())
}

/// Whole-list replace. Returns whether the store accepted it; a
/// successful save while the editor is bound resynchronizes the editor
/// from the store before returning.
#[tauri::command]
pub fn save_recipe(app: AppHandle, recipe: RecipeFormData) -> Result<bool, String> {
    let editor = app.state::<RecipeEditor>();
    let mut flow = editor.lock().map_err(|e| e.to_string())?;

    flow.save_recipe(&recipe)
}

#[tauri::command]
pub fn get_recipe_cost(app: AppHandle, item_id: i64) -> Result<f64, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    recipe_cost(&conn, item_id)
}
