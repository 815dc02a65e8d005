mod alerts;
mod commands;
mod db;
mod forms;
mod models;
mod notify;
mod printing;
mod recipe;

#[cfg(test)]
mod tests;

use commands::{backup, categories, menu_items, modifiers, receipts, recipes, settings, stock};
use db::Database;
use recipe::RecipeFlow;
use std::sync::{Arc, Mutex};
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .setup(|app| {
            // Initialize database
            let db = Arc::new(Database::new(&app.handle()).expect("Failed to create database"));
            db.initialize().expect("Failed to initialize database");
            app.manage(db.clone());

            // Recipe editor flow shares the store with the command layer
            app.manage(Mutex::new(RecipeFlow::new(db)));

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Categories
            categories::get_categories,
            categories::create_category,
            categories::update_category,
            categories::delete_category,
            // Menu items
            menu_items::get_menu_items,
            menu_items::get_low_stock_items,
            menu_items::create_menu_item,
            menu_items::update_menu_item,
            menu_items::delete_menu_item,
            // Modifiers
            modifiers::get_modifiers,
            modifiers::create_modifier,
            modifiers::update_modifier,
            modifiers::delete_modifier,
            // Recipes
            recipes::get_menu_item_recipe,
            recipes::open_recipe_editor,
            recipes::recipe_editor_state,
            recipes::save_recipe,
            recipes::get_recipe_cost,
            // Stock
            stock::get_ingredients,
            stock::create_ingredient,
            stock::update_ingredient,
            stock::delete_ingredient,
            stock::record_stock_adjustment,
            stock::get_stock_adjustments,
            stock::get_stock_alerts,
            stock::alert_action,
            // Receipts
            receipts::create_receipt,
            receipts::get_receipts,
            receipts::get_receipt,
            receipts::get_receipts_by_date_range,
            receipts::receipt_print_content,
            receipts::mark_receipt_printed,
            // Settings
            settings::get_business_info,
            settings::update_business_info,
            // Backup
            backup::export_backup,
            backup::import_backup,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
