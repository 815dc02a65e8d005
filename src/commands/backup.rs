//! Versioned JSON export/import of the whole store. The dashboard picks
//! the file location through the dialog plugin; restore replaces every
//! table wholesale inside one transaction, preserving row ids.

use crate::commands::settings::read_business_info;
use crate::db::DatabaseExt;
use crate::models::{
    BusinessInfo, Category, Ingredient, MenuItem, MenuItemIngredient, Modifier, Receipt,
    ReceiptLine, StockAdjustment,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tauri::AppHandle;

const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct AlertActionRecord {
    id: i64,
    notification_id: String,
    action: String,
    created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackupSnapshot {
    version: u32,
    exported_at: String,
    business_info: BusinessInfo,
    categories: Vec<Category>,
    modifiers: Vec<Modifier>,
    menu_items: Vec<MenuItem>,
    ingredients: Vec<Ingredient>,
    recipes: Vec<MenuItemIngredient>,
    stock_adjustments: Vec<StockAdjustment>,
    alert_actions: Vec<AlertActionRecord>,
    receipts: Vec<Receipt>,
}

pub(crate) fn export_snapshot(conn: &Connection) -> Result<BackupSnapshot, String> {
    let categories = {
        let mut stmt = conn
            .prepare("SELECT id, name, description, color, is_active, created_at, updated_at FROM categories ORDER BY id")
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    color: row.get(3)?,
                    is_active: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })
            .map_err(|e| e.to_string())?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        rows
    };

    let modifiers = {
        let mut stmt = conn
            .prepare("SELECT id, name, price_adjustment, is_active, created_at FROM modifiers ORDER BY id")
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Modifier {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price_adjustment: row.get(2)?,
                    is_active: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .map_err(|e| e.to_string())?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        rows
    };

    let mut menu_items = {
        let mut stmt = conn
            .prepare(
                "SELECT m.id, m.name, m.description, m.price, m.category_id, c.name, m.is_available,
                        m.stock_count, m.low_stock_alert, m.allergens, m.preparation_time,
                        m.calories, m.is_vegetarian, m.is_vegan, m.is_gluten_free, m.created_at,
                        m.updated_at
                 FROM menu_items m
                 LEFT JOIN categories c ON m.category_id = c.id
                 ORDER BY m.id",
            )
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
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
                    modifier_ids: Vec::new(),
                    preparation_time: row.get(10)?,
                    calories: row.get(11)?,
                    is_vegetarian: row.get(12)?,
                    is_vegan: row.get(13)?,
                    is_gluten_free: row.get(14)?,
                    created_at: row.get(15)?,
                    updated_at: row.get(16)?,
                })
            })
            .map_err(|e| e.to_string())?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        rows
    };

    for item in &mut menu_items {
        let mut stmt = conn
            .prepare("SELECT modifier_id FROM menu_item_modifiers WHERE menu_item_id = ?1 ORDER BY modifier_id")
            .map_err(|e| e.to_string())?;
        item.modifier_ids = stmt
            .query_map([item.id], |row| row.get(0))
            .map_err(|e| e.to_string())?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
    }

    let ingredients = {
        let mut stmt = conn
            .prepare(
                "SELECT id, name, unit, current_stock, min_stock_level, cost_per_unit, supplier,
                        expiry_date, created_at, updated_at
                 FROM ingredients ORDER BY id",
            )
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
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
            })
            .map_err(|e| e.to_string())?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        rows
    };

    let recipes = {
        let mut stmt = conn
            .prepare(
                "SELECT mi.id, mi.menu_item_id, mi.ingredient_id, i.name, mi.quantity_required, mi.unit
                 FROM menu_item_ingredients mi
                 LEFT JOIN ingredients i ON mi.ingredient_id = i.id
                 ORDER BY mi.id",
            )
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MenuItemIngredient {
                    id: row.get(0)?,
                    menu_item_id: row.get(1)?,
                    ingredient_id: row.get(2)?,
                    ingredient_name: row.get(3)?,
                    quantity_required: row.get(4)?,
                    unit: row.get(5)?,
                })
            })
            .map_err(|e| e.to_string())?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        rows
    };

    let stock_adjustments = {
        let mut stmt = conn
            .prepare(
                "SELECT a.id, a.ingredient_id, i.name, a.adjustment_type, a.quantity_change,
                        a.unit_cost, a.total_cost, a.staff_name, a.supplier, a.reference, a.notes,
                        a.created_at
                 FROM stock_adjustments a
                 LEFT JOIN ingredients i ON a.ingredient_id = i.id
                 ORDER BY a.id",
            )
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
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
            })
            .map_err(|e| e.to_string())?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        rows
    };

    let alert_actions = {
        let mut stmt = conn
            .prepare("SELECT id, notification_id, action, created_at FROM alert_actions ORDER BY id")
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
                Ok(AlertActionRecord {
                    id: row.get(0)?,
                    notification_id: row.get(1)?,
                    action: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })
            .map_err(|e| e.to_string())?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        rows
    };

    let mut receipts = Vec::new();
    {
        let mut stmt = conn
            .prepare("SELECT id FROM receipts ORDER BY id")
            .map_err(|e| e.to_string())?;
        let ids: Vec<i64> = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| e.to_string())?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        for id in ids {
            receipts.push(crate::commands::receipts::fetch_receipt(conn, id)?);
        }
    }

    let exported_at: String = conn
        .query_row("SELECT datetime('now')", [], |row| row.get(0))
        .map_err(|e| e.to_string())?;

    Ok(BackupSnapshot {
        version: BACKUP_VERSION,
        exported_at,
        business_info: read_business_info(conn)?,
        categories,
        modifiers,
        menu_items,
        ingredients,
        recipes,
        stock_adjustments,
        alert_actions,
        receipts,
    })
}

pub(crate) fn import_snapshot(conn: &mut Connection, snapshot: &BackupSnapshot) -> Result<(), String> {
    if snapshot.version != BACKUP_VERSION {
        return Err(format!(
            "Unsupported backup version: {}",
            snapshot.version
        ));
    }

    let tx = conn.transaction().map_err(|e| e.to_string())?;

    for table in [
        "receipt_items",
        "receipts",
        "alert_actions",
        "stock_adjustments",
        "menu_item_ingredients",
        "menu_item_modifiers",
        "menu_items",
        "ingredients",
        "modifiers",
        "categories",
        "business_info",
    ] {
        tx.execute(&format!("DELETE FROM {}", table), [])
            .map_err(|e| e.to_string())?;
    }

    for category in &snapshot.categories {
        tx.execute(
            "INSERT INTO categories (id, name, description, color, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                category.id,
                category.name,
                category.description,
                category.color,
                category.is_active,
                category.created_at,
                category.updated_at
            ],
        )
        .map_err(|e| e.to_string())?;
    }

    for modifier in &snapshot.modifiers {
        tx.execute(
            "INSERT INTO modifiers (id, name, price_adjustment, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                modifier.id,
                modifier.name,
                modifier.price_adjustment,
                modifier.is_active,
                modifier.created_at
            ],
        )
        .map_err(|e| e.to_string())?;
    }

    for item in &snapshot.menu_items {
        let allergens = serde_json::to_string(&item.allergens).map_err(|e| e.to_string())?;
        tx.execute(
            "INSERT INTO menu_items (id, name, description, price, category_id, is_available,
                                     stock_count, low_stock_alert, allergens, preparation_time,
                                     calories, is_vegetarian, is_vegan, is_gluten_free, created_at,
                                     updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            rusqlite::params![
                item.id,
                item.name,
                item.description,
                item.price,
                item.category_id,
                item.is_available,
                item.stock_count,
                item.low_stock_alert,
                allergens,
                item.preparation_time,
                item.calories,
                item.is_vegetarian,
                item.is_vegan,
                item.is_gluten_free,
                item.created_at,
                item.updated_at
            ],
        )
        .map_err(|e| e.to_string())?;

        for modifier_id in &item.modifier_ids {
            tx.execute(
                "INSERT INTO menu_item_modifiers (menu_item_id, modifier_id) VALUES (?1, ?2)",
                rusqlite::params![item.id, modifier_id],
            )
            .map_err(|e| e.to_string())?;
        }
    }

    for ingredient in &snapshot.ingredients {
        tx.execute(
            "INSERT INTO ingredients (id, name, unit, current_stock, min_stock_level, cost_per_unit,
                                      supplier, expiry_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                ingredient.id,
                ingredient.name,
                ingredient.unit,
                ingredient.current_stock,
                ingredient.min_stock_level,
                ingredient.cost_per_unit,
                ingredient.supplier,
                ingredient.expiry_date,
                ingredient.created_at,
                ingredient.updated_at
            ],
        )
        .map_err(|e| e.to_string())?;
    }

    for line in &snapshot.recipes {
        tx.execute(
            "INSERT INTO menu_item_ingredients (id, menu_item_id, ingredient_id, quantity_required, unit)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                line.id,
                line.menu_item_id,
                line.ingredient_id,
                line.quantity_required,
                line.unit
            ],
        )
        .map_err(|e| e.to_string())?;
    }

    for adjustment in &snapshot.stock_adjustments {
        tx.execute(
            "INSERT INTO stock_adjustments (id, ingredient_id, adjustment_type, quantity_change,
                                            unit_cost, total_cost, staff_name, supplier, reference,
                                            notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                adjustment.id,
                adjustment.ingredient_id,
                adjustment.adjustment_type,
                adjustment.quantity_change,
                adjustment.unit_cost,
                adjustment.total_cost,
                adjustment.staff_name,
                adjustment.supplier,
                adjustment.reference,
                adjustment.notes,
                adjustment.created_at
            ],
        )
        .map_err(|e| e.to_string())?;
    }

    for action in &snapshot.alert_actions {
        tx.execute(
            "INSERT INTO alert_actions (id, notification_id, action, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![action.id, action.notification_id, action.action, action.created_at],
        )
        .map_err(|e| e.to_string())?;
    }

    for receipt in &snapshot.receipts {
        tx.execute(
            "INSERT INTO receipts (id, order_number, business_name, business_address, business_phone,
                                   business_tax_id, subtotal, tax, tip, total, payment_method,
                                   cash_received, change_due, staff_name, table_number,
                                   customer_name, created_at, printed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            rusqlite::params![
                receipt.id,
                receipt.data.order_number,
                receipt.data.business.name,
                receipt.data.business.address,
                receipt.data.business.phone,
                receipt.data.business.tax_id,
                receipt.data.subtotal,
                receipt.data.tax,
                receipt.data.tip,
                receipt.data.total,
                receipt.data.payment_method,
                receipt.data.cash_received,
                receipt.data.change_due,
                receipt.data.staff_name,
                receipt.data.table_number,
                receipt.data.customer_name,
                receipt.data.created_at,
                receipt.printed_at
            ],
        )
        .map_err(|e| e.to_string())?;

        for item in &receipt.data.items {
            tx.execute(
                "INSERT INTO receipt_items (receipt_id, name, quantity, unit_price, total) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![receipt.id, item.name, item.quantity, item.unit_price, item.total],
            )
            .map_err(|e| e.to_string())?;
        }
    }

    let business = &snapshot.business_info;
    tx.execute(
        "INSERT INTO business_info (id, name, address, phone, tax_id) VALUES (1, ?1, ?2, ?3, ?4)",
        rusqlite::params![business.name, business.address, business.phone, business.tax_id],
    )
    .map_err(|e| e.to_string())?;

    tx.commit().map_err(|e| e.to_string())?;

    Ok(())
}

pub(crate) fn write_backup_file(conn: &Connection, path: &Path) -> Result<(), String> {
    let snapshot = export_snapshot(conn)?;
    let json = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;

    std::fs::write(path, json).map_err(|e| e.to_string())?;

    Ok(())
}

pub(crate) fn read_backup_file(conn: &mut Connection, path: &Path) -> Result<(), String> {
    let json = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let snapshot: BackupSnapshot = serde_json::from_str(&json).map_err(|e| e.to_string())?;

    import_snapshot(conn, &snapshot)
}

#[tauri::command]
pub fn export_backup(app: AppHandle, path: String) -> Result<String, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    write_backup_file(&conn, Path::new(&path))?;
    log::info!("backup exported to {}", path);

    Ok(path)
}

#[tauri::command]
pub fn import_backup(app: AppHandle, path: String) -> Result<(), String> {
    let db = app.db();
    let mut conn = db.conn.lock().map_err(|e| e.to_string())?;

    read_backup_file(&mut conn, Path::new(&path))?;
    log::info!("backup restored from {}", path);

    Ok(())
}
