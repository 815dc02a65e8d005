use rusqlite::{Connection, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tauri::AppHandle;

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn new(app_handle: &AppHandle) -> Result<Self> {
        let app_dir = app_handle
            .path()
            .app_data_dir()
            .expect("Failed to get app data dir");

        std::fs::create_dir_all(&app_dir).expect("Failed to create app data directory");

        let db_path: PathBuf = app_dir.join("resto_admin.db");
        log::info!("opening database at {}", db_path.display());
        let conn = Connection::open(db_path)?;

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        init_schema(&conn)?;

        // Run migrations for existing databases (pass connection to avoid deadlock)
        Self::migrate_conn(&conn)?;

        Ok(())
    }

    fn migrate_conn(conn: &Connection) -> Result<()> {
        // Columns added after the first release; create them on older databases
        let item_columns: Vec<String> = conn
            .prepare("PRAGMA table_info(menu_items)")?
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();

        if !item_columns.contains(&"calories".to_string()) {
            conn.execute(
                "ALTER TABLE menu_items ADD COLUMN calories INTEGER NOT NULL DEFAULT 0",
                [],
            )?;
        }
        if !item_columns.contains(&"preparation_time".to_string()) {
            conn.execute(
                "ALTER TABLE menu_items ADD COLUMN preparation_time INTEGER NOT NULL DEFAULT 0",
                [],
            )?;
        }

        let ingredient_columns: Vec<String> = conn
            .prepare("PRAGMA table_info(ingredients)")?
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();

        if !ingredient_columns.contains(&"expiry_date".to_string()) {
            conn.execute("ALTER TABLE ingredients ADD COLUMN expiry_date DATE", [])?;
        }

        let receipt_columns: Vec<String> = conn
            .prepare("PRAGMA table_info(receipts)")?
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();

        if !receipt_columns.contains(&"printed_at".to_string()) {
            conn.execute("ALTER TABLE receipts ADD COLUMN printed_at DATETIME", [])?;
        }

        Ok(())
    }
}

/// Idempotent schema creation. Shared with the test setup so tests run
/// against the real schema.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Menu categories
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            color TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Sellable items
        CREATE TABLE IF NOT EXISTS menu_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            price REAL NOT NULL,
            category_id INTEGER,
            is_available INTEGER NOT NULL DEFAULT 1,
            stock_count INTEGER NOT NULL DEFAULT 0,
            low_stock_alert INTEGER NOT NULL DEFAULT 5,
            allergens TEXT NOT NULL DEFAULT '[]',
            preparation_time INTEGER NOT NULL DEFAULT 0,
            calories INTEGER NOT NULL DEFAULT 0,
            is_vegetarian INTEGER NOT NULL DEFAULT 0,
            is_vegan INTEGER NOT NULL DEFAULT 0,
            is_gluten_free INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (category_id) REFERENCES categories(id)
        );

        -- Item modifiers (extra cheese, no onions, ...)
        CREATE TABLE IF NOT EXISTS modifiers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            price_adjustment REAL NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS menu_item_modifiers (
            menu_item_id INTEGER NOT NULL,
            modifier_id INTEGER NOT NULL,
            PRIMARY KEY (menu_item_id, modifier_id),
            FOREIGN KEY (menu_item_id) REFERENCES menu_items(id),
            FOREIGN KEY (modifier_id) REFERENCES modifiers(id)
        );

        -- Raw ingredients tracked for recipes and stock alerts
        CREATE TABLE IF NOT EXISTS ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            unit TEXT NOT NULL DEFAULT 'unit',
            current_stock REAL NOT NULL DEFAULT 0,
            min_stock_level REAL NOT NULL DEFAULT 0,
            cost_per_unit REAL NOT NULL DEFAULT 0,
            supplier TEXT,
            expiry_date DATE,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Recipe lines; the set for one menu item is replaced wholesale on save
        CREATE TABLE IF NOT EXISTS menu_item_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            menu_item_id INTEGER NOT NULL,
            ingredient_id INTEGER NOT NULL,
            quantity_required REAL NOT NULL,
            unit TEXT NOT NULL,
            FOREIGN KEY (menu_item_id) REFERENCES menu_items(id),
            FOREIGN KEY (ingredient_id) REFERENCES ingredients(id)
        );

        -- Append-only inventory movements
        CREATE TABLE IF NOT EXISTS stock_adjustments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ingredient_id INTEGER NOT NULL,
            adjustment_type TEXT NOT NULL,
            quantity_change REAL NOT NULL,
            unit_cost REAL,
            total_cost REAL,
            staff_name TEXT,
            supplier TEXT,
            reference TEXT,
            notes TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (ingredient_id) REFERENCES ingredients(id)
        );

        -- User actions routed from the alert panel
        CREATE TABLE IF NOT EXISTS alert_actions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            notification_id TEXT NOT NULL,
            action TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Singleton row holding the receipt header details
        CREATE TABLE IF NOT EXISTS business_info (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            name TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            phone TEXT,
            tax_id TEXT
        );

        -- Immutable checkout snapshots
        CREATE TABLE IF NOT EXISTS receipts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_number TEXT NOT NULL,
            business_name TEXT NOT NULL,
            business_address TEXT NOT NULL,
            business_phone TEXT,
            business_tax_id TEXT,
            subtotal REAL NOT NULL,
            tax REAL NOT NULL,
            tip REAL,
            total REAL NOT NULL,
            payment_method TEXT NOT NULL,
            cash_received REAL,
            change_due REAL,
            staff_name TEXT,
            table_number INTEGER,
            customer_name TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            printed_at DATETIME
        );

        CREATE TABLE IF NOT EXISTS receipt_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            receipt_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            unit_price REAL NOT NULL,
            total REAL NOT NULL,
            FOREIGN KEY (receipt_id) REFERENCES receipts(id)
        );
        ",
    )
}

use tauri::Manager;

pub trait DatabaseExt {
    fn db(&self) -> Arc<Database>;
}

impl DatabaseExt for AppHandle {
    fn db(&self) -> Arc<Database> {
        self.state::<Arc<Database>>().inner().clone()
    }
}
