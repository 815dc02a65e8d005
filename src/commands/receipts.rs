use crate::db::DatabaseExt;
use crate::models::{BusinessInfo, Receipt, ReceiptData, ReceiptLine};
use crate::printing::generate_print_content;
use rusqlite::Connection;
use tauri::AppHandle;

const RECEIPT_SELECT: &str =
    "SELECT id, order_number, business_name, business_address, business_phone, business_tax_id,
            subtotal, tax, tip, total, payment_method, cash_received, change_due, staff_name,
            table_number, customer_name, created_at, printed_at
     FROM receipts";

fn map_receipt(row: &rusqlite::Row) -> rusqlite::Result<Receipt> {
    Ok(Receipt {
        id: row.get(0)?,
        data: ReceiptData {
            order_number: row.get(1)?,
            business: BusinessInfo {
                name: row.get(2)?,
                address: row.get(3)?,
                phone: row.get(4)?,
                tax_id: row.get(5)?,
            },
            items: Vec::new(), // filled in afterwards
            subtotal: row.get(6)?,
            tax: row.get(7)?,
            tip: row.get(8)?,
            total: row.get(9)?,
            payment_method: row.get(10)?,
            cash_received: row.get(11)?,
            change_due: row.get(12)?,
            staff_name: row.get(13)?,
            table_number: row.get(14)?,
            customer_name: row.get(15)?,
            created_at: row.get(16)?,
        },
        printed_at: row.get(17)?,
    })
}

fn load_receipt_items(conn: &Connection, receipt_id: i64) -> Result<Vec<ReceiptLine>, String> {
    let mut stmt = conn
        .prepare(
            "SELECT name, quantity, unit_price, total FROM receipt_items WHERE receipt_id = ?1 ORDER BY id",
        )
        .map_err(|e| e.to_string())?;

    let result = stmt
        .query_map([receipt_id], |row| {
            Ok(ReceiptLine {
                name: row.get(0)?,
                quantity: row.get(1)?,
                unit_price: row.get(2)?,
                total: row.get(3)?,
            })
        })
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string());
    result
}

pub(crate) fn fetch_receipt(conn: &Connection, id: i64) -> Result<Receipt, String> {
    let mut receipt = conn
        .query_row(&format!("{} WHERE id = ?1", RECEIPT_SELECT), [id], map_receipt)
        .map_err(|e| e.to_string())?;

    receipt.data.items = load_receipt_items(conn, id)?;

    Ok(receipt)
}

/// Persists a checkout snapshot with its line items. The snapshot is
/// immutable from here on; only printed_at may transition later.
pub(crate) fn insert_receipt(conn: &mut Connection, data: &ReceiptData) -> Result<Receipt, String> {
    let tx = conn.transaction().map_err(|e| e.to_string())?;

    tx.execute(
        "INSERT INTO receipts (order_number, business_name, business_address, business_phone,
                               business_tax_id, subtotal, tax, tip, total, payment_method,
                               cash_received, change_due, staff_name, table_number, customer_name,
                               created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        rusqlite::params![
            data.order_number,
            data.business.name,
            data.business.address,
            data.business.phone,
            data.business.tax_id,
            data.subtotal,
            data.tax,
            data.tip,
            data.total,
            data.payment_method,
            data.cash_received,
            data.change_due,
            data.staff_name,
            data.table_number,
            data.customer_name,
            data.created_at
        ],
    )
    .map_err(|e| e.to_string())?;

    let receipt_id = tx.last_insert_rowid();

    for item in &data.items {
        tx.execute(
            "INSERT INTO receipt_items (receipt_id, name, quantity, unit_price, total) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![receipt_id, item.name, item.quantity, item.unit_price, item.total],
        )
        .map_err(|e| e.to_string())?;
    }

    tx.commit().map_err(|e| e.to_string())?;

    fetch_receipt(conn, receipt_id)
}

/// Sets printed_at on the first call only; later calls leave the
/// original marker untouched.
pub(crate) fn mark_printed(conn: &Connection, id: i64) -> Result<Receipt, String> {
    conn.execute(
        "UPDATE receipts SET printed_at = CURRENT_TIMESTAMP WHERE id = ?1 AND printed_at IS NULL",
        [id],
    )
    .map_err(|e| e.to_string())?;

    fetch_receipt(conn, id)
}

#[tauri::command]
pub fn create_receipt(app: AppHandle, data: ReceiptData) -> Result<Receipt, String> {
    let db = app.db();
    let mut conn = db.conn.lock().map_err(|e| e.to_string())?;

    insert_receipt(&mut conn, &data)
}

#[tauri::command]
pub fn get_receipts(app: AppHandle, limit: Option<i32>) -> Result<Vec<Receipt>, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    let limit = limit.unwrap_or(50);

    let mut stmt = conn
        .prepare(&format!(
            "{} ORDER BY created_at DESC, id DESC LIMIT ?1",
            RECEIPT_SELECT
        ))
        .map_err(|e| e.to_string())?;

    let mut receipts = stmt
        .query_map([limit], map_receipt)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    for receipt in &mut receipts {
        receipt.data.items = load_receipt_items(&conn, receipt.id)?;
    }

    Ok(receipts)
}

#[tauri::command]
pub fn get_receipt(app: AppHandle, id: i64) -> Result<Receipt, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    fetch_receipt(&conn, id)
}

#[tauri::command]
pub fn get_receipts_by_date_range(
    app: AppHandle,
    start_date: String,
    end_date: String,
) -> Result<Vec<Receipt>, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    let mut stmt = conn
        .prepare(&format!(
            "{} WHERE date(created_at, 'localtime') BETWEEN ?1 AND ?2 ORDER BY created_at DESC",
            RECEIPT_SELECT
        ))
        .map_err(|e| e.to_string())?;

    let mut receipts = stmt
        .query_map([&start_date, &end_date], map_receipt)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    for receipt in &mut receipts {
        receipt.data.items = load_receipt_items(&conn, receipt.id)?;
    }

    Ok(receipts)
}

/// Renders the stored snapshot through the formatter.
#[tauri::command]
pub fn receipt_print_content(app: AppHandle, id: i64) -> Result<String, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    let receipt = fetch_receipt(&conn, id)?;

    Ok(generate_print_content(&receipt.data))
}

#[tauri::command]
pub fn mark_receipt_printed(app: AppHandle, id: i64) -> Result<Receipt, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    mark_printed(&conn, id)
}
