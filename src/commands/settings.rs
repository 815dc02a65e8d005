use crate::db::DatabaseExt;
use crate::models::BusinessInfo;
use rusqlite::Connection;
use tauri::AppHandle;

pub(crate) fn read_business_info(conn: &Connection) -> Result<BusinessInfo, String> {
    let info = conn
        .query_row(
            "SELECT name, address, phone, tax_id FROM business_info WHERE id = 1",
            [],
            |row| {
                Ok(BusinessInfo {
                    name: row.get(0)?,
                    address: row.get(1)?,
                    phone: row.get(2)?,
                    tax_id: row.get(3)?,
                })
            },
        )
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(BusinessInfo {
                name: String::new(),
                address: String::new(),
                phone: None,
                tax_id: None,
            }),
            other => Err(other),
        })
        .map_err(|e| e.to_string())?;

    Ok(info)
}

pub(crate) fn write_business_info(conn: &Connection, info: &BusinessInfo) -> Result<(), String> {
    conn.execute(
        "INSERT INTO business_info (id, name, address, phone, tax_id) VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET name = ?1, address = ?2, phone = ?3, tax_id = ?4",
        rusqlite::params![info.name, info.address, info.phone, info.tax_id],
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}

#[tauri::command]
pub fn get_business_info(app: AppHandle) -> Result<BusinessInfo, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    read_business_info(&conn)
}

#[tauri::command]
pub fn update_business_info(app: AppHandle, info: BusinessInfo) -> Result<BusinessInfo, String> {
    let db = app.db();
    let conn = db.conn.lock().map_err(|e| e.to_string())?;

    write_business_info(&conn, &info)?;

    read_business_info(&conn)
}
