//! Stock alert derivation and the notification action pass-through.

use crate::db::Database;
use crate::models::StockAlert;
use rusqlite::Connection;

/// Ingredients expiring within this many days raise an alert.
const EXPIRY_WINDOW_DAYS: i64 = 3;

/// Receives `(notification_id, action)` pairs exactly as the user
/// triggered them. The flow routing into a sink never reinterprets,
/// filters or deduplicates.
pub trait AlertSink {
    fn notification_action(&self, notification_id: &str, action: &str) -> Result<(), String>;
}

impl AlertSink for Database {
    fn notification_action(&self, notification_id: &str, action: &str) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;

        conn.execute(
            "INSERT INTO alert_actions (notification_id, action) VALUES (?1, ?2)",
            [notification_id, action],
        )
        .map_err(|e| e.to_string())?;

        Ok(())
    }
}

/// Verbatim routing of a user action to the collaborator.
pub fn forward_alert_action<S: AlertSink + ?Sized>(
    sink: &S,
    notification_id: &str,
    action: &str,
) -> Result<(), String> {
    sink.notification_action(notification_id, action)
}

fn alert_id(kind: &str, scope: &str, row_id: i64) -> String {
    format!("{}:{}:{}", kind, scope, row_id)
}

/// Monitoring query: derives the active alerts from the current
/// ingredient and menu item state. Ids previously dismissed through the
/// action log are filtered here, at the source.
pub fn collect_stock_alerts(conn: &Connection) -> Result<Vec<StockAlert>, String> {
    let mut alerts: Vec<StockAlert> = Vec::new();

    let mut stmt = conn
        .prepare(
            "SELECT id, name, unit, current_stock, min_stock_level, expiry_date
             FROM ingredients
             ORDER BY name",
        )
        .map_err(|e| e.to_string())?;

    let ingredients = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    for (id, name, unit, current, min_level, expiry) in ingredients {
        if current <= 0.0 {
            alerts.push(StockAlert {
                id: alert_id("out_of_stock", "ingredient", id),
                alert_type: "out_of_stock".to_string(),
                severity: "critical".to_string(),
                ingredient_id: Some(id),
                menu_item_id: None,
                name: name.clone(),
                message: format!("{} is out of stock", name),
            });
        } else if current <= min_level {
            alerts.push(StockAlert {
                id: alert_id("low_stock", "ingredient", id),
                alert_type: "low_stock".to_string(),
                severity: "warning".to_string(),
                ingredient_id: Some(id),
                menu_item_id: None,
                name: name.clone(),
                message: format!(
                    "{} is low on stock: {} {} remaining (minimum {})",
                    name, current, unit, min_level
                ),
            });
        }

        if let Some(expiry_date) = expiry {
            let within_window: bool = conn
                .query_row(
                    "SELECT date(?1) <= date('now', ?2)",
                    rusqlite::params![
                        expiry_date,
                        format!("+{} days", EXPIRY_WINDOW_DAYS)
                    ],
                    |row| row.get(0),
                )
                .map_err(|e| e.to_string())?;

            if within_window {
                alerts.push(StockAlert {
                    id: alert_id("expiring", "ingredient", id),
                    alert_type: "expiring".to_string(),
                    severity: "warning".to_string(),
                    ingredient_id: Some(id),
                    menu_item_id: None,
                    name: name.clone(),
                    message: format!("{} expires on {}", name, expiry_date),
                });
            }
        }
    }

    let mut stmt = conn
        .prepare(
            "SELECT id, name, stock_count, low_stock_alert
             FROM menu_items
             WHERE stock_count <= low_stock_alert
             ORDER BY stock_count ASC",
        )
        .map_err(|e| e.to_string())?;

    let items = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i32>(2)?,
                row.get::<_, i32>(3)?,
            ))
        })
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    for (id, name, stock, threshold) in items {
        if stock <= 0 {
            alerts.push(StockAlert {
                id: alert_id("out_of_stock", "menu_item", id),
                alert_type: "out_of_stock".to_string(),
                severity: "critical".to_string(),
                ingredient_id: None,
                menu_item_id: Some(id),
                name: name.clone(),
                message: format!("{} is sold out", name),
            });
        } else {
            alerts.push(StockAlert {
                id: alert_id("low_stock", "menu_item", id),
                alert_type: "low_stock".to_string(),
                severity: "warning".to_string(),
                ingredient_id: None,
                menu_item_id: Some(id),
                name: name.clone(),
                message: format!(
                    "{} is low on stock: {} left (alert at {})",
                    name, stock, threshold
                ),
            });
        }
    }

    let mut stmt = conn
        .prepare("SELECT DISTINCT notification_id FROM alert_actions WHERE action = 'dismiss'")
        .map_err(|e| e.to_string())?;

    let dismissed: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    alerts.retain(|alert| !dismissed.contains(&alert.id));

    Ok(alerts)
}
