//! Plain-text receipt rendering for the printing collaborator.
//!
//! Everything here is a pure transform: the same `ReceiptData` value
//! always produces a byte-identical document. Device escape codes are
//! the printer integration's concern, not ours.

use crate::models::ReceiptData;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Character width of a thermal receipt line.
const WIDTH: usize = 42;

/// Formats an amount with a leading dollar sign and exactly two
/// decimals; negative amounts come out as `-$5.00`. Non-finite input is
/// a caller error and renders as `$NaN` / `$inf` rather than being
/// silently clamped.
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount.abs())
    }
}

/// Renders a timestamp as local `DD/MM/YYYY HH:MM:SS`. Accepts RFC 3339
/// or the SQLite `CURRENT_TIMESTAMP` format (interpreted as UTC).
/// Unparseable input yields the sentinel `"Invalid Date"`.
pub fn format_date_time(timestamp: &str) -> String {
    let parsed: Option<DateTime<Local>> = DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Local))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| Local.from_utc_datetime(&naive))
        });

    match parsed {
        Some(dt) => format!("{} {}", dt.format("%d/%m/%Y"), dt.format("%H:%M:%S")),
        None => "Invalid Date".to_string(),
    }
}

fn center(text: &str) -> String {
    let len = text.chars().count();
    if len >= WIDTH {
        return text.to_string();
    }
    let pad = (WIDTH - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Left label, right-aligned value, truncating the label if the two
/// would collide.
fn row(left: &str, right: &str) -> String {
    let right_len = right.chars().count();
    let max_left = WIDTH.saturating_sub(right_len + 1);
    let left: String = left.chars().take(max_left).collect();
    let pad = WIDTH
        .saturating_sub(left.chars().count() + right_len)
        .max(1);
    format!("{}{}{}", left, " ".repeat(pad), right)
}

fn rule() -> String {
    "-".repeat(WIDTH)
}

/// Composes the full printable document in fixed order: business
/// header, order number and timestamp, line items, subtotal/tax/tip/
/// total, payment details, server/table/customer, footer.
pub fn generate_print_content(data: &ReceiptData) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(center(&data.business.name.to_uppercase()));
    lines.push(center(&data.business.address));
    if let Some(phone) = &data.business.phone {
        lines.push(center(&format!("Tel: {}", phone)));
    }
    if let Some(tax_id) = &data.business.tax_id {
        lines.push(center(&format!("Tax ID: {}", tax_id)));
    }
    lines.push(rule());

    lines.push(format!("Order #{}", data.order_number));
    lines.push(format_date_time(&data.created_at));
    lines.push(rule());

    for item in &data.items {
        lines.push(row(
            &format!("{} x {}", item.quantity, item.name),
            &format_currency(item.total),
        ));
        lines.push(format!("    {} each", format_currency(item.unit_price)));
    }
    lines.push(rule());

    lines.push(row("Subtotal", &format_currency(data.subtotal)));
    lines.push(row("Tax", &format_currency(data.tax)));
    if let Some(tip) = data.tip {
        lines.push(row("Tip", &format_currency(tip)));
    }
    lines.push(row("TOTAL", &format_currency(data.total)));
    lines.push(rule());

    lines.push(format!("Payment: {}", data.payment_method));
    if let Some(cash) = data.cash_received {
        lines.push(row("Cash", &format_currency(cash)));
    }
    if let Some(change) = data.change_due {
        lines.push(row("Change", &format_currency(change)));
    }
    if let Some(staff) = &data.staff_name {
        lines.push(format!("Server: {}", staff));
    }
    if let Some(table) = data.table_number {
        lines.push(format!("Table: {}", table));
    }
    if let Some(customer) = &data.customer_name {
        lines.push(format!("Customer: {}", customer));
    }
    lines.push(rule());

    lines.push(center("Thank you for dining with us!"));
    lines.push(String::new());

    lines.join("\n")
}
