pub mod backup;
pub mod categories;
pub mod menu_items;
pub mod modifiers;
pub mod recipes;
pub mod receipts;
pub mod settings;
pub mod stock;
