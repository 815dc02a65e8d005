//! Integration tests for the admin backend
//! These tests use an in-memory SQLite database plus mock collaborators
//! to exercise the business logic without a running Tauri app

#[cfg(test)]
mod tests {
    use crate::alerts::{collect_stock_alerts, forward_alert_action, AlertSink};
    use crate::commands::backup::{
        export_snapshot, import_snapshot, read_backup_file, write_backup_file,
    };
    use crate::commands::menu_items::{fetch_menu_item, insert_menu_item, resolve_category};
    use crate::commands::receipts::{fetch_receipt, insert_receipt, mark_printed};
    use crate::commands::recipes::recipe_cost;
    use crate::commands::settings::{read_business_info, write_business_info};
    use crate::commands::stock::{adjustment_total_cost, apply_adjustment};
    use crate::db::{init_schema, Database};
    use crate::forms::{
        convert_form_data_to_record, validate_menu_item_form, MenuItemFormData,
    };
    use crate::models::{
        BusinessInfo, CreateStockAdjustment, MenuItemIngredient, ReceiptData, ReceiptLine,
    };
    use crate::notify::{Notice, Notifier};
    use crate::printing::{format_currency, format_date_time, generate_print_content};
    use crate::recipe::{FlowState, RecipeFlow, RecipeFormData, RecipeLineInput, RecipeStore};
    use rusqlite::Connection;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Create a test database with the real schema
    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
        init_schema(&conn).expect("Failed to create schema");
        conn
    }

    /// Seed test data
    fn seed_test_data(conn: &Connection) {
        conn.execute_batch(
            "
            INSERT INTO categories (id, name) VALUES (1, 'Pizza');
            INSERT INTO categories (id, name) VALUES (2, 'Salads');

            INSERT INTO menu_items (id, name, price, category_id, stock_count, low_stock_alert)
                VALUES (1, 'Margherita Pizza', 12.5, 1, 20, 5);
            INSERT INTO menu_items (id, name, price, category_id, stock_count, low_stock_alert)
                VALUES (2, 'Caesar Salad', 9.0, 2, 2, 5);
            INSERT INTO menu_items (id, name, price, category_id, stock_count, low_stock_alert)
                VALUES (3, 'Lemonade', 4.0, NULL, 0, 3);

            INSERT INTO ingredients (id, name, unit, current_stock, min_stock_level, cost_per_unit)
                VALUES (1, 'Flour', 'kg', 10, 5, 2.0);
            INSERT INTO ingredients (id, name, unit, current_stock, min_stock_level, cost_per_unit)
                VALUES (2, 'Tomatoes', 'kg', 2, 5, 3.5);
            INSERT INTO ingredients (id, name, unit, current_stock, min_stock_level, cost_per_unit)
                VALUES (3, 'Basil', 'bunch', 0, 1, 1.25);
            INSERT INTO ingredients (id, name, unit, current_stock, min_stock_level, cost_per_unit, expiry_date)
                VALUES (4, 'Cream', 'l', 5, 2, 2.8, date('now', '+2 days'));

            INSERT INTO modifiers (id, name, price_adjustment) VALUES (1, 'Extra Cheese', 1.5);
            INSERT INTO modifiers (id, name, price_adjustment) VALUES (2, 'Gluten Free Base', 2.0);
            ",
        )
        .expect("Failed to seed test data");
    }

    fn valid_form() -> MenuItemFormData {
        MenuItemFormData {
            name: "Margherita Pizza".to_string(),
            description: "Tomato, mozzarella and basil".to_string(),
            price: 12.5,
            category: "Pizza".to_string(),
            is_available: true,
            stock_count: 20,
            low_stock_alert: 5,
            allergens: vec!["gluten".to_string(), "dairy".to_string()],
            modifiers: vec![1, 2],
            preparation_time: 15,
            calories: 850,
            is_vegetarian: true,
            is_vegan: false,
            is_gluten_free: false,
        }
    }

    fn sample_receipt() -> ReceiptData {
        ReceiptData {
            order_number: "1042".to_string(),
            created_at: "2026-01-15 19:30:00".to_string(),
            business: BusinessInfo {
                name: "Trattoria Roma".to_string(),
                address: "12 Via Nazionale".to_string(),
                phone: Some("555-0100".to_string()),
                tax_id: Some("IT-998877".to_string()),
            },
            items: vec![
                ReceiptLine {
                    name: "Margherita Pizza".to_string(),
                    quantity: 2,
                    unit_price: 12.5,
                    total: 25.0,
                },
                ReceiptLine {
                    name: "Caesar Salad".to_string(),
                    quantity: 1,
                    unit_price: 9.0,
                    total: 9.0,
                },
            ],
            subtotal: 34.0,
            tax: 2.72,
            tip: Some(5.0),
            total: 41.72,
            payment_method: "Cash".to_string(),
            cash_received: Some(50.0),
            change_due: Some(8.28),
            staff_name: Some("Alice".to_string()),
            table_number: Some(7),
            customer_name: Some("Bob".to_string()),
        }
    }

    struct RecordingNotifier {
        notices: RefCell<Vec<Notice>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            RecordingNotifier {
                notices: RefCell::new(Vec::new()),
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: &Notice) {
            self.notices.borrow_mut().push(notice.clone());
        }
    }

    // ===== CATEGORY TESTS =====

    #[test]
    fn test_create_category() {
        let conn = setup_test_db();

        conn.execute("INSERT INTO categories (name, color) VALUES ('Desserts', '#f59e0b')", [])
            .unwrap();

        let (name, color, active): (String, Option<String>, bool) = conn
            .query_row(
                "SELECT name, color, is_active FROM categories WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(name, "Desserts");
        assert_eq!(color, Some("#f59e0b".to_string()));
        assert!(active);
    }

    #[test]
    fn test_category_unique_constraint() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        let result = conn.execute("INSERT INTO categories (name) VALUES ('Pizza')", []);
        assert!(result.is_err(), "Should not allow duplicate category names");
    }

    #[test]
    fn test_delete_category_detaches_items() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        conn.execute("UPDATE menu_items SET category_id = NULL WHERE category_id = 1", [])
            .unwrap();
        conn.execute("DELETE FROM categories WHERE id = 1", []).unwrap();

        let category_id: Option<i64> = conn
            .query_row("SELECT category_id FROM menu_items WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(category_id, None);
    }

    #[test]
    fn test_resolve_category_reuses_and_creates() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        let existing = resolve_category(&conn, "Pizza").unwrap();
        assert_eq!(existing, 1);

        let created = resolve_category(&conn, "Drinks").unwrap();
        assert!(created > 2);

        let again = resolve_category(&conn, "Drinks").unwrap();
        assert_eq!(created, again);
    }

    // ===== MENU ITEM TESTS =====

    #[test]
    fn test_insert_menu_item_from_form() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        let mut form = valid_form();
        form.name = "Quattro Formaggi".to_string();

        let record = convert_form_data_to_record(&form);
        let item = insert_menu_item(&conn, &record).unwrap();

        assert_eq!(item.name, "Quattro Formaggi");
        assert!((item.price - 12.5).abs() < 0.01);
        assert_eq!(item.category_name, Some("Pizza".to_string()));
        assert_eq!(item.allergens, vec!["gluten".to_string(), "dairy".to_string()]);
        assert_eq!(item.modifier_ids, vec![1, 2]);
        assert!(item.is_vegetarian);
        assert!(!item.is_gluten_free);
    }

    #[test]
    fn test_low_stock_item_detection() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        // Caesar Salad (2 <= 5) and Lemonade (0 <= 3) are low
        let low_stock_count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM menu_items WHERE stock_count <= low_stock_alert",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(low_stock_count, 2);
    }

    #[test]
    fn test_delete_menu_item_removes_joins() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        conn.execute(
            "INSERT INTO menu_item_modifiers (menu_item_id, modifier_id) VALUES (1, 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO menu_item_ingredients (menu_item_id, ingredient_id, quantity_required, unit) VALUES (1, 1, 0.3, 'kg')",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM menu_item_modifiers WHERE menu_item_id = 1", [])
            .unwrap();
        conn.execute("DELETE FROM menu_item_ingredients WHERE menu_item_id = 1", [])
            .unwrap();
        conn.execute("DELETE FROM menu_items WHERE id = 1", []).unwrap();

        let joins: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM menu_item_modifiers WHERE menu_item_id = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(joins, 0);

        let result = fetch_menu_item(&conn, 1);
        assert!(result.is_err());
    }

    // ===== FORM VALIDATION TESTS =====

    #[test]
    fn test_valid_form_passes_without_notice() {
        let notifier = RecordingNotifier::new();

        assert!(validate_menu_item_form(&valid_form(), &notifier));
        assert!(notifier.notices.borrow().is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let notifier = RecordingNotifier::new();
        let mut form = valid_form();
        form.name = "".to_string();

        assert!(!validate_menu_item_form(&form, &notifier));

        let notices = notifier.notices.borrow();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].description, "Item name is required.");
        assert_eq!(notices[0].variant, "destructive");
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let notifier = RecordingNotifier::new();
        let mut form = valid_form();
        form.name = "   \t".to_string();

        assert!(!validate_menu_item_form(&form, &notifier));
        assert_eq!(
            notifier.notices.borrow()[0].description,
            "Item name is required."
        );
    }

    #[test]
    fn test_name_failure_short_circuits() {
        // Name, category and price all invalid: only the name message fires
        let notifier = RecordingNotifier::new();
        let mut form = valid_form();
        form.name = " ".to_string();
        form.category = "".to_string();
        form.price = -1.0;

        assert!(!validate_menu_item_form(&form, &notifier));

        let notices = notifier.notices.borrow();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].description, "Item name is required.");
    }

    #[test]
    fn test_empty_category_rejected() {
        let notifier = RecordingNotifier::new();
        let mut form = valid_form();
        form.category = "  ".to_string();

        assert!(!validate_menu_item_form(&form, &notifier));
        assert_eq!(
            notifier.notices.borrow()[0].description,
            "Category is required."
        );
    }

    #[test]
    fn test_zero_and_negative_price_rejected() {
        for price in [0.0, -3.5] {
            let notifier = RecordingNotifier::new();
            let mut form = valid_form();
            form.price = price;

            assert!(!validate_menu_item_form(&form, &notifier));
            assert_eq!(
                notifier.notices.borrow()[0].description,
                "Price must be greater than 0."
            );
        }
    }

    #[test]
    fn test_nan_price_rejected() {
        let notifier = RecordingNotifier::new();
        let mut form = valid_form();
        form.price = f64::NAN;

        assert!(!validate_menu_item_form(&form, &notifier));
        assert_eq!(
            notifier.notices.borrow()[0].description,
            "Price must be greater than 0."
        );
    }

    // ===== FORM CONVERSION TESTS =====

    #[test]
    fn test_convert_preserves_every_field() {
        let form = valid_form();
        let record = convert_form_data_to_record(&form);

        assert_eq!(record.name, form.name);
        assert_eq!(record.description, form.description);
        assert_eq!(record.price, form.price);
        assert_eq!(record.category, form.category);
        assert_eq!(record.is_available, form.is_available);
        assert_eq!(record.stock_count, form.stock_count);
        assert_eq!(record.low_stock_alert, form.low_stock_alert);
        assert_eq!(record.allergens, form.allergens);
        assert_eq!(record.modifiers, form.modifiers);
        assert_eq!(record.preparation_time, form.preparation_time);
        assert_eq!(record.calories, form.calories);
        assert_eq!(record.is_vegetarian, form.is_vegetarian);
        assert_eq!(record.is_vegan, form.is_vegan);
        assert_eq!(record.is_gluten_free, form.is_gluten_free);
    }

    #[test]
    fn test_convert_is_a_reversible_rename() {
        // Reversing the rename recovers the original form exactly
        let form = valid_form();
        let record = convert_form_data_to_record(&form);

        let recovered = MenuItemFormData {
            name: record.name,
            description: record.description,
            price: record.price,
            category: record.category,
            is_available: record.is_available,
            stock_count: record.stock_count,
            low_stock_alert: record.low_stock_alert,
            allergens: record.allergens,
            modifiers: record.modifiers,
            preparation_time: record.preparation_time,
            calories: record.calories,
            is_vegetarian: record.is_vegetarian,
            is_vegan: record.is_vegan,
            is_gluten_free: record.is_gluten_free,
        };

        assert_eq!(recovered, form);
    }

    #[test]
    fn test_form_and_record_field_casing() {
        let form = valid_form();
        let record = convert_form_data_to_record(&form);

        let form_json = serde_json::to_value(&form).unwrap();
        let record_json = serde_json::to_value(&record).unwrap();

        assert!(form_json.get("stockCount").is_some());
        assert!(form_json.get("stock_count").is_none());
        assert!(record_json.get("stock_count").is_some());
        assert!(record_json.get("stockCount").is_none());
    }

    // ===== RECIPE STORE TESTS =====

    fn recipe_form(menu_item_id: i64, lines: &[(i64, f64, &str)]) -> RecipeFormData {
        RecipeFormData {
            menu_item_id,
            ingredients: lines
                .iter()
                .map(|(ingredient_id, quantity_required, unit)| RecipeLineInput {
                    ingredient_id: *ingredient_id,
                    quantity_required: *quantity_required,
                    unit: unit.to_string(),
                })
                .collect(),
        }
    }

    fn seeded_database() -> Database {
        let conn = setup_test_db();
        seed_test_data(&conn);
        Database {
            conn: Mutex::new(conn),
        }
    }

    #[test]
    fn test_store_save_and_get_recipe() {
        let db = seeded_database();

        let saved = db
            .save_menu_item_recipe(&recipe_form(1, &[(1, 0.3, "kg"), (2, 0.2, "kg")]))
            .unwrap();
        assert!(saved);

        let recipe = db.get_menu_item_recipe(1).unwrap();
        assert_eq!(recipe.len(), 2);
        assert_eq!(recipe[0].ingredient_name, Some("Flour".to_string()));
        assert!((recipe[0].quantity_required - 0.3).abs() < 1e-9);
        assert_eq!(recipe[1].ingredient_name, Some("Tomatoes".to_string()));
    }

    #[test]
    fn test_store_save_replaces_wholesale() {
        let db = seeded_database();

        db.save_menu_item_recipe(&recipe_form(1, &[(1, 0.3, "kg"), (2, 0.2, "kg")]))
            .unwrap();
        db.save_menu_item_recipe(&recipe_form(1, &[(3, 1.0, "bunch")]))
            .unwrap();

        let recipe = db.get_menu_item_recipe(1).unwrap();
        assert_eq!(recipe.len(), 1);
        assert_eq!(recipe[0].ingredient_name, Some("Basil".to_string()));
    }

    #[test]
    fn test_store_rejects_nonpositive_quantity() {
        let db = seeded_database();

        db.save_menu_item_recipe(&recipe_form(1, &[(1, 0.3, "kg")]))
            .unwrap();

        let saved = db
            .save_menu_item_recipe(&recipe_form(1, &[(1, 0.0, "kg")]))
            .unwrap();
        assert!(!saved);

        // Rejection leaves the stored recipe untouched
        let recipe = db.get_menu_item_recipe(1).unwrap();
        assert_eq!(recipe.len(), 1);
        assert!((recipe[0].quantity_required - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_store_rejects_unknown_menu_item() {
        let db = seeded_database();

        let saved = db
            .save_menu_item_recipe(&recipe_form(999, &[(1, 0.3, "kg")]))
            .unwrap();
        assert!(!saved);
    }

    // ===== RECIPE FLOW TESTS =====

    struct MockStore {
        recipes: RefCell<HashMap<i64, Vec<MenuItemIngredient>>>,
        fetch_count: Cell<i32>,
        fail_fetch: Cell<bool>,
        fail_save: Cell<bool>,
        reject_save: Cell<bool>,
    }

    impl MockStore {
        fn new() -> Arc<Self> {
            Arc::new(MockStore {
                recipes: RefCell::new(HashMap::new()),
                fetch_count: Cell::new(0),
                fail_fetch: Cell::new(false),
                fail_save: Cell::new(false),
                reject_save: Cell::new(false),
            })
        }

        fn put(&self, item_id: i64, lines: Vec<MenuItemIngredient>) {
            self.recipes.borrow_mut().insert(item_id, lines);
        }
    }

    impl RecipeStore for MockStore {
        fn get_menu_item_recipe(&self, item_id: i64) -> Result<Vec<MenuItemIngredient>, String> {
            if self.fail_fetch.get() {
                return Err("store offline".to_string());
            }
            self.fetch_count.set(self.fetch_count.get() + 1);
            Ok(self
                .recipes
                .borrow()
                .get(&item_id)
                .cloned()
                .unwrap_or_default())
        }

        fn save_menu_item_recipe(&self, recipe: &RecipeFormData) -> Result<bool, String> {
            if self.fail_save.get() {
                return Err("store offline".to_string());
            }
            if self.reject_save.get() {
                return Ok(false);
            }
            let lines = recipe
                .ingredients
                .iter()
                .enumerate()
                .map(|(i, line)| MenuItemIngredient {
                    id: i as i64 + 1,
                    menu_item_id: recipe.menu_item_id,
                    ingredient_id: line.ingredient_id,
                    ingredient_name: None,
                    quantity_required: line.quantity_required,
                    unit: line.unit.clone(),
                })
                .collect();
            self.recipes.borrow_mut().insert(recipe.menu_item_id, lines);
            Ok(true)
        }
    }

    fn line(item_id: i64, ingredient_id: i64, quantity: f64) -> MenuItemIngredient {
        MenuItemIngredient {
            id: ingredient_id,
            menu_item_id: item_id,
            ingredient_id,
            ingredient_name: None,
            quantity_required: quantity,
            unit: "kg".to_string(),
        }
    }

    #[test]
    fn test_flow_bind_fetches_once_per_identity() {
        let store = MockStore::new();
        store.put(1, vec![line(1, 1, 0.3)]);
        store.put(2, vec![line(2, 2, 0.5), line(2, 3, 1.0)]);

        let mut flow = RecipeFlow::new(store.clone());
        assert_eq!(flow.state(), FlowState::Idle);

        flow.bind(1).unwrap();
        assert_eq!(store.fetch_count.get(), 1);
        assert_eq!(flow.recipe().len(), 1);
        assert_eq!(flow.state(), FlowState::Ready);

        // Rebinding the same item is a no-op
        flow.bind(1).unwrap();
        assert_eq!(store.fetch_count.get(), 1);

        // A new identity refetches and replaces wholesale
        flow.bind(2).unwrap();
        assert_eq!(store.fetch_count.get(), 2);
        assert_eq!(flow.recipe().len(), 2);
        assert_eq!(flow.bound_item(), Some(2));
    }

    #[test]
    fn test_flow_save_resyncs_from_store() {
        let store = MockStore::new();
        store.put(1, vec![line(1, 1, 0.3)]);

        let mut flow = RecipeFlow::new(store.clone());
        flow.bind(1).unwrap();

        let saved = flow
            .save_recipe(&recipe_form(1, &[(1, 0.4, "kg"), (2, 0.1, "kg")]))
            .unwrap();
        assert!(saved);

        // Read-after-write: local state now matches an immediate fetch
        assert_eq!(flow.recipe(), &store.get_menu_item_recipe(1).unwrap()[..]);
        assert_eq!(flow.recipe().len(), 2);
        assert!(!flow.is_loading());
        assert_eq!(flow.state(), FlowState::Ready);
    }

    #[test]
    fn test_flow_save_failure_leaves_state_untouched() {
        let store = MockStore::new();
        store.put(1, vec![line(1, 1, 0.3)]);

        let mut flow = RecipeFlow::new(store.clone());
        flow.bind(1).unwrap();
        store.fail_save.set(true);

        let result = flow.save_recipe(&recipe_form(1, &[(1, 0.4, "kg")]));
        assert!(result.is_err());
        assert_eq!(flow.recipe().len(), 1);
        assert!((flow.recipe()[0].quantity_required - 0.3).abs() < 1e-9);
        assert_eq!(flow.state(), FlowState::Ready);
        assert!(!flow.is_loading());
    }

    #[test]
    fn test_flow_rejected_save_does_not_resync() {
        let store = MockStore::new();
        store.put(1, vec![line(1, 1, 0.3)]);

        let mut flow = RecipeFlow::new(store.clone());
        flow.bind(1).unwrap();
        let fetches_before = store.fetch_count.get();
        store.reject_save.set(true);

        let saved = flow.save_recipe(&recipe_form(1, &[(1, 0.4, "kg")])).unwrap();
        assert!(!saved);
        assert_eq!(store.fetch_count.get(), fetches_before);
        assert_eq!(flow.state(), FlowState::Ready);
    }

    #[test]
    fn test_flow_unbound_save_skips_resync() {
        let store = MockStore::new();
        let mut flow = RecipeFlow::new(store.clone());

        let saved = flow.save_recipe(&recipe_form(1, &[(1, 0.4, "kg")])).unwrap();
        assert!(saved);
        assert_eq!(store.fetch_count.get(), 0);
        assert_eq!(flow.state(), FlowState::Idle);
        assert!(flow.recipe().is_empty());
    }

    #[test]
    fn test_flow_fetch_failure_clears_loading() {
        let store = MockStore::new();
        store.fail_fetch.set(true);

        let mut flow = RecipeFlow::new(store.clone());
        let result = flow.bind(1);

        assert!(result.is_err());
        assert!(!flow.is_loading());
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[test]
    fn test_flow_discards_stale_fetch() {
        let store = MockStore::new();
        store.put(1, vec![line(1, 1, 0.3)]);
        store.put(2, vec![line(2, 2, 0.5)]);

        let mut flow = RecipeFlow::new(store.clone());
        flow.bind(1).unwrap();

        // A fetch completing for an item that is not the bound one is
        // discarded; the bound item's recipe stays in place
        flow.fetch_recipe(2).unwrap();
        assert_eq!(flow.recipe().len(), 1);
        assert_eq!(flow.recipe()[0].ingredient_id, 1);
        assert!(!flow.is_loading());
    }

    // ===== STOCK ADJUSTMENT TESTS =====

    #[test]
    fn test_restock_adjustment_applies_to_stock() {
        let mut conn = setup_test_db();
        seed_test_data(&conn);

        let adjustment = apply_adjustment(
            &mut conn,
            &CreateStockAdjustment {
                ingredient_id: 1,
                adjustment_type: "restock".to_string(),
                quantity_change: 5.0,
                unit_cost: Some(2.0),
                total_cost: None,
                staff_name: Some("Alice".to_string()),
                supplier: Some("Mill & Co".to_string()),
                reference: Some("PO-1881".to_string()),
                notes: None,
            },
        )
        .unwrap();

        assert_eq!(adjustment.ingredient_name, Some("Flour".to_string()));
        assert_eq!(adjustment.total_cost, Some(10.0));

        let stock: f64 = conn
            .query_row("SELECT current_stock FROM ingredients WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert!((stock - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_waste_adjustment_reduces_stock() {
        let mut conn = setup_test_db();
        seed_test_data(&conn);

        apply_adjustment(
            &mut conn,
            &CreateStockAdjustment {
                ingredient_id: 1,
                adjustment_type: "waste".to_string(),
                quantity_change: -2.0,
                unit_cost: None,
                total_cost: None,
                staff_name: None,
                supplier: None,
                reference: None,
                notes: Some("dropped a sack".to_string()),
            },
        )
        .unwrap();

        let stock: f64 = conn
            .query_row("SELECT current_stock FROM ingredients WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert!((stock - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_adjustment_rejects_bad_input() {
        let mut conn = setup_test_db();
        seed_test_data(&conn);

        let unknown_type = apply_adjustment(
            &mut conn,
            &CreateStockAdjustment {
                ingredient_id: 1,
                adjustment_type: "shrinkage".to_string(),
                quantity_change: -1.0,
                unit_cost: None,
                total_cost: None,
                staff_name: None,
                supplier: None,
                reference: None,
                notes: None,
            },
        );
        assert!(unknown_type.is_err());

        let zero_change = apply_adjustment(
            &mut conn,
            &CreateStockAdjustment {
                ingredient_id: 1,
                adjustment_type: "correction".to_string(),
                quantity_change: 0.0,
                unit_cost: None,
                total_cost: None,
                staff_name: None,
                supplier: None,
                reference: None,
                notes: None,
            },
        );
        assert!(zero_change.is_err());

        let unknown_ingredient = apply_adjustment(
            &mut conn,
            &CreateStockAdjustment {
                ingredient_id: 999,
                adjustment_type: "restock".to_string(),
                quantity_change: 5.0,
                unit_cost: None,
                total_cost: None,
                staff_name: None,
                supplier: None,
                reference: None,
                notes: None,
            },
        );
        assert!(unknown_ingredient.is_err());

        // Nothing was recorded
        let count: i32 = conn
            .query_row("SELECT COUNT(*) FROM stock_adjustments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_adjustments_are_append_only() {
        let mut conn = setup_test_db();
        seed_test_data(&conn);

        for change in [5.0, -2.0] {
            apply_adjustment(
                &mut conn,
                &CreateStockAdjustment {
                    ingredient_id: 1,
                    adjustment_type: "correction".to_string(),
                    quantity_change: change,
                    unit_cost: None,
                    total_cost: None,
                    staff_name: None,
                    supplier: None,
                    reference: None,
                    notes: None,
                },
            )
            .unwrap();
        }

        let count: i32 = conn
            .query_row("SELECT COUNT(*) FROM stock_adjustments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        // The first record still carries its original change
        let first_change: f64 = conn
            .query_row("SELECT quantity_change FROM stock_adjustments WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!((first_change - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_adjustment_total_cost_derivation() {
        assert_eq!(adjustment_total_cost(Some(2.0), None, -3.0), Some(6.0));
        assert_eq!(adjustment_total_cost(Some(2.0), Some(10.0), 4.0), Some(10.0));
        assert_eq!(adjustment_total_cost(None, None, 5.0), None);
    }

    // ===== STOCK ALERT TESTS =====

    #[test]
    fn test_alerts_cover_ingredients_and_items() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        let alerts = collect_stock_alerts(&conn).unwrap();
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();

        // Basil is out, Tomatoes low, Cream expiring; Caesar low, Lemonade out
        assert!(ids.contains(&"out_of_stock:ingredient:3"));
        assert!(ids.contains(&"low_stock:ingredient:2"));
        assert!(ids.contains(&"expiring:ingredient:4"));
        assert!(ids.contains(&"low_stock:menu_item:2"));
        assert!(ids.contains(&"out_of_stock:menu_item:3"));

        // Healthy rows raise nothing
        assert!(!ids.iter().any(|id| id.ends_with("ingredient:1")));
        assert!(!ids.iter().any(|id| id.ends_with("menu_item:1")));

        let basil = alerts.iter().find(|a| a.id == "out_of_stock:ingredient:3").unwrap();
        assert_eq!(basil.severity, "critical");
        assert_eq!(basil.ingredient_id, Some(3));

        let caesar = alerts.iter().find(|a| a.id == "low_stock:menu_item:2").unwrap();
        assert_eq!(caesar.severity, "warning");
        assert_eq!(caesar.menu_item_id, Some(2));
    }

    #[test]
    fn test_dismissed_alerts_are_filtered() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        conn.execute(
            "INSERT INTO alert_actions (notification_id, action) VALUES ('low_stock:ingredient:2', 'dismiss')",
            [],
        )
        .unwrap();

        let alerts = collect_stock_alerts(&conn).unwrap();
        assert!(!alerts.iter().any(|a| a.id == "low_stock:ingredient:2"));
        assert!(alerts.iter().any(|a| a.id == "out_of_stock:ingredient:3"));
    }

    #[test]
    fn test_acknowledge_does_not_filter() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        conn.execute(
            "INSERT INTO alert_actions (notification_id, action) VALUES ('low_stock:ingredient:2', 'acknowledge')",
            [],
        )
        .unwrap();

        let alerts = collect_stock_alerts(&conn).unwrap();
        assert!(alerts.iter().any(|a| a.id == "low_stock:ingredient:2"));
    }

    #[test]
    fn test_far_expiry_raises_no_alert() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        conn.execute(
            "UPDATE ingredients SET expiry_date = date('now', '+30 days') WHERE id = 4",
            [],
        )
        .unwrap();

        let alerts = collect_stock_alerts(&conn).unwrap();
        assert!(!alerts.iter().any(|a| a.id == "expiring:ingredient:4"));
    }

    // ===== ALERT ACTION ROUTING TESTS =====

    struct RecordingSink {
        calls: RefCell<Vec<(String, String)>>,
    }

    impl AlertSink for RecordingSink {
        fn notification_action(&self, notification_id: &str, action: &str) -> Result<(), String> {
            self.calls
                .borrow_mut()
                .push((notification_id.to_string(), action.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_action_forwarded_verbatim() {
        let sink = RecordingSink {
            calls: RefCell::new(Vec::new()),
        };

        forward_alert_action(&sink, "low_stock:ingredient:42", "dismiss").unwrap();
        forward_alert_action(&sink, "an id with spaces / symbols!", "reorder").unwrap();

        let calls = sink.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            ("low_stock:ingredient:42".to_string(), "dismiss".to_string())
        );
        assert_eq!(
            calls[1],
            ("an id with spaces / symbols!".to_string(), "reorder".to_string())
        );
    }

    #[test]
    fn test_database_sink_records_action() {
        let db = seeded_database();

        forward_alert_action(&db, "out_of_stock:ingredient:3", "reorder").unwrap();

        let conn = db.conn.lock().unwrap();
        let (id, action): (String, String) = conn
            .query_row(
                "SELECT notification_id, action FROM alert_actions WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(id, "out_of_stock:ingredient:3");
        assert_eq!(action, "reorder");
    }

    // ===== RECEIPT FORMATTING TESTS =====

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(12.5), "$12.50");
        assert_eq!(format_currency(0.1), "$0.10");
        assert_eq!(format_currency(1234.567), "$1234.57");
        assert_eq!(format_currency(-3.0), "-$3.00");
        assert_eq!(format_currency(-0.0), "$0.00");
    }

    #[test]
    fn test_format_currency_nonfinite_is_documented() {
        // Caller error, rendered without clamping
        assert_eq!(format_currency(f64::NAN), "$NaN");
        assert_eq!(format_currency(f64::INFINITY), "$inf");
        assert_eq!(format_currency(f64::NEG_INFINITY), "-$inf");
    }

    #[test]
    fn test_format_date_time_accepts_both_formats() {
        let sqlite = format_date_time("2026-01-15 19:30:00");
        assert_ne!(sqlite, "Invalid Date");
        assert!(sqlite.contains('/'));
        assert!(sqlite.contains(':'));

        let rfc3339 = format_date_time("2026-01-15T19:30:00Z");
        assert_ne!(rfc3339, "Invalid Date");
        assert_eq!(sqlite, rfc3339);
    }

    #[test]
    fn test_format_date_time_sentinel() {
        assert_eq!(format_date_time("yesterday-ish"), "Invalid Date");
        assert_eq!(format_date_time(""), "Invalid Date");
    }

    #[test]
    fn test_print_content_is_deterministic() {
        let data = sample_receipt();

        let first = generate_print_content(&data);
        let second = generate_print_content(&data);
        assert_eq!(first, second);
    }

    #[test]
    fn test_print_content_sections_in_order() {
        let content = generate_print_content(&sample_receipt());

        assert!(content.contains("TRATTORIA ROMA"));
        assert!(content.contains("Order #1042"));
        assert!(content.contains("2 x Margherita Pizza"));
        assert!(content.contains("$25.00"));
        assert!(content.contains("$12.50 each"));

        // Amount rows start at a line boundary; the "Tax " probe avoids
        // the "Tax ID" header line
        let subtotal = content.find("\nSubtotal").unwrap();
        let tax = content.find("\nTax ").unwrap();
        let tip = content.find("\nTip").unwrap();
        let total = content.find("\nTOTAL").unwrap();
        let payment = content.find("\nPayment: Cash").unwrap();
        let footer = content.find("Thank you").unwrap();

        assert!(subtotal < tax && tax < tip && tip < total && total < payment && payment < footer);

        assert!(content.contains("Server: Alice"));
        assert!(content.contains("Table: 7"));
        assert!(content.contains("Customer: Bob"));
        assert!(content.contains("Change"));
    }

    #[test]
    fn test_print_content_omits_absent_fields() {
        let mut data = sample_receipt();
        data.payment_method = "Card".to_string();
        data.tip = None;
        data.cash_received = None;
        data.change_due = None;
        data.staff_name = None;
        data.table_number = None;
        data.customer_name = None;

        let content = generate_print_content(&data);

        assert!(content.contains("Payment: Card"));
        assert!(!content.contains("Tip"));
        assert!(!content.contains("Cash"));
        assert!(!content.contains("Change"));
        assert!(!content.contains("Server:"));
        assert!(!content.contains("Table:"));
        assert!(!content.contains("Customer:"));
    }

    #[test]
    fn test_print_content_fits_receipt_width() {
        let content = generate_print_content(&sample_receipt());
        assert!(content.lines().all(|line| line.chars().count() <= 42));
    }

    // ===== RECEIPT STORAGE TESTS =====

    #[test]
    fn test_insert_and_fetch_receipt() {
        let mut conn = setup_test_db();

        let receipt = insert_receipt(&mut conn, &sample_receipt()).unwrap();

        assert_eq!(receipt.data.order_number, "1042");
        assert_eq!(receipt.data.items.len(), 2);
        assert_eq!(receipt.data.created_at, "2026-01-15 19:30:00");
        assert_eq!(receipt.printed_at, None);

        let fetched = fetch_receipt(&conn, receipt.id).unwrap();
        assert_eq!(fetched.data, receipt.data);
    }

    #[test]
    fn test_mark_printed_transitions_once() {
        let mut conn = setup_test_db();
        let receipt = insert_receipt(&mut conn, &sample_receipt()).unwrap();

        let printed = mark_printed(&conn, receipt.id).unwrap();
        assert!(printed.printed_at.is_some());

        // Pin the marker, then confirm a second print leaves it alone
        conn.execute(
            "UPDATE receipts SET printed_at = '2020-01-01 00:00:00' WHERE id = ?1",
            [receipt.id],
        )
        .unwrap();

        let again = mark_printed(&conn, receipt.id).unwrap();
        assert_eq!(again.printed_at, Some("2020-01-01 00:00:00".to_string()));
    }

    #[test]
    fn test_fetch_unknown_receipt_fails() {
        let conn = setup_test_db();
        assert!(fetch_receipt(&conn, 41).is_err());
    }

    #[test]
    fn test_receipt_date_range_query() {
        let mut conn = setup_test_db();

        let mut january = sample_receipt();
        january.created_at = "2026-01-15 12:00:00".to_string();
        let mut february = sample_receipt();
        february.created_at = "2026-02-15 12:00:00".to_string();

        insert_receipt(&mut conn, &january).unwrap();
        insert_receipt(&mut conn, &february).unwrap();

        let in_january: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM receipts WHERE date(created_at, 'localtime') BETWEEN '2026-01-01' AND '2026-01-31'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(in_january, 1);
    }

    // ===== RECIPE COST TESTS =====

    #[test]
    fn test_recipe_cost_sums_ingredient_costs() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        conn.execute_batch(
            "
            INSERT INTO menu_item_ingredients (menu_item_id, ingredient_id, quantity_required, unit)
                VALUES (1, 1, 0.3, 'kg');
            INSERT INTO menu_item_ingredients (menu_item_id, ingredient_id, quantity_required, unit)
                VALUES (1, 2, 0.2, 'kg');
            ",
        )
        .unwrap();

        // 0.3 * 2.0 + 0.2 * 3.5 = 1.3
        let cost = recipe_cost(&conn, 1).unwrap();
        assert!((cost - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_recipe_cost_empty_recipe_is_zero() {
        let conn = setup_test_db();
        seed_test_data(&conn);

        let cost = recipe_cost(&conn, 1).unwrap();
        assert!((cost - 0.0).abs() < 1e-9);
    }

    // ===== BUSINESS INFO TESTS =====

    #[test]
    fn test_business_info_defaults_when_unset() {
        let conn = setup_test_db();

        let info = read_business_info(&conn).unwrap();
        assert_eq!(info.name, "");
        assert_eq!(info.phone, None);
    }

    #[test]
    fn test_business_info_upsert() {
        let conn = setup_test_db();

        let first = BusinessInfo {
            name: "Trattoria Roma".to_string(),
            address: "12 Via Nazionale".to_string(),
            phone: Some("555-0100".to_string()),
            tax_id: None,
        };
        write_business_info(&conn, &first).unwrap();
        assert_eq!(read_business_info(&conn).unwrap(), first);

        let second = BusinessInfo {
            name: "Trattoria Roma II".to_string(),
            ..first
        };
        write_business_info(&conn, &second).unwrap();
        assert_eq!(read_business_info(&conn).unwrap(), second);

        // Still a singleton
        let count: i32 = conn
            .query_row("SELECT COUNT(*) FROM business_info", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    // ===== BACKUP TESTS =====

    fn populated_conn() -> Connection {
        let mut conn = setup_test_db();
        seed_test_data(&conn);

        conn.execute(
            "INSERT INTO menu_item_modifiers (menu_item_id, modifier_id) VALUES (1, 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO menu_item_ingredients (menu_item_id, ingredient_id, quantity_required, unit) VALUES (1, 1, 0.3, 'kg')",
            [],
        )
        .unwrap();
        write_business_info(
            &conn,
            &BusinessInfo {
                name: "Trattoria Roma".to_string(),
                address: "12 Via Nazionale".to_string(),
                phone: None,
                tax_id: Some("IT-998877".to_string()),
            },
        )
        .unwrap();
        apply_adjustment(
            &mut conn,
            &CreateStockAdjustment {
                ingredient_id: 1,
                adjustment_type: "restock".to_string(),
                quantity_change: 5.0,
                unit_cost: Some(2.0),
                total_cost: None,
                staff_name: None,
                supplier: None,
                reference: None,
                notes: None,
            },
        )
        .unwrap();
        insert_receipt(&mut conn, &sample_receipt()).unwrap();

        conn
    }

    #[test]
    fn test_backup_roundtrip_preserves_everything() {
        let source = populated_conn();
        let snapshot = export_snapshot(&source).unwrap();

        let mut target = setup_test_db();
        import_snapshot(&mut target, &snapshot).unwrap();

        for table in [
            "categories",
            "modifiers",
            "menu_items",
            "menu_item_modifiers",
            "ingredients",
            "menu_item_ingredients",
            "stock_adjustments",
            "receipts",
            "receipt_items",
        ] {
            let source_count: i32 = source
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
                .unwrap();
            let target_count: i32 = target
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
                .unwrap();
            assert_eq!(source_count, target_count, "row count mismatch in {}", table);
        }

        // Spot-check restored values, ids included
        let item = fetch_menu_item(&target, 1).unwrap();
        assert_eq!(item.name, "Margherita Pizza");
        assert_eq!(item.modifier_ids, vec![1]);

        let stock: f64 = target
            .query_row("SELECT current_stock FROM ingredients WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert!((stock - 15.0).abs() < 1e-9);

        let receipt = fetch_receipt(&target, 1).unwrap();
        assert_eq!(receipt.data.items.len(), 2);
        assert_eq!(receipt.data.order_number, "1042");

        assert_eq!(
            read_business_info(&target).unwrap().tax_id,
            Some("IT-998877".to_string())
        );
    }

    #[test]
    fn test_backup_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resto_backup.json");

        let source = populated_conn();
        write_backup_file(&source, &path).unwrap();

        let mut target = setup_test_db();
        read_backup_file(&mut target, &path).unwrap();

        let items: i32 = target
            .query_row("SELECT COUNT(*) FROM menu_items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(items, 3);
    }

    #[test]
    fn test_import_replaces_existing_rows() {
        let source = populated_conn();
        let snapshot = export_snapshot(&source).unwrap();

        // The target already has unrelated data; restore wipes it
        let mut target = setup_test_db();
        target
            .execute("INSERT INTO categories (id, name) VALUES (99, 'Stale')", [])
            .unwrap();

        import_snapshot(&mut target, &snapshot).unwrap();

        let stale: i32 = target
            .query_row("SELECT COUNT(*) FROM categories WHERE name = 'Stale'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(stale, 0);
    }
}
