//! Recipe management flow: loads and saves the ingredient list bound to
//! a menu item, tracking loading state for the editor panel.

use crate::db::Database;
use crate::models::MenuItemIngredient;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Dashboard-submitted replacement for a menu item's recipe.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFormData {
    pub menu_item_id: i64,
    pub ingredients: Vec<RecipeLineInput>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLineInput {
    pub ingredient_id: i64,
    pub quantity_required: f64,
    pub unit: String,
}

/// Persistence collaborator for recipes. Save is an atomic whole-list
/// replace; partial success is not representable, only the boolean.
pub trait RecipeStore {
    fn get_menu_item_recipe(&self, item_id: i64) -> Result<Vec<MenuItemIngredient>, String>;
    fn save_menu_item_recipe(&self, recipe: &RecipeFormData) -> Result<bool, String>;
}

impl<S: RecipeStore> RecipeStore for Arc<S> {
    fn get_menu_item_recipe(&self, item_id: i64) -> Result<Vec<MenuItemIngredient>, String> {
        (**self).get_menu_item_recipe(item_id)
    }

    fn save_menu_item_recipe(&self, recipe: &RecipeFormData) -> Result<bool, String> {
        (**self).save_menu_item_recipe(recipe)
    }
}

impl RecipeStore for Database {
    fn get_menu_item_recipe(&self, item_id: i64) -> Result<Vec<MenuItemIngredient>, String> {
        let conn = self.conn.lock().map_err(|e| e.to_string())?;

        let mut stmt = conn
            .prepare(
                "SELECT mi.id, mi.menu_item_id, mi.ingredient_id, i.name, mi.quantity_required, mi.unit
                 FROM menu_item_ingredients mi
                 LEFT JOIN ingredients i ON mi.ingredient_id = i.id
                 WHERE mi.menu_item_id = ?1
                 ORDER BY mi.id",
            )
            .map_err(|e| e.to_string())?;

        let lines = stmt
            .query_map([item_id], |row| {
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

        Ok(lines)
    }

    fn save_menu_item_recipe(&self, recipe: &RecipeFormData) -> Result<bool, String> {
        // Reject without touching the store: every line must require a
        // positive quantity and the menu item must exist
        if recipe
            .ingredients
            .iter()
            .any(|line| !(line.quantity_required > 0.0))
        {
            return Ok(false);
        }

        let mut conn = self.conn.lock().map_err(|e| e.to_string())?;

        let item_exists: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM menu_items WHERE id = ?1",
                [recipe.menu_item_id],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)
            .map_err(|e| e.to_string())?;

        if !item_exists {
            return Ok(false);
        }

        let tx = conn.transaction().map_err(|e| e.to_string())?;

        tx.execute(
            "DELETE FROM menu_item_ingredients WHERE menu_item_id = ?1",
            [recipe.menu_item_id],
        )
        .map_err(|e| e.to_string())?;

        for line in &recipe.ingredients {
            tx.execute(
                "INSERT INTO menu_item_ingredients (menu_item_id, ingredient_id, quantity_required, unit) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    recipe.menu_item_id,
                    line.ingredient_id,
                    line.quantity_required,
                    line.unit
                ],
            )
            .map_err(|e| e.to_string())?;
        }

        tx.commit().map_err(|e| e.to_string())?;

        Ok(true)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FlowState {
    Idle,
    Loading,
    Ready,
    Saving,
}

/// Snapshot of the editor flow handed to the dashboard.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecipeEditorSnapshot {
    pub item_id: Option<i64>,
    pub recipe: Vec<MenuItemIngredient>,
    pub loading: bool,
    pub state: FlowState,
}

/// The flow managed for the recipe editor panel.
pub type RecipeEditor = Mutex<RecipeFlow<Arc<Database>>>;

/// State machine over a `RecipeStore`. Holds a transient copy of one
/// menu item's recipe; the store remains the owner of the data.
pub struct RecipeFlow<S: RecipeStore> {
    store: S,
    bound_item: Option<i64>,
    recipe: Vec<MenuItemIngredient>,
    state: FlowState,
}

impl<S: RecipeStore> RecipeFlow<S> {
    pub fn new(store: S) -> Self {
        RecipeFlow {
            store,
            bound_item: None,
            recipe: Vec::new(),
            state: FlowState::Idle,
        }
    }

    pub fn bound_item(&self) -> Option<i64> {
        self.bound_item
    }

    pub fn recipe(&self) -> &[MenuItemIngredient] {
        &self.recipe
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Loading is true only strictly between issuing a fetch and its
    /// completion; saves never set it.
    pub fn is_loading(&self) -> bool {
        self.state == FlowState::Loading
    }

    pub fn snapshot(&self) -> RecipeEditorSnapshot {
        RecipeEditorSnapshot {
            item_id: self.bound_item,
            recipe: self.recipe.clone(),
            loading: self.is_loading(),
            state: self.state,
        }
    }

    /// Binds the flow to a menu item. A fetch runs on first binding and
    /// whenever the identity changes; rebinding the same item is a no-op.
    pub fn bind(&mut self, item_id: i64) -> Result<(), String> {
        if self.bound_item == Some(item_id) {
            return Ok(());
        }
        self.bound_item = Some(item_id);
        self.fetch_recipe(item_id)
    }

    /// Retrieves the recipe for `item_id` and replaces the in-memory
    /// copy wholesale. A result arriving for an item that is no longer
    /// the bound one is discarded (last relevant response wins).
    /// Loading clears on every path, success or failure.
    pub fn fetch_recipe(&mut self, item_id: i64) -> Result<(), String> {
        self.state = FlowState::Loading;

        let result = self.store.get_menu_item_recipe(item_id);
        let still_relevant = self.bound_item.map_or(true, |bound| bound == item_id);

        match result {
            Ok(lines) => {
                if still_relevant {
                    self.recipe = lines;
                }
                self.state = FlowState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = FlowState::Idle;
                Err(e)
            }
        }
    }

    /// Submits a whole-list replacement. On a successful save while
    /// bound, refetches from the store so local state reflects what was
    /// actually persisted (read-after-write); the refetch is sequenced
    /// strictly after the save acknowledgment. On failure local state
    /// is left untouched.
    pub fn save_recipe(&mut self, recipe: &RecipeFormData) -> Result<bool, String> {
        let previous = self.state;
        self.state = FlowState::Saving;

        match self.store.save_menu_item_recipe(recipe) {
            Ok(true) => {
                if let Some(item_id) = self.bound_item {
                    self.fetch_recipe(item_id)?;
                } else {
                    self.state = previous;
                }
                Ok(true)
            }
            Ok(false) => {
                self.state = previous;
                Ok(false)
            }
            Err(e) => {
                self.state = previous;
                Err(e)
            }
        }
    }
}
