use chatgraph_core::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

pub const DEFAULT_ITEMS: [&str; 3] = ["Sunscreen", "Water", "Snacks"];

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ItemParams {
    /// Name of the item, e.g. "Sunscreen"
    pub item_name: String,
}

#[derive(Debug, Default)]
struct Items {
    missing: Vec<String>,
    packed: Vec<String>,
}

/// A trip packlist shared by its tools. Clones share the same list.
#[derive(Debug, Clone)]
pub struct Packlist {
    items: Arc<Mutex<Items>>,
}

impl Default for Packlist {
    fn default() -> Self {
        Self::with_items(DEFAULT_ITEMS)
    }
}

impl Packlist {
    pub fn with_items<I, T>(missing: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            items: Arc::new(Mutex::new(Items {
                missing: missing.into_iter().map(Into::into).collect(),
                packed: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Items>, ToolError> {
        self.items
            .lock()
            .map_err(|_| ToolError::Execution("packlist lock poisoned".into()))
    }

    pub fn packed(&self) -> Vec<String> {
        self.items
            .lock()
            .map(|items| items.packed.clone())
            .unwrap_or_default()
    }

    /// The three packlist tools, ready to hand to a tools chatbot.
    pub fn registry(&self) -> ToolRegistry {
        ToolRegistry::new()
            .with(PacklistListPacklistMissingItems(self.clone()))
            .with(PacklistMarkItemAsPacked(self.clone()))
            .with(PacklistAddItemToPacklist(self.clone()))
    }
}

#[tools(
    list_packlist_missing_items = "List the missing items in the packlist",
    mark_item_as_packed = "Mark an item as packed",
    add_item_to_packlist = "Add an item to the packlist"
)]
impl Packlist {
    async fn list_packlist_missing_items(&self) -> Result<Vec<String>, ToolError> {
        info!("listing missing items");
        Ok(self.lock()?.missing.clone())
    }

    async fn mark_item_as_packed(&self, params: ItemParams) -> Result<String, ToolError> {
        info!(item = %params.item_name, "marking item as packed");
        let mut items = self.lock()?;
        let wanted = params.item_name.trim();
        if let Some(pos) = items
            .missing
            .iter()
            .position(|i| i.eq_ignore_ascii_case(wanted))
        {
            let item = items.missing.remove(pos);
            items.packed.push(item);
        }
        Ok(format!("Item {} marked as packed in the packlist", params.item_name))
    }

    async fn add_item_to_packlist(&self, params: ItemParams) -> Result<String, ToolError> {
        info!(item = %params.item_name, "adding item to packlist");
        let mut items = self.lock()?;
        let name = params.item_name.trim().to_string();
        if !items.missing.iter().any(|i| i.eq_ignore_ascii_case(&name)) {
            items.missing.push(name);
        }
        Ok(format!("Item {} added to packlist", params.item_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn seeded_with_default_items() {
        let packlist = Packlist::default();
        let missing = packlist
            .registry()
            .call("list_packlist_missing_items", json!({}))
            .await
            .unwrap();
        assert_eq!(missing, json!(["Sunscreen", "Water", "Snacks"]));
    }

    #[tokio::test]
    async fn packing_moves_item_out_of_missing() {
        let packlist = Packlist::default();
        let registry = packlist.registry();

        let reply = registry
            .call("mark_item_as_packed", json!({ "item_name": "water" }))
            .await
            .unwrap();
        assert_eq!(reply, json!("Item water marked as packed in the packlist"));
        assert_eq!(packlist.packed(), vec!["Water"]);

        let missing = registry
            .call("list_packlist_missing_items", json!({}))
            .await
            .unwrap();
        assert_eq!(missing, json!(["Sunscreen", "Snacks"]));
    }

    #[tokio::test]
    async fn adding_is_idempotent() {
        let packlist = Packlist::with_items(Vec::<String>::new());
        let registry = packlist.registry();
        for _ in 0..2 {
            let reply = registry
                .call("add_item_to_packlist", json!({ "item_name": "Hat" }))
                .await
                .unwrap();
            assert_eq!(reply, json!("Item Hat added to packlist"));
        }
        let missing = registry
            .call("list_packlist_missing_items", json!({}))
            .await
            .unwrap();
        assert_eq!(missing, json!(["Hat"]));
    }
}
