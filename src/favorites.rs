use crate::db::KeyValueStore;
use crate::error::StoreError;
use crate::recipe::Recipe;

/// Persisted favorites, unique by recipe id, kept in insertion order.
///
/// Hydrated once from the store and written back in full after every change.
pub struct Favorites<S> {
    items: Vec<Recipe>,
    store: S,
    key: String,
}

impl<S: KeyValueStore> Favorites<S> {
    /// Reads the list stored under `key`. Absent or unreadable data yields an
    /// empty list.
    pub fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = match read_items(&store, &key) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Ignoring unreadable favorites under {}: {}", key, e);
                Vec::new()
            }
        };
        log::debug!("Loaded {} favorites under {}", items.len(), key);
        Favorites { items, store, key }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|fav| fav.id == id)
    }

    pub fn find(&self, id: &str) -> Option<&Recipe> {
        self.items.iter().find(|fav| fav.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes the recipe if present, appends it otherwise. Returns whether it
    /// is a favorite afterwards.
    pub fn toggle(&mut self, recipe: &Recipe) -> bool {
        let now_favorite = if self.contains(&recipe.id) {
            self.items.retain(|fav| fav.id != recipe.id);
            false
        } else {
            self.items.push(recipe.clone());
            true
        };
        if let Err(e) = self.persist() {
            log::error!("Failed to save favorites under {}: {}", self.key, e);
        }
        now_favorite
    }

    fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.items)?;
        self.store.put(&self.key, &json)
    }
}

fn read_items<S: KeyValueStore>(store: &S, key: &str) -> Result<Vec<Recipe>, StoreError> {
    let Some(json) = store.get(key)? else {
        return Ok(Vec::new());
    };
    let mut items: Vec<Recipe> = serde_json::from_str(&json)?;
    // A hand-edited store may hold duplicates; keep the first of each id.
    let mut seen = std::collections::HashSet::new();
    items.retain(|fav| seen.insert(fav.id.clone()));
    Ok(items)
}
