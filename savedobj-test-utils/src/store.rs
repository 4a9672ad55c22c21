//! In-memory saved-object store backing the reference server.
//!
//! Space-aware objects are stored under their prefixed id together with the
//! space that owns them; objects of other types are shared by every space.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use savedobj_core::{
    Attributes, ErrorBody, FixtureError, FixtureLoader, ObjectType, SavedObject, SpaceId,
    SpaceLayout,
};
use savedobj_verify::fixtures;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct StoredObject {
    /// Owning space; `None` for types shared by every space.
    namespace: Option<SpaceId>,
    object: SavedObject,
}

#[derive(Debug, Default)]
struct StoreState {
    objects: BTreeMap<(ObjectType, String), StoredObject>,
    loaded: Option<String>,
    load_count: usize,
    unload_count: usize,
}

/// Shared handle to the store; clones see the same objects.
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    layout: SpaceLayout,
    state: Arc<Mutex<StoreState>>,
}

impl ReferenceStore {
    pub fn new(layout: SpaceLayout) -> Self {
        Self {
            layout,
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }

    pub fn layout(&self) -> &SpaceLayout {
        &self.layout
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Only visualizations are partitioned by space.
    pub fn is_space_aware(&self, object_type: &ObjectType) -> bool {
        object_type.as_str() == ObjectType::VISUALIZATION
    }

    /// Insert an object directly. Space-aware objects get `space`'s id prefix.
    pub fn insert(&self, space: &SpaceId, object_type: ObjectType, id: &str, attributes: Attributes) {
        let (namespace, stored_id) = if self.is_space_aware(&object_type) {
            (Some(space.clone()), self.layout.prefixed_id(space, id))
        } else {
            (None, id.to_string())
        };
        let object = SavedObject {
            id: stored_id.clone(),
            object_type: object_type.clone(),
            attributes,
            version: fixtures::SEEDED_VERSION,
            updated_at: seeded_at(),
        };
        self.state()
            .objects
            .insert((object_type, stored_id), StoredObject { namespace, object });
    }

    /// Object stored under `(object_type, id)`, whatever space owns it.
    pub fn get(&self, object_type: &ObjectType, id: &str) -> Option<SavedObject> {
        self.state()
            .objects
            .get(&(object_type.clone(), id.to_string()))
            .map(|stored| stored.object.clone())
    }

    pub fn len(&self) -> usize {
        self.state().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().objects.is_empty()
    }

    pub fn clear(&self) {
        self.state().objects.clear();
    }

    /// Replace the attributes of the object addressed from `space`.
    ///
    /// A space-aware object owned by another space is reported missing under
    /// the id it was addressed by.
    pub fn update(
        &self,
        space: &SpaceId,
        object_type: &ObjectType,
        id: &str,
        attributes: Attributes,
        now: DateTime<Utc>,
    ) -> Result<SavedObject, ErrorBody> {
        let space_aware = self.is_space_aware(object_type);
        let mut state = self.state();
        let stored = state
            .objects
            .get_mut(&(object_type.clone(), id.to_string()))
            .filter(|stored| !space_aware || stored.namespace.as_ref() == Some(space))
            .ok_or_else(|| ErrorBody::not_found(object_type, id))?;

        stored.object.apply_update(attributes, now);
        Ok(stored.object.clone())
    }

    /// Dataset currently loaded, if any.
    pub fn loaded_dataset(&self) -> Option<String> {
        self.state().loaded.clone()
    }

    pub fn load_count(&self) -> usize {
        self.state().load_count
    }

    pub fn unload_count(&self) -> usize {
        self.state().unload_count
    }

    fn seed_spaces(&self) -> Result<(), FixtureError> {
        let seed_error = |e: savedobj_core::CoreError| FixtureError::Load {
            name: fixtures::SPACES_DATASET.to_string(),
            reason: e.to_string(),
        };
        let spaces = [
            self.layout.default_space().clone(),
            SpaceId::new(fixtures::SPACE_1).map_err(seed_error)?,
            SpaceId::new(fixtures::SPACE_2).map_err(seed_error)?,
        ];

        for space in &spaces {
            self.insert(
                space,
                fixtures::space_aware_type(),
                fixtures::SPACE_AWARE_ID,
                visualization_attributes(space),
            );
        }
        self.insert(
            self.layout.default_space(),
            fixtures::not_space_aware_type(),
            fixtures::NOT_SPACE_AWARE_ID,
            json_object(json!({ "name": "My favorite global object" })),
        );
        Ok(())
    }
}

impl Default for ReferenceStore {
    fn default() -> Self {
        Self::new(SpaceLayout::default())
    }
}

#[async_trait]
impl FixtureLoader for ReferenceStore {
    /// Loading replaces whatever was stored before.
    async fn load(&self, name: &str) -> Result<(), FixtureError> {
        if name != fixtures::SPACES_DATASET {
            return Err(FixtureError::UnknownDataset(name.to_string()));
        }
        self.clear();
        self.seed_spaces()?;

        let mut state = self.state();
        state.loaded = Some(name.to_string());
        state.load_count += 1;
        tracing::debug!(dataset = name, objects = state.objects.len(), "fixture loaded");
        Ok(())
    }

    async fn unload(&self, name: &str) -> Result<(), FixtureError> {
        if name != fixtures::SPACES_DATASET {
            return Err(FixtureError::UnknownDataset(name.to_string()));
        }
        let mut state = self.state();
        state.objects.clear();
        state.loaded = None;
        state.unload_count += 1;
        tracing::debug!(dataset = name, "fixture unloaded");
        Ok(())
    }
}

fn seeded_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 9, 21, 18, 51, 23)
        .single()
        .unwrap_or_else(Utc::now)
}

fn visualization_attributes(space: &SpaceId) -> Attributes {
    json_object(json!({
        "title": format!("Count of requests ({})", space),
        "description": "",
        "visState": "{\"title\":\"Count of requests\",\"type\":\"area\"}",
        "uiStateJSON": "{}",
        "version": 1
    }))
}

fn json_object(value: serde_json::Value) -> Attributes {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Attributes::new(),
    }
}
