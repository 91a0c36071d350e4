use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use unitsvc_core::{ClassId, Entity, Unit, UnitId};

use super::r#trait::{StoreError, UnitStore};

/// In-memory unit store (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryUnitStore {
    inner: RwLock<HashMap<UnitId, Unit>>,
}

impl InMemoryUnitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl UnitStore for InMemoryUnitStore {
    async fn get_by_id(&self, id: UnitId) -> Result<Unit, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        map.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_by_class(&self, class_id: ClassId) -> Result<Vec<Unit>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        let mut units: Vec<Unit> = map
            .values()
            .filter(|u| u.class_id() == class_id)
            .cloned()
            .collect();
        // v7 ids sort by creation time.
        units.sort_by_key(|u| *u.id());
        Ok(units)
    }

    async fn insert(&self, unit: Unit) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let id = *unit.id();
        if map.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        map.insert(id, unit);
        Ok(())
    }

    async fn update(&self, unit: Unit) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        match map.get_mut(unit.id()) {
            Some(existing) => {
                *existing = unit;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: UnitId) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        map.remove(&id);
        Ok(())
    }
}
