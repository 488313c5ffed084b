//! Type-keyed lookup of schemas.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::schema::{ParseReport, Schema};

/// Map from a target type to the schema that parses it.
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl SchemaRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the schema for `T`, returning the one it replaces.
    pub fn register<T: 'static>(&mut self, schema: Arc<Schema<T>>) -> Option<Arc<Schema<T>>> {
        self.schemas
            .insert(TypeId::of::<T>(), schema)
            .and_then(|old| old.downcast::<Schema<T>>().ok())
    }

    /// The schema registered for `T`.
    pub fn get<T: 'static>(&self) -> Option<Arc<Schema<T>>> {
        self.schemas
            .get(&TypeId::of::<T>())
            .and_then(|s| Arc::clone(s).downcast::<Schema<T>>().ok())
    }

    /// Whether a schema is registered for `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.schemas.contains_key(&TypeId::of::<T>())
    }

    /// Parse `input` into `target` with the schema registered for `T`.
    pub fn parse_registered<T: 'static>(
        &self,
        target: &mut T,
        input: &str,
    ) -> Result<ParseReport, RegistryError> {
        let schema = self.get::<T>().ok_or(RegistryError::NotRegistered {
            type_name: type_name::<T>(),
        })?;
        Ok(schema.parse(target, input)?)
    }
}
