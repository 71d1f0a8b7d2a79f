//! The YAML entity catalog used to seed categories and tracked entities.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Category, CategoryId, Entity, EntityId};
use crate::ConfigError;

/// Namespace for deterministic entity ids derived from (name, category).
const ENTITY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x5f1c_0a4e_7d2b_4e3a_9c61_2b8f_d04e_71a9);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    /// Name of the category this entity belongs to.
    pub category: String,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub image_url: Option<String>,
}

impl EntityConfig {
    /// Stable id for this entity within `category_id`.
    ///
    /// The same name in the same category always maps to the same id, so
    /// re-seeding updates an entity instead of duplicating it.
    #[must_use]
    pub fn entity_id(&self, category_id: CategoryId) -> EntityId {
        let key = format!("{}:{category_id}", self.name.trim().to_lowercase());
        Uuid::new_v5(&ENTITY_ID_NAMESPACE, key.as_bytes())
    }

    /// Keywords trimmed, with blanks removed.
    #[must_use]
    pub fn clean_keywords(&self) -> Vec<String> {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntitiesFile {
    pub categories: Vec<CategoryConfig>,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl EntitiesFile {
    /// Look up a category id by (case-insensitive) name.
    #[must_use]
    pub fn category_id(&self, name: &str) -> Option<CategoryId> {
        let wanted = name.trim().to_lowercase();
        self.categories
            .iter()
            .find(|c| c.name.trim().to_lowercase() == wanted)
            .map(|c| c.id)
    }

    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .map(|c| Category {
                id: c.id,
                name: c.name.trim().to_string(),
            })
            .collect()
    }

    /// Resolve every entity against its category.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if an entity names an unknown category.
    pub fn resolve_entities(&self) -> Result<Vec<Entity>, ConfigError> {
        self.entities
            .iter()
            .map(|e| {
                let category_id = self.category_id(&e.category).ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "entity '{}' references unknown category '{}'",
                        e.name, e.category
                    ))
                })?;
                Ok(Entity {
                    id: e.entity_id(category_id),
                    name: e.name.trim().to_string(),
                    category_id,
                    description: e.description.clone(),
                    image_url: e.image_url.clone().filter(|u| !u.trim().is_empty()),
                    keywords: e.clean_keywords(),
                })
            })
            .collect()
    }
}

/// Load and validate the entity catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_entities(path: &Path) -> Result<EntitiesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::EntitiesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: EntitiesFile = serde_yaml::from_str(&content)?;
    validate_entities(&file)?;
    Ok(file)
}

fn validate_entities(file: &EntitiesFile) -> Result<(), ConfigError> {
    let mut seen_category_ids = HashSet::new();
    let mut seen_category_names = HashSet::new();

    for category in &file.categories {
        if category.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category {} has an empty name",
                category.id
            )));
        }
        if !seen_category_ids.insert(category.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate category id: {}",
                category.id
            )));
        }
        if !seen_category_names.insert(category.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category name: '{}'",
                category.name
            )));
        }
    }

    let mut seen_ids = HashSet::new();
    for entity in &file.entities {
        if entity.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "entity name must be non-empty".to_string(),
            ));
        }

        let category_id = file.category_id(&entity.category).ok_or_else(|| {
            ConfigError::Validation(format!(
                "entity '{}' references unknown category '{}'",
                entity.name, entity.category
            ))
        })?;

        if !seen_ids.insert(entity.entity_id(category_id)) {
            return Err(ConfigError::Validation(format!(
                "duplicate entity '{}' in category '{}'",
                entity.name, entity.category
            )));
        }
    }

    Ok(())
}
