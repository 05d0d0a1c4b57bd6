//! Category types for product organization.

use crate::current_timestamp;
use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// A product category, optionally nested under a parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Parent category (None for top-level categories).
    pub parent_id: Option<CategoryId>,
    /// Category name.
    pub name: String,
    /// URL-friendly slug (unique).
    pub slug: String,
    /// Category description.
    pub description: Option<String>,
    /// Whether the category is visible.
    pub is_active: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Category {
    /// Create a new top-level category.
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            id: CategoryId::generate(),
            parent_id: None,
            name: name.into(),
            slug: slug.into(),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new category nested under a parent.
    pub fn child_of(
        parent: &Category,
        name: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        let mut category = Self::new(name, slug);
        category.parent_id = Some(parent.id.clone());
        category
    }

    /// Check if this is a top-level category.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Hide the category from listings.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = current_timestamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_category() {
        let cat = Category::new("Grains", "grains");
        assert!(cat.is_root());
        assert!(cat.is_active);
    }

    #[test]
    fn test_child_category() {
        let parent = Category::new("Grains", "grains");
        let child = Category::child_of(&parent, "Rice", "rice");
        assert_eq!(child.parent_id, Some(parent.id.clone()));
        assert!(!child.is_root());
    }

    #[test]
    fn test_deactivate() {
        let mut cat = Category::new("Grains", "grains");
        cat.deactivate();
        assert!(!cat.is_active);
    }
}
