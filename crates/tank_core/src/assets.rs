//! Asset provider seam.
//!
//! The simulation never loads images. It stores optional [`ImageHandle`]s
//! resolved through an [`AssetProvider`] and works the same whether or not
//! they are present; nothing in damage or collision depends on imagery.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Opaque reference to a drawable image, with its pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageHandle {
    /// Provider-assigned identifier.
    pub id: u32,
    /// Natural width in pixels.
    pub width: f32,
    /// Natural height in pixels.
    pub height: f32,
}

impl ImageHandle {
    /// Create a new handle.
    #[must_use]
    pub const fn new(id: u32, width: f32, height: f32) -> Self {
        Self { id, width, height }
    }
}

/// Resolves string keys (e.g. `"tank.demo.head"`) to image handles.
///
/// Implementations report missing keys themselves; callers just receive
/// `None`.
pub trait AssetProvider {
    /// Look up an image by key.
    fn image(&self, key: &str) -> Option<ImageHandle>;
}

/// The images a tank draws with. Every slot may be empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TankImagery {
    /// Turret image.
    pub head: Option<ImageHandle>,
    /// Hull image.
    pub body: Option<ImageHandle>,
    /// Image for projectiles this tank fires.
    pub bullet: Option<ImageHandle>,
    /// Image for impacts of this tank's projectiles.
    pub impact: Option<ImageHandle>,
}

impl TankImagery {
    /// Resolve the four standard keys under `prefix`
    /// (`{prefix}.head`, `{prefix}.body`, `{prefix}.bullet`, `{prefix}.collision`).
    pub fn resolve(provider: &dyn AssetProvider, prefix: &str) -> Self {
        Self {
            head: provider.image(&format!("{prefix}.head")),
            body: provider.image(&format!("{prefix}.body")),
            bullet: provider.image(&format!("{prefix}.bullet")),
            impact: provider.image(&format!("{prefix}.collision")),
        }
    }
}

/// In-memory asset table.
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    images: HashMap<String, ImageHandle>,
    next_id: u32,
}

impl AssetTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: impl Into<String>, width: f32, height: f32) -> ImageHandle {
        let key = key.into();
        let handle = ImageHandle::new(self.next_id, width, height);
        self.next_id += 1;
        if self.images.insert(key.clone(), handle).is_some() {
            tracing::warn!(key = %key, "Image registered twice, replacing previous entry");
        }
        handle
    }

    /// Number of registered images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl AssetProvider for AssetTable {
    fn image(&self, key: &str) -> Option<ImageHandle> {
        let found = self.images.get(key).copied();
        if found.is_none() {
            tracing::warn!(key, "Image not found");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_missing_slots() {
        let mut table = AssetTable::new();
        let head = table.insert("tank.demo.head", 150.0, 150.0);
        let bullet = table.insert("tank.demo.bullet", 90.0, 30.0);

        let imagery = TankImagery::resolve(&table, "tank.demo");
        assert_eq!(imagery.head, Some(head));
        assert_eq!(imagery.bullet, Some(bullet));
        assert!(imagery.body.is_none());
        assert!(imagery.impact.is_none());
    }

    #[test]
    fn test_reinsert_replaces() {
        let mut table = AssetTable::new();
        table.insert("map.01", 10.0, 10.0);
        let second = table.insert("map.01", 20.0, 20.0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.image("map.01"), Some(second));
    }
}
