//! The ordered template registry.

use indexmap::IndexMap;
use log::debug;

use crate::error::SigError;

use super::PatternTemplate;

/// Templates keyed by family name, in registration order.
///
/// Registration order is the order in which the region pipeline runs the
/// templates, and therefore the order in which their compounds become
/// interpretations.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    templates: IndexMap<String, PatternTemplate>,
}

impl PatternRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in families: bass clefs, then repeat dots.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for template in [PatternTemplate::bass(), PatternTemplate::repeat()] {
            registry
                .templates
                .insert(template.name().to_string(), template);
        }
        registry
    }

    /// Builds a registry from a list of templates.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid or duplicate template.
    pub fn from_templates(
        templates: impl IntoIterator<Item = PatternTemplate>,
    ) -> Result<Self, SigError> {
        let mut registry = Self::new();
        for template in templates {
            registry.register(template)?;
        }
        Ok(registry)
    }

    /// Registers a template after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::Config`] if the template is invalid or its name
    /// is already registered.
    pub fn register(&mut self, template: PatternTemplate) -> Result<(), SigError> {
        template.validate()?;
        if self.templates.contains_key(template.name()) {
            return Err(SigError::Config(format!(
                "pattern '{}' is registered twice",
                template.name()
            )));
        }
        debug!(name = template.name(); "Pattern registered");
        self.templates.insert(template.name().to_string(), template);
        Ok(())
    }

    /// Returns the template with the given name.
    pub fn get(&self, name: &str) -> Option<&PatternTemplate> {
        self.templates.get(name)
    }

    /// Iterates over templates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PatternTemplate> {
        self.templates.values()
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no template is registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use omrsig_core::shape::{Shape, ShapeSet};

    use super::*;
    use crate::pattern::Anchor;

    #[test]
    fn test_builtin_order() {
        let registry = PatternRegistry::builtin();
        let names: Vec<_> = registry.iter().map(PatternTemplate::name).collect();
        assert_eq!(names, vec!["bass", "repeat"]);
        assert!(registry.get("repeat").is_some());
        assert!(registry.get("alto").is_none());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = PatternRegistry::builtin();
        let result = registry.register(PatternTemplate::bass());
        assert!(matches!(result, Err(SigError::Config(_))));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_from_templates_keeps_order() {
        let dot = ShapeSet::single(Shape::Dot);
        let custom = PatternTemplate::new(
            "custom",
            ShapeSet::single(Shape::CClef),
            Anchor::new(dot, -2.0),
            Anchor::new(dot, 2.0),
        );
        let registry =
            PatternRegistry::from_templates([custom, PatternTemplate::bass()]).unwrap();
        let names: Vec<_> = registry.iter().map(PatternTemplate::name).collect();
        assert_eq!(names, vec!["custom", "bass"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = PatternRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }
}
