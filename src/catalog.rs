//! Attribute Catalog
//!
//! Holds the attribute and value definitions for a single product. The catalog is
//! validated once when it is built, so lookups and the resolvers built on top of it
//! never have to guard against dangling dependency references or cycles.

use petgraph::{
    algo::toposort,
    graph::{DiGraph, NodeIndex},
};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    attributes::{Attribute, AttributeValue},
    ids::{AttributeId, AttributeValueId},
    selection::Selection,
};

/// Structural problems detected while building a catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidCatalog {
    /// Two attributes share an id.
    #[error("attribute {0} is defined more than once")]
    DuplicateAttribute(AttributeId),

    /// Two values of one attribute share an id.
    #[error("value {value_id} is defined more than once on attribute {attribute_id}")]
    DuplicateValue {
        /// Attribute declaring the value
        attribute_id: AttributeId,

        /// Repeated value
        value_id: AttributeValueId,
    },

    /// An attribute depends on itself.
    #[error("attribute {0} depends on itself")]
    SelfDependency(AttributeId),

    /// An attribute depends on an attribute missing from the catalog.
    #[error("attribute {attribute_id} depends on unknown attribute {parent_attribute_id}")]
    UnknownParent {
        /// Dependent attribute
        attribute_id: AttributeId,

        /// Missing parent
        parent_attribute_id: AttributeId,
    },

    /// A dependency allows a parent value the parent does not define.
    #[error(
        "attribute {attribute_id} allows value {value_id} which {parent_attribute_id} does not define"
    )]
    UnknownParentValue {
        /// Dependent attribute
        attribute_id: AttributeId,

        /// Parent attribute
        parent_attribute_id: AttributeId,

        /// Value missing from the parent
        value_id: AttributeValueId,
    },

    /// The dependency graph loops back on itself.
    #[error("dependency cycle through attribute {0}")]
    DependencyCycle(AttributeId),
}

/// Errors raised by catalog lookups and construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No attribute with this id exists.
    #[error("attribute {0} not found")]
    AttributeNotFound(AttributeId),

    /// The attribute exists but has no value with this id.
    #[error("value {value_id} not found on attribute {attribute_id}")]
    ValueNotFound {
        /// Attribute that was searched
        attribute_id: AttributeId,

        /// Missing value
        value_id: AttributeValueId,
    },

    /// The catalog definition is structurally invalid.
    #[error("invalid catalog: {0}")]
    Invalid(#[from] InvalidCatalog),
}

/// Attribute and value definitions for one product.
#[derive(Debug, Clone)]
pub struct AttributeCatalog {
    attributes: Vec<Attribute>,
    positions: FxHashMap<AttributeId, usize>,
    required: SmallVec<[AttributeId; 4]>,
}

impl AttributeCatalog {
    /// Build a catalog, validating ids and the dependency graph.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] if ids repeat, a dependency points at itself,
    /// at an unknown attribute or value, or dependencies form a cycle.
    pub fn new(attributes: impl IntoIterator<Item = Attribute>) -> Result<Self, CatalogError> {
        let attributes: Vec<Attribute> = attributes.into_iter().collect();
        let mut positions = FxHashMap::default();

        for (position, attribute) in attributes.iter().enumerate() {
            if positions.insert(attribute.id().clone(), position).is_some() {
                return Err(InvalidCatalog::DuplicateAttribute(attribute.id().clone()).into());
            }

            ensure_unique_values(attribute)?;
        }

        let catalog = Self {
            required: attributes
                .iter()
                .filter(|attribute| attribute.is_required())
                .map(|attribute| attribute.id().clone())
                .collect(),
            attributes,
            positions,
        };

        catalog.ensure_dependencies_resolve()?;
        catalog.ensure_acyclic()?;

        debug!(
            attributes = catalog.attributes.len(),
            required = catalog.required.len(),
            "built attribute catalog"
        );

        Ok(catalog)
    }

    /// Look up an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::AttributeNotFound`] for unknown ids.
    pub fn attribute(&self, attribute_id: &str) -> Result<&Attribute, CatalogError> {
        self.positions
            .get(attribute_id)
            .and_then(|&position| self.attributes.get(position))
            .ok_or_else(|| CatalogError::AttributeNotFound(attribute_id.into()))
    }

    /// Look up a value of an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::AttributeNotFound`] or [`CatalogError::ValueNotFound`].
    pub fn value(&self, attribute_id: &str, value_id: &str) -> Result<&AttributeValue, CatalogError> {
        let attribute = self.attribute(attribute_id)?;

        attribute
            .value(value_id)
            .ok_or_else(|| CatalogError::ValueNotFound {
                attribute_id: attribute.id().clone(),
                value_id: value_id.into(),
            })
    }

    /// Ids of required attributes, in declared order
    pub fn required_attribute_ids(&self) -> &[AttributeId] {
        &self.required
    }

    /// Whether `attribute_id` must be present in a complete selection
    pub fn is_required(&self, attribute_id: &str) -> bool {
        self.attribute(attribute_id)
            .is_ok_and(Attribute::is_required)
    }

    /// Attributes in declared order
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the catalog defines no attributes
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Choose a value, rejecting ids the catalog does not know.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::AttributeNotFound`] or [`CatalogError::ValueNotFound`].
    pub fn select(
        &self,
        selection: &Selection,
        attribute_id: &str,
        value_id: &str,
    ) -> Result<Selection, CatalogError> {
        let value = self.value(attribute_id, value_id)?;

        Ok(selection.with(attribute_id, value.id().clone()))
    }

    fn ensure_dependencies_resolve(&self) -> Result<(), InvalidCatalog> {
        for attribute in &self.attributes {
            let Some(dependency) = attribute.depends_on() else {
                continue;
            };

            let parent_id = dependency.attribute_id();

            if parent_id == attribute.id() {
                return Err(InvalidCatalog::SelfDependency(attribute.id().clone()));
            }

            let parent = self.attribute(parent_id.as_str()).map_err(|_err| {
                InvalidCatalog::UnknownParent {
                    attribute_id: attribute.id().clone(),
                    parent_attribute_id: parent_id.clone(),
                }
            })?;

            // Sorted so the reported value does not depend on hash order.
            let mut allowed: Vec<&AttributeValueId> = dependency.allowed_value_ids().iter().collect();
            allowed.sort();

            if let Some(value_id) = allowed
                .into_iter()
                .find(|value_id| parent.value(value_id.as_str()).is_none())
            {
                return Err(InvalidCatalog::UnknownParentValue {
                    attribute_id: attribute.id().clone(),
                    parent_attribute_id: parent_id.clone(),
                    value_id: value_id.clone(),
                });
            }
        }

        Ok(())
    }

    fn ensure_acyclic(&self) -> Result<(), InvalidCatalog> {
        let mut graph = DiGraph::<&AttributeId, ()>::with_capacity(self.attributes.len(), 0);
        let nodes: FxHashMap<&AttributeId, NodeIndex> = self
            .attributes
            .iter()
            .map(|attribute| (attribute.id(), graph.add_node(attribute.id())))
            .collect();

        for attribute in &self.attributes {
            let Some(dependency) = attribute.depends_on() else {
                continue;
            };

            if let (Some(&parent), Some(&child)) =
                (nodes.get(dependency.attribute_id()), nodes.get(attribute.id()))
            {
                graph.add_edge(parent, child, ());
            }
        }

        let Err(cycle) = toposort(&graph, None) else {
            return Ok(());
        };

        let attribute_id = graph
            .node_weight(cycle.node_id())
            .map(|&attribute_id| attribute_id.clone())
            .unwrap_or_default();

        Err(InvalidCatalog::DependencyCycle(attribute_id))
    }
}

fn ensure_unique_values(attribute: &Attribute) -> Result<(), InvalidCatalog> {
    let mut seen = FxHashSet::default();

    for value in attribute.values() {
        if !seen.insert(value.id()) {
            return Err(InvalidCatalog::DuplicateValue {
                attribute_id: attribute.id().clone(),
                value_id: value.id().clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::attributes::{Dependency, PriceModifier};

    use super::*;

    fn apparel() -> Result<AttributeCatalog, CatalogError> {
        AttributeCatalog::new([
            Attribute::required(
                "color",
                [
                    AttributeValue::new("red"),
                    AttributeValue::with_modifier("blue", PriceModifier::Percentage(Decimal::TEN)),
                ],
            ),
            Attribute::required("size", [AttributeValue::new("S"), AttributeValue::new("L")]),
            Attribute::optional("gift_wrap", [AttributeValue::new("yes")]),
        ])
    }

    #[test]
    fn looks_up_attributes_and_values() -> TestResult {
        let catalog = apparel()?;

        assert_eq!(catalog.attribute("size")?.values().len(), 2);
        assert_eq!(
            catalog.value("color", "blue")?.price_modifier(),
            PriceModifier::Percentage(Decimal::TEN)
        );

        Ok(())
    }

    #[test]
    fn unknown_ids_are_not_found() -> TestResult {
        let catalog = apparel()?;

        assert_eq!(
            catalog.attribute("material").err(),
            Some(CatalogError::AttributeNotFound("material".into()))
        );

        assert_eq!(
            catalog.value("color", "green").err(),
            Some(CatalogError::ValueNotFound {
                attribute_id: "color".into(),
                value_id: "green".into(),
            })
        );

        Ok(())
    }

    #[test]
    fn required_ids_follow_declared_order() -> TestResult {
        let catalog = apparel()?;

        assert_eq!(
            catalog.required_attribute_ids(),
            [AttributeId::from("color"), AttributeId::from("size")]
        );
        assert!(!catalog.is_required("gift_wrap"));

        Ok(())
    }

    #[test]
    fn select_rejects_unknown_values() -> TestResult {
        let catalog = apparel()?;
        let selection = catalog.select(&Selection::new(), "color", "red")?;

        assert!(selection.contains("color"));
        assert!(matches!(
            catalog.select(&selection, "size", "XXL"),
            Err(CatalogError::ValueNotFound { .. })
        ));

        Ok(())
    }

    #[test]
    fn rejects_duplicate_attribute_ids() {
        let result = AttributeCatalog::new([
            Attribute::required("color", [AttributeValue::new("red")]),
            Attribute::optional("color", [AttributeValue::new("blue")]),
        ]);

        assert_eq!(
            result.err(),
            Some(InvalidCatalog::DuplicateAttribute("color".into()).into())
        );
    }

    #[test]
    fn rejects_duplicate_value_ids() {
        let result = AttributeCatalog::new([Attribute::required(
            "color",
            [AttributeValue::new("red"), AttributeValue::new("red")],
        )]);

        assert!(matches!(
            result,
            Err(CatalogError::Invalid(InvalidCatalog::DuplicateValue { .. }))
        ));
    }

    #[test]
    fn rejects_self_dependency() {
        let result = AttributeCatalog::new([Attribute::required(
            "lens",
            [AttributeValue::new("polarized")],
        )
        .depending_on(Dependency::new("lens", ["polarized"]))]);

        assert_eq!(
            result.err(),
            Some(InvalidCatalog::SelfDependency("lens".into()).into())
        );
    }

    #[test]
    fn rejects_unknown_parent_and_parent_value() {
        let unknown_parent = AttributeCatalog::new([Attribute::required(
            "lens",
            [AttributeValue::new("polarized")],
        )
        .depending_on(Dependency::new("frame", ["metal"]))]);

        assert!(matches!(
            unknown_parent,
            Err(CatalogError::Invalid(InvalidCatalog::UnknownParent { .. }))
        ));

        let unknown_value = AttributeCatalog::new([
            Attribute::required("frame", [AttributeValue::new("metal")]),
            Attribute::required("lens", [AttributeValue::new("polarized")])
                .depending_on(Dependency::new("frame", ["titanium"])),
        ]);

        assert_eq!(
            unknown_value.err(),
            Some(
                InvalidCatalog::UnknownParentValue {
                    attribute_id: "lens".into(),
                    parent_attribute_id: "frame".into(),
                    value_id: "titanium".into(),
                }
                .into()
            )
        );
    }

    #[test]
    fn rejects_dependency_cycles() {
        let result = AttributeCatalog::new([
            Attribute::required("a", [AttributeValue::new("a1")])
                .depending_on(Dependency::new("c", ["c1"])),
            Attribute::required("b", [AttributeValue::new("b1")])
                .depending_on(Dependency::new("a", ["a1"])),
            Attribute::required("c", [AttributeValue::new("c1")])
                .depending_on(Dependency::new("b", ["b1"])),
        ]);

        assert!(matches!(
            result,
            Err(CatalogError::Invalid(InvalidCatalog::DependencyCycle(_)))
        ));
    }

    #[test]
    fn accepts_dependency_chains() -> TestResult {
        let catalog = AttributeCatalog::new([
            Attribute::required("frame", [AttributeValue::new("metal")]),
            Attribute::optional("lens", [AttributeValue::new("polarized")])
                .depending_on(Dependency::new("frame", ["metal"])),
            Attribute::optional("coating", [AttributeValue::new("mirror")])
                .depending_on(Dependency::new("lens", ["polarized"])),
        ])?;

        assert_eq!(catalog.len(), 3);

        Ok(())
    }
}
