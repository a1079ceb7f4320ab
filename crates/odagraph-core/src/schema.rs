use serde::{Deserialize, Serialize};

/// Normalized description of one OData service, independent of the metadata
/// dialect it was declared in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Namespace of the first schema container, empty when absent.
    pub namespace: String,
    pub entities: Vec<EntityType>,
}

impl Schema {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, name: &str) -> Option<&EntityType> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// A named record type. `name` doubles as the graph-node id downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    /// Key property names, in declaration order. Non-empty for well-formed services.
    pub keys: Vec<String>,
    /// Declaration order is preserved for display.
    pub properties: Vec<Property>,
    pub navigation: Vec<NavigationProperty>,
}

impl EntityType {
    pub fn is_key(&self, property: &str) -> bool {
        self.keys.iter().any(|k| k == property)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// A declared relationship from one entity type to another.
///
/// `target` holds the bare entity name with namespace prefix and any
/// `Collection(...)` wrapper already stripped. `None` means the reference
/// could not be resolved; the navigation property is kept (it is still part
/// of the entity's declared shape) but produces no graph edge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationProperty {
    pub name: String,
    pub target: Option<String>,
    /// V2/V3 only: the association this navigation property referenced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_multiplicity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_multiplicity: Option<String>,
    /// Referential-integrity field pairs; `source_field` belongs to the
    /// declaring entity, `target_field` to the target entity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<FieldConstraint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConstraint {
    pub source_field: String,
    pub target_field: String,
}
