//! Metadata document → normalized [`Schema`].
//!
//! Two dialect shapes are normalized here:
//! - V2/V3: navigation properties reference a separately declared
//!   `Association` by name + role, so an association pre-pass builds a
//!   role→end lookup first.
//! - V4: navigation properties carry the target type directly, optionally
//!   wrapped in `Collection(...)`.
//!
//! The resolver is total: any input that does not contain a recognizable
//! schema container yields an empty [`Schema`].

use roxmltree::{Document, Node};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::schema::{EntityType, FieldConstraint, NavigationProperty, Property, Schema};

#[derive(Debug, Clone)]
struct AssociationEnd {
    target: String,
    multiplicity: Option<String>,
}

/// Principal/dependent field lists of a V2/V3 `ReferentialConstraint`,
/// kept role-addressed so they can be oriented per navigation property.
#[derive(Debug, Clone)]
struct AssociationConstraint {
    principal_role: String,
    principal_fields: Vec<String>,
    dependent_role: String,
    dependent_fields: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct AssociationInfo {
    ends: FxHashMap<String, AssociationEnd>,
    constraint: Option<AssociationConstraint>,
}

/// Scaffolding for one resolution call: maps both the namespace-qualified
/// and the bare association name to the association's role table. Built
/// once per parse and discarded with the call.
type AssociationTable = FxHashMap<String, AssociationInfo>;

/// Parses a raw metadata document into a normalized schema.
///
/// Pure function of its input; fails closed. Malformed XML, a missing
/// schema container, or an otherwise unusable document all degrade to an
/// empty schema rather than an error. Unresolvable navigation targets are
/// kept with `target = None` (they simply produce no graph edge).
pub fn resolve_metadata(text: &str) -> Schema {
    let doc = match Document::parse(text) {
        Ok(doc) => doc,
        Err(err) => {
            warn!(error = %err, "metadata is not well-formed XML; resolving to empty schema");
            return Schema::default();
        }
    };

    let Some(schema_node) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Schema")
    else {
        warn!("metadata has no Schema container; resolving to empty schema");
        return Schema::default();
    };

    let namespace = schema_node.attribute("Namespace").unwrap_or("").to_string();
    let associations = collect_associations(schema_node, &namespace);

    let mut entities = Vec::new();
    for et in schema_node
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "EntityType")
    {
        entities.push(resolve_entity(et, &associations));
    }

    Schema {
        namespace,
        entities,
    }
}

fn collect_associations(schema: Node<'_, '_>, namespace: &str) -> AssociationTable {
    let mut table = AssociationTable::default();

    for assoc in schema
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Association")
    {
        let Some(name) = assoc.attribute("Name") else {
            continue;
        };

        let mut info = AssociationInfo::default();
        for end in child_elements(assoc, "End") {
            let (Some(role), Some(ty)) = (end.attribute("Role"), end.attribute("Type")) else {
                continue;
            };
            info.ends.insert(
                role.to_string(),
                AssociationEnd {
                    target: ty.to_string(),
                    multiplicity: end.attribute("Multiplicity").map(str::to_string),
                },
            );
        }
        info.constraint = association_constraint(assoc);

        // Navigation properties may reference the association by either the
        // qualified or the bare name, so key the table both ways.
        if !namespace.is_empty() {
            table.insert(format!("{namespace}.{name}"), info.clone());
        }
        table.insert(name.to_string(), info);
    }

    table
}

fn association_constraint(assoc: Node<'_, '_>) -> Option<AssociationConstraint> {
    let rc = child_elements(assoc, "ReferentialConstraint").next()?;
    let principal = child_elements(rc, "Principal").next()?;
    let dependent = child_elements(rc, "Dependent").next()?;
    Some(AssociationConstraint {
        principal_role: principal.attribute("Role").unwrap_or("").to_string(),
        principal_fields: property_refs(principal),
        dependent_role: dependent.attribute("Role").unwrap_or("").to_string(),
        dependent_fields: property_refs(dependent),
    })
}

fn resolve_entity(et: Node<'_, '_>, associations: &AssociationTable) -> EntityType {
    let name = et.attribute("Name").unwrap_or("Unknown").to_string();

    let keys = child_elements(et, "Key")
        .next()
        .map(property_refs)
        .unwrap_or_default();

    let properties = child_elements(et, "Property")
        .map(|p| Property {
            name: p.attribute("Name").unwrap_or("").to_string(),
            ty: p.attribute("Type").unwrap_or("").to_string(),
        })
        .collect();

    let navigation = child_elements(et, "NavigationProperty")
        .map(|nav| resolve_navigation(nav, &name, associations))
        .collect();

    EntityType {
        name,
        keys,
        properties,
        navigation,
    }
}

fn resolve_navigation(
    nav: Node<'_, '_>,
    entity: &str,
    associations: &AssociationTable,
) -> NavigationProperty {
    let name = nav.attribute("Name").unwrap_or("Unknown").to_string();

    // Two-branch dialect rule: a direct type reference wins (V4); otherwise
    // resolve through the association table (V2/V3).
    if let Some(ty) = nav.attribute("Type") {
        let (inner, is_collection) = strip_collection(ty);
        let constraints = nav
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "ReferentialConstraint")
            .filter_map(|rc| {
                Some(FieldConstraint {
                    source_field: rc.attribute("Property")?.to_string(),
                    target_field: rc.attribute("ReferencedProperty")?.to_string(),
                })
            })
            .collect();
        return NavigationProperty {
            name,
            target: Some(last_segment(inner).to_string()),
            relationship: None,
            source_multiplicity: None,
            target_multiplicity: Some(if is_collection { "*" } else { "0..1" }.to_string()),
            constraints,
        };
    }

    let relationship = nav.attribute("Relationship").map(str::to_string);
    let to_role = nav.attribute("ToRole");
    let from_role = nav.attribute("FromRole");

    let (Some(rel), Some(to_role)) = (relationship.as_deref(), to_role) else {
        debug!(entity, nav = %name, "navigation property has neither Type nor Relationship/ToRole");
        return NavigationProperty {
            name,
            relationship,
            ..Default::default()
        };
    };

    // Qualified name first, bare name second.
    let info = associations
        .get(rel)
        .or_else(|| associations.get(last_segment(rel)));
    let Some(info) = info else {
        debug!(entity, nav = %name, relationship = rel, "association not declared; leaving target unresolved");
        return NavigationProperty {
            name,
            relationship,
            ..Default::default()
        };
    };

    let Some(target_end) = info.ends.get(to_role) else {
        debug!(entity, nav = %name, relationship = rel, to_role, "role not declared on association; leaving target unresolved");
        return NavigationProperty {
            name,
            relationship,
            ..Default::default()
        };
    };

    // The source end is the FromRole when declared, else the one end that
    // is not the target role (the common two-ended case).
    let source_role = from_role
        .map(str::to_string)
        .or_else(|| info.ends.keys().find(|r| *r != to_role).cloned());
    let source_multiplicity = source_role
        .as_deref()
        .and_then(|r| info.ends.get(r))
        .and_then(|end| end.multiplicity.clone());

    let constraints = info
        .constraint
        .as_ref()
        .and_then(|c| orient_constraint(c, source_role.as_deref()))
        .unwrap_or_default();

    NavigationProperty {
        name,
        target: Some(last_segment(&target_end.target).to_string()),
        relationship,
        source_multiplicity,
        target_multiplicity: target_end.multiplicity.clone(),
        constraints,
    }
}

/// Orients an association-level constraint so `source_field` is a field of
/// the declaring entity (the source role's end).
fn orient_constraint(
    c: &AssociationConstraint,
    source_role: Option<&str>,
) -> Option<Vec<FieldConstraint>> {
    let source_role = source_role?;
    let (source_fields, target_fields) = if c.dependent_role == source_role {
        (&c.dependent_fields, &c.principal_fields)
    } else if c.principal_role == source_role {
        (&c.principal_fields, &c.dependent_fields)
    } else {
        return None;
    };
    Some(
        source_fields
            .iter()
            .zip(target_fields.iter())
            .map(|(s, t)| FieldConstraint {
                source_field: s.clone(),
                target_field: t.clone(),
            })
            .collect(),
    )
}

fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn property_refs(node: Node<'_, '_>) -> Vec<String> {
    child_elements(node, "PropertyRef")
        .filter_map(|p| p.attribute("Name").map(str::to_string))
        .collect()
}

/// `Collection(NS.Order)` → (`NS.Order`, true); anything else passes through.
fn strip_collection(ty: &str) -> (&str, bool) {
    match ty
        .strip_prefix("Collection(")
        .and_then(|s| s.strip_suffix(')'))
    {
        Some(inner) => (inner, true),
        None => (ty, false),
    }
}

/// A qualified reference collapses to its bare name: final dot-segment.
fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
