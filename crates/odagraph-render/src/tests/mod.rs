
use odagraph_core::{EntityType, FieldConstraint, NavigationProperty, Property, Schema};

pub(crate) fn nav(name: &str, target: &str) -> NavigationProperty {
    NavigationProperty {
        name: name.to_string(),
        target: Some(target.to_string()),
        ..Default::default()
    }
}

pub(crate) fn entity(name: &str, props: &[&str], navigation: Vec<NavigationProperty>) -> EntityType {
    EntityType {
        name: name.to_string(),
        keys: props.first().map(|p| vec![p.to_string()]).unwrap_or_default(),
        properties: props
            .iter()
            .map(|p| Property {
                name: p.to_string(),
                ty: "Edm.String".to_string(),
            })
            .collect(),
        navigation,
    }
}

pub(crate) fn schema_of(entities: Vec<EntityType>) -> Schema {
    Schema {
        namespace: "NS".to_string(),
        entities,
    }
}

pub(crate) fn constraint(source: &str, target: &str) -> FieldConstraint {
    FieldConstraint {
        source_field: source.to_string(),
        target_field: target.to_string(),
    }
}
