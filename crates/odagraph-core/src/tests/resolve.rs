use crate::schema::FieldConstraint;
use crate::*;

const NORTHWIND_V2: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx Version="1.0" xmlns:edmx="http://schemas.microsoft.com/ado/2007/06/edmx">
  <edmx:DataServices>
    <Schema Namespace="NorthwindModel" xmlns="http://schemas.microsoft.com/ado/2008/09/edm">
      <EntityType Name="Customer">
        <Key>
          <PropertyRef Name="CustomerID" />
        </Key>
        <Property Name="CustomerID" Type="Edm.String" />
        <Property Name="CompanyName" Type="Edm.String" />
        <NavigationProperty Name="Orders" Relationship="NorthwindModel.FK_Orders_Customers" FromRole="Customers" ToRole="Orders" />
      </EntityType>
      <EntityType Name="Order">
        <Key>
          <PropertyRef Name="OrderID" />
        </Key>
        <Property Name="OrderID" Type="Edm.Int32" />
        <Property Name="CustomerID" Type="Edm.String" />
        <NavigationProperty Name="Customer" Relationship="NorthwindModel.FK_Orders_Customers" FromRole="Orders" ToRole="Customers" />
      </EntityType>
      <Association Name="FK_Orders_Customers">
        <End Role="Customers" Type="NorthwindModel.Customer" Multiplicity="1" />
        <End Role="Orders" Type="NorthwindModel.Order" Multiplicity="*" />
        <ReferentialConstraint>
          <Principal Role="Customers">
            <PropertyRef Name="CustomerID" />
          </Principal>
          <Dependent Role="Orders">
            <PropertyRef Name="CustomerID" />
          </Dependent>
        </ReferentialConstraint>
      </Association>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>
"#;

const TRIPPIN_V4: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx Version="4.0" xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx">
  <edmx:DataServices>
    <Schema Namespace="NS" xmlns="http://docs.oasis-open.org/odata/ns/edm">
      <EntityType Name="Customer">
        <Key>
          <PropertyRef Name="ID" />
        </Key>
        <Property Name="ID" Type="Edm.Int32" />
        <Property Name="Name" Type="Edm.String" />
        <NavigationProperty Name="Orders" Type="Collection(NS.Order)" />
      </EntityType>
      <EntityType Name="Order">
        <Key>
          <PropertyRef Name="ID" />
        </Key>
        <Property Name="ID" Type="Edm.Int32" />
        <Property Name="CustomerID" Type="Edm.Int32" />
        <NavigationProperty Name="Customer" Type="NS.Customer">
          <ReferentialConstraint Property="CustomerID" ReferencedProperty="ID" />
        </NavigationProperty>
      </EntityType>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>
"#;

#[test]
fn v2_navigation_resolves_through_association_roles() {
    let schema = resolve_metadata(NORTHWIND_V2);
    assert_eq!(schema.namespace, "NorthwindModel");
    assert_eq!(schema.entities.len(), 2);

    let customer = schema.entity("Customer").unwrap();
    let orders = &customer.navigation[0];
    assert_eq!(orders.name, "Orders");
    assert_eq!(orders.target.as_deref(), Some("Order"));
    assert_eq!(orders.source_multiplicity.as_deref(), Some("1"));
    assert_eq!(orders.target_multiplicity.as_deref(), Some("*"));

    let order = schema.entity("Order").unwrap();
    let back = &order.navigation[0];
    assert_eq!(back.target.as_deref(), Some("Customer"));
    assert_eq!(back.source_multiplicity.as_deref(), Some("*"));
    assert_eq!(back.target_multiplicity.as_deref(), Some("1"));
}

#[test]
fn v2_referential_constraint_is_oriented_per_declaring_entity() {
    let schema = resolve_metadata(NORTHWIND_V2);

    // Order is the dependent end: its CustomerID points at Customer's.
    let order_nav = &schema.entity("Order").unwrap().navigation[0];
    assert_eq!(
        order_nav.constraints,
        vec![FieldConstraint {
            source_field: "CustomerID".to_string(),
            target_field: "CustomerID".to_string(),
        }]
    );

    // The principal side gets the mirrored pair.
    let customer_nav = &schema.entity("Customer").unwrap().navigation[0];
    assert_eq!(customer_nav.constraints.len(), 1);
    assert_eq!(customer_nav.constraints[0].source_field, "CustomerID");
}

#[test]
fn v2_bare_association_reference_falls_back_to_unqualified_name() {
    let text = NORTHWIND_V2.replace(
        "Relationship=\"NorthwindModel.FK_Orders_Customers\"",
        "Relationship=\"FK_Orders_Customers\"",
    );
    let schema = resolve_metadata(&text);
    let customer = schema.entity("Customer").unwrap();
    assert_eq!(customer.navigation[0].target.as_deref(), Some("Order"));
}

#[test]
fn v2_unknown_association_leaves_target_unresolved() {
    let text = NORTHWIND_V2.replace("FK_Orders_Customers\">", "FK_Something_Else\">");
    let schema = resolve_metadata(&text);
    let customer = schema.entity("Customer").unwrap();
    assert_eq!(customer.navigation[0].target, None);
    assert!(customer.navigation[0].relationship.is_some());
}

#[test]
fn v4_collection_wrapper_and_namespace_are_stripped() {
    let schema = resolve_metadata(TRIPPIN_V4);
    let customer = schema.entity("Customer").unwrap();
    let orders = &customer.navigation[0];
    assert_eq!(orders.target.as_deref(), Some("Order"));
    assert_eq!(orders.target_multiplicity.as_deref(), Some("*"));

    let order = schema.entity("Order").unwrap();
    let single = &order.navigation[0];
    assert_eq!(single.target.as_deref(), Some("Customer"));
    assert_eq!(single.target_multiplicity.as_deref(), Some("0..1"));
}

#[test]
fn v4_navigation_level_referential_constraint_is_collected() {
    let schema = resolve_metadata(TRIPPIN_V4);
    let order_nav = &schema.entity("Order").unwrap().navigation[0];
    assert_eq!(
        order_nav.constraints,
        vec![FieldConstraint {
            source_field: "CustomerID".to_string(),
            target_field: "ID".to_string(),
        }]
    );
}

#[test]
fn keys_and_properties_preserve_declaration_order() {
    let text = r#"<Schema Namespace="NS">
      <EntityType Name="Composite">
        <Key>
          <PropertyRef Name="B" />
          <PropertyRef Name="A" />
        </Key>
        <Property Name="B" Type="Edm.Int32" />
        <Property Name="A" Type="Edm.Int32" />
        <Property Name="Z" Type="Edm.String" />
      </EntityType>
    </Schema>"#;
    let schema = resolve_metadata(text);
    let entity = schema.entity("Composite").unwrap();
    assert_eq!(entity.keys, vec!["B", "A"]);
    let names: Vec<&str> = entity.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["B", "A", "Z"]);
    assert!(entity.is_key("B"));
    assert!(!entity.is_key("Z"));
}

#[test]
fn malformed_input_resolves_to_empty_schema() {
    assert!(resolve_metadata("not xml at all").is_empty());
    assert!(resolve_metadata("<unclosed>").is_empty());
    assert!(resolve_metadata("").is_empty());
}

#[test]
fn xml_without_schema_container_resolves_to_empty_schema() {
    let schema = resolve_metadata("<html><body>404</body></html>");
    assert!(schema.is_empty());
    assert_eq!(schema.namespace, "");
}

#[test]
fn schema_serializes_to_stable_json_shape() {
    let schema = resolve_metadata(TRIPPIN_V4);
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(value["namespace"], serde_json::json!("NS"));
    assert_eq!(
        value["entities"][0]["properties"][0]["type"],
        serde_json::json!("Edm.Int32")
    );
}
