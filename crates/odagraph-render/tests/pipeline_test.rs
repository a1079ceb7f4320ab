//! End-to-end pipeline over the public API: metadata text in, placed graph
//! and focus directives out.

use futures::executor::block_on;

use odagraph_core::resolve_metadata;
use odagraph_render::{
    GraphOptions, LayoutEngine, RowLayout, Session, finalize, highlight, neutral, prepare,
};

const NORTHWIND_V2: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx Version="1.0" xmlns:edmx="http://schemas.microsoft.com/ado/2007/06/edmx">
  <edmx:DataServices xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata" m:DataServiceVersion="2.0">
    <Schema Namespace="NorthwindModel" xmlns="http://schemas.microsoft.com/ado/2008/09/edm">
      <EntityType Name="Customer">
        <Key><PropertyRef Name="CustomerID"/></Key>
        <Property Name="CustomerID" Type="Edm.String" Nullable="false"/>
        <Property Name="CompanyName" Type="Edm.String"/>
        <NavigationProperty Name="Orders" Relationship="NorthwindModel.FK_Orders_Customers" FromRole="Customers" ToRole="Orders"/>
      </EntityType>
      <EntityType Name="Order">
        <Key><PropertyRef Name="OrderID"/></Key>
        <Property Name="OrderID" Type="Edm.Int32" Nullable="false"/>
        <Property Name="CustomerID" Type="Edm.String"/>
        <NavigationProperty Name="Customer" Relationship="NorthwindModel.FK_Orders_Customers" FromRole="Orders" ToRole="Customers"/>
      </EntityType>
      <Association Name="FK_Orders_Customers">
        <End Role="Customers" Type="NorthwindModel.Customer" Multiplicity="1"/>
        <End Role="Orders" Type="NorthwindModel.Order" Multiplicity="*"/>
        <ReferentialConstraint>
          <Principal Role="Customers"><PropertyRef Name="CustomerID"/></Principal>
          <Dependent Role="Orders"><PropertyRef Name="CustomerID"/></Dependent>
        </ReferentialConstraint>
      </Association>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

#[test]
fn v2_metadata_flows_through_resolve_prepare_layout_finalize() {
    let schema = resolve_metadata(NORTHWIND_V2);
    assert_eq!(schema.namespace, "NorthwindModel");
    assert_eq!(schema.entities.len(), 2);

    let prepared = prepare(&schema, &GraphOptions::default());
    assert_eq!(prepared.edges.len(), 1);
    assert_eq!(prepared.edges[0].label, "Orders (1 : *)");

    let engine = RowLayout::default();
    let response = engine.layout(&prepared.request).unwrap();
    let graph = finalize(&prepared, &response);

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    let edge = &graph.edges[0];
    assert_eq!(edge.source, "Customer");
    assert_eq!(edge.target, "Order");
    assert!(!edge.color.is_empty());

    // Referential-constraint fields are colored on both endpoints with the
    // relationship color.
    let customer = graph.node("Customer").unwrap();
    let order = graph.node("Order").unwrap();
    assert_eq!(customer.field_colors.get("CustomerID"), Some(&edge.color));
    assert_eq!(order.field_colors.get("CustomerID"), Some(&edge.color));
}

#[test]
fn focus_directives_cover_every_placed_node_and_edge() {
    let schema = resolve_metadata(NORTHWIND_V2);
    let prepared = prepare(&schema, &GraphOptions::default());
    let engine = RowLayout::default();
    let response = engine.layout(&prepared.request).unwrap();
    let graph = finalize(&prepared, &response);

    let base = neutral(&graph);
    assert_eq!(base.nodes.len(), graph.nodes.len());
    assert_eq!(base.edges.len(), graph.edges.len());

    let focused = highlight(&graph, "Customer");
    assert_eq!(focused.nodes.len(), graph.nodes.len());
    assert_eq!(focused.edges.len(), graph.edges.len());
    assert!(!focused.nodes["Order"].dimmed);
    assert_eq!(focused.edges[&graph.edges[0].id].stroke, graph.edges[0].color);
}

#[test]
fn session_drives_the_pipeline_from_raw_metadata() {
    let mut session = Session::new();
    let ticket = session.begin_load();
    let installed = block_on(session.load(
        ticket,
        NORTHWIND_V2,
        &RowLayout::default(),
        &GraphOptions::default(),
    ));
    assert!(installed);

    let graph = session.graph().unwrap();
    assert_eq!(graph.nodes.len(), 2);

    let directive = session.focus_node("Order").unwrap();
    assert_eq!(directive.focused.as_deref(), Some("Order"));
}
