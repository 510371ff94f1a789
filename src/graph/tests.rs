//! Serialization tests against catalog API fixtures

use serde_json::{json, Value};

/// Fixture: lineage response for a table with one upstream and one downstream hop
fn lineage_response_fixture() -> Value {
    json!({
        "entity": {
            "id": "5d2c9a1e-0000-0000-0000-000000000002",
            "type": "table",
            "name": "orders_clean",
            "fullyQualifiedName": "mysql.shop.public.orders_clean",
            "deleted": false
        },
        "nodes": [
            {
                "id": "5d2c9a1e-0000-0000-0000-000000000001",
                "type": "table",
                "name": "orders_raw",
                "fullyQualifiedName": "mysql.shop.public.orders_raw"
            },
            {
                "id": "5d2c9a1e-0000-0000-0000-000000000003",
                "type": "dashboard",
                "name": "revenue",
                "fullyQualifiedName": "superset.revenue",
                "displayName": "Revenue"
            }
        ],
        "upstreamEdges": [
            {
                "fromEntity": "5d2c9a1e-0000-0000-0000-000000000001",
                "toEntity": "5d2c9a1e-0000-0000-0000-000000000002",
                "lineageDetails": {
                    "sqlQuery": "insert into orders_clean select * from orders_raw",
                    "columnsLineage": [
                        {
                            "fromColumns": ["mysql.shop.public.orders_raw.id"],
                            "toColumn": "mysql.shop.public.orders_clean.id"
                        }
                    ],
                    "pipeline": {
                        "id": "5d2c9a1e-0000-0000-0000-00000000000a",
                        "type": "pipeline",
                        "name": "clean_orders",
                        "fullyQualifiedName": "airflow.clean_orders"
                    }
                }
            }
        ],
        "downstreamEdges": [
            {
                "fromEntity": "5d2c9a1e-0000-0000-0000-000000000002",
                "toEntity": "5d2c9a1e-0000-0000-0000-000000000003"
            }
        ]
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::graph::{EntityId, EntityLineage, EntityReference, LineageDirection};

    #[test]
    fn entity_id_serializes_as_string() {
        let id = EntityId::from_string("5d2c9a1e");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"5d2c9a1e\"");
    }

    #[test]
    fn lineage_response_deserializes() {
        let lineage: EntityLineage = serde_json::from_value(lineage_response_fixture()).unwrap();

        assert_eq!(lineage.entity.name, "orders_clean");
        assert_eq!(lineage.entity.deleted, Some(false));
        assert_eq!(lineage.nodes.len(), 2);
        assert_eq!(lineage.nodes[1].label(), "Revenue");
        assert_eq!(lineage.edges(LineageDirection::Upstream).len(), 1);
        assert_eq!(lineage.edges(LineageDirection::Downstream).len(), 1);

        let upstream = &lineage.upstream_edges[0];
        let details = upstream.lineage_details.as_ref().unwrap();
        assert_eq!(details.columns_lineage[0].from_columns.len(), 1);
        assert_eq!(upstream.pipeline().unwrap().name, "clean_orders");
    }

    #[test]
    fn missing_arrays_are_empty() {
        let lineage: EntityLineage = serde_json::from_value(json!({
            "entity": { "id": "a", "type": "table" }
        }))
        .unwrap();

        assert!(lineage.nodes.is_empty());
        assert!(lineage.upstream_edges.is_empty());
        assert!(lineage.downstream_edges.is_empty());
        assert_eq!(lineage.entity.fully_qualified_name, "");
    }

    #[test]
    fn entity_reference_uses_api_field_names() {
        let entity = EntityReference::with_id("a", "table", "svc.db.s.orders");
        let value = serde_json::to_value(&entity).unwrap();

        assert_eq!(value["type"], "table");
        assert_eq!(value["fullyQualifiedName"], "svc.db.s.orders");
        assert!(value.get("displayName").is_none());
        assert!(value.get("entity_type").is_none());
    }

    #[test]
    fn lineage_survives_json_roundtrip() {
        let lineage: EntityLineage = serde_json::from_value(lineage_response_fixture()).unwrap();
        let text = serde_json::to_string(&lineage).unwrap();
        let back: EntityLineage = serde_json::from_str(&text).unwrap();
        assert_eq!(back, lineage);
    }
}
