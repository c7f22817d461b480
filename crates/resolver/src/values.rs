//! Value list assembly.
//!
//! The first level of an attribute's value list comes from one endpoint; the
//! children of each value come from another, keyed by the value's internal id.
//! Values are fetched depth first with an explicit work stack into a flat
//! arena, then folded into the nested [`EccairsValue`] tree. Children are only
//! requested for values the service flags with `hasChild`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use taxonomy::{
    EccairsValue, Endpoints, InternalId, TaxonomyError, TaxonomyTransport, ValueId,
};

use crate::RetryingTransport;

/// A value as returned by the first-level and child-value endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueNode {
    /// Internal id, used to request this value's children.
    id: InternalId,
    /// Public id exposed to callers.
    identifier: ValueId,
    #[serde(default, deserialize_with = "lenient_text")]
    description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    detailed: String,
    #[serde(default, deserialize_with = "lenient_text")]
    explanation: String,
    #[serde(default, deserialize_with = "lenient_text")]
    level: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    has_child: bool,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    domains: Option<String>,
}

/// Accepts strings, numbers, booleans and `null` for free-text fields.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

/// `true`, `"true"` (any case) and non-zero numbers are set; anything else is not.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::String(text) => text.trim().eq_ignore_ascii_case("true"),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

fn lenient_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

struct Slot {
    value: EccairsValue,
    internal_id: InternalId,
    has_child: bool,
    depth: u32,
    children: Option<Vec<usize>>,
}

/// Builds the value list of one attribute.
pub struct ValueListBuilder<'a, T> {
    transport: &'a RetryingTransport<T>,
    endpoints: &'a Endpoints,
}

impl<'a, T: TaxonomyTransport> ValueListBuilder<'a, T> {
    pub fn new(transport: &'a RetryingTransport<T>, endpoints: &'a Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Fetches the complete value list of `attribute`, preserving the order
    /// the service returns at every level.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and returns
    /// [`TaxonomyError::MalformedResponse`] if a value list is missing from a
    /// response.
    #[tracing::instrument(skip(self))]
    pub async fn build(&self, attribute: InternalId) -> Result<Vec<EccairsValue>, TaxonomyError> {
        let envelope = self
            .transport
            .fetch(&self.endpoints.first_level_values(attribute), "first-level values")
            .await?;
        let first_level: Vec<ValueNode> = envelope.extract(&format!("/map/{attribute}"))?;

        let mut arena = Vec::new();
        let roots = push_level(&mut arena, first_level, 1);
        let mut pending: Vec<usize> = roots.iter().rev().copied().collect();

        while let Some(index) = pending.pop() {
            let slot = &arena[index];
            if !slot.has_child {
                continue;
            }
            let (parent, level) = (slot.internal_id, slot.depth + 1);
            tracing::trace!(%attribute, level, value = %parent, "Loading child values");

            let envelope = self
                .transport
                .fetch(&self.endpoints.child_values(parent), "child values")
                .await?;
            let children: Vec<ValueNode> = envelope.extract("/list")?;
            let indices = push_level(&mut arena, children, level);
            pending.extend(indices.iter().rev().copied());
            arena[index].children = Some(indices);
        }

        tracing::debug!(%attribute, values = arena.len(), "Assembled value list");
        Ok(assemble(arena, &roots))
    }
}

fn push_level(arena: &mut Vec<Slot>, nodes: Vec<ValueNode>, depth: u32) -> Vec<usize> {
    nodes
        .into_iter()
        .map(|node| {
            arena.push(Slot {
                internal_id: node.id,
                has_child: node.has_child,
                depth,
                children: None,
                value: EccairsValue {
                    id: node.identifier,
                    description: node.description,
                    detailed_description: node.detailed,
                    explanation: node.explanation,
                    level: node.level,
                    domains: node.domains,
                    children: None,
                },
            });
            arena.len() - 1
        })
        .collect()
}

/// Folds the arena into nested values. Children always sit at higher indices
/// than their parent, so walking backwards finishes every child first.
fn assemble(arena: Vec<Slot>, roots: &[usize]) -> Vec<EccairsValue> {
    let mut built: Vec<Option<EccairsValue>> = vec![None; arena.len()];
    for (index, slot) in arena.into_iter().enumerate().rev() {
        let mut value = slot.value;
        value.children = slot.children.map(|children| {
            children
                .into_iter()
                .filter_map(|child| built[child].take())
                .collect()
        });
        built[index] = Some(value);
    }
    roots.iter().filter_map(|&root| built[root].take()).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use taxonomy::{TransportError, TransportRequest};

    use super::*;
    use crate::RetrySettings;

    /// Serves envelopes by URL and records every requested URL.
    #[derive(Default)]
    struct RoutedTransport {
        routes: HashMap<String, Value>,
        requested: Mutex<Vec<String>>,
    }

    impl RoutedTransport {
        fn route(mut self, path: &str, data: Value) -> Self {
            self.routes.insert(format!("http://svc{path}"), json!({ "data": data }));
            self
        }
    }

    #[async_trait]
    impl TaxonomyTransport for RoutedTransport {
        async fn send(&self, request: &TransportRequest) -> Result<String, TransportError> {
            self.requested.lock().unwrap().push(request.url.clone());
            self.routes
                .get(&request.url)
                .map(Value::to_string)
                .ok_or_else(|| TransportError::Status {
                    url: request.url.clone(),
                    status_code: 404,
                })
        }
    }

    fn value(id: i64, identifier: i64, description: &str, level: &str, has_child: bool) -> Value {
        json!({
            "id": id,
            "identifier": identifier,
            "description": description,
            "detailed": format!("{description} (detailed)"),
            "explanation": null,
            "level": level,
            "hasChild": has_child,
        })
    }

    async fn build(transport: RoutedTransport) -> (Result<Vec<EccairsValue>, TaxonomyError>, Vec<String>) {
        let transport = RetryingTransport::new(transport, RetrySettings::default());
        let endpoints = Endpoints::new("http://svc").unwrap();
        let result = ValueListBuilder::new(&transport, &endpoints)
            .build(InternalId::new(5))
            .await;
        let requested = transport_requests(&transport);
        (result, requested)
    }

    fn transport_requests(transport: &RetryingTransport<RoutedTransport>) -> Vec<String> {
        transport.inner().requested.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn flat_list_needs_a_single_request() {
        let transport = RoutedTransport::default().route(
            "/attributes/public/showFirstLevelValues?attributesList=5",
            json!({"map": {"5": [
                value(10, 1, "Accident", "1", false),
                value(11, 2, "Serious incident", "1", false),
            ]}}),
        );

        let (result, requested) = build(transport).await;
        let values = result.unwrap();

        assert_eq!(requested.len(), 1);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].description, "Accident");
        assert_eq!(values[0].detailed_description, "Accident (detailed)");
        assert_eq!(values[0].explanation, "");
        assert!(values.iter().all(|v| v.children.is_none()));
    }

    #[tokio::test]
    async fn nested_levels_are_fetched_depth_first_in_service_order() {
        let transport = RoutedTransport::default()
            .route(
                "/attributes/public/showFirstLevelValues?attributesList=5",
                json!({"map": {"5": [
                    value(10, 1, "Ground", "1", true),
                    value(11, 2, "Flight", "1", true),
                ]}}),
            )
            .route(
                "/listofvalue/public/childrenLov/10",
                json!({"list": [
                    value(20, 101, "Taxi", "2", true),
                    value(21, 102, "Parked", "2", false),
                ]}),
            )
            .route(
                "/listofvalue/public/childrenLov/20",
                json!({"list": [value(30, 1001, "Taxi to runway", "3", false)]}),
            )
            .route(
                "/listofvalue/public/childrenLov/11",
                json!({"list": [value(40, 201, "Cruise", "2", false)]}),
            );

        let (result, requested) = build(transport).await;
        let values = result.unwrap();

        assert_eq!(
            requested,
            vec![
                "http://svc/attributes/public/showFirstLevelValues?attributesList=5",
                "http://svc/listofvalue/public/childrenLov/10",
                "http://svc/listofvalue/public/childrenLov/20",
                "http://svc/listofvalue/public/childrenLov/11",
            ]
        );

        let ground = &values[0];
        let ground_children = ground.children.as_ref().unwrap();
        assert_eq!(
            ground_children.iter().map(|v| v.description.as_str()).collect::<Vec<_>>(),
            vec!["Taxi", "Parked"]
        );
        assert_eq!(ground_children[0].children.as_ref().unwrap()[0].level, "3");
        assert!(ground_children[1].children.is_none());
        assert_eq!(values[1].children.as_ref().unwrap()[0].id, ValueId::new(201));
    }

    #[tokio::test]
    async fn flagged_value_with_no_children_gets_an_empty_sequence() {
        let transport = RoutedTransport::default()
            .route(
                "/attributes/public/showFirstLevelValues?attributesList=5",
                json!({"map": {"5": [value(10, 1, "Other", "1", true)]}}),
            )
            .route("/listofvalue/public/childrenLov/10", json!({"list": []}));

        let (result, _) = build(transport).await;

        assert_eq!(result.unwrap()[0].children, Some(vec![]));
    }

    #[tokio::test]
    async fn missing_has_child_flag_means_leaf() {
        let transport = RoutedTransport::default().route(
            "/attributes/public/showFirstLevelValues?attributesList=5",
            json!({"map": {"5": [{"id": 10, "identifier": 1, "description": "Unknown", "level": 1}]}}),
        );

        let (result, requested) = build(transport).await;
        let values = result.unwrap();

        assert_eq!(requested.len(), 1);
        assert_eq!(values[0].level, "1");
        assert!(values[0].children.is_none());
    }

    #[tokio::test]
    async fn loosely_typed_flags_and_domains_are_accepted() {
        let transport = RoutedTransport::default()
            .route(
                "/attributes/public/showFirstLevelValues?attributesList=5",
                json!({"map": {"5": [
                    {"id": 10, "identifier": 1, "description": "Ground", "level": "1",
                     "hasChild": "true", "domains": ["E", "R"]},
                    {"id": 11, "identifier": 2, "description": "Flight", "level": "1",
                     "hasChild": 0, "domains": null},
                    {"id": 12, "identifier": 3, "description": "Other", "level": "1",
                     "hasChild": null, "domains": 7},
                ]}}),
            )
            .route(
                "/listofvalue/public/childrenLov/10",
                json!({"list": [value(20, 101, "Taxi", "2", false)]}),
            );

        let (result, requested) = build(transport).await;
        let values = result.unwrap();

        assert_eq!(requested.len(), 2);
        assert_eq!(values[0].children.as_ref().unwrap().len(), 1);
        assert_eq!(values[0].domains.as_deref(), Some(r#"["E","R"]"#));
        assert!(values[1].children.is_none());
        assert!(values[1].domains.is_none());
        assert!(values[2].children.is_none());
        assert_eq!(values[2].domains.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn missing_attribute_in_first_level_map_is_malformed() {
        let transport = RoutedTransport::default().route(
            "/attributes/public/showFirstLevelValues?attributesList=5",
            json!({"map": {}}),
        );

        let (result, _) = build(transport).await;

        assert!(matches!(result, Err(TaxonomyError::MalformedResponse { .. })));
    }

    #[tokio::test]
    async fn failing_child_request_fails_the_whole_list() {
        let transport = RoutedTransport::default().route(
            "/attributes/public/showFirstLevelValues?attributesList=5",
            json!({"map": {"5": [value(10, 1, "Ground", "1", true)]}}),
        );

        let (result, _) = build(transport).await;

        assert!(matches!(result, Err(TaxonomyError::ServiceError { status_code: 404 })));
    }
}
