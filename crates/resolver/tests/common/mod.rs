//! In-memory stand-in for the taxonomy service.
//!
//! Serves a small fixture taxonomy (version `5.1.1.2`) modelled on real
//! ECCAIRS codes: entity 24 "Occurrence" owning attributes 390, 430, 431 and
//! 601, and entity 4 "Aircraft" owning the hierarchical attribute 32.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use taxonomy::{Method, TaxonomyTransport, TransportError, TransportRequest};
use tokio::time::Instant;

pub const BASE_URL: &str = "http://taxonomy.test/taxonomy-service";

pub const VERSION_PATH: &str = "/version/public/";
pub const TREE_PATH: &str = "/tree/public/";
pub const BY_IDS_PATH: &str = "/attributes/public/byIDs";

#[derive(Debug)]
enum Reply {
    Data(Value),
    Status(u16),
}

#[derive(Debug)]
pub struct FakeTaxonomyService {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    refusals_left: AtomicU32,
    requests: Mutex<Vec<(TransportRequest, Instant)>>,
}

impl FakeTaxonomyService {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            refusals_left: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
        .with_data(Method::Get, VERSION_PATH, json!({"id": 12, "version": "5.1.1.2"}))
        .with_data(Method::Get, TREE_PATH, fixture_tree())
        .with_data(
            Method::Get,
            "/attributes/public/byID/1430?taxonomyId=12",
            json!({"id": 1430, "attributeValueList": {"id": 88, "levels": 1}}),
        )
        .with_data(
            Method::Get,
            "/attributes/public/byID/1431?taxonomyId=12",
            json!({"id": 1431, "attributeValueList": {"id": 89, "levels": 2}}),
        )
        .with_data(
            Method::Get,
            "/attributes/public/byID/1032?taxonomyId=12",
            json!({"id": 1032, "attributeValueList": {"id": 90, "levels": 3}}),
        )
        .with_data(
            Method::Get,
            "/attributes/public/byID/1601?taxonomyId=12",
            json!({"id": 1601, "dataType": "Text"}),
        )
        .with_data(
            Method::Get,
            "/attributes/public/showFirstLevelValues?attributesList=1431",
            json!({"map": {"1431": [
                value(5001, 100, "Accident", "1", true),
                value(5002, 200, "Serious incident", "1", false),
                value(5003, 300, "Occurrence with No Flight Intended", "1", true),
            ]}}),
        )
        .with_data(
            Method::Get,
            "/listofvalue/public/childrenLov/5001",
            json!({"list": [
                value(6001, 101, "Accident - fatal", "2", false),
                value(6002, 102, "Accident - non-fatal", "2", false),
            ]}),
        )
        .with_data(Method::Get, "/listofvalue/public/childrenLov/5003", json!({"list": []}))
        .with_data(
            Method::Post,
            BY_IDS_PATH,
            json!([{
                "id": 1431,
                "tc": 431,
                "label": "Event phase",
                "entity": {"id": 1, "tc": 24, "label": "Occurrence", "xsdTag": "Occurrence"}
            }]),
        )
    }

    /// Serves `data` wrapped in an envelope for `path`.
    pub fn with_data(self, method: Method, path: &str, data: Value) -> Self {
        self.serve_data(method, path, data);
        self
    }

    /// Answers `path` with a bare HTTP status.
    pub fn with_status(self, method: Method, path: &str, status_code: u16) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert((method, url(path)), Reply::Status(status_code));
        self
    }

    /// Replaces what `path` serves from now on.
    pub fn serve_data(&self, method: Method, path: &str, data: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, url(path)), Reply::Data(data));
    }

    /// Refuses the next `count` connections.
    pub fn refusing(self, count: u32) -> Self {
        self.refusals_left.store(count, Ordering::SeqCst);
        self
    }

    /// Every request received, including refused ones.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    /// Times at which requests to `path` were received.
    pub fn request_times(&self, path: &str) -> Vec<Instant> {
        let target = url(path);
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(request, _)| request.url == target)
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.request_times(path).len()
    }
}

#[async_trait]
impl TaxonomyTransport for FakeTaxonomyService {
    async fn send(&self, request: &TransportRequest) -> Result<String, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), Instant::now()));

        let refused = self
            .refusals_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(TransportError::Connect {
                url: request.url.clone(),
                reason: "Connection refused (os error 111)".into(),
            });
        }

        let routes = self.routes.lock().unwrap();
        match routes.get(&(request.method, request.url.clone())) {
            Some(Reply::Data(data)) => Ok(json!({"data": data, "returnCode": "OK"}).to_string()),
            Some(Reply::Status(status_code)) => Err(TransportError::Status {
                url: request.url.clone(),
                status_code: *status_code,
            }),
            None => Err(TransportError::Status {
                url: request.url.clone(),
                status_code: 404,
            }),
        }
    }
}

pub fn url(path: &str) -> String {
    format!("{BASE_URL}{path}")
}

pub fn value(id: i64, identifier: i64, description: &str, level: &str, has_child: bool) -> Value {
    json!({
        "id": id,
        "identifier": identifier,
        "description": description,
        "detailed": "",
        "explanation": format!("Explanation of {description}"),
        "level": level,
        "hasChild": has_child,
    })
}

pub fn fixture_tree() -> Value {
    json!([{
        "id": 1,
        "tc": 24,
        "type": "E",
        "label": "Occurrence",
        "xsdTag": "Occurrence",
        "attributes": [
            {"id": 1390, "tc": 390, "type": "A", "label": "Event type", "xsdTag": "Event_Type"},
            {"id": 1430, "tc": 430, "type": "A", "label": "Occurrence class", "xsdTag": "Occurrence_Class"},
            {"id": 1431, "tc": 431, "type": "A", "label": "Event phase", "xsdTag": "Event_Phase"},
            {"id": 1601, "tc": 601, "type": "A", "label": "Narrative text", "xsdTag": "Narrative_Text"}
        ],
        "entities": [{
            "id": 4,
            "tc": 4,
            "type": "E",
            "label": "Aircraft",
            "xsdTag": "Aircraft",
            "attributes": [
                {"id": 1032, "tc": 32, "type": "A", "label": "Aircraft category", "xsdTag": "Aircraft_Category"}
            ]
        }]
    }])
}
