use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const OID_PREFIX: &str = "urn:oid:";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Concept {
    pub code: String,
    pub display: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValueSetVersion {
    pub version: String,
    pub date: String,
    pub concepts: Vec<Concept>,
}

/// A ValueSet with its versions, oldest first. The last one is current.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValueSet {
    pub id: Uuid,
    pub oid: String,
    pub name: String,
    pub versions: Vec<ValueSetVersion>,
}

impl ValueSet {
    fn version(&self, version: Option<&str>) -> Option<&ValueSetVersion> {
        match version {
            Some(v) => self.versions.iter().find(|vs| vs.version == v),
            None => self.versions.last(),
        }
    }

    fn resource(&self, version: &ValueSetVersion) -> Value {
        json!({
            "resourceType": "ValueSet",
            "id": self.id,
            "url": format!("{OID_PREFIX}{}", self.oid),
            "version": version.version,
            "name": self.name,
            "date": version.date,
            "status": "active",
        })
    }
}

/// Request body of the POST operations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    #[serde(default)]
    pub parameter: Vec<Parameter>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "valueString")]
    pub value_string: Option<String>,
}

impl Parameters {
    fn get(&self, name: &str) -> Option<&str> {
        self.parameter
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.value_string.as_deref())
    }
}

#[derive(Deserialize)]
pub struct InfoQuery {
    pub url: Option<String>,
    #[serde(rename = "_format")]
    pub format: Option<String>,
}

pub type Db = Arc<RwLock<Vec<ValueSet>>>;

/// Router over the sample catalogue.
pub fn app() -> Router {
    app_with(sample_catalogue())
}

pub fn app_with(catalogue: Vec<ValueSet>) -> Router {
    let db: Db = Arc::new(RwLock::new(catalogue));
    Router::new()
        .route("/ValueSet", get(info))
        .route("/ValueSet/$expand", post(expand))
        .route("/ValueSet/$lookup", post(lookup))
        .route("/ValueSet/$validate-code", post(validate_code))
        .route("/ValueSet/{id}/_history", get(history))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Two ValueSets with fixed ids, the first one in two versions.
pub fn sample_catalogue() -> Vec<ValueSet> {
    let concept = |code: &str, display: &str| Concept {
        code: code.to_string(),
        display: display.to_string(),
    };
    vec![
        ValueSet {
            id: Uuid::from_u128(0x1b7c_9a4e_0000_4000_8000_0000_0000_0001),
            oid: "1.2.643.5.1.13.13.11.1040".to_string(),
            name: "Gender".to_string(),
            versions: vec![
                ValueSetVersion {
                    version: "1".to_string(),
                    date: "2016-01-01".to_string(),
                    concepts: vec![concept("1", "Male"), concept("2", "Female")],
                },
                ValueSetVersion {
                    version: "2".to_string(),
                    date: "2019-06-01".to_string(),
                    concepts: vec![
                        concept("1", "Male"),
                        concept("2", "Female"),
                        concept("3", "Unknown"),
                    ],
                },
            ],
        },
        ValueSet {
            id: Uuid::from_u128(0x1b7c_9a4e_0000_4000_8000_0000_0000_0002),
            oid: "1.2.643.5.1.13.2.1.1.1504".to_string(),
            name: "Blood group".to_string(),
            versions: vec![ValueSetVersion {
                version: "1".to_string(),
                date: "2017-03-15".to_string(),
                concepts: vec![
                    concept("O", "O (I)"),
                    concept("A", "A (II)"),
                    concept("B", "B (III)"),
                    concept("AB", "AB (IV)"),
                ],
            }],
        },
    ]
}

/// Accept `Authorization: N3 <id>` with a non-empty id.
fn authorize(headers: &HeaderMap) -> Result<(), StatusCode> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;
    match value.strip_prefix("N3 ") {
        Some(id) if !id.trim().is_empty() => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

fn oid_from_system(system: &str) -> Result<&str, StatusCode> {
    system
        .strip_prefix(OID_PREFIX)
        .filter(|oid| !oid.is_empty())
        .ok_or(StatusCode::BAD_REQUEST)
}

fn find_by_oid<'a>(catalogue: &'a [ValueSet], oid: &str) -> Result<&'a ValueSet, StatusCode> {
    catalogue
        .iter()
        .find(|vs| vs.oid == oid)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Resolve `system` and the optional `version` of a POST body.
fn resolve<'a>(
    catalogue: &'a [ValueSet],
    params: &Parameters,
) -> Result<(&'a ValueSet, &'a ValueSetVersion), StatusCode> {
    let system = params.get("system").ok_or(StatusCode::BAD_REQUEST)?;
    let value_set = find_by_oid(catalogue, oid_from_system(system)?)?;
    let version = value_set
        .version(params.get("version"))
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok((value_set, version))
}

fn out_param(name: &str, value: Value) -> Value {
    let key = if value.is_boolean() {
        "valueBoolean"
    } else {
        "valueString"
    };
    json!({ "name": name, key: value })
}

async fn info(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<InfoQuery>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    tracing::debug!(url = ?query.url, format = ?query.format, "info");
    let url = query.url.ok_or(StatusCode::BAD_REQUEST)?;
    let catalogue = db.read().await;
    let value_set = find_by_oid(&catalogue, oid_from_system(&url)?)?;
    let current = value_set.version(None).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(value_set.resource(current)))
}

async fn expand(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(params): Json<Parameters>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    let catalogue = db.read().await;
    let (value_set, version) = resolve(&catalogue, &params)?;
    let system = format!("{OID_PREFIX}{}", value_set.oid);
    let contains: Vec<Value> = version
        .concepts
        .iter()
        .map(|c| json!({ "system": system, "code": c.code, "display": c.display }))
        .collect();

    let mut resource = value_set.resource(version);
    resource["expansion"] = json!({
        "total": contains.len(),
        "contains": contains,
    });
    Ok(Json(resource))
}

async fn lookup(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(params): Json<Parameters>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    let code = params.get("code").ok_or(StatusCode::BAD_REQUEST)?;
    let catalogue = db.read().await;
    let (value_set, version) = resolve(&catalogue, &params)?;
    let concept = version
        .concepts
        .iter()
        .find(|c| c.code == code)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({
        "resourceType": "Parameters",
        "parameter": [
            out_param("name", json!(value_set.name)),
            out_param("version", json!(version.version)),
            out_param("display", json!(concept.display)),
        ],
    })))
}

async fn validate_code(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(params): Json<Parameters>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    let code = params.get("code").ok_or(StatusCode::BAD_REQUEST)?;
    let catalogue = db.read().await;
    let (value_set, version) = resolve(&catalogue, &params)?;
    let parameter = match version.concepts.iter().find(|c| c.code == code) {
        Some(concept) => vec![
            out_param("result", json!(true)),
            out_param("display", json!(concept.display)),
        ],
        None => vec![
            out_param("result", json!(false)),
            out_param(
                "message",
                json!(format!(
                    "code '{code}' is not in {} version {}",
                    value_set.name, version.version
                )),
            ),
        ],
    };
    Ok(Json(json!({ "resourceType": "Parameters", "parameter": parameter })))
}

async fn history(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&headers)?;
    let catalogue = db.read().await;
    let value_set = catalogue
        .iter()
        .find(|vs| vs.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let entry: Vec<Value> = value_set
        .versions
        .iter()
        .rev()
        .map(|v| json!({ "resource": value_set.resource(v) }))
        .collect();
    Ok(Json(json!({
        "resourceType": "Bundle",
        "type": "history",
        "total": entry.len(),
        "entry": entry,
    })))
}
