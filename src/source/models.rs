use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{shared::Geometry, source};

/// A feature-like record before normalization. Geometry that does not parse
/// as GeoJSON is treated as absent rather than failing the record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFeature {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub geometry: Option<Geometry>,
    #[serde(default, alias = "attributes", deserialize_with = "lenient")]
    pub properties: Option<Map<String, Value>>,
}

impl RawFeature {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(key)
    }
}

/// A flat attribute record, as served for stops by both the transit API and
/// survey layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, alias = "properties", deserialize_with = "lenient")]
    pub attributes: Option<Map<String, Value>>,
}

impl RawRecord {
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.as_ref()?.get(key)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserializes each element on its own, dropping the ones that do not fit `T`.
pub fn parse_records<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    let total = values.len();
    let records: Vec<T> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if records.len() < total {
        debug!("Dropped {} malformed records", total - records.len());
    }
    records
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

/// A JSON:API listing document.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub included: Vec<Value>,
    #[serde(default)]
    pub links: Option<Links>,
}

impl Document {
    pub fn parse(body: &str) -> Result<Self, source::Error> {
        let document: Document = serde_json::from_str(body)
            .map_err(|err| source::Error::MalformedResponse(err.to_string()))?;
        if document.data.is_none() {
            return Err(source::Error::MalformedResponse(
                "document is missing the data array".to_string(),
            ));
        }
        Ok(document)
    }

    pub fn has_next(&self) -> bool {
        self.links
            .as_ref()
            .is_some_and(|links| links.next.as_ref().is_some_and(|next| !next.is_empty()))
    }

    /// Included resources of the given JSON:API `type`.
    pub fn included_of(&self, kind: &str) -> Vec<Value> {
        self.included
            .iter()
            .filter(|value| value.get("type").and_then(Value::as_str) == Some(kind))
            .cloned()
            .collect()
    }

    pub fn into_page(self) -> source::Page<Value> {
        let has_next = self.has_next();
        source::Page {
            items: self.data.unwrap_or_default(),
            has_next,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitRouteAttributes {
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitRoute {
    pub id: String,
    #[serde(default)]
    pub attributes: TransitRouteAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitShapeAttributes {
    #[serde(default)]
    pub polyline: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceId {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitShapeRelationships {
    #[serde(default)]
    pub route: Option<Relationship>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitShape {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: TransitShapeAttributes,
    #[serde(default)]
    pub relationships: TransitShapeRelationships,
}

impl TransitShape {
    pub fn route_id(&self) -> Option<&str> {
        self.relationships
            .route
            .as_ref()?
            .data
            .as_ref()
            .map(|data| data.id.as_str())
    }
}

#[test]
fn raw_feature_tolerates_bad_geometry() {
    let raw: RawFeature = serde_json::from_value(serde_json::json!({
        "geometry": { "type": "LineString", "coordinates": "nope" },
        "properties": null
    }))
    .unwrap();
    assert!(raw.geometry.is_none());
    assert!(raw.properties.is_none());
}

#[test]
fn document_requires_data() {
    assert!(matches!(
        Document::parse(r#"{"links": {}}"#),
        Err(source::Error::MalformedResponse(_))
    ));
    let document = Document::parse(r#"{"data": [], "links": {"next": "/stops?page[offset]=100"}}"#)
        .unwrap();
    assert!(document.has_next());
}
