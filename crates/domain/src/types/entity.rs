//! Generic Para object
//!
//! An [`Entity`] is an ordered, string-keyed bag of JSON values. A fixed set
//! of reserved fields is always present, so a serialised entity carries every
//! system property next to the caller's own data in one flat object.

use std::collections::BTreeSet;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::constants::DEFAULT_TYPE;

/// Keys backed by the typed accessors of [`Entity`]
pub const RESERVED_FIELDS: [&str; 14] = [
    "id",
    "timestamp",
    "type",
    "appid",
    "parentid",
    "creatorid",
    "updated",
    "name",
    "tags",
    "votes",
    "version",
    "stored",
    "indexed",
    "cached",
];

/// Generic domain object sent to and returned by the server
///
/// Reserved fields have typed accessors; everything else is reached through
/// [`Entity::get`] and [`Entity::set`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    fields: Map<String, Value>,
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity {
    /// Create an entity of the default type with no id
    pub fn new() -> Self {
        let mut fields = Map::new();
        for key in RESERVED_FIELDS {
            fields.insert(key.to_string(), reserved_default(key));
        }
        Self { fields }
    }

    /// Create an entity of the given type with no id
    pub fn with_type(type_name: impl Into<String>) -> Self {
        let mut entity = Self::new();
        entity.set_type(type_name);
        entity
    }

    /// Create an entity with an id and a type
    pub fn with_id(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        let mut entity = Self::with_type(type_name);
        entity.set_id(id);
        entity
    }

    /// Materialise an entity from a decoded JSON object
    ///
    /// Any subset of fields is accepted. Reserved fields missing from `fields`
    /// keep their defaults; unknown keys are retained as opaque data.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let mut entity = Self::new();
        entity.merge(fields);
        entity
    }

    /// Copy every key of `fields` into this entity, overwriting existing values
    pub fn merge(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.fields.insert(key, value);
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Flat JSON object with reserved and opaque fields together
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    /// Set any field, returning the previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Remove an opaque field
    ///
    /// Reserved fields cannot be removed; they are reset to their default.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if RESERVED_FIELDS.contains(&key) {
            return self.fields.insert(key.to_string(), reserved_default(key));
        }
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterator over the keys that are not reserved
    pub fn opaque_keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str).filter(|key| !RESERVED_FIELDS.contains(key))
    }

    // ------------------------------------------------------------------
    // Reserved fields
    // ------------------------------------------------------------------

    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.fields.insert("id".into(), Value::String(id.into()));
    }

    pub fn clear_id(&mut self) {
        self.fields.insert("id".into(), Value::Null);
    }

    /// Object type, falling back to `sysprop` when unset
    pub fn type_name(&self) -> &str {
        self.str_field("type").filter(|t| !t.is_empty()).unwrap_or(DEFAULT_TYPE)
    }

    pub fn set_type(&mut self, type_name: impl Into<String>) {
        self.fields.insert("type".into(), Value::String(type_name.into()));
    }

    /// Creation time in milliseconds since the epoch
    pub fn timestamp(&self) -> Option<i64> {
        self.int_field("timestamp")
    }

    pub fn set_timestamp(&mut self, millis: i64) {
        self.fields.insert("timestamp".into(), Value::from(millis));
    }

    pub fn appid(&self) -> Option<&str> {
        self.str_field("appid")
    }

    pub fn set_appid(&mut self, appid: impl Into<String>) {
        self.fields.insert("appid".into(), Value::String(appid.into()));
    }

    pub fn parentid(&self) -> Option<&str> {
        self.str_field("parentid")
    }

    pub fn set_parentid(&mut self, parentid: impl Into<String>) {
        self.fields.insert("parentid".into(), Value::String(parentid.into()));
    }

    pub fn creatorid(&self) -> Option<&str> {
        self.str_field("creatorid")
    }

    pub fn set_creatorid(&mut self, creatorid: impl Into<String>) {
        self.fields.insert("creatorid".into(), Value::String(creatorid.into()));
    }

    /// Last update time in milliseconds since the epoch
    pub fn updated(&self) -> Option<i64> {
        self.int_field("updated")
    }

    pub fn set_updated(&mut self, millis: i64) {
        self.fields.insert("updated".into(), Value::from(millis));
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.fields.insert("name".into(), Value::String(name.into()));
    }

    /// Tags as a set; non-string elements are ignored
    pub fn tags(&self) -> BTreeSet<String> {
        self.fields
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Replace all tags; duplicates and empty strings are dropped
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> =
            tags.into_iter().map(Into::into).filter(|tag| !tag.is_empty()).collect();
        self.fields
            .insert("tags".into(), Value::Array(set.into_iter().map(Value::String).collect()));
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let mut tags = self.tags();
        tags.insert(tag.into());
        self.set_tags(tags);
    }

    pub fn votes(&self) -> i64 {
        self.int_field("votes").unwrap_or(0)
    }

    pub fn set_votes(&mut self, votes: i64) {
        self.fields.insert("votes".into(), Value::from(votes));
    }

    pub fn version(&self) -> i64 {
        self.int_field("version").unwrap_or(0)
    }

    pub fn set_version(&mut self, version: i64) {
        self.fields.insert("version".into(), Value::from(version));
    }

    /// Whether the object is persisted in the database
    pub fn stored(&self) -> bool {
        self.bool_field("stored")
    }

    pub fn set_stored(&mut self, stored: bool) {
        self.fields.insert("stored".into(), Value::Bool(stored));
    }

    /// Whether the object is indexed by the search engine
    pub fn indexed(&self) -> bool {
        self.bool_field("indexed")
    }

    pub fn set_indexed(&mut self, indexed: bool) {
        self.fields.insert("indexed".into(), Value::Bool(indexed));
    }

    /// Whether the object is cached on create and update
    pub fn cached(&self) -> bool {
        self.bool_field("cached")
    }

    pub fn set_cached(&mut self, cached: bool) {
        self.fields.insert("cached".into(), Value::Bool(cached));
    }

    /// Resource URI of this object, e.g. `/dog/d1`
    ///
    /// Type and id are percent-encoded. Without an id only the type segment
    /// is returned.
    pub fn object_uri(&self) -> String {
        let type_segment = format!("/{}", urlencoding::encode(self.type_name()));
        match self.id().filter(|id| !id.is_empty()) {
            Some(id) => format!("{type_segment}/{}", urlencoding::encode(id)),
            None => type_segment,
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    fn int_field(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(|value| {
            value.as_i64().or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        })
    }

    fn bool_field(&self, key: &str) -> bool {
        self.fields.get(key).and_then(Value::as_bool).unwrap_or(true)
    }
}

fn reserved_default(key: &str) -> Value {
    match key {
        "type" => Value::String(DEFAULT_TYPE.to_string()),
        "timestamp" => Value::from(Utc::now().timestamp_millis()),
        "tags" => Value::Array(Vec::new()),
        "votes" | "version" => Value::from(0),
        "stored" | "indexed" | "cached" => Value::Bool(true),
        _ => Value::Null,
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_fields(fields)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Value::Object(entity.fields)
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Entity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::from_fields)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_entity_has_reserved_defaults() {
        let entity = Entity::new();
        assert_eq!(entity.id(), None);
        assert_eq!(entity.type_name(), "sysprop");
        assert!(entity.timestamp().is_some());
        assert_eq!(entity.votes(), 0);
        assert_eq!(entity.version(), 0);
        assert!(entity.stored() && entity.indexed() && entity.cached());
        assert!(entity.tags().is_empty());

        for key in RESERVED_FIELDS {
            assert!(entity.fields().contains_key(key), "missing reserved field {key}");
        }
    }

    #[test]
    fn test_serialization_is_flat() {
        let mut entity = Entity::with_type("dog");
        entity.set("foo", "bark");
        entity.set_tags(["b", "a", "a", ""]);

        let value = serde_json::to_value(&entity).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["type"], "dog");
        assert_eq!(object["foo"], "bark");
        assert_eq!(object["tags"], json!(["a", "b"]));
        assert_eq!(object.len(), RESERVED_FIELDS.len() + 1);
    }

    #[test]
    fn test_deserialize_accepts_any_subset() {
        let entity: Entity = serde_json::from_value(json!({"id": "d1", "foo": "bark"})).unwrap();
        assert_eq!(entity.id(), Some("d1"));
        assert_eq!(entity.type_name(), "sysprop");
        assert_eq!(entity.get("foo"), Some(&json!("bark")));
        assert_eq!(entity.opaque_keys().collect::<Vec<_>>(), vec!["foo"]);

        let empty: Entity = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.id(), None);

        assert!(serde_json::from_value::<Entity>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_reserved_fields_are_reset_not_removed() {
        let mut entity = Entity::with_id("1", "cat");
        entity.set_votes(5);
        entity.set("color", "black");

        assert_eq!(entity.remove("votes"), Some(json!(5)));
        assert_eq!(entity.votes(), 0);
        assert!(entity.fields().contains_key("votes"));

        assert_eq!(entity.remove("color"), Some(json!("black")));
        assert!(!entity.fields().contains_key("color"));
    }

    #[test]
    fn test_object_uri() {
        assert_eq!(Entity::with_type("dog").object_uri(), "/dog");
        assert_eq!(Entity::with_id("d1", "dog").object_uri(), "/dog/d1");
        assert_eq!(Entity::with_id("a b", "my type").object_uri(), "/my%20type/a%20b");
    }

    #[test]
    fn test_numeric_strings_are_read_as_integers() {
        let entity = Entity::from_fields(
            json!({"timestamp": "1700000000000", "votes": 3}).as_object().unwrap().clone(),
        );
        assert_eq!(entity.timestamp(), Some(1_700_000_000_000));
        assert_eq!(entity.votes(), 3);
    }
}
