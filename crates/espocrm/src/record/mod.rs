//! Dynamic entity records and their attribute values.
//!
//! EspoCRM entities carry caller-defined fields that are not known at
//! compile time. [`Record`] keeps the two reserved wire keys (`id`,
//! `_type`) as first-class fields and every other key in an open
//! attribute map of [`JsonValue`]s.

mod value;

pub use value::JsonValue;

use std::collections::HashMap;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{self, Serialize, SerializeMap, Serializer};

/// Reserved wire key for the record identity.
pub const ID_KEY: &str = "id";

/// Reserved wire key for the entity type tag.
pub const TYPE_KEY: &str = "_type";

/// One API entity instance with an open attribute set.
///
/// Decoding pulls the reserved keys out of the payload: `id` and `_type`
/// become the identity and entity-type fields (both optional, a JSON null
/// counts as absent) and every remaining key lands in `attributes` exactly
/// once. If the source object repeats a key, the last value wins.
///
/// Encoding emits the reserved keys only when present, followed by the
/// attributes. An attribute named `id` or `_type` would silently shadow a
/// reserved field, so serialization rejects it instead.
///
/// # Example
///
/// ```
/// use espocrm::{JsonValue, Record};
///
/// let record: Record =
///     serde_json::from_str(r#"{"id": "1", "_type": "Account", "name": "Acme"}"#).unwrap();
/// assert_eq!(record.id.as_deref(), Some("1"));
/// assert_eq!(record.entity_type.as_deref(), Some("Account"));
/// assert_eq!(record.get("name"), Some(&JsonValue::String("Acme".into())));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Record identity, if the server (or caller) assigned one.
    pub id: Option<String>,

    /// Entity type tag, if present on the wire.
    pub entity_type: Option<String>,

    /// Every non-reserved field of the record.
    pub attributes: HashMap<String, JsonValue>,
}

impl Record {
    /// Create an empty record with no identity, type, or attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attribute by name.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.attributes.get(key)
    }

    /// Insert an attribute, replacing any previous value for the key.
    ///
    /// # Errors
    ///
    /// Rejects the reserved keys; set [`Record::id`] or
    /// [`Record::entity_type`] directly instead.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Result<(), crate::error::Error> {
        let key = key.into();
        if key == ID_KEY || key == TYPE_KEY {
            return Err(crate::error::Error::Encoding(format!(
                "attribute `{key}` collides with a reserved field"
            )));
        }
        self.attributes.insert(key, value.into());
        Ok(())
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        for reserved in [ID_KEY, TYPE_KEY] {
            if self.attributes.contains_key(reserved) {
                return Err(ser::Error::custom(format!(
                    "attribute `{reserved}` collides with a reserved field"
                )));
            }
        }

        let len = usize::from(self.id.is_some())
            + usize::from(self.entity_type.is_some())
            + self.attributes.len();
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(id) = &self.id {
            map.serialize_entry(ID_KEY, id)?;
        }
        if let Some(entity_type) = &self.entity_type {
            map.serialize_entry(TYPE_KEY, entity_type)?;
        }
        for (key, value) in &self.attributes {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Decode the whole object into a keyed map first, then pop the
        // reserved keys out of it.
        let mut attributes = HashMap::<String, JsonValue>::deserialize(deserializer)?;
        let id = take_reserved_string(&mut attributes, ID_KEY).map_err(de::Error::custom)?;
        let entity_type =
            take_reserved_string(&mut attributes, TYPE_KEY).map_err(de::Error::custom)?;

        Ok(Record {
            id,
            entity_type,
            attributes,
        })
    }
}

fn take_reserved_string(
    attributes: &mut HashMap<String, JsonValue>,
    key: &str,
) -> Result<Option<String>, String> {
    match attributes.remove(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(other) => Err(format!(
            "reserved key `{key}` must be a string, got {other:?}"
        )),
    }
}
