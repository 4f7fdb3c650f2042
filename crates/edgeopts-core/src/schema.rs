//! Schema model for service options
//!
//! A service publishes its options as a list of [`OptionDescriptor`]s. Dynamic
//! descriptors carry a [`PropertyDescriptor`] naming the option key and the
//! shape of its value. Standard descriptors carry no property; their option
//! key comes from [`standard_option_key`].
//!
//! ## Wire Format
//!
//! ```json
//! [
//!   { "id": "1", "name": "Reverse Proxy", "kind": "standard", "readOnly": false },
//!   {
//!     "id": "7", "name": "Max Age", "kind": "dynamic", "group": "Caching",
//!     "property": { "name": "maxAge", "type": "integer", "minValue": 0, "maxValue": 86400 }
//!   }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Display names of standard options and the option keys they map to
const STANDARD_OPTION_KEYS: &[(&str, &str)] = &[
    ("Reverse Proxy", "reverseProxy"),
    ("ProtectServe", "protectServeKeyEnabled"),
    ("CORS Override", "cors"),
    ("Expiry Overrides", "expiryHeaders"),
    ("Referrer Blocking", "referrerBlocking"),
    ("Auto HTTPS Redirect", "autoRedirect"),
];

/// Map a standard option's display name to its key in the options map
///
/// Unrecognized names map to themselves.
pub fn standard_option_key(display_name: &str) -> &str {
    STANDARD_OPTION_KEYS
        .iter()
        .find(|(name, _)| *name == display_name)
        .map(|(_, key)| *key)
        .unwrap_or(display_name)
}

/// Whether an option is fixed by name or declared by the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Fixed, code-known option validated by structural rules
    Standard,
    /// Option whose key and value shape come from its property descriptor
    Dynamic,
}

/// Declared type of a dynamic option's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyType {
    Boolean,
    Integer,
    String,
    Enum,
    Bitfield,
    #[serde(alias = "string_list")]
    StringList,
}

impl PropertyType {
    /// Name used in messages and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Boolean => "boolean",
            PropertyType::Integer => "integer",
            PropertyType::String => "string",
            PropertyType::Enum => "enum",
            PropertyType::Bitfield => "bitfield",
            PropertyType::StringList => "stringList",
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named bit of a bitfield option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitField {
    /// Bit position
    pub bit: u32,
    /// Key used in the option's object value
    pub key: String,
}

/// Shape of a dynamic option's value
///
/// Constraint fields are only consulted when `property_type` matches them;
/// `min_value` on a string property is ignored, not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    /// Key of the option in the options map
    pub name: String,

    /// Declared value type
    #[serde(rename = "type")]
    pub property_type: PropertyType,

    /// Inclusive lower bound (integer only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,

    /// Inclusive upper bound (integer only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,

    /// Allowed values in declaration order (enum only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,

    /// Declared bits (bitfield only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bit_fields: Vec<BitField>,
}

impl PropertyDescriptor {
    /// Create a property with no constraints
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            min_value: None,
            max_value: None,
            enum_values: Vec::new(),
            bit_fields: Vec::new(),
        }
    }

    /// Set integer bounds
    pub fn with_range(mut self, min_value: Option<i64>, max_value: Option<i64>) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    /// Set allowed enum values
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set declared bit fields
    pub fn with_bit_fields(mut self, bit_fields: Vec<BitField>) -> Self {
        self.bit_fields = bit_fields;
        self
    }
}

/// One entry in a service's options metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDescriptor {
    /// Descriptor ID
    #[serde(default)]
    pub id: String,

    /// Human display name, e.g. "Reverse Proxy"
    pub name: String,

    /// Standard or dynamic
    pub kind: OptionKind,

    /// Read-only options cannot be set by callers
    #[serde(default)]
    pub read_only: bool,

    /// Free-form grouping, used for reporting only
    #[serde(default)]
    pub group: String,

    /// Free-form scope, used for reporting only
    #[serde(default)]
    pub scope: String,

    /// Value shape; present only for dynamic options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyDescriptor>,
}

impl OptionDescriptor {
    /// Create a standard descriptor
    pub fn standard(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: OptionKind::Standard,
            read_only: false,
            group: String::new(),
            scope: String::new(),
            property: None,
        }
    }

    /// Create a dynamic descriptor
    pub fn dynamic(
        id: impl Into<String>,
        name: impl Into<String>,
        property: PropertyDescriptor,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: OptionKind::Dynamic,
            read_only: false,
            group: String::new(),
            scope: String::new(),
            property: Some(property),
        }
    }

    /// Mark as read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Set the reporting group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Set the reporting scope
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Key this option uses in the options map
    ///
    /// `None` for a dynamic descriptor that is missing its property.
    pub fn option_key(&self) -> Option<&str> {
        match self.kind {
            OptionKind::Dynamic => self.property.as_ref().map(|p| p.name.as_str()),
            OptionKind::Standard => Some(standard_option_key(&self.name)),
        }
    }
}

/// An options-map key resolved against a [`SchemaDocument`]
#[derive(Debug, Clone, Copy)]
pub enum ResolvedOption<'a> {
    /// Declared by the schema; validated against `property`
    Dynamic {
        descriptor: &'a OptionDescriptor,
        property: &'a PropertyDescriptor,
    },
    /// Fixed-name option; validated by structural rules keyed on `key`
    Standard {
        descriptor: &'a OptionDescriptor,
        key: &'a str,
    },
}

impl<'a> ResolvedOption<'a> {
    /// The descriptor the key resolved to
    pub fn descriptor(&self) -> &'a OptionDescriptor {
        match self {
            ResolvedOption::Dynamic { descriptor, .. } => descriptor,
            ResolvedOption::Standard { descriptor, .. } => descriptor,
        }
    }
}

/// The options metadata for one service, indexed by option key
///
/// Built per call and dropped afterwards; never cached.
#[derive(Debug, Clone, Default)]
pub struct SchemaDocument {
    descriptors: Vec<OptionDescriptor>,
    dynamic_index: HashMap<String, usize>,
    standard_index: HashMap<String, usize>,
}

impl SchemaDocument {
    /// Index a list of descriptors
    ///
    /// Dynamic descriptors are keyed by property name, standard descriptors by
    /// their mapped display name. A dynamic descriptor without a property
    /// cannot be keyed and is left out of both indexes.
    pub fn from_descriptors(descriptors: Vec<OptionDescriptor>) -> Self {
        let mut dynamic_index = HashMap::new();
        let mut standard_index = HashMap::new();

        for (position, descriptor) in descriptors.iter().enumerate() {
            match (descriptor.kind, &descriptor.property) {
                (OptionKind::Dynamic, Some(property)) => {
                    dynamic_index.insert(property.name.clone(), position);
                }
                (OptionKind::Dynamic, None) => {
                    tracing::warn!(
                        "Skipping dynamic option '{}' (id: {}): no property descriptor",
                        descriptor.name,
                        descriptor.id
                    );
                }
                (OptionKind::Standard, _) => {
                    let key = standard_option_key(&descriptor.name).to_string();
                    standard_index.insert(key, position);
                }
            }
        }

        Self {
            descriptors,
            dynamic_index,
            standard_index,
        }
    }

    /// All descriptors in document order, including unindexed ones
    pub fn descriptors(&self) -> &[OptionDescriptor] {
        &self.descriptors
    }

    /// Look up a dynamic option by property name
    pub fn dynamic(&self, key: &str) -> Option<&OptionDescriptor> {
        self.dynamic_index.get(key).map(|&i| &self.descriptors[i])
    }

    /// Look up a standard option by mapped name
    pub fn standard(&self, key: &str) -> Option<&OptionDescriptor> {
        self.standard_index.get(key).map(|&i| &self.descriptors[i])
    }

    /// Resolve an options-map key, dynamic index first
    pub fn resolve(&self, key: &str) -> Option<ResolvedOption<'_>> {
        if let Some(descriptor) = self.dynamic(key)
            && let Some(property) = descriptor.property.as_ref()
        {
            return Some(ResolvedOption::Dynamic {
                descriptor,
                property,
            });
        }

        self.standard_index.get_key_value(key).map(|(key, &i)| {
            ResolvedOption::Standard {
                descriptor: &self.descriptors[i],
                key: key.as_str(),
            }
        })
    }

    /// Number of dynamic options indexed
    pub fn dynamic_len(&self) -> usize {
        self.dynamic_index.len()
    }

    /// Number of standard options indexed
    pub fn standard_len(&self) -> usize {
        self.standard_index.len()
    }

    /// Whether the document has no descriptors
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors grouped by their `group` field, for reporting
    pub fn grouped(&self) -> BTreeMap<&str, Vec<&OptionDescriptor>> {
        let mut groups: BTreeMap<&str, Vec<&OptionDescriptor>> = BTreeMap::new();
        for descriptor in &self.descriptors {
            groups
                .entry(descriptor.group.as_str())
                .or_default()
                .push(descriptor);
        }
        groups
    }
}
