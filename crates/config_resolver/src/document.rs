//! Configuration document model and parsing.
//!
//! A configuration document describes one page, API or database object. It
//! is written in YAML (or TOML) and is parsed once into an immutable
//! [`ConfigDocument`]:
//!
//! ```yaml
//! urls:
//!   default: http://{env}.myapp.com
//!   prod: https://myapp.com
//! accounts:
//!   default:
//!     RegularUser:
//!       username: test
//!       password: test
//! elements:
//!   first_name:
//!     elementType: Textbox
//!     id: fname
//! include: Header, Footer
//! ```
//!
//! Scalar values are kept as strings regardless of how YAML typed them, so
//! `port: 8080` and `port: "8080"` read the same. Element attribute order is
//! preserved because it determines selector precedence.

use crate::keys::{collapse_whitespace, normalize_key};
use crate::{ConfigurationError, ConfigurationResult, DocumentName};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;

/// Name of the environment section consulted when the active environment has
/// no entry for a key.
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// Name of the `urls` entry used as a last resort template.
pub const BASE_URL_KEY: &str = "base";

/// Placeholder substituted with the active environment in default and base
/// URLs and executables.
pub const ENVIRONMENT_PLACEHOLDER: &str = "{env}";

/// Attribute naming the element type. It is metadata, never a selector.
pub const ELEMENT_TYPE_KEY: &str = "elementType";

/// On-disk format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// File extensions searched for, in preference order.
    pub const EXTENSIONS: [&'static str; 3] = ["yml", "yaml", "toml"];

    /// Determines the format from a file extension, ignoring case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "yml" | "yaml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Determines the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// What kind of object a document describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageObjectType {
    /// The document declares `urls`.
    WebPage,
    /// The document declares `executables`.
    Executable,
    /// The document declares neither, typically a reusable part.
    Unknown,
}

/// Ordered attributes of one element definition.
///
/// Attribute names are matched case-insensitively. The `elementType`
/// attribute is exposed separately through [`ElementAttributes::element_type`]
/// and is excluded from [`ElementAttributes::selectors`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementAttributes {
    entries: Vec<(String, String)>,
}

impl ElementAttributes {
    /// Builds attributes from ordered pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Looks up an attribute by name, ignoring case.
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(attribute))
            .map(|(_, value)| value.as_str())
    }

    /// The declared element type, if any.
    pub fn element_type(&self) -> Option<&str> {
        self.get(ELEMENT_TYPE_KEY)
    }

    /// All attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Selector attributes in declaration order (everything except
    /// `elementType`).
    pub fn selectors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case(ELEMENT_TYPE_KEY))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fields of one account or test data object.
pub type FieldMap = BTreeMap<String, String>;

/// A parsed, validated configuration document.
///
/// Instances are immutable. Element names are stored in normalized form
/// (see [`normalize_key`]) and test data object names with whitespace
/// collapsed to `_`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    name: DocumentName,
    urls: BTreeMap<String, String>,
    executables: BTreeMap<String, String>,
    accounts: BTreeMap<String, BTreeMap<String, FieldMap>>,
    elements: Option<BTreeMap<String, ElementAttributes>>,
    include: Vec<DocumentName>,
    testdata: BTreeMap<String, BTreeMap<String, FieldMap>>,
}

impl ConfigDocument {
    /// The logical name of the document.
    pub fn name(&self) -> &DocumentName {
        &self.name
    }

    pub fn page_object_type(&self) -> PageObjectType {
        if !self.urls.is_empty() {
            PageObjectType::WebPage
        } else if !self.executables.is_empty() {
            PageObjectType::Executable
        } else {
            PageObjectType::Unknown
        }
    }

    /// The URL declared under an exact `urls` key, without fallback.
    pub fn url(&self, key: &str) -> Option<&str> {
        self.urls.get(key).map(String::as_str)
    }

    /// The executable declared under an exact `executables` key, without
    /// fallback.
    pub fn executable(&self, key: &str) -> Option<&str> {
        self.executables.get(key).map(String::as_str)
    }

    /// The account declared in an exact environment section, without
    /// fallback.
    pub fn account(&self, environment: &str, account: &str) -> Option<&FieldMap> {
        self.accounts.get(environment)?.get(account)
    }

    /// Names of the accounts declared in an environment section.
    pub fn account_names(&self, environment: &str) -> Vec<&str> {
        self.accounts
            .get(environment)
            .map(|section| section.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// The test data object declared in an exact environment section.
    ///
    /// `object` may be given as a phrase; whitespace is collapsed to `_`
    /// before lookup.
    pub fn test_data(&self, environment: &str, object: &str) -> Option<&FieldMap> {
        self.testdata
            .get(environment)?
            .get(&collapse_whitespace(object))
    }

    /// Whether the document has an `elements` section at all.
    pub fn has_elements(&self) -> bool {
        self.elements.is_some()
    }

    /// The element declared under `name`, normalized before lookup.
    pub fn element(&self, name: &str) -> Option<&ElementAttributes> {
        self.elements.as_ref()?.get(&normalize_key(name))
    }

    /// Normalized names of all declared elements.
    pub fn element_names(&self) -> Vec<&str> {
        self.elements
            .as_ref()
            .map(|elements| elements.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Included part documents in declaration order.
    pub fn includes(&self) -> &[DocumentName] {
        &self.include
    }
}

/// Parses a configuration document.
///
/// # Errors
///
/// * `ConfigurationError::ParseError` - the text is not valid YAML/TOML or
///   does not have the document shape
/// * `ConfigurationError::InvalidDocument` - the document declares both
///   `urls` and `executables`, or two entries collide after normalization
pub fn parse_document(
    name: &DocumentName,
    text: &str,
    format: DocumentFormat,
) -> ConfigurationResult<ConfigDocument> {
    let raw: RawDocument = deserialize(name.as_str(), text, format)?;
    raw.validate(name)
}

/// Global settings document (`configurations: env -> key -> value`).
///
/// ```
/// use config_resolver::{DocumentFormat, SettingsDocument};
///
/// let settings = SettingsDocument::parse(
///     "configurations:\n  default:\n    browser: chrome\n  qa:\n    browser: firefox\n",
///     DocumentFormat::Yaml,
/// ).unwrap();
///
/// assert_eq!(settings.get("qa", "browser"), Some("firefox"));
/// assert_eq!(settings.get("prod", "browser"), Some("chrome"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsDocument {
    configurations: BTreeMap<String, BTreeMap<String, String>>,
}

impl SettingsDocument {
    /// Parses a settings document.
    pub fn parse(text: &str, format: DocumentFormat) -> ConfigurationResult<Self> {
        let raw: RawSettings = deserialize("settings", text, format)?;
        let configurations = raw
            .configurations
            .map(|sections| {
                sections
                    .0
                    .into_iter()
                    .map(|(env, values)| {
                        let values = values.0.into_iter().map(|(k, v)| (k, v.0)).collect();
                        (env, values)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self { configurations })
    }

    /// Reads and parses a settings document from disk.
    ///
    /// # Errors
    ///
    /// * `ConfigurationError::DocumentNotFound` - the file does not exist
    /// * `ConfigurationError::ReadFailed` - the file could not be read
    /// * `ConfigurationError::ParseError` - the content is invalid
    pub fn from_path(path: &Path) -> ConfigurationResult<Self> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigurationError::DocumentNotFound {
                document: display.clone(),
                searched: display.clone(),
            },
            std::io::ErrorKind::PermissionDenied => ConfigurationError::AccessDenied {
                path: display.clone(),
            },
            _ => ConfigurationError::ReadFailed {
                document: display.clone(),
                reason: e.to_string(),
            },
        })?;
        let format = DocumentFormat::from_path(path).unwrap_or(DocumentFormat::Yaml);
        Self::parse(&text, format)
    }

    /// Looks up a key in the environment section, falling back to `default`.
    pub fn get(&self, environment: &str, key: &str) -> Option<&str> {
        self.configurations
            .get(environment)
            .and_then(|section| section.get(key))
            .or_else(|| {
                self.configurations
                    .get(DEFAULT_ENVIRONMENT)
                    .and_then(|section| section.get(key))
            })
            .map(String::as_str)
    }

    /// Environment section names, including `default` when present.
    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.configurations.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}

fn deserialize<T>(document: &str, text: &str, format: DocumentFormat) -> ConfigurationResult<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if text.trim().is_empty() {
        return Ok(T::default());
    }

    let parsed = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        DocumentFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
    };

    parsed.map_err(|reason| ConfigurationError::ParseError {
        document: document.to_string(),
        reason,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    configurations: Option<Entries<Entries<Scalar>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDocument {
    urls: Option<Entries<Scalar>>,
    executables: Option<Entries<Scalar>>,
    accounts: Option<Entries<Entries<Entries<Scalar>>>>,
    elements: Option<Entries<Entries<Scalar>>>,
    include: Option<IncludeList>,
    testdata: Option<Entries<Entries<Entries<Scalar>>>>,
}

impl RawDocument {
    fn validate(self, name: &DocumentName) -> ConfigurationResult<ConfigDocument> {
        let invalid = |reason: String| ConfigurationError::InvalidDocument {
            document: name.to_string(),
            reason,
        };

        let urls = scalar_map(self.urls);
        let executables = scalar_map(self.executables);
        if !urls.is_empty() && !executables.is_empty() {
            return Err(invalid(
                "a document cannot declare both urls and executables".to_string(),
            ));
        }

        let accounts = nested_map(self.accounts, |account| account.to_string());
        let testdata = nested_map(self.testdata, collapse_whitespace);

        let elements = match self.elements {
            Some(entries) => {
                let mut elements = BTreeMap::new();
                for (element, attributes) in entries.0 {
                    let key = normalize_key(&element);
                    if key.is_empty() {
                        return Err(invalid("element names cannot be blank".to_string()));
                    }

                    let mut seen = HashSet::new();
                    for (attribute, _) in &attributes.0 {
                        if !seen.insert(attribute.to_ascii_lowercase()) {
                            return Err(invalid(format!(
                                "element '{}' declares attribute '{}' more than once",
                                element, attribute
                            )));
                        }
                    }

                    let attributes = ElementAttributes {
                        entries: attributes.0.into_iter().map(|(k, v)| (k, v.0)).collect(),
                    };
                    if elements.insert(key.clone(), attributes).is_some() {
                        return Err(invalid(format!(
                            "element '{}' collides with another element named '{}'",
                            element, key
                        )));
                    }
                }
                Some(elements)
            }
            None => None,
        };

        let mut include: Vec<DocumentName> = Vec::new();
        for part in self.include.map(|list| list.0).unwrap_or_default() {
            let part = DocumentName::from_phrase(&part)
                .map_err(|e| invalid(format!("invalid include '{}': {}", part, e)))?;
            if part == *name {
                return Err(invalid(format!("document '{}' includes itself", name)));
            }
            if !include.contains(&part) {
                include.push(part);
            }
        }

        Ok(ConfigDocument {
            name: name.clone(),
            urls,
            executables,
            accounts,
            elements,
            include,
            testdata,
        })
    }
}

fn scalar_map(section: Option<Entries<Scalar>>) -> BTreeMap<String, String> {
    section
        .map(|entries| entries.0.into_iter().map(|(k, v)| (k, v.0)).collect())
        .unwrap_or_default()
}

fn nested_map(
    section: Option<Entries<Entries<Entries<Scalar>>>>,
    object_key: impl Fn(&str) -> String,
) -> BTreeMap<String, BTreeMap<String, FieldMap>> {
    section
        .map(|environments| {
            environments
                .0
                .into_iter()
                .map(|(env, objects)| {
                    let objects = objects
                        .0
                        .into_iter()
                        .map(|(object, fields)| (object_key(&object), scalar_map(Some(fields))))
                        .collect();
                    (env, objects)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// A scalar read leniently as a string. Null reads as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Scalar(String);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Scalar, E> {
                Ok(Scalar(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Scalar, E> {
                Ok(Scalar::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<Scalar, E> {
                Ok(Scalar::default())
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

/// A mapping read into declaration order. Null reads as an empty mapping.
#[derive(Debug)]
struct Entries<V>(Vec<(String, V)>);

impl<V> Default for Entries<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V> Deserialize<'de> for Entries<V>
where
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<V> {
            marker: PhantomData<V>,
        }

        impl<'de, V> Visitor<'de> for EntriesVisitor<V>
        where
            V: Deserialize<'de>,
        {
            type Value = Entries<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Entries<V>, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<Scalar, V>()? {
                    entries.push((key.0, value));
                }
                Ok(Entries(entries))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Entries<V>, E> {
                Ok(Entries::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<Entries<V>, E> {
                Ok(Entries::default())
            }
        }

        deserializer.deserialize_any(EntriesVisitor {
            marker: PhantomData,
        })
    }
}

/// `include` as either a sequence of names or a comma-separated string.
#[derive(Debug, Default)]
struct IncludeList(Vec<String>);

impl<'de> Deserialize<'de> for IncludeList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IncludeVisitor;

        impl<'de> Visitor<'de> for IncludeVisitor {
            type Value = IncludeList;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a list of document names or a comma-separated string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<IncludeList, E> {
                Ok(IncludeList(
                    v.split(',')
                        .map(str::trim)
                        .filter(|part| !part.is_empty())
                        .map(str::to_string)
                        .collect(),
                ))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<IncludeList, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut parts = Vec::new();
                while let Some(part) = seq.next_element::<Scalar>()? {
                    let part = part.0.trim().to_string();
                    if !part.is_empty() {
                        parts.push(part);
                    }
                }
                Ok(IncludeList(parts))
            }

            fn visit_unit<E: de::Error>(self) -> Result<IncludeList, E> {
                Ok(IncludeList::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<IncludeList, E> {
                Ok(IncludeList::default())
            }
        }

        deserializer.deserialize_any(IncludeVisitor)
    }
}
