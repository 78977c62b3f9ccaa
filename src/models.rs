use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;

use crate::error::RequesterError;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::PATCH,
        HttpMethod::DELETE,
        HttpMethod::HEAD,
        HttpMethod::OPTIONS,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    /// Methods that carry a request body
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT | HttpMethod::PATCH)
    }

    /// Case-insensitive lookup of a configured method name
    pub fn parse(s: &str) -> Result<HttpMethod, RequesterError> {
        let upper = s.trim().to_uppercase();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| RequesterError::UnsupportedMethod(s.to_string()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::PATCH => reqwest::Method::PATCH,
            HttpMethod::DELETE => reqwest::Method::DELETE,
            HttpMethod::HEAD => reqwest::Method::HEAD,
            HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
        }
    }
}

/// Header or query pairs in document order
pub type Pairs = Vec<(String, String)>;

/// Value for `key` in a pair list
pub fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Authentication attached to a resolved call
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AuthType {
    #[default]
    None,
    Basic {
        username: String,
        password: Option<String>,
    },
}

/// `basicAuth` block as written in a namespace document.
/// Both keys are optional so that `common` can supply either half.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct BasicAuth {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// One callable action as defined in a namespace document
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTemplate {
    #[serde(default)]
    pub method: Option<String>,
    pub endpoint: String,
    #[serde(default, deserialize_with = "opt_scalar")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "opt_scalar")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_scalar_pairs")]
    pub headers: Option<Pairs>,
    #[serde(default, deserialize_with = "opt_scalar_pairs")]
    pub parameters: Option<Pairs>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
    #[serde(default)]
    pub mode: Option<String>,
}

impl RequestTemplate {
    /// Whether this template is visible under the given mode
    pub fn applies_to(&self, mode: &str) -> bool {
        self.mode.as_deref().map_or(true, |m| m == mode)
    }
}

/// Defaults overlaid onto every template that lacks them
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonFields {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "opt_scalar")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "opt_scalar")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_scalar_pairs")]
    pub headers: Option<Pairs>,
    #[serde(default, deserialize_with = "opt_scalar_pairs")]
    pub parameters: Option<Pairs>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
}

/// A namespace: base URLs per mode plus the ordered set of request templates
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    #[serde(skip)]
    pub name: String,
    pub url_by_mode: BTreeMap<String, String>,
    #[serde(deserialize_with = "ordered_requests")]
    pub requests: Vec<(String, RequestTemplate)>,
    #[serde(default)]
    pub common: Option<CommonFields>,
}

impl Namespace {
    pub fn base_url(&self, mode: &str) -> Option<&str> {
        self.url_by_mode.get(mode).map(String::as_str)
    }

    pub fn request(&self, name: &str) -> Option<&RequestTemplate> {
        self.requests
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn modes(&self) -> Vec<&str> {
        self.url_by_mode.keys().map(String::as_str).collect()
    }
}

/// The concrete call handed to the dispatcher
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedCall {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: Pairs,
    pub query: Pairs,
    pub body: Option<Value>,
    pub auth: AuthType,
}

/// Response as received from the wire, before classification
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Media type without parameters, lowercased
    pub fn content_type(&self) -> Option<String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| {
                v.split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase()
            })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Classified content of an archived response
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Pdf,
    Json,
    /// Body did not parse as JSON and was stored as a string
    Other,
}

impl ContentKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ContentKind::Pdf => "pdf",
            ContentKind::Json | ContentKind::Other => "json",
        }
    }
}

/// Result of one dispatched and archived call
#[derive(Clone, Debug)]
pub struct CallOutcome {
    pub request: String,
    pub status: u16,
    pub reason: String,
    pub elapsed_ms: u64,
    pub kind: ContentKind,
    pub path: PathBuf,
    /// Set when the body was expected to be JSON but could not be decoded
    pub decode_warning: Option<String>,
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ========================
// Deserialization helpers
// ========================

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Accepts `id: 42` as well as `id: "42"`
fn opt_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

fn opt_scalar_pairs<'de, D>(deserializer: D) -> Result<Option<Pairs>, D::Error>
where
    D: Deserializer<'de>,
{
    let pairs = Option::<Ordered<Scalar>>::deserialize(deserializer)?;
    Ok(pairs.map(|o| o.0.into_iter().map(|(k, v)| (k, v.into())).collect()))
}

/// Keeps document order of `requests`, which is the menu order
fn ordered_requests<'de, D>(deserializer: D) -> Result<Vec<(String, RequestTemplate)>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Ordered::<RequestTemplate>::deserialize(deserializer)?.0)
}

/// A string-keyed mapping read in document order; repeated keys are rejected
struct Ordered<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Ordered<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = Ordered<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping with unique keys")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, V)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    if entries.iter().any(|(k, _)| *k == key) {
                        return Err(de::Error::custom(format!("duplicate key '{}'", key)));
                    }
                    entries.push((key, value));
                }
                Ok(Ordered(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}
