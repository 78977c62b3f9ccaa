//! Request resolution - turns a named template into a concrete call
//!
//! Resolution runs in a fixed order: mode filter, common overlay, URL
//! composition, auth, then body attachment by method. The result is checked
//! against what the HTTP client accepts before anything is sent.

use reqwest::header::{HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::{RequesterError, Result};
use crate::models::{
    AuthType, BasicAuth, CommonFields, HttpMethod, Namespace, Pairs, RequestTemplate, ResolvedCall,
};

/// Method used when neither the template nor `common` names one
pub const DEFAULT_METHOD: HttpMethod = HttpMethod::POST;

/// Templates visible under `mode`, in document order
pub fn menu<'a>(namespace: &'a Namespace, mode: &str) -> Vec<(&'a str, &'a RequestTemplate)> {
    namespace
        .requests
        .iter()
        .filter(|(_, template)| template.applies_to(mode))
        .map(|(name, template)| (name.as_str(), template))
        .collect()
}

/// Build the call for `name` under `mode`
pub fn resolve(namespace: &Namespace, mode: &str, name: &str) -> Result<ResolvedCall> {
    let base = namespace
        .base_url(mode)
        .ok_or_else(|| mode_unsupported(namespace, mode))?;

    let template = menu(namespace, mode)
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, t)| t)
        .ok_or_else(|| RequesterError::RequestNotFound(name.to_string()))?;

    let merged = match &namespace.common {
        Some(common) => overlay(template, common),
        None => template.clone(),
    };

    let method = match merged.method.as_deref() {
        Some(m) => HttpMethod::parse(m)?,
        None => DEFAULT_METHOD,
    };

    let url = compose_url(base, &merged.endpoint, merged.action.as_deref(), merged.id.as_deref());

    let auth = match merged.basic_auth {
        Some(BasicAuth { username, password }) => AuthType::Basic {
            username: username.unwrap_or_default(),
            password,
        },
        None => AuthType::None,
    };

    let body = if method.has_body() { merged.body } else { None };

    let call = ResolvedCall {
        name: name.to_string(),
        method,
        url,
        headers: merged.headers.unwrap_or_default(),
        query: merged.parameters.unwrap_or_default(),
        body,
        auth,
    };
    validate(&call)?;

    tracing::debug!(request = name, %method, url = %call.url, "Resolved request");
    Ok(call)
}

/// Reject calls the client could only fail to build
fn validate(call: &ResolvedCall) -> Result<()> {
    let invalid = |message: String| RequesterError::InvalidRequest {
        request: call.name.clone(),
        message,
    };

    let url = reqwest::Url::parse(&call.url).map_err(|e| invalid(format!("URL '{}': {}", call.url, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("URL '{}': scheme must be http or https", call.url)));
    }

    for (key, value) in &call.headers {
        HeaderName::from_bytes(key.as_bytes()).map_err(|_| invalid(format!("invalid header name '{}'", key)))?;
        HeaderValue::from_str(value).map_err(|_| invalid(format!("invalid value for header '{}'", key)))?;
    }
    Ok(())
}

/// Fail early when the active mode has no base URL
pub fn check_mode(namespace: &Namespace, mode: &str) -> Result<()> {
    namespace
        .base_url(mode)
        .map(|_| ())
        .ok_or_else(|| mode_unsupported(namespace, mode))
}

fn mode_unsupported(namespace: &Namespace, mode: &str) -> RequesterError {
    RequesterError::ModeUnsupported {
        mode: mode.to_string(),
        namespace: namespace.name.clone(),
        available: namespace.modes().join(", "),
    }
}

/// Apply `common` defaults to a template. Template values win; mapping values
/// are merged key by key with template keys winning.
pub fn overlay(template: &RequestTemplate, common: &CommonFields) -> RequestTemplate {
    let t = template.clone();
    RequestTemplate {
        method: t.method.or_else(|| common.method.clone()),
        endpoint: t.endpoint,
        action: t.action.or_else(|| common.action.clone()),
        id: t.id.or_else(|| common.id.clone()),
        headers: merge_maps(t.headers, common.headers.as_ref()),
        parameters: merge_maps(t.parameters, common.parameters.as_ref()),
        body: merge_body(t.body, common.body.as_ref()),
        basic_auth: match (t.basic_auth, &common.basic_auth) {
            (Some(own), Some(default)) => Some(BasicAuth {
                username: own.username.or_else(|| default.username.clone()),
                password: own.password.or_else(|| default.password.clone()),
            }),
            (own, default) => own.or_else(|| default.clone()),
        },
        mode: t.mode,
    }
}

/// Template pairs first in their own order, then defaults the template lacks
fn merge_maps(own: Option<Pairs>, defaults: Option<&Pairs>) -> Option<Pairs> {
    match (own, defaults) {
        (Some(mut own), Some(defaults)) => {
            for (key, value) in defaults {
                if !own.iter().any(|(k, _)| k == key) {
                    own.push((key.clone(), value.clone()));
                }
            }
            Some(own)
        }
        (own, defaults) => own.or_else(|| defaults.cloned()),
    }
}

fn merge_body(own: Option<Value>, defaults: Option<&Value>) -> Option<Value> {
    match (own, defaults) {
        (Some(own), Some(defaults)) => Some(merge_json(own, defaults)),
        (own, defaults) => own.or_else(|| defaults.cloned()),
    }
}

/// Object bodies merge recursively so nested blocks (e.g. `data.ApiKey`) pick up
/// defaults; any non-object value on the template side is kept as is.
fn merge_json(own: Value, defaults: &Value) -> Value {
    match (own, defaults) {
        (Value::Object(mut own), Value::Object(defaults)) => {
            for (key, default) in defaults {
                let merged = match own.remove(key) {
                    Some(value) => merge_json(value, default),
                    None => default.clone(),
                };
                own.insert(key.clone(), merged);
            }
            Value::Object(own)
        }
        (own, _) => own,
    }
}

/// `base/endpoint[/action][/id]`, slashes at the joins collapsed to one
pub fn compose_url(base: &str, endpoint: &str, action: Option<&str>, id: Option<&str>) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in std::iter::once(endpoint).chain(action).chain(id) {
        url.push('/');
        url.push_str(segment.trim_matches('/'));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lookup;
    use serde_json::json;

    fn namespace(doc: &str) -> Namespace {
        let mut ns: Namespace = serde_yaml::from_str(doc).unwrap();
        ns.name = "test".into();
        ns
    }

    const DOC: &str = r#"
urlByMode:
  PROD: https://api.example.com
  LOCAL: http://localhost:8080/
common:
  headers:
    A: "1"
    B: "2"
  parameters:
    _tracy_skip_error: "1"
  body:
    data:
      ApiKey: secret
      ResellerId: 10
  basicAuth:
    username: svc
    password: pw
requests:
  list_users:
    method: GET
    endpoint: users
    headers:
      B: "9"
    body:
      ignored: true
  activate:
    method: post
    endpoint: users
    action: activate
    id: 42
    body:
      data:
        ResellerId: 99
        Note: hi
  purge:
    method: DELETE
    endpoint: cache
    mode: LOCAL
  legacy:
    endpoint: old
  weird:
    method: TRACE
    endpoint: x
"#;

    #[test]
    fn test_mode_scoped_template_invisible_elsewhere() {
        let ns = namespace(DOC);
        let names: Vec<&str> = menu(&ns, "PROD").into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["list_users", "activate", "legacy", "weird"]);

        assert!(matches!(
            resolve(&ns, "PROD", "purge"),
            Err(RequesterError::RequestNotFound(n)) if n == "purge"
        ));
        let call = resolve(&ns, "LOCAL", "purge").unwrap();
        assert_eq!(call.url, "http://localhost:8080/cache");
    }

    #[test]
    fn test_header_subkeys_template_wins() {
        let ns = namespace(DOC);
        let call = resolve(&ns, "PROD", "list_users").unwrap();
        assert_eq!(lookup(&call.headers, "A"), Some("1"));
        assert_eq!(lookup(&call.headers, "B"), Some("9"));
        assert_eq!(lookup(&call.query, "_tracy_skip_error"), Some("1"));
        // template order first, then defaults it lacked
        let names: Vec<&str> = call.headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_url_order_and_body_merge() {
        let ns = namespace(DOC);
        let call = resolve(&ns, "PROD", "activate").unwrap();
        assert_eq!(call.method, HttpMethod::POST);
        assert_eq!(call.url, "https://api.example.com/users/activate/42");
        assert_eq!(
            call.body,
            Some(json!({"data": {"ApiKey": "secret", "ResellerId": 99, "Note": "hi"}}))
        );
        assert_eq!(
            call.auth,
            AuthType::Basic {
                username: "svc".into(),
                password: Some("pw".into())
            }
        );
    }

    #[test]
    fn test_body_only_for_body_methods() {
        let ns = namespace(DOC);
        // GET template defines a body; it must not be sent
        assert_eq!(resolve(&ns, "PROD", "list_users").unwrap().body, None);

        for method in HttpMethod::ALL {
            let doc = format!(
                "urlByMode: {{DEV: 'http://h'}}\nrequests:\n  r:\n    method: {}\n    endpoint: e\n    body: {{k: v}}\n",
                method
            );
            let call = resolve(&namespace(&doc), "DEV", "r").unwrap();
            assert_eq!(call.body.is_some(), method.has_body(), "{}", method);
        }
    }

    #[test]
    fn test_default_and_unsupported_method() {
        let ns = namespace(DOC);
        assert_eq!(resolve(&ns, "PROD", "legacy").unwrap().method, DEFAULT_METHOD);
        assert!(matches!(
            resolve(&ns, "PROD", "weird"),
            Err(RequesterError::UnsupportedMethod(m)) if m == "TRACE"
        ));
    }

    #[test]
    fn test_unknown_mode() {
        let ns = namespace(DOC);
        let err = resolve(&ns, "DEV", "list_users").unwrap_err();
        assert!(matches!(err, RequesterError::ModeUnsupported { .. }));
        assert!(check_mode(&ns, "PROD").is_ok());
        assert!(check_mode(&ns, "prod").is_err());
    }

    #[test]
    fn test_overlay_idempotent_when_template_complete() {
        let common = CommonFields {
            method: Some("GET".into()),
            headers: Some(vec![("A".to_string(), "1".to_string())]),
            body: Some(json!({"x": 1})),
            ..CommonFields::default()
        };
        let template = RequestTemplate {
            method: Some("PUT".into()),
            endpoint: "things".into(),
            headers: Some(vec![
                ("Z".to_string(), "0".to_string()),
                ("A".to_string(), "7".to_string()),
            ]),
            body: Some(json!({"x": 2, "y": [1]})),
            ..RequestTemplate::default()
        };
        assert_eq!(overlay(&template, &common), template);
        assert_eq!(overlay(&overlay(&template, &common), &common), template);
    }

    #[test]
    fn test_unsendable_call_rejected_before_dispatch() {
        let bad_base = namespace("urlByMode: {DEV: not-a-url}\nrequests:\n  r:\n    endpoint: e\n");
        assert!(matches!(
            resolve(&bad_base, "DEV", "r"),
            Err(RequesterError::InvalidRequest { request, message }) if request == "r" && message.contains("not-a-url")
        ));

        let ftp = namespace("urlByMode: {DEV: 'ftp://files'}\nrequests:\n  r:\n    endpoint: e\n");
        assert!(matches!(resolve(&ftp, "DEV", "r"), Err(RequesterError::InvalidRequest { .. })));

        let bad_header = namespace(
            "urlByMode: {DEV: 'http://h'}\ncommon:\n  headers:\n    Bad Header: v\nrequests:\n  r:\n    endpoint: e\n",
        );
        let err = resolve(&bad_header, "DEV", "r").unwrap_err();
        assert!(err.to_string().contains("invalid header name 'Bad Header'"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_compose_url() {
        assert_eq!(compose_url("http://h/", "/a/", None, None), "http://h/a");
        assert_eq!(compose_url("http://h", "a", None, Some("1")), "http://h/a/1");
        assert_eq!(compose_url("http://h", "a", Some("b"), None), "http://h/a/b");
    }
}
