//! Attachment descriptors
//!
//! Backends have handed attachments over in several shapes: an object with a
//! `url`, a cloud upload with a `secure_url`, a bare URL string, or an object
//! carrying a filesystem `path` on the upload server. They are decoded into one
//! tagged [`Attachment`] and resolved to a displayable URL by a pure function.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

/// An attachment in one of the recognized shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// Object with an explicit `url`
    Direct { url: String },
    /// Cloud upload with a `secure_url`
    Cloud { secure_url: String },
    /// String that already looks like a URL
    Plain(String),
    /// Object with a server-side `path`
    Stored { path: String },
    /// Anything else, kept verbatim
    Unrecognized(Value),
}

impl Attachment {
    /// Resolve to a displayable URL.
    ///
    /// `None` means "omit this attachment", never an error.
    pub fn resolve(&self, uploads_base: &str) -> Option<String> {
        match self {
            Attachment::Direct { url } => Some(url.clone()),
            Attachment::Cloud { secure_url } => Some(secure_url.clone()),
            Attachment::Plain(url) => Some(url.clone()),
            Attachment::Stored { path } => {
                if path.starts_with("http") {
                    return Some(path.clone());
                }
                let filename = path.rsplit(['/', '\\']).next().unwrap_or(path);
                if filename.is_empty() {
                    return None;
                }
                Some(format!("{}/{}", uploads_base.trim_end_matches('/'), filename))
            }
            Attachment::Unrecognized(_) => None,
        }
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) if s.starts_with("http") => Attachment::Plain(s),
            Value::Object(map) => {
                let field = |key: &str| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                };
                if let Some(url) = field("url") {
                    Attachment::Direct { url }
                } else if let Some(secure_url) = field("secure_url") {
                    Attachment::Cloud { secure_url }
                } else if let Some(path) = field("path") {
                    Attachment::Stored { path }
                } else {
                    Attachment::Unrecognized(Value::Object(map))
                }
            }
            other => Attachment::Unrecognized(other),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Attachment::Direct { url } => json!({ "url": url }),
            Attachment::Cloud { secure_url } => json!({ "secure_url": secure_url }),
            Attachment::Plain(url) => Value::String(url.clone()),
            Attachment::Stored { path } => json!({ "path": path }),
            Attachment::Unrecognized(raw) => raw.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Attachment::from_value)
    }
}

impl Serialize for Attachment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8000/uploads/blotter";

    fn decode(json: &str) -> Attachment {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_each_shape_resolves() {
        assert_eq!(
            decode(r#"{"url": "https://cdn.example/a.jpg"}"#).resolve(BASE),
            Some("https://cdn.example/a.jpg".to_string())
        );
        assert_eq!(
            decode(r#"{"secure_url": "https://res.cloudinary.com/b.png"}"#).resolve(BASE),
            Some("https://res.cloudinary.com/b.png".to_string())
        );
        assert_eq!(
            decode(r#""http://example.org/c.pdf""#).resolve(BASE),
            Some("http://example.org/c.pdf".to_string())
        );
        assert_eq!(
            decode(r#"{"path": "uploads/blotter/1714-d.jpg"}"#).resolve(BASE),
            Some(format!("{}/1714-d.jpg", BASE))
        );
    }

    #[test]
    fn test_priority_order() {
        let att = decode(
            r#"{"path": "x/y.jpg", "secure_url": "https://s/y.jpg", "url": "https://u/y.jpg"}"#,
        );
        assert_eq!(att.resolve(BASE), Some("https://u/y.jpg".to_string()));

        let att = decode(r#"{"path": "x/y.jpg", "secure_url": "https://s/y.jpg"}"#);
        assert_eq!(att.resolve(BASE), Some("https://s/y.jpg".to_string()));
    }

    #[test]
    fn test_windows_path_and_absolute_path() {
        let att = decode(r#"{"path": "C:\\srv\\uploads\\blotter\\e.png"}"#);
        assert_eq!(att.resolve(BASE), Some(format!("{}/e.png", BASE)));

        let att = decode(r#"{"path": "https://files.example/f.png"}"#);
        assert_eq!(att.resolve(BASE), Some("https://files.example/f.png".to_string()));
    }

    #[test]
    fn test_unrecognized_resolves_to_none() {
        for json in [r#""not-a-url.jpg""#, r#"{"name": "g.jpg"}"#, "42", "null"] {
            let att = decode(json);
            assert!(matches!(att, Attachment::Unrecognized(_)), "{}", json);
            assert_eq!(att.resolve(BASE), None);
        }
    }

    #[test]
    fn test_serialize_keeps_shape() {
        let att = Attachment::Cloud {
            secure_url: "https://s/y.jpg".to_string(),
        };
        let json = serde_json::to_value(&att).unwrap();
        assert_eq!(json, serde_json::json!({"secure_url": "https://s/y.jpg"}));
    }
}
