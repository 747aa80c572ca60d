//! Resource documents and their merge keys.

use std::fmt;

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Stable identity of a resource across tree snapshots.
///
/// Two documents are the same logical resource iff their keys match;
/// file position carries no identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}/{}", self.kind, self.name)
        } else {
            write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
        }
    }
}

/// One structured configuration document within a package.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDocument {
    value: Value,
}

impl ResourceDocument {
    /// Wrap a parsed YAML value. The value must be a mapping with `kind`
    /// and `metadata.name` — everything a merge key needs.
    pub fn new(value: Value, path: &str) -> Result<Self> {
        let doc = Self { value };
        // Validate identity eagerly so collisions surface at parse time.
        doc.key().map_err(|e| match e {
            Error::InvalidResource { reason, .. } => Error::InvalidResource {
                path: path.to_string(),
                reason,
            },
            other => other,
        })?;
        Ok(doc)
    }

    /// The underlying YAML value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the document, yielding its YAML value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// The document's merge key: kind + namespace + name.
    pub fn key(&self) -> Result<ResourceKey> {
        if !self.value.is_mapping() {
            return Err(invalid("document is not a mapping"));
        }

        let kind = string_field(&self.value, "kind").ok_or_else(|| invalid("document has no kind"))?;
        let metadata = self
            .value
            .get("metadata")
            .ok_or_else(|| invalid("document has no metadata"))?;
        let name =
            string_field(metadata, "name").ok_or_else(|| invalid("document has no metadata.name"))?;
        let namespace = string_field(metadata, "namespace").unwrap_or_default();

        Ok(ResourceKey {
            kind,
            namespace,
            name,
        })
    }
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

fn invalid(reason: &str) -> Error {
    Error::InvalidResource {
        path: String::new(),
        reason: reason.to_string(),
    }
}

/// Parse a (possibly multi-document) YAML source into resource documents.
///
/// Empty and comment-only documents are skipped.
pub fn parse_documents(path: &str, source: &str) -> Result<Vec<ResourceDocument>> {
    let mut documents = Vec::new();
    for deserializer in serde_yaml::Deserializer::from_str(source) {
        let value = Value::deserialize(deserializer).map_err(|e| Error::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        if value.is_null() {
            continue;
        }
        documents.push(ResourceDocument::new(value, path)?);
    }
    Ok(documents)
}

/// Render documents back to a multi-document YAML source.
pub fn render_documents(documents: &[ResourceDocument]) -> Result<String> {
    let mut rendered = String::new();
    for (i, doc) in documents.iter().enumerate() {
        if i > 0 {
            rendered.push_str("---\n");
        }
        let body = serde_yaml::to_string(doc.value()).map_err(|e| Error::Render {
            message: e.to_string(),
        })?;
        rendered.push_str(&body);
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DEPLOYMENT: &str = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: frontend\n  namespace: web\nspec:\n  replicas: 3\n";

    #[test]
    fn key_includes_kind_namespace_name() {
        let docs = parse_documents("deployment.yaml", DEPLOYMENT).unwrap();
        assert_eq!(docs.len(), 1);
        let key = docs[0].key().unwrap();
        assert_eq!(key.kind, "Deployment");
        assert_eq!(key.namespace, "web");
        assert_eq!(key.name, "frontend");
        assert_eq!(key.to_string(), "Deployment web/frontend");
    }

    #[test]
    fn cluster_scoped_key_has_empty_namespace() {
        let source = "kind: Namespace\nmetadata:\n  name: web\n";
        let docs = parse_documents("ns.yaml", source).unwrap();
        let key = docs[0].key().unwrap();
        assert_eq!(key.namespace, "");
        assert_eq!(key.to_string(), "Namespace/web");
    }

    #[test]
    fn multi_document_sources_split_on_separators() {
        let source = format!("{DEPLOYMENT}---\nkind: Service\nmetadata:\n  name: frontend\n");
        let docs = parse_documents("all.yaml", &source).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn empty_documents_are_skipped() {
        let source = "---\n# just a comment\n---\nkind: Service\nmetadata:\n  name: svc\n";
        let docs = parse_documents("svc.yaml", source).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn document_without_name_is_invalid() {
        let err = parse_documents("bad.yaml", "kind: Service\nmetadata: {}\n").unwrap_err();
        assert!(matches!(err, Error::InvalidResource { .. }));
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn malformed_yaml_reports_the_file() {
        let err = parse_documents("broken.yaml", "kind: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn render_joins_documents_with_separators() {
        let source = format!("{DEPLOYMENT}---\nkind: Service\nmetadata:\n  name: frontend\n");
        let docs = parse_documents("all.yaml", &source).unwrap();
        let rendered = render_documents(&docs).unwrap();
        let reparsed = parse_documents("all.yaml", &rendered).unwrap();
        assert_eq!(reparsed, docs);
    }
}
