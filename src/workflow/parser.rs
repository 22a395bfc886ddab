//! Graph Document Parser
//!
//! Handles decoding step-dependency documents from JSON or YAML, either
//! from an in-memory string or from a file whose extension picks the format.

use std::fs;
use std::path::Path;

use log::{debug, info};

use super::model::GraphDocument;
use crate::error::EngineError;

/// Supported document encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Picks the format from a file extension; anything but `.yaml`/`.yml`
    /// is treated as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

impl GraphDocument {
    /// Decodes a document from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, EngineError> {
        serde_json::from_str(content).map_err(|e| EngineError::Parse {
            format: DocumentFormat::Json.label(),
            message: e.to_string(),
        })
    }

    /// Decodes a document from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, EngineError> {
        serde_yaml::from_str(content).map_err(|e| EngineError::Parse {
            format: DocumentFormat::Yaml.label(),
            message: e.to_string(),
        })
    }

    /// Encodes the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Encode {
            format: DocumentFormat::Json.label(),
            message: e.to_string(),
        })
    }
}

/// Loads a graph document from a file.
///
/// The document is only decoded here; structural validation happens when
/// the engine builds the graph.
///
/// # Example
///
/// ```rust,no_run
/// use flowforge_engine::load_document;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let document = load_document("onboarding.json")?;
///     println!("Loaded {} nodes", document.nodes.len());
///     Ok(())
/// }
/// ```
pub fn load_document(path: impl AsRef<Path>) -> Result<GraphDocument, EngineError> {
    let path = path.as_ref();
    info!("Loading graph document from: {}", path.display());

    let content = fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Document content loaded ({} bytes)", content.len());

    let document = match DocumentFormat::from_path(path) {
        DocumentFormat::Yaml => GraphDocument::from_yaml_str(&content)?,
        DocumentFormat::Json => GraphDocument::from_json_str(&content)?,
    };

    info!(
        "Parsed document '{}': {} nodes, {} edges",
        document.name,
        document.nodes.len(),
        document.edges.len()
    );

    Ok(document)
}

/// Saves a graph document, encoding it by the path's extension.
pub fn save_document(document: &GraphDocument, path: impl AsRef<Path>) -> Result<(), EngineError> {
    let path = path.as_ref();

    let content = match DocumentFormat::from_path(path) {
        DocumentFormat::Yaml => serde_yaml::to_string(document).map_err(|e| EngineError::Encode {
            format: DocumentFormat::Yaml.label(),
            message: e.to_string(),
        })?,
        DocumentFormat::Json => document.to_json_pretty()?,
    };

    fs::write(path, content).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Graph document saved to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::model::{NodeSpec, Value};
    use tempfile::tempdir;

    #[test]
    fn test_from_json_str() {
        let doc = GraphDocument::from_json_str(
            r#"{
                "id": "wf-1",
                "name": "onboarding",
                "nodes": [
                    {"id": "a", "service": "hr", "action": "lookup", "parameters": {"employee": "ada"}},
                    {"id": "b", "service": "slack", "action": "invite"}
                ],
                "edges": [{"source": "a", "target": "b"}]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.id, "wf-1");
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[0].parameters["employee"], Value::from("ada"));
        assert_eq!(doc.edges[0].target, "b");
    }

    #[test]
    fn test_from_json_str_invalid() {
        let result = GraphDocument::from_json_str("{ not json");
        assert!(matches!(result, Err(EngineError::Parse { format: "JSON", .. })));
    }

    #[test]
    fn test_from_json_str_missing_nodes() {
        let result = GraphDocument::from_json_str(r#"{"name": "empty"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
id: wf-2
name: offboarding
nodes:
  - id: revoke
    service: google
    action: suspend_account
    parameters:
      email: bob@example.com
  - id: notify
    service: slack
    action: send_message
    depends_on: [revoke]
"#;
        let doc = GraphDocument::from_yaml_str(yaml).unwrap();

        assert_eq!(doc.name, "offboarding");
        assert_eq!(doc.nodes[1].depends_on, vec!["revoke"]);
        assert!(doc.edges.is_empty());
    }

    #[test]
    fn test_round_trip_keeps_document_metadata() {
        let doc = GraphDocument::from_json_str(
            r#"{
                "id": "wf-3",
                "name": "onboarding",
                "description": "New hire setup",
                "team": "eng",
                "version": 3,
                "parameters": {"start_date": "2024-01-08", "seats": 2},
                "nodes": [
                    {
                        "id": "lookup",
                        "name": "Look up employee",
                        "description": "Fetch HR record",
                        "service": "hr",
                        "action": "get_employee",
                        "actor": "hr_manager",
                        "parameters": [{"name": "email", "value": "ada@example.com", "description": "Work email"}],
                        "outputs": {"employee_id": "string"}
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.team.as_deref(), Some("eng"));
        assert_eq!(doc.version, Some(3));
        assert_eq!(doc.parameters["seats"], Value::Integer(2));
        assert_eq!(doc.nodes[0].outputs["employee_id"], "string");

        let json: serde_json::Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["team"], "eng");
        assert_eq!(json["version"], 3);
        assert_eq!(json["parameters"]["start_date"], "2024-01-08");
        assert_eq!(json["nodes"][0]["outputs"]["employee_id"], "string");
        assert_eq!(json["nodes"][0]["actor"], "hr_manager");
        assert_eq!(json["nodes"][0]["required"][0], "email");

        let reloaded = GraphDocument::from_json_str(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(reloaded, doc);
    }

    #[test]
    fn test_minimal_document_encodes_without_optional_fields() {
        let doc = GraphDocument::new("wf", "bare").with_node(NodeSpec::new("a", "hr", "lookup"));
        let json: serde_json::Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();

        assert!(json.get("team").is_none());
        assert!(json.get("version").is_none());
        assert!(json.get("parameters").is_none());
        assert!(json["nodes"][0].get("outputs").is_none());
        assert!(json["nodes"][0].get("required").is_none());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("noext")), DocumentFormat::Json);
    }

    #[test]
    fn test_load_document_not_found() {
        let result = load_document("/nonexistent/path/graph.json");
        assert!(matches!(result, Err(EngineError::Io { .. })));
    }

    #[test]
    fn test_save_and_load_yaml() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("graph.yaml");

        let doc = GraphDocument::new("wf", "saved")
            .with_node(NodeSpec::new("a", "hr", "lookup").with_param("n", 1))
            .with_node(NodeSpec::new("b", "jira", "create_issue"))
            .with_edge("a", "b");

        save_document(&doc, &path).unwrap();
        assert!(path.exists());

        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_save_and_load_json() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("graph.json");

        let doc = GraphDocument::new("wf", "saved")
            .with_node(NodeSpec::new("a", "hr", "lookup").with_param("active", true));

        save_document(&doc, &path).unwrap();
        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded.nodes[0].parameters["active"], Value::Bool(true));
    }
}
