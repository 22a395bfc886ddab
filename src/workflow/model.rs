//! Graph Document Model
//!
//! Wire-level data structures for a step-dependency document and the
//! tagged [`Value`] type used for node parameters and step results.
//!
//! # Example JSON Format
//!
//! ```json
//! {
//!   "id": "onboarding",
//!   "name": "Employee onboarding",
//!   "nodes": [
//!     { "id": "create_account", "service": "google", "action": "create_account",
//!       "parameters": { "email": "ada@example.com" } },
//!     { "id": "invite_slack", "service": "slack", "action": "invite_user",
//!       "parameters": { "channel": "#general" } }
//!   ],
//!   "edges": [ { "source": "create_account", "target": "invite_slack" } ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Parameter mapping of a node, keyed by parameter name.
pub type Parameters = BTreeMap<String, Value>;

/// Loosely-typed payload value with an explicit tag per shape.
///
/// Serialized untagged so it round-trips through plain JSON/YAML.
/// Integers are tried before floats so `1` stays an integer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Looks up a key when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            // Nested shapes render as compact JSON
            other => match serde_json::to_string(other) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "<unprintable>"),
            },
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

/// One entry of the list-shaped parameter form.
#[derive(Deserialize)]
struct NamedParameter {
    name: String,
    #[serde(default)]
    value: Value,
    #[serde(default = "default_required")]
    required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParameterForm {
    Map(Parameters),
    List(Vec<NamedParameter>),
}

/// Wire shape of a node. Parameters may be a mapping or a list of
/// `{name, value, required, ...}` entries; both become one mapping, and
/// list entries flagged `required` (the default) are collected by name.
#[derive(Deserialize)]
struct RawNodeSpec {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    actor: Option<String>,
    service: String,
    action: String,
    #[serde(default)]
    parameters: Option<ParameterForm>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    outputs: BTreeMap<String, String>,
}

impl From<RawNodeSpec> for NodeSpec {
    fn from(raw: RawNodeSpec) -> Self {
        let mut required = raw.required;
        let parameters = match raw.parameters {
            None => Parameters::new(),
            Some(ParameterForm::Map(map)) => map,
            Some(ParameterForm::List(entries)) => entries
                .into_iter()
                .map(|entry| {
                    if entry.required && !required.contains(&entry.name) {
                        required.push(entry.name.clone());
                    }
                    (entry.name, entry.value)
                })
                .collect(),
        };

        Self {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            actor: raw.actor,
            service: raw.service,
            action: raw.action,
            parameters,
            required,
            depends_on: raw.depends_on,
            outputs: raw.outputs,
        }
    }
}

/// A single step in the graph: one `(service, action, parameters)` call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "RawNodeSpec")]
pub struct NodeSpec {
    /// Unique identifier within the document (referenced by edges)
    pub id: String,

    /// Human-readable label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Role expected to perform the step (e.g. "hr_manager")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// Target service (e.g. "slack", "jira")
    pub service: String,

    /// Action on the service (e.g. "create_channel")
    pub action: String,

    pub parameters: Parameters,

    /// Parameters that must carry a non-null value before the call is made
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Inline dependencies; each entry is an edge `dep -> self`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Declared outputs, name to type; carried, not interpreted
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, String>,
}

impl NodeSpec {
    /// Creates a node bound to a service call.
    ///
    /// # Example
    ///
    /// ```
    /// use flowforge_engine::workflow::NodeSpec;
    ///
    /// let node = NodeSpec::new("invite", "slack", "invite_user")
    ///     .with_param("channel", "#general")
    ///     .depends_on("create_account");
    /// assert_eq!(node.depends_on, vec!["create_account"]);
    /// ```
    pub fn new(
        id: impl Into<String>,
        service: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            actor: None,
            service: service.into(),
            action: action.into(),
            parameters: Parameters::new(),
            required: Vec::new(),
            depends_on: Vec::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Sets a single parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Marks a parameter as required.
    pub fn require(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.required.contains(&key) {
            self.required.push(key);
        }
        self
    }

    /// First required parameter that is absent or null.
    pub fn missing_parameter(&self) -> Option<&str> {
        self.required
            .iter()
            .find(|key| self.parameters.get(*key).map_or(true, Value::is_null))
            .map(String::as_str)
    }

    /// Adds an inline dependency on another node.
    pub fn depends_on(mut self, node_id: impl Into<String>) -> Self {
        self.depends_on.push(node_id.into());
        self
    }
}

/// Directed edge: `target` runs after `source`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EdgeSpec {
    #[serde(alias = "from")]
    pub source: String,
    #[serde(alias = "to")]
    pub target: String,
}

impl EdgeSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A complete step-dependency document as produced by the generator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GraphDocument {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Owning team
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    pub nodes: Vec<NodeSpec>,

    #[serde(default)]
    pub edges: Vec<EdgeSpec>,

    /// Document-wide parameters; carried, not interpreted
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: Parameters,
}

impl GraphDocument {
    /// Creates an empty document.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            team: None,
            version: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            parameters: Parameters::new(),
        }
    }

    /// Appends a node (builder style).
    pub fn with_node(mut self, node: NodeSpec) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends an edge (builder style).
    pub fn with_edge(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edges.push(EdgeSpec::new(source, target));
        self
    }

    /// Gets a node by ID (first match).
    pub fn node(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All declared dependencies: explicit edges first, then each node's
    /// inline `depends_on` entries, in declaration order.
    pub fn declared_edges(&self) -> Vec<EdgeSpec> {
        let inline = self.nodes.iter().flat_map(|node| {
            node.depends_on
                .iter()
                .map(move |dep| EdgeSpec::new(dep.clone(), node.id.clone()))
        });
        self.edges.iter().cloned().chain(inline).collect()
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the document has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_creation() {
        let node = NodeSpec::new("notify", "slack", "send_message")
            .with_param("channel", "#eng")
            .with_param("urgent", true)
            .with_name("Notify team");

        assert_eq!(node.id, "notify");
        assert_eq!(node.parameters.get("channel"), Some(&Value::from("#eng")));
        assert_eq!(node.parameters.get("urgent"), Some(&Value::Bool(true)));
        assert_eq!(node.name.as_deref(), Some("Notify team"));
    }

    #[test]
    fn test_value_keeps_integers_distinct_from_floats() {
        let value: Value = serde_json::from_value(json!({"n": 3, "x": 1.5})).unwrap();
        assert_eq!(value.get("n"), Some(&Value::Integer(3)));
        assert_eq!(value.get("x"), Some(&Value::Float(1.5)));
    }

    #[test]
    fn test_value_nested_shapes_deserialize() {
        let value: Value =
            serde_json::from_value(json!({"list": [1, "a", null], "flag": false})).unwrap();
        assert_eq!(
            value.get("list"),
            Some(&Value::List(vec![
                Value::Integer(1),
                Value::from("a"),
                Value::Null
            ]))
        );
        assert_eq!(value.get("flag").and_then(Value::as_bool), Some(false));
    }

    #[test]
    fn test_value_from_json() {
        let value = Value::from(json!({"id": 7, "tags": ["x"]}));
        assert_eq!(value.get("id").and_then(Value::as_i64), Some(7));
        assert!(matches!(value.get("tags"), Some(Value::List(_))));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::Integer(4).to_string(), "4");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::List(vec![Value::Integer(1)]).to_string(), "[1]");
    }

    #[test]
    fn test_parameters_accept_named_list() {
        let node: NodeSpec = serde_json::from_value(json!({
            "id": "a",
            "service": "jira",
            "action": "create_issue",
            "parameters": [
                {"name": "project", "value": "ENG", "description": "Project key", "required": true},
                {"name": "priority", "value": 2}
            ]
        }))
        .unwrap();

        assert_eq!(node.parameters.len(), 2);
        assert_eq!(node.parameters["project"], Value::from("ENG"));
        assert_eq!(node.parameters["priority"], Value::Integer(2));
        // `required` defaults to true for list entries
        assert_eq!(node.required, vec!["project", "priority"]);
        assert_eq!(node.missing_parameter(), None);
    }

    #[test]
    fn test_required_parameter_without_value() {
        let node: NodeSpec = serde_json::from_value(json!({
            "id": "a",
            "service": "jira",
            "action": "create_issue",
            "parameters": [
                {"name": "project", "description": "Project key"},
                {"name": "labels", "value": null, "required": false}
            ]
        }))
        .unwrap();

        assert_eq!(node.required, vec!["project"]);
        assert_eq!(node.parameters["project"], Value::Null);
        assert_eq!(node.missing_parameter(), Some("project"));
    }

    #[test]
    fn test_require_builder() {
        let node = NodeSpec::new("a", "slack", "invite")
            .require("user")
            .require("user");
        assert_eq!(node.required, vec!["user"]);
        assert_eq!(node.missing_parameter(), Some("user"));

        let node = node.with_param("user", "ada");
        assert_eq!(node.missing_parameter(), None);
    }

    #[test]
    fn test_ids_are_kept_verbatim() {
        let node = NodeSpec::new(" a ", "hr", "lookup");
        assert_eq!(node.id, " a ");

        let doc = GraphDocument::new("wf", "spaced")
            .with_node(node)
            .with_node(NodeSpec::new("b", "hr", "lookup"))
            .with_edge(" a ", "b");
        assert!(doc.node(" a ").is_some());
        assert_eq!(doc.declared_edges(), vec![EdgeSpec::new(" a ", "b")]);
    }

    #[test]
    fn test_parameters_missing_or_null() {
        let node: NodeSpec = serde_json::from_value(json!({
            "id": "a", "service": "hr", "action": "lookup", "parameters": null
        }))
        .unwrap();
        assert!(node.parameters.is_empty());

        let node: NodeSpec =
            serde_json::from_value(json!({"id": "b", "service": "hr", "action": "lookup"}))
                .unwrap();
        assert!(node.parameters.is_empty());
    }

    #[test]
    fn test_edge_accepts_from_to_aliases() {
        let edge: EdgeSpec = serde_json::from_value(json!({"from": "a", "to": "b"})).unwrap();
        assert_eq!(edge, EdgeSpec::new("a", "b"));
    }

    #[test]
    fn test_declared_edges_include_inline_dependencies() {
        let doc = GraphDocument::new("wf", "demo")
            .with_node(NodeSpec::new("a", "hr", "lookup"))
            .with_node(NodeSpec::new("b", "slack", "invite").depends_on("a"))
            .with_node(NodeSpec::new("c", "jira", "assign"))
            .with_edge("b", "c");

        let edges = doc.declared_edges();
        assert_eq!(edges, vec![EdgeSpec::new("b", "c"), EdgeSpec::new("a", "b")]);
    }

    #[test]
    fn test_document_defaults() {
        let doc: GraphDocument = serde_json::from_value(json!({
            "nodes": [{"id": "a", "service": "hr", "action": "lookup"}]
        }))
        .unwrap();

        assert_eq!(doc.len(), 1);
        assert!(doc.edges.is_empty());
        assert!(doc.name.is_empty());
        assert!(doc.node("a").is_some());
        assert!(doc.node("zz").is_none());
    }
}
