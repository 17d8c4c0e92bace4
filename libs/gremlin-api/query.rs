//! Gremlin query builder
//!
//! Builders render to the query string through `Display`:
//!
//! ```rust,ignore
//! let g = Graph::new("g");
//! let query = g.v().has_label("user").values_by("name").fold();
//! assert_eq!(query.to_string(), r#"g.V().hasLabel("user").values("name").fold()"#);
//! ```
//!
//! String arguments are quoted and escaped; nothing else is validated,
//! the server remains the judge of the query.

use std::fmt;
use uuid::Uuid;

/// Anything that renders to a Gremlin query fragment
pub trait QueryBuilder: fmt::Display + Send + Sync {}

/// Escape a string argument for use inside double quotes
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// A fixed query fragment, e.g. `.count()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleQuery(String);

impl SimpleQuery {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self(fragment.into())
    }
}

impl fmt::Display for SimpleQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl QueryBuilder for SimpleQuery {}

/// `name("a","b")` with quoted string parameters
pub fn multi_param_query(name: &str, params: &[&str]) -> SimpleQuery {
    let params: Vec<String> = params.iter().map(|p| format!("\"{}\"", escape(p))).collect();
    SimpleQuery(format!("{}({})", name, params.join(",")))
}

/// `name(1,2)` with bare integer parameters
pub fn multi_param_query_int(name: &str, params: &[i64]) -> SimpleQuery {
    let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    SimpleQuery(format!("{}({})", name, params.join(",")))
}

/// Ordered list of fragments shared by the traversal types
struct Fragments(Vec<Box<dyn QueryBuilder>>);

impl Fragments {
    fn starting_with(fragment: String) -> Self {
        Self(vec![Box::new(SimpleQuery(fragment))])
    }

    fn push(&mut self, builder: impl QueryBuilder + 'static) {
        self.0.push(Box::new(builder));
    }
}

impl fmt::Display for Fragments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.0 {
            write!(f, "{}", fragment)?;
        }
        Ok(())
    }
}

/// Entry point of every traversal; renders to the graph's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    name: String,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// `g.V()`
    pub fn v(&self) -> VertexQuery {
        VertexQuery::new(format!("{}.V()", self.name))
    }

    /// `g.V("1")`; ids are always sent quoted
    pub fn v_by(&self, id: i64) -> VertexQuery {
        VertexQuery::new(format!("{}.V(\"{}\")", self.name, id))
    }

    pub fn v_by_str(&self, id: &str) -> VertexQuery {
        VertexQuery::new(format!("{}.V(\"{}\")", self.name, escape(id)))
    }

    pub fn v_by_uuid(&self, id: Uuid) -> VertexQuery {
        VertexQuery::new(format!("{}.V(\"{}\")", self.name, id))
    }

    /// `g.addV("label")`
    pub fn add_v(&self, label: &str) -> VertexQuery {
        VertexQuery::new(format!("{}.addV(\"{}\")", self.name, escape(label)))
    }

    /// `g.E()`
    pub fn e(&self) -> EdgeQuery {
        EdgeQuery {
            fragments: Fragments::starting_with(format!("{}.E()", self.name)),
        }
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl QueryBuilder for Graph {}

/// Traversal over vertices
pub struct VertexQuery {
    fragments: Fragments,
}

impl VertexQuery {
    fn new(start: String) -> Self {
        Self {
            fragments: Fragments::starting_with(start),
        }
    }

    /// Append a custom fragment
    pub fn add(mut self, builder: impl QueryBuilder + 'static) -> Self {
        self.fragments.push(builder);
        self
    }

    pub fn has_label(self, label: &str) -> Self {
        self.add(multi_param_query(".hasLabel", &[label]))
    }

    /// `.has("key","value")`
    pub fn has(self, key: &str, value: &str) -> Self {
        self.add(multi_param_query(".has", &[key, value]))
    }

    /// `.property("key","value")`
    pub fn property(self, key: &str, value: &str) -> Self {
        self.add(multi_param_query(".property", &[key, value]))
    }

    /// `.property("key",42)`
    pub fn property_int(self, key: &str, value: i64) -> Self {
        self.add(SimpleQuery(format!(".property(\"{}\",{})", escape(key), value)))
    }

    pub fn out_e(self, labels: &[&str]) -> EdgeQuery {
        EdgeQuery {
            fragments: self.fragments,
        }
        .add(multi_param_query(".outE", labels))
    }

    pub fn in_e(self, labels: &[&str]) -> EdgeQuery {
        EdgeQuery {
            fragments: self.fragments,
        }
        .add(multi_param_query(".inE", labels))
    }

    pub fn count(self) -> ValueQuery {
        ValueQuery::from_fragments(self.fragments).add(SimpleQuery::new(".count()"))
    }

    /// `.values("label")`
    pub fn values_by(self, label: &str) -> ValueQuery {
        ValueQuery::from_fragments(self.fragments).add(multi_param_query(".values", &[label]))
    }

    pub fn drop(self) -> Self {
        self.add(SimpleQuery::new(".drop()"))
    }
}

impl fmt::Display for VertexQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fragments, f)
    }
}

impl QueryBuilder for VertexQuery {}

/// Traversal over edges
pub struct EdgeQuery {
    fragments: Fragments,
}

impl EdgeQuery {
    pub fn add(mut self, builder: impl QueryBuilder + 'static) -> Self {
        self.fragments.push(builder);
        self
    }

    pub fn has_label(self, label: &str) -> Self {
        self.add(multi_param_query(".hasLabel", &[label]))
    }

    pub fn count(self) -> ValueQuery {
        ValueQuery::from_fragments(self.fragments).add(SimpleQuery::new(".count()"))
    }

    pub fn drop(self) -> Self {
        self.add(SimpleQuery::new(".drop()"))
    }
}

impl fmt::Display for EdgeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fragments, f)
    }
}

impl QueryBuilder for EdgeQuery {}

/// Traversal ending in plain values
pub struct ValueQuery {
    fragments: Fragments,
}

impl ValueQuery {
    fn from_fragments(fragments: Fragments) -> Self {
        Self { fragments }
    }

    /// Append a custom fragment, e.g. `SimpleQuery::new(".limit(3)")`
    pub fn add(mut self, builder: impl QueryBuilder + 'static) -> Self {
        self.fragments.push(builder);
        self
    }

    /// `.fold()`
    pub fn fold(self) -> Self {
        self.add(SimpleQuery::new(".fold()"))
    }
}

impl fmt::Display for ValueQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fragments, f)
    }
}

impl QueryBuilder for ValueQuery {}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = "mygraph";

    #[test]
    fn test_graph_entry_points() {
        let g = Graph::new(GRAPH);
        assert_eq!(g.to_string(), "mygraph");
        assert_eq!(g.v().to_string(), "mygraph.V()");
        assert_eq!(g.v_by(1).to_string(), "mygraph.V(\"1\")");
        assert_eq!(g.v_by_str("1234ABCD").to_string(), "mygraph.V(\"1234ABCD\")");
        assert_eq!(g.add_v("user").to_string(), "mygraph.addV(\"user\")");
        assert_eq!(g.e().to_string(), "mygraph.E()");
    }

    #[test]
    fn test_v_by_uuid() {
        let id = Uuid::new_v4();
        let query = Graph::new(GRAPH).v_by_uuid(id);
        assert_eq!(query.to_string(), format!("mygraph.V(\"{}\")", id));
    }

    #[test]
    fn test_values_fold() {
        let query = Graph::new(GRAPH).v().values_by("test").fold();
        assert_eq!(query.to_string(), "mygraph.V().values(\"test\").fold()");
    }

    #[test]
    fn test_multi_param_query() {
        assert_eq!(multi_param_query(".outE", &[]).to_string(), ".outE()");
        assert_eq!(multi_param_query(".outE", &["label1"]).to_string(), ".outE(\"label1\")");
        assert_eq!(
            multi_param_query(".outE", &["label1", "label2"]).to_string(),
            ".outE(\"label1\",\"label2\")"
        );
    }

    #[test]
    fn test_multi_param_query_int() {
        assert_eq!(multi_param_query_int(".within", &[]).to_string(), ".within()");
        assert_eq!(multi_param_query_int(".within", &[1]).to_string(), ".within(1)");
        assert_eq!(multi_param_query_int(".within", &[1, 2]).to_string(), ".within(1,2)");
    }

    #[test]
    fn test_chained_traversal() {
        let g = Graph::new("g");
        let query = g
            .add_v("user")
            .property("name", "Ann \"the\" admin")
            .property_int("age", 42);
        assert_eq!(
            query.to_string(),
            r#"g.addV("user").property("name","Ann \"the\" admin").property("age",42)"#
        );

        let edges = g.v_by_str("a").out_e(&["knows"]).has_label("knows").count();
        assert_eq!(edges.to_string(), r#"g.V("a").outE("knows").hasLabel("knows").count()"#);

        let custom = g.v().count().add(SimpleQuery::new(".is(0)"));
        assert_eq!(custom.to_string(), "g.V().count().is(0)");
    }
}
