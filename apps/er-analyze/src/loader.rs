//! JSON graph ingestion.
//!
//! Wire format: `{"nodes": {"<id>": {...attrs}}, "edges": [{"source","target","weight"}]}`.
//! Attribute keys are case-insensitive — every node object is canonicalized
//! to lowercase keys before any field is read, so `"KInst"`, `"kinst"`, and
//! `"KINST"` are all equivalent.

use crate::error::CliError;
use er_core::types::{Category, KInst, Vertex, VertexId, VertexKind};
use er_core::GraphStore;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub fn load(path: &Path) -> Result<GraphStore, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: Value = serde_json::from_str(&raw).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let nodes_obj = doc
        .get("nodes")
        .and_then(Value::as_object)
        .ok_or_else(|| CliError::MalformedGraph("missing top-level \"nodes\" object".to_string()))?;

    let mut vertices = Vec::with_capacity(nodes_obj.len());
    for (id, attrs) in nodes_obj {
        let obj = attrs
            .as_object()
            .ok_or_else(|| CliError::MalformedGraph(format!("node '{id}' is not an object")))?;
        vertices.push(parse_vertex(id, &canonicalize(obj))?);
    }

    let edges_arr = doc
        .get("edges")
        .and_then(Value::as_array)
        .ok_or_else(|| CliError::MalformedGraph("missing top-level \"edges\" array".to_string()))?;

    let mut edges = Vec::with_capacity(edges_arr.len());
    for (i, edge) in edges_arr.iter().enumerate() {
        let obj = edge
            .as_object()
            .ok_or_else(|| CliError::MalformedGraph(format!("edge #{i} is not an object")))?;
        let canon = canonicalize(obj);
        let source = canon
            .get("source")
            .and_then(Value::as_str)
            .ok_or_else(|| CliError::MalformedGraph(format!("edge #{i} missing \"source\"")))?;
        let target = canon
            .get("target")
            .and_then(Value::as_str)
            .ok_or_else(|| CliError::MalformedGraph(format!("edge #{i} missing \"target\"")))?;
        let weight = canon
            .get("weight")
            .and_then(Value::as_f64)
            .ok_or_else(|| CliError::MalformedGraph(format!("edge #{i} missing numeric \"weight\"")))?;
        edges.push((VertexId::new(source), VertexId::new(target), weight));
    }

    GraphStore::from_description(vertices, edges).map_err(CliError::from)
}

/// Lowercase every key in a node/edge attribute object, last-write-wins on
/// a collision (wire producers should never emit one).
fn canonicalize(obj: &serde_json::Map<String, Value>) -> BTreeMap<String, Value> {
    obj.iter().map(|(k, v)| (k.to_lowercase(), v.clone())).collect()
}

fn parse_vertex(id: &str, attrs: &BTreeMap<String, Value>) -> Result<Vertex, CliError> {
    let kind = match attrs.get("kind") {
        None => VertexKind::Dummy,
        Some(raw) => parse_kind(id, raw)?,
    };

    let category = match attrs.get("category").and_then(Value::as_str) {
        Some("Q") => Category::Query,
        Some("C") => Category::Constraint,
        _ => Category::Normal,
    };

    let kinst = attrs.get("kinst").and_then(Value::as_str).and_then(KInst::parse);

    let width = attrs.get("width").and_then(Value::as_u64).unwrap_or(0) as u32;
    let freq = attrs.get("freq").and_then(Value::as_u64).unwrap_or(1);

    let is_pointer = attrs
        .get("ispointer")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("true"));

    let root = attrs.get("root").and_then(Value::as_str).map(str::to_string);
    let label = attrs.get("label").and_then(Value::as_str).map(str::to_string);
    let dbg_info = attrs.get("dbginfo").and_then(Value::as_str).map(str::to_string);

    Ok(Vertex {
        id: VertexId::new(id),
        kind,
        kinst,
        width,
        freq,
        is_pointer,
        category,
        root,
        label,
        dbg_info,
    })
}

/// `Kind` is `"0"` for a constant, `"3"` for a read expression, `"UN"` for
/// an array update node, and any other integer for an operator tag that
/// the analyzer never inspects beyond "is it a constant".
fn parse_kind(id: &str, raw: &Value) -> Result<VertexKind, CliError> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(CliError::MalformedGraph(format!("node '{id}' has non-scalar \"Kind\": {other}"))),
    };

    match text.as_str() {
        "0" => Ok(VertexKind::Constant),
        "3" => Ok(VertexKind::Read),
        "UN" => Ok(VertexKind::UpdateNode),
        other => other
            .parse::<i64>()
            .map(VertexKind::Other)
            .map_err(|_| CliError::MalformedGraph(format!("node '{id}' has unrecognized \"Kind\": {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("create temp file");
        f.write_all(contents.as_bytes()).expect("write temp file");
        f
    }

    #[test]
    fn loads_minimal_graph_with_mixed_case_keys() {
        let json = r#"{
            "nodes": {
                "a": {"Category":"N","KInst":"0x1","Kind":1,"Width":8,"Freq":1,"IsPointer":"false"},
                "b": {"category":"n","kind":"0","width":8,"freq":1,"ispointer":"false"}
            },
            "edges": [{"source":"a","target":"b","weight":1.0}]
        }"#;
        let f = write_temp(json);
        let graph = load(f.path()).expect("loads successfully");
        assert_eq!(graph.vertex_count(), 2);
        assert!(graph.vertex(&VertexId::new("b")).unwrap().kind.is_constant());
    }

    #[test]
    fn rejects_invalid_kind() {
        let json = r#"{"nodes":{"a":{"Kind":"bogus"}},"edges":[]}"#;
        let f = write_temp(json);
        let result = load(f.path());
        assert!(matches!(result, Err(CliError::MalformedGraph(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load(Path::new("/nonexistent/does-not-exist.json"));
        assert!(matches!(result, Err(CliError::Io { .. })));
    }
}
