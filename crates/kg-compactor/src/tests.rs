use crate::*;
use crate::codebook::{self, escape_term, generate_codes, is_code, parse_codebook_line, unescape_term};
use crate::collector::{build_code_table, collect_terms};
use crate::decoder::decode;
use crate::encoder::{encode, encode_link, encode_node, encode_value};
use kg_core::{AttrValue, CodecConfig, Graph, KgError, Link, Node, Scalar};
use std::collections::BTreeSet;

fn function_node() -> Node {
    Node::new("Function: f")
        .with_attr("type", AttrValue::string("Function"))
        .with_attr(
            "parameters",
            AttrValue::Sequence(vec![AttrValue::string("a"), AttrValue::string("b")]),
        )
}

fn single_node_graph() -> Graph {
    Graph { nodes: vec![function_node()], links: vec![] }
}

fn bare_config() -> CodecConfig {
    CodecConfig::default().with_instructions(false)
}

fn terms(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ========== Codebook ==========

#[test]
fn test_generate_codes() {
    assert_eq!(generate_codes('T', 3), vec!["T1", "T2", "T3"]);
    assert!(generate_codes('T', 0).is_empty());
    assert_eq!(codebook::format_code('K', 12), "K12");
}

#[test]
fn test_is_code() {
    assert!(is_code("T1", 'T'));
    assert!(is_code("T204", 'T'));
    assert!(!is_code("T", 'T'));
    assert!(!is_code("T0", 'T'));
    assert!(!is_code("T01", 'T'));
    assert!(!is_code("X1", 'T'));
    assert!(!is_code("T1a", 'T'));
}

#[test]
fn test_code_table_ranks_sorted_terms() {
    let table = CodeTable::from_terms(terms(&["zeta", "Alpha", "beta"]), 'T');
    assert_eq!(table.len(), 3);
    assert_eq!(table.code("Alpha").unwrap(), "T1");
    assert_eq!(table.code("beta").unwrap(), "T2");
    assert_eq!(table.code("zeta").unwrap(), "T3");
    assert_eq!(table.term("T2"), Some("beta"));
}

#[test]
fn test_code_table_term_out_of_range() {
    let table = CodeTable::from_terms(terms(&["x"]), 'T');
    assert_eq!(table.term("T0"), None);
    assert_eq!(table.term("T2"), None);
    assert_eq!(table.term("Q1"), None);
}

#[test]
fn test_code_table_miss_is_error() {
    let table = CodeTable::from_terms(terms(&["x"]), 'T');
    let err = table.code("y").unwrap_err();
    assert!(matches!(err, KgError::MissingCode { ref term } if term == "y"));
}

#[test]
fn test_code_table_rank_order_not_text_order() {
    let names: Vec<String> = (0..12).map(|i| format!("t{i:02}")).collect();
    let table = CodeTable::from_terms(names.iter().cloned().collect(), 'T');
    let codes: Vec<String> = table.iter().map(|(c, _)| c).collect();
    assert_eq!(codes[9], "T10");
    assert_eq!(codes[1], "T2");
    let rendered = table.render();
    assert_eq!(rendered[1], "#T2:t01");
    assert_eq!(rendered[10], "#T11:t10");
}

#[test]
fn test_render_escapes_terms() {
    let table = CodeTable::from_terms(terms(&["line1\nline2", "a\\b"]), 'T');
    let rendered = table.render();
    assert_eq!(rendered, vec!["#T1:a\\\\b", "#T2:line1\\nline2"]);
}

#[test]
fn test_escape_roundtrip() {
    for term in ["plain", "", "a\\nb", "x\ny\r\n", "\\", "ends\\"] {
        assert_eq!(unescape_term(&escape_term(term)), term);
    }
}

#[test]
fn test_unescape_unknown_sequence_kept() {
    assert_eq!(unescape_term("a\\tb"), "a\\tb");
}

#[test]
fn test_parse_codebook_line() {
    assert_eq!(parse_codebook_line("#T3:Function: f", 'T'), Some(("T3".into(), "Function: f".into())));
    assert_eq!(parse_codebook_line("#T1:", 'T'), Some(("T1".into(), String::new())));
    assert_eq!(parse_codebook_line("# Codebook:", 'T'), None);
    assert_eq!(parse_codebook_line("N|T1|", 'T'), None);
}

#[test]
fn test_instruction_lines_are_not_codebook_lines() {
    for line in codebook::instructions() {
        assert!(line.starts_with('#'));
        assert_eq!(parse_codebook_line(line, 'T'), None, "{line}");
    }
}

// ========== Collector ==========

#[test]
fn test_collect_example_terms() {
    let collected = collect_terms(&single_node_graph()).unwrap();
    assert_eq!(
        collected,
        terms(&["Function", "Function: f", "a", "b", "parameters", "type"])
    );
}

#[test]
fn test_collect_skips_identifier_key() {
    let collected = collect_terms(&single_node_graph()).unwrap();
    assert!(!collected.contains("id"));
}

#[test]
fn test_collect_nested_keys_and_values() {
    let node = Node::new("n").with_attr(
        "args",
        AttrValue::Sequence(vec![AttrValue::Mapping(vec![
            ("name".into(), AttrValue::string("x")),
            ("default".into(), AttrValue::Scalar(Scalar::Null)),
        ])]),
    );
    let collected = collect_terms(&Graph { nodes: vec![node], links: vec![] }).unwrap();
    assert_eq!(collected, terms(&["args", "default", "n", "name", "null", "x"]));
}

#[test]
fn test_collect_links() {
    let graph = Graph {
        nodes: vec![],
        links: vec![Link::new("a", "CALLS", "b"), Link::new("b", "CALLS", "a")],
    };
    assert_eq!(collect_terms(&graph).unwrap(), terms(&["CALLS", "a", "b"]));
}

#[test]
fn test_collect_empty_string_term() {
    let graph = Graph { nodes: vec![Node::new("")], links: vec![] };
    let table = build_code_table(&graph, 'T').unwrap();
    assert_eq!(table.code("").unwrap(), "T1");
}

#[test]
fn test_collect_int_and_string_collapse() {
    let node = Node::new("x")
        .with_attr("a", AttrValue::Scalar(Scalar::Number(1u64.into())))
        .with_attr("b", AttrValue::string("1"));
    let collected = collect_terms(&Graph { nodes: vec![node], links: vec![] }).unwrap();
    assert_eq!(collected, terms(&["1", "a", "b", "x"]));
}

#[test]
fn test_collect_empty_graph() {
    assert!(collect_terms(&Graph::new()).unwrap().is_empty());
}

// ========== Encoder ==========

#[test]
fn test_encode_example_node() {
    let graph = single_node_graph();
    let table = build_code_table(&graph, 'T').unwrap();
    assert_eq!(encode_node(&graph.nodes[0], &table).unwrap(), "N|T2|T6=T1 T5=[T3,T4]");
}

#[test]
fn test_encode_example_artifact() {
    let graph = single_node_graph();
    let table = build_code_table(&graph, 'T').unwrap();
    let out = encode(&graph, &table, &bare_config()).unwrap();
    let expected = [
        "#T1:Function",
        "#T2:Function: f",
        "#T3:a",
        "#T4:b",
        "#T5:parameters",
        "#T6:type",
        "N|T2|T6=T1 T5=[T3,T4]",
    ]
    .join("\n");
    assert_eq!(out, expected);
}

#[test]
fn test_encode_with_instructions() {
    let graph = single_node_graph();
    let table = build_code_table(&graph, 'T').unwrap();
    let out = encode(&graph, &table, &CodecConfig::default()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    let header = codebook::instructions().len();
    assert_eq!(lines[0], "# Compressed Knowledge Graph");
    assert_eq!(lines[header - 1], "# Codebook:");
    assert_eq!(lines[header], "#T1:Function");
    assert_eq!(lines.len(), header + 6 + 1);
}

#[test]
fn test_encode_nested_mapping() {
    let table = CodeTable::from_terms(terms(&["k", "v", "w"]), 'T');
    let value = AttrValue::Mapping(vec![
        ("k".into(), AttrValue::Sequence(vec![AttrValue::string("v"), AttrValue::string("w")])),
        ("w".into(), AttrValue::Mapping(vec![("k".into(), AttrValue::string("v"))])),
    ]);
    assert_eq!(encode_value(&value, &table).unwrap(), "{T1:[T2,T3],T3:{T1:T2}}");
}

#[test]
fn test_encode_empty_containers() {
    let table = CodeTable::from_terms(BTreeSet::new(), 'T');
    assert_eq!(encode_value(&AttrValue::Sequence(vec![]), &table).unwrap(), "[]");
    assert_eq!(encode_value(&AttrValue::Mapping(vec![]), &table).unwrap(), "{}");
}

#[test]
fn test_encode_node_without_attributes() {
    let table = CodeTable::from_terms(terms(&["solo"]), 'T');
    assert_eq!(encode_node(&Node::new("solo"), &table).unwrap(), "N|T1|");
}

#[test]
fn test_encode_link() {
    let table = CodeTable::from_terms(terms(&["CALLS", "f", "g"]), 'T');
    assert_eq!(encode_link(&Link::new("f", "CALLS", "g"), &table).unwrap(), "L|T2|T1|T3");
}

#[test]
fn test_encode_preserves_attribute_order() {
    let node = Node::new("n")
        .with_attr("zz", AttrValue::string("1"))
        .with_attr("aa", AttrValue::string("2"));
    let graph = Graph { nodes: vec![node], links: vec![] };
    let table = build_code_table(&graph, 'T').unwrap();
    // terms: 1, 2, aa, n, zz
    assert_eq!(encode_node(&graph.nodes[0], &table).unwrap(), "N|T4|T5=T1 T3=T2");
}

#[test]
fn test_encode_missing_code_fails() {
    let table = build_code_table(&single_node_graph(), 'T').unwrap();
    let other = Graph { nodes: vec![Node::new("stranger")], links: vec![] };
    let err = encode(&other, &table, &bare_config()).unwrap_err();
    assert!(matches!(err, KgError::MissingCode { ref term } if term == "stranger"));
}

#[test]
fn test_encode_custom_prefix() {
    let graph = single_node_graph();
    let table = build_code_table(&graph, 'K').unwrap();
    assert_eq!(encode_node(&graph.nodes[0], &table).unwrap(), "N|K2|K6=K1 K5=[K3,K4]");
}

// ========== Decoder ==========

#[test]
fn test_decode_example() {
    let text = "#T1:Function\n#T2:Function: f\n#T3:a\n#T4:b\n#T5:parameters\n#T6:type\nN|T2|T6=T1 T5=[T3,T4]";
    let decoded = decode(text, &CodecConfig::default()).unwrap();
    assert_eq!(decoded.graph, single_node_graph());
    assert_eq!(decoded.codebook.len(), 6);
}

#[test]
fn test_decode_nested_and_empty() {
    let text = "#T1:k\n#T2:n\n#T3:v\nN|T2|T1={T1:[],T3:{}} T3=[[T3],{T1:T3}]";
    let node = &decode(text, &CodecConfig::default()).unwrap().graph.nodes[0];
    assert_eq!(
        node.attr("k"),
        Some(&AttrValue::Mapping(vec![
            ("k".into(), AttrValue::Sequence(vec![])),
            ("v".into(), AttrValue::Mapping(vec![])),
        ]))
    );
    assert_eq!(
        node.attr("v"),
        Some(&AttrValue::Sequence(vec![
            AttrValue::Sequence(vec![AttrValue::string("v")]),
            AttrValue::Mapping(vec![("k".into(), AttrValue::string("v"))]),
        ]))
    );
}

#[test]
fn test_decode_link() {
    let text = "#T1:CALLS\n#T2:f\n#T3:g\nL|T2|T1|T3";
    let decoded = decode(text, &CodecConfig::default()).unwrap();
    assert_eq!(decoded.graph.links, vec![Link::new("f", "CALLS", "g")]);
}

#[test]
fn test_decode_unescapes_terms() {
    let text = "#T1:two\\nlines\nN|T1|";
    let decoded = decode(text, &CodecConfig::default()).unwrap();
    assert_eq!(decoded.graph.nodes[0].id, "two\nlines");
}

#[test]
fn test_decode_unknown_code() {
    let err = decode("#T1:a\nN|T1|T1=T9", &CodecConfig::default()).unwrap_err();
    assert!(matches!(err, KgError::UnknownCode { ref code, line: 2 } if code == "T9"));
}

#[test]
fn test_decode_duplicate_code() {
    let err = decode("#T1:a\n#T1:b", &CodecConfig::default()).unwrap_err();
    assert!(matches!(err, KgError::DuplicateCode { line: 2, .. }));
}

#[test]
fn test_decode_bad_link_arity() {
    let err = decode("#T1:a\nL|T1|T1", &CodecConfig::default()).unwrap_err();
    assert!(matches!(err, KgError::MalformedLine { line: 2, .. }));
}

#[test]
fn test_decode_stray_line() {
    let err = decode("#T1:a\nX|T1", &CodecConfig::default()).unwrap_err();
    assert!(matches!(err, KgError::MalformedLine { line: 2, .. }));
}

#[test]
fn test_decode_unbalanced_value() {
    for bad in ["N|T1|T1=[T1", "N|T1|T1={T1}", "N|T1|T1=T1]", "N|T1|T1=", "N|T1|T1"] {
        let text = format!("#T1:a\n{bad}");
        assert!(decode(&text, &CodecConfig::default()).is_err(), "{bad}");
    }
}

#[test]
fn test_decode_skips_blank_and_comment_lines() {
    let text = "# Compressed Knowledge Graph\n\n#T1:a\n# note: ignored\nN|T1|";
    let decoded = decode(text, &CodecConfig::default()).unwrap();
    assert_eq!(decoded.graph.nodes.len(), 1);
    assert_eq!(decoded.codebook.len(), 1);
}

// ========== Pipeline ==========

#[test]
fn test_pipeline_stats() {
    let compactor = GraphCompactor::new();
    let result = compactor.compress(&single_node_graph()).unwrap();
    assert_eq!(result.term_count(), 6);
    assert_eq!(result.node_count, 1);
    assert_eq!(result.link_count, 0);
    assert_eq!(result.compressed_len, result.output.len());
    assert!(result.original_len > 0);
    assert!((result.ratio() - result.compressed_len as f64 / result.original_len as f64).abs() < 1e-9);
}

#[test]
fn test_pipeline_rejects_bad_prefix() {
    let err = GraphCompactor::with_config(CodecConfig::default().with_code_prefix('|')).unwrap_err();
    assert!(matches!(err, KgError::InvalidConfig(_)));
}

#[test]
fn test_pipeline_empty_graph() {
    let compactor = GraphCompactor::with_config(bare_config()).unwrap();
    let result = compactor.compress(&Graph::new()).unwrap();
    assert_eq!(result.output, "");
    assert_eq!(result.term_count(), 0);
}

#[test]
fn test_pipeline_decompress() {
    let compactor = GraphCompactor::new();
    let result = compactor.compress(&single_node_graph()).unwrap();
    let decoded = compactor.decompress(&result.output).unwrap();
    assert_eq!(decoded.graph, single_node_graph());
}
