use super::AnalyzerConfig;
use super::AnnotatedNode;
use super::RankOrder;
use super::TreeAnalyzer;
use super::rank;
use ds_core::DomspyError;
use ds_core::DomspyResult;
use ds_core::LogLevel;
use ds_core::MemoryLogger;
use ds_core::NullLogger;
use ds_dom::Document;
use ds_dom::HostTree;
use ds_dom::NodeId;
use ds_dom::NodeKind;
use ds_html::HtmlParser;
use proptest::prelude::*;
use std::sync::Arc;

const PAGE: &str = concat!(
    "<!DOCTYPE html>",
    "<html lang=\"en\">",
    "<head><title>Shop</title></head>",
    "<body>\n  ",
    "<nav><a href=\"/\">Home</a></nav>\n  ",
    "<main><ul><li>One</li><li>Two</li><li>Three <b>!</b></li></ul><!-- promo --></main>\n",
    "<?php echo 1 ?>",
    "</body>",
    "</html>"
);

fn analyzer() -> TreeAnalyzer {
    TreeAnalyzer::new(AnalyzerConfig::default(), Arc::new(NullLogger))
}

fn parse(input: &str) -> Document {
    match HtmlParser.parse(input) {
        Ok(doc) => doc,
        Err(error) => panic!("{error}"),
    }
}

fn find<'a>(node: &'a AnnotatedNode, name: &str) -> &'a AnnotatedNode {
    match node.descendants().find(|candidate| candidate.name == name) {
        Some(found) => found,
        None => panic!("no `{name}` node in analysis"),
    }
}

fn assert_counts(node: &AnnotatedNode) {
    let expected = 1 + node
        .children
        .iter()
        .map(|child| child.subtree_node_count)
        .sum::<usize>();
    assert_eq!(node.subtree_node_count, expected, "count at {}", node.path);
    for child in &node.children {
        assert_counts(child);
    }
}

#[test]
fn document_root_emits_doctype_first() {
    let doc = parse(PAGE);
    // Depth ranking keeps sibling order, so construction order is visible.
    let analysis = analyzer().analyze_with_order(&doc, doc.root(), RankOrder::ByDepth);

    assert_eq!(analysis.kind, NodeKind::Document);
    assert_eq!(analysis.name, "#document");
    assert_eq!(analysis.path, "#document");

    let doctype = &analysis.children[0];
    assert_eq!(doctype.kind, NodeKind::Doctype);
    assert_eq!(doctype.name, "<!DOCTYPE>");
    assert_eq!(doctype.subtree_node_count, 1);
    assert_eq!(doctype.depth, 1);
    assert_eq!(doctype.path, "#document > <!DOCTYPE>");

    assert_eq!(analysis.children.len(), 2);
    assert_eq!(analysis.children[1].name, "html");
}

#[test]
fn counts_cover_retained_nodes_only() {
    let doc = parse(PAGE);
    let analysis = analyzer().analyze(&doc, doc.root());

    assert_counts(&analysis);
    assert_eq!(analysis.subtree_node_count, analysis.descendants().count());
    assert!(
        analysis
            .descendants()
            .all(|node| node.kind != NodeKind::ProcessingInstruction)
    );

    let ul = find(&analysis, "ul");
    // ul, 3 li, 3 text, b, "!" text
    assert_eq!(ul.subtree_node_count, 9);
}

#[test]
fn whitespace_text_is_excluded_and_text_is_trimmed() {
    let doc = parse("<p>\n   </p><p>  padded  </p>");
    let analysis = analyzer().analyze(&doc, doc.root());

    let texts = analysis
        .descendants()
        .filter(|node| node.kind == NodeKind::Text)
        .collect::<Vec<_>>();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].text.as_deref(), Some("padded"));
    assert_eq!(texts[0].subtree_node_count, 1);
    assert!(texts[0].is_leaf());
}

#[test]
fn comments_keep_raw_content() {
    let doc = parse("<div><!--  keep me  --></div>");
    let analysis = analyzer().analyze(&doc, doc.root());
    let comment = find(&analysis, "#comment");
    assert_eq!(comment.text.as_deref(), Some("  keep me  "));
    assert_eq!(comment.subtree_node_count, 1);
}

#[test]
fn paths_and_depths_follow_ancestors() {
    let doc = parse(PAGE);
    let analysis = analyzer().analyze(&doc, doc.root());

    let bold = find(&analysis, "b");
    assert_eq!(
        bold.path,
        "#document > html > body > main > ul > li > b"
    );
    assert_eq!(bold.depth, 6);
    assert_eq!(analysis.max_depth(), 7);
}

#[test]
fn ranks_children_by_subtree_size() {
    let doc = parse(PAGE);
    let analysis = analyzer().analyze_with_order(&doc, doc.root(), RankOrder::BySubtreeSize);

    for node in analysis.descendants() {
        for pair in node.children.windows(2) {
            assert!(pair[0].subtree_node_count >= pair[1].subtree_node_count);
        }
    }

    let body = find(&analysis, "body");
    assert_eq!(body.children[0].name, "main");
    // Path is fixed at construction, so reordering leaves it alone.
    assert_eq!(body.children[0].path, "#document > html > body > main");
}

#[test]
fn ranks_children_by_serialized_length() {
    let doc = parse("<div><i>a</i><section>much longer</section><b>bb</b></div>");
    let analysis =
        analyzer().analyze_with_order(&doc, doc.root(), RankOrder::BySerializedLength);

    let div = find(&analysis, "div");
    let names = div
        .children
        .iter()
        .map(|child| child.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["section", "b", "i"]);
    assert_eq!(div.children[0].serialized_length, "<section>much longer</section>".len());
}

#[test]
fn depth_order_keeps_encounter_order() {
    let doc = parse("<ul><li>a</li><li><b>b</b></li><li>c</li></ul>");
    let analysis = analyzer().analyze_with_order(&doc, doc.root(), RankOrder::ByDepth);

    let ul = find(&analysis, "ul");
    let texts = ul
        .children
        .iter()
        .map(|li| li.subtree_node_count)
        .collect::<Vec<_>>();
    assert_eq!(texts, vec![2, 3, 2]);
}

#[test]
fn reranking_never_changes_counts() {
    let doc = parse(PAGE);
    let mut analysis = analyzer().analyze_with_order(&doc, doc.root(), RankOrder::ByDepth);
    let mut before = analysis
        .descendants()
        .map(|node| (node.path.clone(), node.subtree_node_count))
        .collect::<Vec<_>>();

    rank(&mut analysis, RankOrder::BySerializedLength);
    rank(&mut analysis, RankOrder::BySubtreeSize);

    let mut after = analysis
        .descendants()
        .map(|node| (node.path.clone(), node.subtree_node_count))
        .collect::<Vec<_>>();
    before.sort();
    after.sort();
    assert_eq!(before, after);
    assert_counts(&analysis);
}

#[test]
fn absent_root_yields_empty_document() {
    let doc = Document::new();
    let analysis = analyzer().analyze(&doc, None);
    assert_eq!(analysis, AnnotatedNode::empty_document());
    assert_eq!(analysis.subtree_node_count, 1);
    assert!(analysis.children.is_empty());
}

#[test]
fn element_root_starts_its_own_path() {
    let doc = parse("<div id=outer><span>x</span></div>");
    let div = doc.elements_by_tag("div")[0];
    let analysis = analyzer().analyze(&doc, Some(div));

    assert_eq!(analysis.kind, NodeKind::Element);
    assert_eq!(analysis.path, "div");
    assert_eq!(analysis.depth, 0);
    assert_eq!(
        analysis.attributes.get("id").map(String::as_str),
        Some("outer")
    );
    assert_eq!(analysis.children[0].path, "div > span");
    assert_eq!(analysis.handle, Some(div));
}

#[test]
fn custom_separator_is_used_in_paths() {
    let doc = parse("<div><span>x</span></div>");
    let config = AnalyzerConfig {
        path_separator: "/".to_owned(),
        ..AnalyzerConfig::default()
    };
    let analysis = TreeAnalyzer::new(config, Arc::new(NullLogger)).analyze(&doc, doc.root());
    assert_eq!(find(&analysis, "span").path, "#document/div/span");
}

#[test]
fn empty_separator_is_rejected() {
    let config = AnalyzerConfig {
        path_separator: String::new(),
        ..AnalyzerConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(error) if error.code == "config.path_separator_empty"
    ));
    assert!(AnalyzerConfig::default().validate().is_ok());
}

/// Host wrapper that fails to describe one node, or only to read its text.
struct FlakyTree {
    inner: Document,
    broken: NodeId,
    unreadable_text: Option<NodeId>,
}

impl HostTree for FlakyTree {
    fn root(&self) -> Option<NodeId> {
        self.inner.root()
    }

    fn kind(&self, id: NodeId) -> DomspyResult<NodeKind> {
        if id == self.broken {
            return Err(DomspyError::new("test.broken", "node detached mid-read"));
        }
        self.inner.kind(id)
    }

    fn node_name(&self, id: NodeId) -> DomspyResult<String> {
        self.inner.node_name(id)
    }

    fn children(&self, id: NodeId) -> DomspyResult<Vec<NodeId>> {
        self.inner.children(id)
    }

    fn attributes(&self, id: NodeId) -> DomspyResult<Vec<(String, String)>> {
        self.inner.attributes(id)
    }

    fn text(&self, id: NodeId) -> DomspyResult<Option<String>> {
        if Some(id) == self.unreadable_text {
            return Err(DomspyError::new("test.broken", "text is unavailable"));
        }
        self.inner.text(id)
    }

    fn outer_html_len(&self, id: NodeId) -> Option<usize> {
        self.inner.outer_html_len(id)
    }
}

#[test]
fn failing_node_is_pruned_and_siblings_survive() {
    let doc = parse("<ul><li>a</li><li>b</li><li>c</li></ul>");
    let broken = doc.elements_by_tag("li")[1];
    let tree = FlakyTree {
        inner: doc,
        broken,
        unreadable_text: None,
    };
    let logger = Arc::new(MemoryLogger::new());
    let analyzer = TreeAnalyzer::new(AnalyzerConfig::default(), logger.clone());

    let analysis = analyzer.analyze(&tree, tree.root());
    let ul = find(&analysis, "ul");
    assert_eq!(ul.children.len(), 2);
    assert_eq!(ul.subtree_node_count, 5);
    assert!(logger.contains(LogLevel::Warn, "node detached mid-read"));
}

#[test]
fn unreadable_character_data_is_pruned_like_any_node() {
    let doc = parse("<div>kept<!-- lost --><!-- kept --></div>");
    let div = doc.elements_by_tag("div")[0];
    let children = match doc.children(div) {
        Ok(children) => children,
        Err(error) => panic!("{error}"),
    };
    let tree = FlakyTree {
        inner: doc,
        broken: NodeId::new(u32::MAX),
        unreadable_text: Some(children[1]),
    };
    let logger = Arc::new(MemoryLogger::new());
    let analyzer = TreeAnalyzer::new(AnalyzerConfig::default(), logger.clone());

    let analysis = analyzer.analyze(&tree, tree.root());
    let div = find(&analysis, "div");
    let texts = div
        .children
        .iter()
        .map(|child| (child.name.as_str(), child.text.as_deref()))
        .collect::<Vec<_>>();
    assert_eq!(texts, vec![("#text", Some("kept")), ("#comment", Some(" kept "))]);
    assert_eq!(div.subtree_node_count, 3);
    assert!(logger.contains(LogLevel::Warn, "text is unavailable"));
}

#[test]
fn serializes_with_analyzer_wire_names() {
    let doc = parse("<p class=x>hi</p>");
    let analysis = analyzer().analyze(&doc, doc.root());
    let value = match serde_json::to_value(&analysis) {
        Ok(value) => value,
        Err(error) => panic!("{error}"),
    };

    assert_eq!(value["tagName"], "#document");
    assert_eq!(value["nodes"], 3);
    assert_eq!(value["kind"], "document");
    let p = &value["_children"][0];
    assert_eq!(p["tagName"], "p");
    assert_eq!(p["attributes"]["class"], "x");
    assert_eq!(p["_children"][0]["text"], "hi");
}

#[test]
fn order_names_round_trip() {
    for order in [
        RankOrder::BySubtreeSize,
        RankOrder::ByDepth,
        RankOrder::BySerializedLength,
    ] {
        assert_eq!(RankOrder::from_name(order.as_str()), Some(order));
    }
    assert_eq!(
        RankOrder::from_name("by-serialized-length"),
        Some(RankOrder::BySerializedLength)
    );
    assert_eq!(RankOrder::from_name("width"), None);
}

#[derive(Debug, Clone)]
enum Shape {
    Element(&'static str, Vec<Shape>),
    Text(String),
    Comment(String),
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        "[a-z ]{0,6}".prop_map(Shape::Text),
        "[ \t\n]{1,3}".prop_map(Shape::Text),
        "[a-z]{0,4}".prop_map(Shape::Comment),
        prop::sample::select(vec!["span", "b", "img"])
            .prop_map(|tag| Shape::Element(tag, Vec::new())),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        (
            prop::sample::select(vec!["div", "section", "ul", "p"]),
            prop::collection::vec(inner, 0..5),
        )
            .prop_map(|(tag, children)| Shape::Element(tag, children))
    })
}

fn build(doc: &mut Document, parent: NodeId, shape: &Shape) -> DomspyResult<()> {
    match shape {
        Shape::Element(tag, children) => {
            let id = doc.append_element(parent, tag, Vec::new())?;
            for child in children {
                build(doc, id, child)?;
            }
        }
        Shape::Text(text) => {
            doc.append_text(parent, text)?;
        }
        Shape::Comment(text) => {
            doc.append_comment(parent, text)?;
        }
    }
    Ok(())
}

fn check_structure(node: &AnnotatedNode) -> Result<(), TestCaseError> {
    let sum = node
        .children
        .iter()
        .map(|child| child.subtree_node_count)
        .sum::<usize>();
    prop_assert_eq!(node.subtree_node_count, 1 + sum);

    if node.kind == NodeKind::Text {
        let text = node.text.as_deref().unwrap_or_default();
        prop_assert!(!text.is_empty());
        prop_assert_eq!(text, text.trim());
    }

    for child in &node.children {
        prop_assert_eq!(&child.path, &format!("{} > {}", node.path, child.name));
        prop_assert_eq!(child.depth, node.depth + 1);
        check_structure(child)?;
    }
    Ok(())
}

proptest! {
    #[test]
    fn analysis_invariants_hold_for_any_tree(shapes in prop::collection::vec(shape_strategy(), 0..4)) {
        let mut doc = Document::new();
        let html = doc.append_element(NodeId::DOCUMENT, "html", Vec::new());
        prop_assert!(html.is_ok());
        let html = html.unwrap_or(NodeId::DOCUMENT);
        for shape in &shapes {
            prop_assert!(build(&mut doc, html, shape).is_ok());
        }

        for order in [RankOrder::BySubtreeSize, RankOrder::ByDepth, RankOrder::BySerializedLength] {
            let analysis = analyzer().analyze_with_order(&doc, doc.root(), order);
            check_structure(&analysis)?;
            prop_assert_eq!(analysis.subtree_node_count, analysis.descendants().count());

            if order == RankOrder::BySubtreeSize {
                for node in analysis.descendants() {
                    for pair in node.children.windows(2) {
                        prop_assert!(pair[0].subtree_node_count >= pair[1].subtree_node_count);
                    }
                }
            }
        }
    }
}
