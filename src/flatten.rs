//! Tree flattening
//!
//! Walks a sentence tree top-down and emits one [`Word`] per leaf, tagged
//! with the clause and phrase in effect where the leaf was reached:
//!
//! - A `cl` node starts a new clause (its own `nodeId`), and each of its
//!   immediate children starts a new phrase (the child's `nodeId`).
//! - Any other inner node passes its context through unchanged.
//! - Leaves before any clause get no clause or phrase.
//!
//! Output is in pre-order, not yet in reference order.

use crate::tree::{Document, NodeId, Tree};
use crate::word::Word;

/// Clause/phrase identifiers active at a point of the descent
#[derive(Debug, Clone, Copy, Default)]
struct Context<'t> {
    clause_id: Option<&'t str>,
    phrase_id: Option<&'t str>,
}

/// Flatten one sentence tree
pub fn flatten_sentence(tree: &Tree, sentence_id: Option<&str>) -> Vec<Word> {
    let mut words = Vec::new();
    let Some(root_id) = tree.root_id else {
        return words;
    };

    // Worklist of (node, context); children are pushed in reverse so they
    // are popped in document order.
    let mut stack: Vec<(NodeId, Context)> = vec![(root_id, Context::default())];

    while let Some((node_id, context)) = stack.pop() {
        let Some(node) = tree.get_node(node_id) else {
            continue;
        };

        if node.is_word() {
            let text = node.trimmed_text().unwrap_or_default();
            words.push(Word {
                sentence_id: sentence_id.map(str::to_string),
                clause_id: context.clause_id.map(str::to_string),
                phrase_id: context.phrase_id.map(str::to_string),
                word_id: node.word_id.clone(),
                reference: node.reference.clone(),
                text: text.to_string(),
                lemma: node.lemma.clone(),
                gloss: node.gloss.clone(),
                strong: node.strong.clone(),
                morph: node.morph.clone(),
            });
            continue;
        }

        if node.is_clause() {
            let clause_id = node.node_id.as_deref();
            for &child_id in node.children.iter().rev() {
                let phrase_id = tree.get_node(child_id).and_then(|c| c.node_id.as_deref());
                stack.push((
                    child_id,
                    Context {
                        clause_id,
                        phrase_id,
                    },
                ));
            }
        } else {
            for &child_id in node.children.iter().rev() {
                stack.push((child_id, context));
            }
        }
    }

    words
}

/// Flatten every sentence of a document, concatenating the results
pub fn flatten_document(document: &Document) -> Vec<Word> {
    document
        .sentences
        .iter()
        .filter_map(|sentence| {
            sentence
                .tree
                .as_ref()
                .map(|tree| flatten_sentence(tree, sentence.reference.as_deref()))
        })
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macula::parse_document;
    use crate::tree::Node;

    fn word_node(node_id: &str, text: &str) -> Node {
        let mut node = Node::new(0, "noun", node_id);
        node.text = Some(text.to_string());
        node.reference = Some(format!("REF!{}", node_id));
        node
    }

    fn add_child(tree: &mut Tree, parent: NodeId, node: Node) -> NodeId {
        let id = tree.add_node(node);
        tree.set_parent(id, parent);
        id
    }

    #[test]
    fn test_leaves_without_clause_have_no_context() {
        let mut tree = Tree::new();
        let root = tree.add_node(Node::new(0, "S", "1"));
        add_child(&mut tree, root, word_node("2", "ἀμήν"));

        let words = flatten_sentence(&tree, Some("S1"));
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].sentence_id.as_deref(), Some("S1"));
        assert_eq!(words[0].clause_id, None);
        assert_eq!(words[0].phrase_id, None);
        assert_eq!(words[0].text, "ἀμήν");
    }

    #[test]
    fn test_clause_children_start_phrases() {
        let mut tree = Tree::new();
        let cl = tree.add_node(Node::new(0, "CL", "10"));
        let np = add_child(&mut tree, cl, Node::new(0, "np", "11"));
        let det = add_child(&mut tree, np, Node::new(0, "adjp", "12"));
        add_child(&mut tree, det, word_node("13", "ὁ"));
        add_child(&mut tree, np, word_node("14", "λόγος"));
        add_child(&mut tree, cl, word_node("15", "ἦν"));

        let words = flatten_sentence(&tree, None);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["ὁ", "λόγος", "ἦν"]);

        // Deep descendants inherit the phrase of the clause's child
        assert_eq!(words[0].clause_id.as_deref(), Some("10"));
        assert_eq!(words[0].phrase_id.as_deref(), Some("11"));
        assert_eq!(words[1].phrase_id.as_deref(), Some("11"));
        // A word directly under the clause is its own phrase
        assert_eq!(words[2].clause_id.as_deref(), Some("10"));
        assert_eq!(words[2].phrase_id.as_deref(), Some("15"));
    }

    #[test]
    fn test_nested_clause_overrides_context() {
        let mut tree = Tree::new();
        let outer = tree.add_node(Node::new(0, "cl", "1"));
        let obj = add_child(&mut tree, outer, Node::new(0, "O", "2"));
        let inner = add_child(&mut tree, obj, Node::new(0, "cl", "3"));
        let verb = add_child(&mut tree, inner, Node::new(0, "V", "4"));
        add_child(&mut tree, verb, word_node("5", "πιστεύειν"));
        add_child(&mut tree, obj, word_node("6", "αὐτόν"));

        let words = flatten_sentence(&tree, None);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].clause_id.as_deref(), Some("3"));
        assert_eq!(words[0].phrase_id.as_deref(), Some("4"));
        // Context is restored after leaving the inner clause
        assert_eq!(words[1].clause_id.as_deref(), Some("1"));
        assert_eq!(words[1].phrase_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_leaf_count_matches_text_leaves() {
        let mut tree = Tree::new();
        let cl = tree.add_node(Node::new(0, "cl", "1"));
        add_child(&mut tree, cl, word_node("2", "α"));
        // No text: not a word
        add_child(&mut tree, cl, Node::new(0, "noun", "3"));
        // Whitespace only: not a word
        add_child(&mut tree, cl, word_node("4", "  "));
        let np = add_child(&mut tree, cl, word_node("5", "β"));
        // Has text and a child: inner node, not a word
        add_child(&mut tree, np, word_node("6", "γ"));

        let words = flatten_sentence(&tree, None);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["α", "γ"]);
        assert_eq!(words[1].phrase_id.as_deref(), Some("5"));
    }

    #[test]
    fn test_empty_tree() {
        assert!(flatten_sentence(&Tree::new(), Some("X")).is_empty());
    }

    #[test]
    fn test_flatten_document_concatenates_sentences() {
        let xml = r#"<Sentences>
          <Sentence ref="S1"><Tree>
            <Node Cat="cl" nodeId="a"><Node Cat="noun" nodeId="a1" ref="X 1:1!1">α</Node></Node>
          </Tree></Sentence>
          <Sentence ref="S2"/>
          <Sentence ref="S3"><Tree>
            <Node Cat="cl" nodeId="a"><Node Cat="noun" nodeId="a1" ref="X 1:2!1">β</Node></Node>
          </Tree></Sentence>
        </Sentences>"#;

        let doc = parse_document(xml).unwrap();
        let words = flatten_document(&doc);

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].sentence_id.as_deref(), Some("S1"));
        assert_eq!(words[1].sentence_id.as_deref(), Some("S3"));
        // Raw identifiers may repeat within a document
        assert_eq!(words[0].clause_id, words[1].clause_id);
    }
}
