//! Macula Greek XML parsing
//!
//! Reads a Macula "nodes" document into a [`Document`]: one [`Sentence`]
//! per `Sentence` child of the root element, each holding the syntax tree
//! found under its first `Tree/Node`.
//!
//! The reader is streaming (`quick-xml`), but a whole document is kept in
//! memory once parsed. Files ending in `.gz` are decompressed on the fly.

use crate::tree::{Document, Node, NodeId, Sentence, Tree};
use flate2::read::MultiGzDecoder;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Error during Macula XML parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Parse error at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn malformed(position: u64, message: impl Into<String>) -> ParseError {
    ParseError::Malformed {
        position,
        message: message.into(),
    }
}

/// Macula XML reader over any buffered source
pub struct MaculaReader<R: BufRead> {
    reader: Reader<R>,
}

impl MaculaReader<Box<dyn BufRead>> {
    /// Create a reader from a file path
    ///
    /// Files ending in `.gz` are read through a gzip decoder.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let is_gzipped = path.extension().is_some_and(|ext| ext == "gz");
        let input: Box<dyn BufRead> = if is_gzipped {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::from_reader(input))
    }
}

impl<'a> MaculaReader<&'a [u8]> {
    /// Create a reader from a string
    pub fn from_string(text: &'a str) -> Self {
        Self::from_reader(text.as_bytes())
    }
}

impl<R: BufRead> MaculaReader<R> {
    pub fn from_reader(input: R) -> Self {
        Self {
            reader: Reader::from_reader(input),
        }
    }

    /// Parse the whole input into a document
    pub fn read_document(mut self) -> Result<Document, ParseError> {
        let mut builder = DocumentBuilder::default();
        let mut buf = Vec::new();

        loop {
            let event = self
                .reader
                .read_event_into(&mut buf)
                .map_err(|e| malformed(self.reader.buffer_position() as u64, e.to_string()))?;
            let position = self.reader.buffer_position() as u64;

            match event {
                Event::Start(e) => builder.open(&e, position)?,
                Event::Empty(e) => {
                    builder.open(&e, position)?;
                    builder.close(position)?;
                }
                Event::End(_) => builder.close(position)?,
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| malformed(position, e.to_string()))?;
                    builder.text(&text, position)?;
                }
                Event::CData(c) => {
                    let bytes = c.into_inner();
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|e| malformed(position, e.to_string()))?;
                    builder.text(text, position)?;
                }
                Event::Eof => return builder.finish(position),
                // Declarations, comments, processing instructions, doctypes
                _ => {}
            }

            buf.clear();
        }
    }
}

/// Parse a document held in memory
pub fn parse_document(text: &str) -> Result<Document, ParseError> {
    MaculaReader::from_string(text).read_document()
}

/// Parse a document from a file (plain or gzipped)
pub fn read_document(path: &Path) -> Result<Document, ParseError> {
    MaculaReader::from_file(path)?.read_document()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FrameKind {
    Root,
    Sentence,
    /// A structural `Node` that belongs to the sentence tree being built
    Node(NodeId),
    /// Anything else; its content is not part of any tree
    Passive,
}

#[derive(Debug)]
struct Frame {
    name: Vec<u8>,
    kind: FrameKind,
    has_child: bool,
}

/// Event-driven document assembly
#[derive(Debug, Default)]
struct DocumentBuilder {
    stack: Vec<Frame>,
    document: Document,
    sentence: Option<Sentence>,
    /// True while inside the tree root of the current sentence
    capturing: bool,
    seen_root: bool,
}

impl DocumentBuilder {
    fn open(&mut self, e: &BytesStart, position: u64) -> Result<(), ParseError> {
        let name = e.name().as_ref().to_vec();

        let kind = match self.stack.len() {
            0 => {
                if self.seen_root {
                    return Err(malformed(position, "multiple root elements"));
                }
                self.seen_root = true;
                FrameKind::Root
            }
            1 if name == b"Sentence" => {
                self.sentence = Some(Sentence {
                    reference: attribute(e, b"ref", position)?,
                    tree: None,
                });
                FrameKind::Sentence
            }
            _ => self.open_nested(&name, e, position)?,
        };

        if let Some(parent) = self.stack.last_mut() {
            parent.has_child = true;
        }
        self.stack.push(Frame {
            name,
            kind,
            has_child: false,
        });
        Ok(())
    }

    fn open_nested(
        &mut self,
        name: &[u8],
        e: &BytesStart,
        position: u64,
    ) -> Result<FrameKind, ParseError> {
        if name != b"Node" {
            return Ok(FrameKind::Passive);
        }
        let (Some(sentence), Some(parent)) = (self.sentence.as_mut(), self.stack.last()) else {
            return Ok(FrameKind::Passive);
        };

        if self.capturing {
            if let (FrameKind::Node(parent_id), Some(tree)) = (parent.kind, sentence.tree.as_mut()) {
                let id = tree.add_node(node_from_start(e, position)?);
                tree.set_parent(id, parent_id);
                return Ok(FrameKind::Node(id));
            }
            return Ok(FrameKind::Passive);
        }

        if sentence.tree.is_none() && parent.name == b"Tree" {
            let mut tree = Tree::new();
            let id = tree.add_node(node_from_start(e, position)?);
            sentence.tree = Some(tree);
            self.capturing = true;
            return Ok(FrameKind::Node(id));
        }

        Ok(FrameKind::Passive)
    }

    fn close(&mut self, position: u64) -> Result<(), ParseError> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| malformed(position, "closing tag without an open element"))?;

        match frame.kind {
            FrameKind::Sentence => {
                if let Some(sentence) = self.sentence.take() {
                    self.document.sentences.push(sentence);
                }
                self.capturing = false;
            }
            FrameKind::Node(id) => {
                let is_tree_root = self
                    .sentence
                    .as_ref()
                    .and_then(|s| s.tree.as_ref())
                    .is_some_and(|tree| tree.root_id == Some(id));
                if is_tree_root {
                    self.capturing = false;
                }
            }
            FrameKind::Root | FrameKind::Passive => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str, position: u64) -> Result<(), ParseError> {
        let Some(frame) = self.stack.last() else {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(malformed(position, "text outside the root element"));
        };

        // Only text before the first child element belongs to a node
        if let (FrameKind::Node(id), false) = (frame.kind, frame.has_child) {
            let node = self
                .sentence
                .as_mut()
                .and_then(|s| s.tree.as_mut())
                .and_then(|tree| tree.get_node_mut(id));
            if let Some(node) = node {
                node.text.get_or_insert_with(String::new).push_str(text);
            }
        }
        Ok(())
    }

    fn finish(self, position: u64) -> Result<Document, ParseError> {
        if let Some(frame) = self.stack.last() {
            return Err(malformed(
                position,
                format!("unclosed element <{}>", String::from_utf8_lossy(&frame.name)),
            ));
        }
        if !self.seen_root {
            return Err(malformed(position, "no root element"));
        }
        Ok(self.document)
    }
}

/// Read a single attribute value
fn attribute(e: &BytesStart, key: &[u8], position: u64) -> Result<Option<String>, ParseError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(position, err.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|err| malformed(position, err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Build a tree node from a `Node` start tag
fn node_from_start(e: &BytesStart, position: u64) -> Result<Node, ParseError> {
    let mut node = Node::default();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(position, err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(position, err.to_string()))?
            .into_owned();

        match attr.key.as_ref() {
            b"Cat" => node.cat = Some(value),
            b"nodeId" => node.node_id = Some(value),
            b"ref" => node.reference = Some(value),
            b"UnicodeLemma" => node.lemma = Some(value),
            b"English" => node.gloss = Some(value),
            b"StrongNumber" => node.strong = Some(value),
            b"FunctionalTag" => node.morph = Some(value),
            b"xml:id" => node.word_id = Some(value),
            _ => {}
        }
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SENTENCES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Sentences>
  <Sentence ref="JHN 1:1">
    <Trees>
      <Tree>
        <Node Cat="CL" nodeId="430010010010010">
          <Node Cat="ADV" nodeId="430010010010020">
            <Node Cat="prep" nodeId="430010010010030" ref="JHN 1:1!1" UnicodeLemma="ἐν" English="In" StrongNumber="1722" FunctionalTag="PREP" xml:id="n43001001001">Ἐν</Node>
          </Node>
          <Node Cat="V" nodeId="430010010020020">
            <Node Cat="verb" nodeId="430010010020030" ref="JHN 1:1!2" UnicodeLemma="εἰμί" English="was" StrongNumber="1510" FunctionalTag="V-IAI-3S" xml:id="n43001001002">ἦν</Node>
          </Node>
        </Node>
      </Tree>
    </Trees>
  </Sentence>
  <Sentence ref="JHN 1:2">
    <Trees>
      <Tree>
        <Node Cat="noun" nodeId="430010020010010" ref="JHN 1:2!1" English="this &amp; that">οὗτος</Node>
      </Tree>
    </Trees>
  </Sentence>
</Sentences>
"#;

    #[test]
    fn test_parse_sentences() {
        let doc = parse_document(TWO_SENTENCES).unwrap();

        assert_eq!(doc.sentences.len(), 2);
        assert_eq!(doc.sentences[0].reference.as_deref(), Some("JHN 1:1"));
        assert_eq!(doc.sentences[1].reference.as_deref(), Some("JHN 1:2"));

        let tree = doc.sentences[0].tree.as_ref().unwrap();
        assert_eq!(tree.len(), 5);
        let root = tree.root().unwrap();
        assert!(root.is_clause());
        assert_eq!(root.children.len(), 2);
        assert_eq!(doc.node_count(), 6);
    }

    #[test]
    fn test_parse_word_attributes() {
        let doc = parse_document(TWO_SENTENCES).unwrap();
        let tree = doc.sentences[0].tree.as_ref().unwrap();
        let word = &tree.nodes[2];

        assert!(word.is_word());
        assert_eq!(word.trimmed_text(), Some("Ἐν"));
        assert_eq!(word.node_id.as_deref(), Some("430010010010030"));
        assert_eq!(word.reference.as_deref(), Some("JHN 1:1!1"));
        assert_eq!(word.lemma.as_deref(), Some("ἐν"));
        assert_eq!(word.gloss.as_deref(), Some("In"));
        assert_eq!(word.strong.as_deref(), Some("1722"));
        assert_eq!(word.morph.as_deref(), Some("PREP"));
        assert_eq!(word.word_id.as_deref(), Some("n43001001001"));
        assert_eq!(word.parent, Some(1));
    }

    #[test]
    fn test_entities_unescaped() {
        let doc = parse_document(TWO_SENTENCES).unwrap();
        let tree = doc.sentences[1].tree.as_ref().unwrap();
        assert_eq!(tree.nodes[0].gloss.as_deref(), Some("this & that"));
        assert!(tree.nodes[0].is_word());
    }

    #[test]
    fn test_only_first_tree_node_is_used() {
        let xml = r#"<Sentences><Sentence ref="A">
            <Trees>
              <Tree><Node Cat="noun" nodeId="1" ref="A!1">πρῶτος</Node></Tree>
              <Tree><Node Cat="noun" nodeId="2" ref="A!2">δεύτερος</Node></Tree>
            </Trees>
        </Sentence></Sentences>"#;

        let doc = parse_document(xml).unwrap();
        let tree = doc.sentences[0].tree.as_ref().unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.nodes[0].node_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_non_node_children_are_not_structural() {
        let xml = r#"<Sentences><Sentence><Tree>
            <Node Cat="np" nodeId="1">
              <Note><Node Cat="noun" nodeId="2">κρυπτός</Node></Note>
              <Node Cat="noun" nodeId="3">φανερός</Node>
            </Node>
        </Tree></Sentence></Sentences>"#;

        let doc = parse_document(xml).unwrap();
        let tree = doc.sentences[0].tree.as_ref().unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.nodes[1].node_id.as_deref(), Some("3"));
        assert_eq!(tree.nodes[0].children, vec![1]);
    }

    #[test]
    fn test_text_after_child_is_ignored() {
        let xml = r#"<Sentences><Sentence><Tree>
            <Node Cat="noun" nodeId="1"><Milestone/>ὕστερον</Node>
        </Tree></Sentence></Sentences>"#;

        let doc = parse_document(xml).unwrap();
        let node = &doc.sentences[0].tree.as_ref().unwrap().nodes[0];
        assert!(node.trimmed_text().is_none());
        assert!(!node.is_word());
    }

    #[test]
    fn test_sentence_without_tree() {
        let xml = r#"<Sentences><Sentence ref="X 1:1"><Trees/></Sentence></Sentences>"#;
        let doc = parse_document(xml).unwrap();

        assert_eq!(doc.sentences.len(), 1);
        assert!(doc.sentences[0].tree.is_none());
    }

    #[test]
    fn test_nested_sentences_are_not_scopes() {
        let xml = r#"<Book><Chapter><Sentence ref="X"/></Chapter></Book>"#;
        let doc = parse_document(xml).unwrap();
        assert!(doc.sentences.is_empty());
    }

    #[test]
    fn test_malformed_mismatched_tag() {
        let xml = "<Sentences><Sentence></Sentences>";
        assert!(matches!(
            parse_document(xml),
            Err(ParseError::Malformed { .. })
        ));
    }

    #[test]
    fn test_malformed_unclosed() {
        let xml = "<Sentences><Sentence ref=\"A\">";
        let err = parse_document(xml).unwrap_err();
        assert!(err.to_string().contains("unclosed element <Sentence>"));
    }

    #[test]
    fn test_malformed_empty_input() {
        let err = parse_document("   ").unwrap_err();
        assert!(err.to_string().contains("no root element"));
    }

    #[test]
    fn test_malformed_two_roots() {
        let err = parse_document("<a/><b/>").unwrap_err();
        assert!(err.to_string().contains("multiple root elements"));
    }

    #[test]
    fn test_malformed_trailing_text() {
        let err = parse_document("<a/>junk").unwrap_err();
        assert!(err.to_string().contains("text outside the root element"));
    }

    #[cfg(test)]
    mod files {
        use super::*;
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::fs;
        use std::io::Write;
        use tempfile::tempdir;

        #[test]
        fn test_read_plain_file() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("04-john.xml");
            fs::write(&path, TWO_SENTENCES).unwrap();

            let doc = read_document(&path).unwrap();
            assert_eq!(doc.sentences.len(), 2);
        }

        #[test]
        fn test_read_gzipped_file() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("04-john.xml.gz");
            let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
            encoder.write_all(TWO_SENTENCES.as_bytes()).unwrap();
            encoder.finish().unwrap();

            let doc = read_document(&path).unwrap();
            assert_eq!(doc.sentences.len(), 2);
            assert_eq!(doc.node_count(), 6);
        }

        #[test]
        fn test_missing_file() {
            let dir = tempdir().unwrap();
            let result = read_document(&dir.path().join("missing.xml"));
            assert!(matches!(result, Err(ParseError::Io(_))));
        }
    }
}
