// ABOUTME: Generic XML element tree built on quick-xml.
// ABOUTME: Reads namespace-resolved documents and writes the canonical pretty form.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};

use crate::error::Error;

/// One element of a parsed document.
///
/// `namespace` holds the resolved namespace URI on the read side; on the
/// write side, callers that need an `xmlns` declaration push it as an
/// ordinary attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }
}

/// Parses a document into its root element.
///
/// Character data is concatenated per element with surrounding whitespace
/// trimmed; declarations, comments, and processing instructions are skipped;
/// `xmlns` attributes are consumed into the resolved `namespace` field.
pub(crate) fn read_document(input: &str) -> Result<Element, Error> {
    let mut reader = NsReader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    loop {
        let (resolve, event) = reader.read_resolved_event().map_err(Error::xml)?;
        match event {
            Event::Start(start) => {
                stack.push(element_from_start(&resolve, &start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&resolve, &start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    parent.text.push_str(&text.unescape().map_err(Error::xml)?);
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    parent.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        // Content past the root element is not part of the document.
                        None => return Ok(element),
                    }
                }
            }
            Event::Eof => return Err(Error::Xml("unexpected end of document".to_string())),
            _ => {}
        }
    }
}

fn element_from_start(resolve: &ResolveResult, start: &BytesStart) -> Result<Element, Error> {
    let mut element = Element {
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        namespace: match resolve {
            ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
            _ => None,
        },
        ..Default::default()
    };
    for attribute in start.attributes() {
        let attribute = attribute.map_err(Error::xml)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attribute.unescape_value().map_err(Error::xml)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Writes a document: XML declaration, then the tree indented by four spaces,
/// one element per line.
pub(crate) fn write_document(root: &Element) -> Result<String, Error> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(Error::encode)?;
    write_element(&mut writer, root)?;
    String::from_utf8(writer.into_inner()).map_err(Error::encode)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), Error> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }
    writer
        .write_event(Event::Start(start))
        .map_err(Error::encode)?;
    if element.children.is_empty() {
        // An explicit text event, even an empty one, keeps the closing tag on
        // the same line: <title>text</title> and <item></item>, never <item/>.
        writer
            .write_event(Event::Text(BytesText::new(&element.text)))
            .map_err(Error::encode)?;
    } else {
        for child in &element.children {
            write_element(writer, child)?;
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(Error::encode)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_resolves_namespaces() {
        let root = read_document(
            r#"<root><group xmlns="http://example.com/ns"><title>t</title></group></root>"#,
        )
        .unwrap();
        assert_eq!(root.name, "root");
        assert_eq!(root.namespace, None);
        let group = &root.children[0];
        assert_eq!(group.namespace.as_deref(), Some("http://example.com/ns"));
        // xmlns itself is not kept as an attribute.
        assert!(group.attributes.is_empty());
        assert_eq!(group.children[0].namespace.as_deref(), Some("http://example.com/ns"));
    }

    #[test]
    fn test_read_collects_attributes_and_text() {
        let root =
            read_document(r#"<a href="x" rel="nofollow">hello &amp; goodbye</a>"#).unwrap();
        assert_eq!(root.attr("href"), Some("x"));
        assert_eq!(root.attr("rel"), Some("nofollow"));
        assert_eq!(root.text, "hello & goodbye");
    }

    #[test]
    fn test_read_accepts_cdata() {
        let root = read_document("<a><![CDATA[1 < 2]]></a>").unwrap();
        assert_eq!(root.text, "1 < 2");
    }

    #[test]
    fn test_read_rejects_malformed_input() {
        assert!(matches!(read_document("<a><b></a>"), Err(Error::Xml(_))));
        assert!(matches!(read_document(""), Err(Error::Xml(_))));
    }

    #[test]
    fn test_write_pretty_form() {
        let mut root = Element::new("root");
        root.set_attr("version", "1");
        let mut title = Element::new("title");
        title.text = "a & b".to_string();
        root.children.push(title);
        root.children.push(Element::new("empty"));

        let written = write_document(&root).unwrap();
        assert_eq!(
            written,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <root version=\"1\">\n    <title>a &amp; b</title>\n    <empty></empty>\n</root>"
        );
    }

    #[test]
    fn test_write_read_round_trip() {
        let mut root = Element::new("root");
        let mut child = Element::new("child");
        child.set_attr("k", "v");
        child.text = "text".to_string();
        root.children.push(child);

        let reread = read_document(&write_document(&root).unwrap()).unwrap();
        assert_eq!(reread, root);
    }
}
