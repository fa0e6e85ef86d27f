//! Small wrapper around the quick-xml event writer for building parts.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use slidev_core::{Error, Result};
use std::io::Cursor;

/// An XML part under construction.
pub(crate) struct XmlPart {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlPart {
    /// Start a part with the standalone UTF-8 declaration.
    pub fn new() -> Result<Self> {
        let mut part = Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        };
        part.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(part)
    }

    /// Open an element.
    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.event(Event::Start(element(name, attrs)))
    }

    /// Write a self-closing element.
    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.event(Event::Empty(element(name, attrs)))
    }

    /// Close an element.
    pub fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Write an element holding escaped text only.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name, &[])?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// Finish the part and return its text.
    pub fn finish(self) -> Result<String> {
        let bytes = self.writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| Error::XmlError(format!("Invalid UTF-8 in part: {}", e)))
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(e.to_string()))
    }
}

fn element<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
    let mut elem = BytesStart::new(name);
    for &attr in attrs {
        elem.push_attribute(attr);
    }
    elem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_text_and_attributes() {
        let mut part = XmlPart::new().unwrap();
        part.start("root", &[("name", "a \"quoted\" <value>")]).unwrap();
        part.text_element("t", "fn f() -> Vec<&str>").unwrap();
        part.empty("leaf", &[]).unwrap();
        part.end("root").unwrap();
        let xml = part.finish().unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(xml.contains("name=\"a &quot;quoted&quot; &lt;value&gt;\""));
        assert!(xml.contains("<t>fn f() -&gt; Vec&lt;&amp;str&gt;</t>"));
        assert!(xml.contains("<leaf/>"));
    }
}
