//! 极简 XML 元素树：只保留元素名、按顺序排列的属性和子元素，忽略文本与注释。

use std::io::Write;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};

use crate::IoError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 追加属性，保持写入顺序。
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((key.into(), value.into()));
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v.as_str()))
    }

    /// 第一个同名子元素。
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }
}

fn malformed(message: impl Into<String>) -> IoError {
    IoError::MalformedDocument(message.into())
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, IoError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|err| malformed(format!("元素名不是合法的 UTF-8: {err}")))?
        .to_string();
    let mut element = XmlElement::new(name);
    for attribute in start.attributes() {
        let attribute =
            attribute.map_err(|err| malformed(format!("元素 {} 属性无效: {err}", element.name)))?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|err| malformed(format!("属性名不是合法的 UTF-8: {err}")))?
            .to_string();
        let value = attribute
            .unescape_value()
            .map_err(|err| malformed(format!("元素 {} 属性 {key} 无效: {err}", element.name)))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// 解析 XML 文本，返回顶层元素列表。
pub fn parse(text: &str) -> Result<Vec<XmlElement>, IoError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut roots = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|err| malformed(format!("XML 解析失败（偏移 {}）: {err}", reader.buffer_position())))?;
        match event {
            Event::Start(start) => stack.push(element_from_start(&start)?),
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => roots.push(element),
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("多余的结束标签"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => roots.push(element),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("元素 {} 未闭合", open.name)));
    }
    Ok(roots)
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), IoError> {
    writer
        .write_event(event)
        .map_err(|err| IoError::Stream(std::io::Error::other(err.to_string())))
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<(), IoError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

/// 写出带 XML 声明、单个注释和一个根元素的文档，子元素按一个空格缩进。
pub fn write<W: Write>(out: W, comment: &str, root: &XmlElement) -> Result<(), IoError> {
    let mut writer = Writer::new_with_indent(out, b' ', 1);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;
    emit(&mut writer, Event::Comment(BytesText::from_escaped(comment)))?;
    write_element(&mut writer, root)?;
    writer
        .into_inner()
        .write_all(b"\n")
        .map_err(IoError::Stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_and_empty_elements() {
        let text = r#"<?xml version="1.0"?>
<!-- comment -->
<Root a="1" b="two &amp; three">
  some text
  <Empty/>
  <Inner x="y"><Leaf/></Inner>
</Root>"#;
        let roots = parse(text).unwrap();
        assert_eq!(roots.len(), 1);
        let root = &roots[0];
        assert_eq!(root.name, "Root");
        assert_eq!(root.attribute("b"), Some("two & three"));
        assert_eq!(root.attribute("missing"), None);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.child("Inner").unwrap().children[0].name, "Leaf");
    }

    #[test]
    fn rejects_broken_markup() {
        assert!(matches!(
            parse("<Root><Open></Root>"),
            Err(IoError::MalformedDocument(_))
        ));
        assert!(matches!(parse("<Root>"), Err(IoError::MalformedDocument(_))));
    }

    #[test]
    fn write_then_parse_preserves_tree() {
        let mut root = XmlElement::new("Root");
        root.set_attribute("quote", "a \"b\" <c>");
        let mut child = XmlElement::new("Child");
        child.set_attribute("k", "v");
        root.children.push(child);
        root.children.push(XmlElement::new("Empty"));

        let mut buffer = Vec::new();
        write(&mut buffer, " hello ", &root).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(text.contains("<!-- hello -->"));
        assert!(text.contains("\n <Child k=\"v\"/>"));

        assert_eq!(parse(&text).unwrap(), vec![root]);
    }
}
