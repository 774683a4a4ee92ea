//! Revelation XML 文档树
//!
//! 把解密后的字节构造成一棵只读的元素树，供解析器遍历。
//! 构造过程使用显式栈，不依赖调用栈递归，任意嵌套深度的输入都只受内存限制。
//! 每个元素的文本包含其所有后代的文本。

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Result, RevtransError};

/// 文档根元素名
pub const ROOT_ELEMENT: &str = "revelationdata";

/// XML 元素
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    /// 文本片段，附带其出现时已有的子元素个数
    text: Vec<(usize, String)>,
    children: Vec<Element>,
}

enum Piece<'a> {
    Text(&'a str),
    Node(&'a Element),
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 元素及其全部后代的文本，按文档顺序拼接（未裁剪空白）
    ///
    /// `<name>a<b>x</b>c</name>` 的文本是 `axc`。
    pub fn text(&self) -> Cow<'_, str> {
        if self.children.is_empty() {
            return match self.text.as_slice() {
                [] => Cow::Borrowed(""),
                [(_, only)] => Cow::Borrowed(only),
                runs => Cow::Owned(runs.iter().map(|(_, t)| t.as_str()).collect()),
            };
        }

        let mut out = String::new();
        let mut pending = vec![Piece::Node(self)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Node(node) => pending.extend(node.pieces().into_iter().rev()),
            }
        }
        Cow::Owned(out)
    }

    /// 按文档顺序交错排列文本片段与子元素
    fn pieces(&self) -> Vec<Piece<'_>> {
        let mut pieces = Vec::with_capacity(self.text.len() + self.children.len());
        let mut runs = self.text.iter().peekable();

        for (index, child) in self.children.iter().enumerate() {
            while let Some((_, text)) = runs.next_if(|(at, _)| *at <= index) {
                pieces.push(Piece::Text(text));
            }
            pieces.push(Piece::Node(child));
        }
        pieces.extend(runs.map(|(_, text)| Piece::Text(text)));
        pieces
    }

    fn push_text(&mut self, text: &str) {
        let at = self.children.len();
        match self.text.last_mut() {
            Some((last, run)) if *last == at => run.push_str(text),
            _ => self.text.push((at, text.to_string())),
        }
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// 第一个名为 `name` 的直接子元素
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// 所有名为 `name` 的直接子元素，保持文档顺序
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl DoubleEndedIterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| malformed(format!("invalid element name: {e}")))?
            .to_string();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| malformed(format!("invalid attribute in <{name}>: {e}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| malformed(format!("invalid attribute name in <{name}>: {e}")))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| malformed(format!("invalid attribute value in <{name}>: {e}")))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            text: Vec::new(),
            children: Vec::new(),
        })
    }
}

// 逐层展开子元素，避免深层嵌套时递归析构耗尽调用栈
impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

/// 完整的 Revelation 文档
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    /// 解析 XML 字节
    ///
    /// 非 UTF-8、XML 语法错误、根元素不是 `revelationdata` 时返回
    /// [`RevtransError::MalformedDocument`]。
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| malformed(format!("document is not valid UTF-8: {e}")))?;

        let mut reader = Reader::from_str(xml);
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => open.push(Element::from_start(&start)?),
                Ok(Event::Empty(start)) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut open, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| malformed("unexpected closing tag".to_string()))?;
                    attach(&mut open, &mut root, element)?;
                }
                Ok(Event::Text(text)) => {
                    if let Some(current) = open.last_mut() {
                        let text = text
                            .unescape()
                            .map_err(|e| malformed(format!("invalid text in <{}>: {e}", current.name)))?;
                        current.push_text(&text);
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(current) = open.last_mut() {
                        let text = std::str::from_utf8(&data)
                            .map_err(|e| malformed(format!("invalid CDATA in <{}>: {e}", current.name)))?;
                        current.push_text(text);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(malformed(format!(
                        "XML parse error at position {}: {e}",
                        reader.error_position()
                    )));
                }
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(malformed(format!("element <{}> is never closed", unclosed.name)));
        }

        let root = root.ok_or_else(|| malformed("document has no root element".to_string()))?;
        if root.name != ROOT_ELEMENT {
            return Err(malformed(format!(
                "unexpected root element <{}>, expected <{ROOT_ELEMENT}>",
                root.name
            )));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn attach(open: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(malformed("document has more than one root element".to_string())),
    }
    Ok(())
}

fn malformed(message: String) -> RevtransError {
    RevtransError::MalformedDocument(message)
}
