//! Revelation 文档解析器
//!
//! 把文档树转换为 [`EntryList`]。
//!
//! 遍历规则：
//! - 只有根元素下的第一层 `entry` 作为起点，之后按文档顺序深入
//! - 每个 `entry` 必须带 `type` 属性
//! - `folder` 类型只把名字压入文件夹栈，自身不产生记录
//! - 其他类型产生一条记录，`name`、`updated` 为必需子元素
//! - `generic-password` 字段提升为记录的口令，其余字段按 id 存入
//!
//! 任何结构错误都会立即终止解析，不返回部分结果。
//! 遍历使用显式工作栈，嵌套深度不受调用栈限制。

use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use crate::document::{Document, Element};
use crate::error::{Result, RevtransError};
use crate::model::{Entry, EntryList, Field};

const ENTRY: &str = "entry";
const FIELD: &str = "field";
const NAME: &str = "name";
const DESCRIPTION: &str = "description";
const UPDATED: &str = "updated";

const TYPE_ATTR: &str = "type";
const ID_ATTR: &str = "id";

/// 文件夹条目的类型标记
pub const FOLDER_TYPE: &str = "folder";

/// 保存条目口令的字段 id
pub const SECRET_FIELD_ID: &str = "generic-password";

/// 按 `type` 属性分派的条目处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind<'a> {
    Folder,
    Record(&'a str),
}

impl<'a> EntryKind<'a> {
    fn of(tag: &'a str) -> Self {
        match tag {
            FOLDER_TYPE => Self::Folder,
            other => Self::Record(other),
        }
    }
}

/// 按 `id` 属性分派的字段处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Secret,
    Plain,
}

impl FieldKind {
    fn of(id: &str) -> Self {
        match id {
            SECRET_FIELD_ID => Self::Secret,
            _ => Self::Plain,
        }
    }
}

enum Visit<'d> {
    Entry(&'d Element),
    LeaveFolder,
}

/// 可复用的解析器；每次 [`DocumentParser::load`] 都会重置内部状态
#[derive(Debug, Default)]
pub struct DocumentParser {
    folders: Vec<String>,
}

impl DocumentParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前文件夹栈，解析成功结束后为空
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    /// 解析已解码的文档字节
    pub fn load(&mut self, document: &[u8]) -> Result<EntryList> {
        let document = Document::parse(document)?;
        self.load_document(&document)
    }

    /// 遍历已构造好的文档树
    pub fn load_document(&mut self, document: &Document) -> Result<EntryList> {
        self.folders.clear();
        let mut list = EntryList::new();

        let mut pending: Vec<Visit<'_>> = document
            .root()
            .children_named(ENTRY)
            .rev()
            .map(Visit::Entry)
            .collect();

        while let Some(visit) = pending.pop() {
            let node = match visit {
                Visit::Entry(node) => node,
                Visit::LeaveFolder => {
                    self.folders.pop();
                    continue;
                }
            };

            let tag = node.attribute(TYPE_ATTR).ok_or_else(|| RevtransError::MissingType {
                path: self.folder_path(),
            })?;

            match EntryKind::of(tag) {
                EntryKind::Folder => {
                    let name = child_text(node, NAME).ok_or_else(|| RevtransError::MissingName {
                        node: "folder",
                        path: self.folder_path(),
                    })?;

                    self.folders.push(name.into_owned());
                    pending.push(Visit::LeaveFolder);
                    pending.extend(node.children_named(ENTRY).rev().map(Visit::Entry));
                }
                EntryKind::Record(kind) => {
                    let entry = self.visit_record(kind, node)?;
                    list.add_entry(entry);
                }
            }
        }

        debug!(entries = list.len(), "parsed revelation document");

        Ok(list)
    }

    fn visit_record(&self, kind: &str, node: &Element) -> Result<Entry> {
        let name = child_text(node, NAME).ok_or_else(|| RevtransError::MissingName {
            node: "entry",
            path: self.folder_path(),
        })?;

        let updated = child_text(node, UPDATED).ok_or_else(|| RevtransError::MissingTimestamp {
            path: self.entry_path(&name),
        })?;
        let last_updated = updated
            .trim()
            .parse::<i64>()
            .map_err(|_| RevtransError::InvalidTimestamp {
                path: self.entry_path(&name),
                value: updated.to_string(),
            })?;

        let mut entry = Entry::new(self.folders.clone(), &*name, kind, last_updated);

        if let Some(description) = child_text(node, DESCRIPTION) {
            entry.set_description(description);
        }

        for field in node.children_named(FIELD) {
            let id = field.attribute(ID_ATTR).ok_or_else(|| RevtransError::MissingFieldId {
                path: self.entry_path(&name),
            })?;

            match FieldKind::of(id) {
                FieldKind::Secret => entry.set_secret(field.text()),
                FieldKind::Plain => entry.add_field(Field::new(id, field.text())),
            }
        }

        Ok(entry)
    }

    fn folder_path(&self) -> String {
        format!("/{}", self.folders.join("/"))
    }

    fn entry_path(&self, name: &str) -> String {
        if self.folders.is_empty() {
            format!("/{name}")
        } else {
            format!("/{}/{name}", self.folders.join("/"))
        }
    }
}

fn child_text<'a>(node: &'a Element, child: &str) -> Option<Cow<'a, str>> {
    node.child(child).map(Element::text)
}

/// 读取未加密的 Revelation XML 导出文件
pub fn read_plain(path: &Path) -> Result<EntryList> {
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), len = bytes.len(), "read plain revelation document");
    DocumentParser::new().load(&bytes)
}
