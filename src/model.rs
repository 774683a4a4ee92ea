//! 解析结果的数据结构
//!
//! [`EntryList`] 是解析器与输出端（CSV writer 等）之间的全部契约。
//! 口令与字段值以 [`Zeroizing`] 保存，释放时清零；`Debug` 输出不包含它们。

use std::collections::HashMap;
use std::fmt;

use zeroize::Zeroizing;

/// 条目中的一个字段
#[derive(Clone)]
pub struct Field {
    id: String,
    value: Zeroizing<String>,
}

impl Field {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: Zeroizing::new(value.into()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.id)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// 一条密码记录
#[derive(Clone)]
pub struct Entry {
    folders: Vec<String>,
    name: String,
    kind: String,
    last_updated: i64,
    description: Option<String>,
    secret: Option<Zeroizing<String>>,
    fields: HashMap<String, Field>,
}

impl Entry {
    pub fn new(
        folders: Vec<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        last_updated: i64,
    ) -> Self {
        Self {
            folders,
            name: name.into(),
            kind: kind.into(),
            last_updated,
            description: None,
            secret: None,
            fields: HashMap::new(),
        }
    }

    /// 条目所在的文件夹链，位于根目录时为空
    ///
    /// `["foo", "bar"]` 表示条目位于 `/foo/bar`。
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Revelation 中记录的条目类型，例如 `generic`、`website`
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn last_updated(&self) -> i64 {
        self.last_updated
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_ref().map(|secret| secret.as_str())
    }

    pub fn set_secret(&mut self, secret: impl Into<String>) {
        self.secret = Some(Zeroizing::new(secret.into()));
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.get(id)
    }

    pub fn fields(&self) -> &HashMap<String, Field> {
        &self.fields
    }

    /// 添加字段；id 重复时后写入的覆盖先写入的
    pub fn add_field(&mut self, field: Field) {
        self.fields.insert(field.id.clone(), field);
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("folders", &self.folders)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("last_updated", &self.last_updated)
            .field("description", &self.description)
            .field("has_secret", &self.secret.is_some())
            .field("fields", &self.fields)
            .finish()
    }
}

/// 按文档顺序追加的条目列表
#[derive(Debug, Clone, Default)]
pub struct EntryList {
    entries: Vec<Entry>,
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
