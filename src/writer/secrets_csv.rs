//! "Secrets for Android" CSV 导入格式
//!
//! 该格式只有五列，能映射的信息有限：
//! - Description：文件夹路径 + 条目名，例如 `/mail/work`
//! - PIN：条目口令
//! - Notes：类型、描述、更新时间以及其余全部字段，每项一行
//!
//! Secrets 的导入器对空列的引号处理有问题，所以空列不加引号，
//! 其余列一律加双引号，内部双引号写成两个。

use std::io::Write;

use zeroize::{Zeroize, Zeroizing};

use crate::error::Result;
use crate::model::{Entry, EntryList};
use crate::writer::EntryWriter;

const COLUMNS: [&str; 5] = ["Description", "Id", "PIN", "Email", "Notes"];

/// Secrets CSV 输出
#[derive(Debug, Default, Clone, Copy)]
pub struct SecretsCsv;

impl SecretsCsv {
    pub fn new() -> Self {
        Self
    }
}

impl EntryWriter for SecretsCsv {
    fn write_to(&self, entries: &EntryList, out: &mut dyn Write) -> Result<()> {
        let header = Row {
            description: COLUMNS[0].to_string(),
            id: COLUMNS[1].to_string(),
            pin: COLUMNS[2].to_string(),
            email: COLUMNS[3].to_string(),
            notes: COLUMNS[4].to_string(),
        };
        header.write(out)?;

        for entry in entries {
            Row::from_entry(entry).write(out)?;
        }

        Ok(())
    }
}

#[derive(Default)]
struct Row {
    description: String,
    id: String,
    pin: String,
    email: String,
    notes: String,
}

impl Row {
    fn from_entry(entry: &Entry) -> Self {
        let mut row = Self::default();

        row.add_note(&format!("Revelation-Type: {}", entry.kind()));

        row.description = if entry.folders().is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", entry.folders().join("/"))
        };
        row.description.push_str(entry.name());

        row.add_note(&format!("Description: {}", entry.description().unwrap_or_default()));

        if let Some(secret) = entry.secret() {
            row.pin = secret.to_string();
        }

        row.add_note(&format!("Last updated: {}", entry.last_updated()));

        let mut fields: Vec<_> = entry.fields().values().collect();
        fields.sort_by(|a, b| a.id().cmp(b.id()));
        for field in fields {
            row.add_note(&format!("{}: {}", field.id(), field.value()));
        }

        row
    }

    fn add_note(&mut self, note: &str) {
        self.notes.push_str(note);
        self.notes.push('\n');
    }

    fn write(&self, out: &mut dyn Write) -> Result<()> {
        let line = Zeroizing::new([
            &self.description,
            &self.id,
            &self.pin,
            &self.email,
            &self.notes,
        ]
        .map(|column| escape_column(column))
        .join(","));

        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        Ok(())
    }
}

impl Drop for Row {
    fn drop(&mut self) {
        self.pin.zeroize();
        self.notes.zeroize();
    }
}

/// 按 Secrets 导入器的规则转义单列
pub fn escape_column(column: &str) -> String {
    if column.is_empty() {
        return String::new();
    }

    format!("\"{}\"", column.replace('"', "\"\""))
}
