//! 输出格式
//!
//! 每种输出格式实现 [`EntryWriter`]，只需提供流式写出；
//! 写入文件时统一走原子写入，并拒绝覆盖已有文件。

pub mod secrets_csv;

use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::fs::atomic::write_new_atomic;
use crate::model::EntryList;

pub use secrets_csv::SecretsCsv;

pub trait EntryWriter {
    /// 将全部条目写入 `out`
    fn write_to(&self, entries: &EntryList, out: &mut dyn Write) -> Result<()>;

    /// 将全部条目写入新文件 `path`；文件已存在时返回错误
    fn save(&self, entries: &EntryList, path: &Path) -> Result<()> {
        write_new_atomic(path, |file| {
            let mut out = BufWriter::new(file);
            self.write_to(entries, &mut out)?;
            out.flush()?;
            Ok(())
        })
    }
}
