//! 原子写入工具。
//!
//! 提供「先写临时文件，成功后再改名为目标文件」的写出语义，
//! 写入失败时不会留下截断的输出文件。
//! 目标文件已存在时直接拒绝，不做覆盖。

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, RevtransError};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// 原子写入一个新文件。
///
/// 流程：
/// 1. 确认目标不存在；
/// 2. 在目标目录创建临时文件并调用 `write_fn` 写入完整内容；
/// 3. 写入成功后 rename 为目标文件。
pub fn write_new_atomic<F>(target: &Path, write_fn: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    if target.exists() {
        return Err(RevtransError::AlreadyExists(target.to_path_buf()));
    }

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp_path = build_tmp_path(parent, target.file_name());
    let mut tmp_file = File::create(&tmp_path)?;

    let written = write_fn(&mut tmp_file).and_then(|()| {
        tmp_file.flush()?;
        tmp_file.sync_all()?;
        Ok(())
    });

    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    // 写入期间目标可能被创建
    if target.exists() {
        let _ = fs::remove_file(&tmp_path);
        return Err(RevtransError::AlreadyExists(target.to_path_buf()));
    }

    fs::rename(&tmp_path, target).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })?;

    Ok(())
}

fn build_tmp_path(parent: &Path, file_name: Option<&std::ffi::OsStr>) -> PathBuf {
    let base_name = file_name
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("revtrans-output");

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let counter = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);

    parent.join(format!(
        ".{base_name}.tmp-{}-{timestamp}-{counter}",
        std::process::id()
    ))
}
