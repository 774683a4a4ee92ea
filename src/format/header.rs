//! Revelation 文件 Header 解析
//!
//! Header 是整个 Revelation 文件的“格式锚点”：
//! - 标识文件类型（magic）
//! - 指明数据版本（决定密钥派生方式）
//! - 记录写出该文件的应用版本
//!
//! 实际字节布局（与网上流传的格式说明并不一致，以真实文件为准）：
//!
//! ```text
//! "rvl" 0x00      magic
//! 1 byte          data version
//! 0x00            分隔符
//! 3 byte          application version
//! 0x00 0x00 0x00  分隔符
//! ```
//!
//! 读取成功后，流的位置恰好位于加密 IV 的第一个字节。
//! Header 解析失败后流已被部分消费，不得继续复用。

use std::io::Read;

use tracing::trace;

use crate::error::{Result, RevtransError};

/// Revelation 文件魔数
pub const MAGIC: &[u8; 4] = b"rvl\0";

/// 仅 Header 本身占用的字节数
pub const HEADER_SIZE: usize = 12;

/// Header 接受的数据版本
pub const SUPPORTED_DATA_VERSIONS: [u8; 2] = [1, 2];

/// Revelation Header 结构
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultHeader {
    pub magic: [u8; 4],
    pub data_version: u8,
    pub app_version: (u8, u8, u8),
}

impl VaultHeader {
    /// 以 `major.minor.patch` 形式返回应用版本
    pub fn app_version_string(&self) -> String {
        let (major, minor, patch) = self.app_version;
        format!("{major}.{minor}.{patch}")
    }

    /// 从输入流读取并解析 Header
    ///
    /// - magic 不匹配（包括流过短）时返回 [`RevtransError::InvalidMagic`]
    /// - 数据版本不在支持范围内时返回 [`RevtransError::IncompatibleVersion`]
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut magic = Vec::with_capacity(MAGIC.len());
        reader
            .by_ref()
            .take(MAGIC.len() as u64)
            .read_to_end(&mut magic)?;

        if magic.as_slice() != MAGIC {
            return Err(RevtransError::InvalidMagic);
        }

        // 版本字节读到就校验，截断的 Header 也要先报告版本不兼容
        let mut version_buf = [0u8; 1];
        reader.read_exact(&mut version_buf)?;
        let data_version = version_buf[0];

        if !SUPPORTED_DATA_VERSIONS.contains(&data_version) {
            return Err(RevtransError::IncompatibleVersion(data_version));
        }

        let mut separator = [0u8; 1];
        reader.read_exact(&mut separator)?;

        let mut app_buf = [0u8; 3];
        reader.read_exact(&mut app_buf)?;

        let mut separator = [0u8; 3];
        reader.read_exact(&mut separator)?;

        let header = Self {
            magic: *MAGIC,
            data_version,
            app_version: (app_buf[0], app_buf[1], app_buf[2]),
        };

        trace!(
            data_version,
            app_version = %header.app_version_string(),
            "read vault header"
        );

        Ok(header)
    }
}

/// 读取 Header 的函数形式入口，便于流水线组合
pub fn read_header<R: Read>(reader: R) -> Result<VaultHeader> {
    VaultHeader::read(reader)
}
