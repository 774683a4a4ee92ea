//! Revelation 密钥派生模块
//!
//! 将用户输入的口令转换为 32 字节的对称密钥，具体方式由 Header 中的
//! 数据版本决定。
//!
//! 版本 1 的做法非常弱：口令直接用 `0x00` 右填充到 32 字节作为 AES 密钥。
//! 这是旧文件格式决定的，为了兼容必须原样复现，不能“改进”。
//!
//! 更高版本使用带 salt 的迭代派生，其算法未被完整记录，因此这里只识别
//! 版本号并明确拒绝，而不是猜测实现。

use zeroize::Zeroizing;

use crate::error::{Result, RevtransError};

/// 派生密钥长度（256-bit）
pub const KEY_LEN: usize = 32;

/// 单次解码期间持有的密钥，离开作用域后自动清零
pub type CipherKey = Zeroizing<[u8; KEY_LEN]>;

/// 已知的密钥派生方式，由数据版本选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDerivation {
    /// 版本 1：`0x00` 右填充
    NullPadded,
    /// 版本 2：带 salt 的派生，当前不支持
    Salted,
}

impl KeyDerivation {
    pub fn for_version(version: u8) -> Result<Self> {
        match version {
            1 => Ok(Self::NullPadded),
            2 => Ok(Self::Salted),
            other => Err(RevtransError::UnsupportedKeyDerivation(other)),
        }
    }

    pub fn derive(self, password: &[u8]) -> Result<CipherKey> {
        match self {
            Self::NullPadded => null_padded(password),
            Self::Salted => Err(RevtransError::UnsupportedKeyDerivation(2)),
        }
    }
}

/// 根据口令和数据版本派生密钥
///
/// #### 错误
/// - 版本 1 下口令超过 32 字节时返回 [`RevtransError::PassphraseTooLong`]
/// - 其他版本返回 [`RevtransError::UnsupportedKeyDerivation`]
pub fn derive_key(password: &[u8], version: u8) -> Result<CipherKey> {
    KeyDerivation::for_version(version)?.derive(password)
}

fn null_padded(password: &[u8]) -> Result<CipherKey> {
    // 旧格式没有定义截断规则，超长口令直接拒绝
    if password.len() > KEY_LEN {
        return Err(RevtransError::PassphraseTooLong {
            len: password.len(),
        });
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key[..password.len()].copy_from_slice(password);

    Ok(key)
}
