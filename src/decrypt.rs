//! Revelation 解密流程实现
//!
//! 本模块负责把一个加密的 Revelation 文件还原为 XML 文档字节。
//!
//! 解密流程（严格顺序）：
//! 1. 读取并校验 Header
//! 2. 按 Header 中的数据版本从口令派生密钥
//! 3. ECB 解密紧随 Header 的 IV
//! 4. CBC 流式解密剩余数据
//! 5. 去除尾部填充
//! 6. zlib 解压
//!
//! 注意：
//! - 密码错误时 1-5 步都不会报错，只会在第 6 步解压失败
//! - 文件句柄在读完全部密文后立即释放，不等待后续步骤
//! - 解密结果只保存在内存中，不写入磁盘

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::block::{BLOCK_SIZE, decrypt_iv};
use crate::crypto::kdf::derive_key;
use crate::crypto::padding::strip_padding;
use crate::error::{Result, RevtransError};
use crate::format::header::VaultHeader;
use crate::format::stream::StreamDecryptor;

/// 单个 Revelation 文件的解码器
///
/// 解码是惰性且幂等的：第一次调用 [`VaultDecoder::decode`] 时读取并解密文件，
/// 之后的调用直接返回缓存结果，不再访问文件。
pub struct VaultDecoder {
    path: PathBuf,
    password: Zeroizing<Vec<u8>>,
    header: Option<VaultHeader>,
    document: Option<Zeroizing<Vec<u8>>>,
}

impl VaultDecoder {
    pub fn new(path: impl Into<PathBuf>, password: &[u8]) -> Self {
        Self {
            path: path.into(),
            password: Zeroizing::new(password.to_vec()),
            header: None,
            document: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 成功解码后可用的 Header
    pub fn header(&self) -> Option<&VaultHeader> {
        self.header.as_ref()
    }

    /// 返回解密并解压后的文档字节
    pub fn decode(&mut self) -> Result<&[u8]> {
        match self.document {
            Some(ref document) => {
                debug!(path = %self.path.display(), "returning cached vault document");
                Ok(document.as_slice())
            }
            None => {
                let (header, document) = decode_file(&self.path, &self.password)?;
                self.header = Some(header);
                Ok(self.document.insert(document).as_slice())
            }
        }
    }
}

fn decode_file(path: &Path, password: &[u8]) -> Result<(VaultHeader, Zeroizing<Vec<u8>>)> {
    // ---------- 读取阶段：离开作用域即关闭文件 ----------
    let (header, padded) = {
        let mut reader = BufReader::new(File::open(path)?);
        decrypt_payload(&mut reader, password)?
    };

    debug!(
        path = %path.display(),
        data_version = header.data_version,
        app_version = %header.app_version_string(),
        decrypted_len = padded.len(),
        "decrypted vault payload"
    );

    // ---------- 去填充 + 解压 ----------
    let compressed = strip_padding(&padded)?;
    let document = decompress(compressed)?;

    debug!(document_len = document.len(), "decompressed vault document");

    Ok((header, document))
}

/// 从 reader 中依次完成 Header 解析、密钥派生、IV 与数据体解密
///
/// 返回的数据仍带有填充且处于压缩状态。
pub fn decrypt_payload<R: Read>(
    mut reader: R,
    password: &[u8],
) -> Result<(VaultHeader, Zeroizing<Vec<u8>>)> {
    let header = VaultHeader::read(&mut reader)?;
    let key = derive_key(password, header.data_version)?;

    let mut encrypted_iv = [0u8; BLOCK_SIZE];
    reader.read_exact(&mut encrypted_iv)?;
    let iv = Zeroizing::new(decrypt_iv(&key, &encrypted_iv)?);

    let padded = StreamDecryptor::new(&key, &iv)?.decrypt(&mut reader)?;

    Ok((header, padded))
}

/// zlib 解压；失败通常意味着密码错误
pub fn decompress(compressed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let mut document = Zeroizing::new(Vec::new());

    ZlibDecoder::new(compressed)
        .read_to_end(&mut document)
        .map_err(RevtransError::Decompression)?;

    Ok(document)
}
