//! Revelation 数据体（Stream）解密
//!
//! 职责范围：
//! - 从 IV 之后的位置开始，按 16 字节分组读取密文直到 EOF
//! - 使用 CBC 模式逐组解密并拼接
//! - 输出仍带有填充、仍是压缩状态的明文
//!
//! 设计约束：
//! - 旧实现会在 EOF 处静默丢弃不完整的分组；这里改为直接拒绝，
//!   不完整分组只可能来自截断或损坏的文件
//! - 本模块不负责去填充、解压

use std::io::{ErrorKind, Read};

use tracing::trace;
use zeroize::Zeroizing;

use crate::crypto::block::{BLOCK_SIZE, BlockChain};
use crate::crypto::kdf::KEY_LEN;
use crate::error::{Result, RevtransError};

/// 流式解密器
pub struct StreamDecryptor {
    chain: BlockChain,
    blocks: u64,
}

impl StreamDecryptor {
    pub fn new(key: &[u8; KEY_LEN], iv: &[u8; BLOCK_SIZE]) -> Result<Self> {
        Ok(Self {
            chain: BlockChain::new(key, iv)?,
            blocks: 0,
        })
    }

    /// 从 reader 读取全部剩余密文并解密
    pub fn decrypt<R: Read>(&mut self, mut reader: R) -> Result<Zeroizing<Vec<u8>>> {
        let mut plaintext = Zeroizing::new(Vec::new());
        let mut block = Zeroizing::new([0u8; BLOCK_SIZE]);

        loop {
            let filled = read_block(&mut reader, &mut block)?;
            if filled == 0 {
                break;
            }

            if filled < BLOCK_SIZE {
                return Err(RevtransError::Crypto(format!(
                    "ciphertext ends with a partial block of {filled} bytes"
                )));
            }

            self.chain.decrypt_block(&mut block);
            plaintext.extend_from_slice(&block[..]);
            self.blocks += 1;
        }

        trace!(blocks = self.blocks, "decrypted payload stream");

        Ok(plaintext)
    }
}

/// 对内存中的密文执行 CBC 解密
pub fn decrypt_stream(
    key: &[u8; KEY_LEN],
    iv: &[u8; BLOCK_SIZE],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    StreamDecryptor::new(key, iv)?.decrypt(ciphertext)
}

// 尽量填满一个分组；只有在 EOF 时才会返回小于 BLOCK_SIZE 的值
fn read_block<R: Read>(reader: &mut R, block: &mut [u8; BLOCK_SIZE]) -> Result<usize> {
    let mut filled = 0;

    while filled < BLOCK_SIZE {
        match reader.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(filled)
}
