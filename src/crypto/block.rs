//! Revelation 分组密码模块
//!
//! Revelation 使用 Rijndael（128 bit 分组）配合 32 字节密钥，即 AES-256：
//! - IV 本身以 ECB 模式加密，单个分组、无填充
//! - 数据体以 CBC 模式加密
//!
//! 两种模式都无法发现错误的密钥：错误的密钥只会得到随机字节，
//! 是否解密正确要交给后续的解压阶段判断。

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockDecryptMut, KeyInit, KeyIvInit};

use crate::crypto::kdf::KEY_LEN;
use crate::error::{Result, RevtransError};

/// 分组长度，同时也是 IV 长度
pub const BLOCK_SIZE: usize = 16;

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// 以 ECB 模式解密 16 字节的 IV
pub fn decrypt_iv(key: &[u8; KEY_LEN], ciphertext: &[u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE]> {
    let cipher = Aes256::new_from_slice(key)
        .map_err(|_| RevtransError::Crypto("invalid key length".to_string()))?;

    let mut block = GenericArray::clone_from_slice(&ciphertext[..]);
    cipher.decrypt_block(&mut block);

    let mut iv = [0u8; BLOCK_SIZE];
    iv.copy_from_slice(&block);
    Ok(iv)
}

/// CBC 解密状态
///
/// 每次只处理一个完整分组，由调用方负责按分组切分输入。
pub struct BlockChain {
    cipher: Aes256CbcDec,
}

impl BlockChain {
    pub fn new(key: &[u8; KEY_LEN], iv: &[u8; BLOCK_SIZE]) -> Result<Self> {
        let cipher = Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|_| RevtransError::Crypto("AES-CBC init failed".to_string()))?;

        Ok(Self { cipher })
    }

    /// 原地解密一个分组
    pub fn decrypt_block(&mut self, block: &mut [u8; BLOCK_SIZE]) {
        self.cipher
            .decrypt_block_mut(GenericArray::from_mut_slice(&mut block[..]));
    }
}
