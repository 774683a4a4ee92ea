//! 测试用的 Revelation 文件构造工具
//!
//! 按真实文件格式生成加密文件：zlib 压缩 -> 块填充 -> CBC 加密，
//! 并把 IV 以 ECB 模式加密后写在 Header 之后。

#![allow(dead_code)]

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

pub const BLOCK: usize = 16;

pub fn padded_key(password: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[..password.len()].copy_from_slice(password);
    key
}

pub fn header(data_version: u8, app_version: (u8, u8, u8)) -> Vec<u8> {
    vec![
        b'r',
        b'v',
        b'l',
        0,
        data_version,
        0,
        app_version.0,
        app_version.1,
        app_version.2,
        0,
        0,
        0,
    ]
}

pub fn compress(document: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(document).expect("compress document");
    encoder.finish().expect("finish compression")
}

pub fn pad(mut data: Vec<u8>) -> Vec<u8> {
    let padding = BLOCK - data.len() % BLOCK;
    data.extend(std::iter::repeat_n(padding as u8, padding));
    data
}

pub fn encrypt_iv(key: &[u8; 32], iv: &[u8; BLOCK]) -> [u8; BLOCK] {
    let cipher = Aes256::new(GenericArray::from_slice(&key[..]));
    let mut block = GenericArray::clone_from_slice(&iv[..]);
    cipher.encrypt_block(&mut block);

    let mut out = [0u8; BLOCK];
    out.copy_from_slice(&block);
    out
}

pub fn encrypt_cbc(key: &[u8; 32], iv: &[u8; BLOCK], plaintext: &[u8]) -> Vec<u8> {
    assert_eq!(plaintext.len() % BLOCK, 0, "plaintext must be block aligned");

    let mut cipher = cbc::Encryptor::<Aes256>::new(
        GenericArray::from_slice(&key[..]),
        GenericArray::from_slice(&iv[..]),
    );

    let mut out = plaintext.to_vec();
    for chunk in out.chunks_exact_mut(BLOCK) {
        cipher.encrypt_block_mut(GenericArray::from_mut_slice(chunk));
    }
    out
}

/// 使用指定 IV 生成完整的版本 1 文件内容
pub fn build_vault_with_iv(document: &[u8], password: &[u8], iv: [u8; BLOCK]) -> Vec<u8> {
    let key = padded_key(password);

    let mut vault = header(1, (0, 4, 11));
    vault.extend_from_slice(&encrypt_iv(&key, &iv));
    vault.extend_from_slice(&encrypt_cbc(&key, &iv, &pad(compress(document))));
    vault
}

pub fn build_vault(document: &[u8], password: &[u8]) -> Vec<u8> {
    build_vault_with_iv(document, password, *b"0123456789abcdef")
}

/// 只包含一个根条目的最小文档
pub const EXAMPLE_DOCUMENT: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<revelationdata version="0.4.11" dataversion="1">
	<entry type="generic">
		<name>Example</name>
		<description></description>
		<updated>1262300400</updated>
		<notes></notes>
		<field id="generic-hostname">example.org</field>
		<field id="generic-username">john</field>
		<field id="generic-password">hunter2</field>
	</entry>
</revelationdata>
"#;
