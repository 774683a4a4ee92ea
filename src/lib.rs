mod decrypt;

pub mod crypto;
pub mod document;
pub mod error;
pub mod format;
pub mod fs;
pub mod model;
pub mod reader;
pub mod writer;

pub use decrypt::{VaultDecoder, decompress, decrypt_payload};
pub use error::{Result, RevtransError};
pub use model::{Entry, EntryList, Field};
pub use reader::{DocumentParser, read_plain};
pub use writer::{EntryWriter, SecretsCsv};

use std::path::Path;

/// 解密 Revelation 文件并解析出全部条目
pub fn decrypt_vault(path: &Path, password: &[u8]) -> Result<EntryList> {
    let mut decoder = VaultDecoder::new(path, password);
    let document = decoder.decode()?;
    DocumentParser::new().load(document)
}
