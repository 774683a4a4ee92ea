//! 块填充去除
//!
//! 最后一个字节的值 `n` 表示尾部有 `n` 个填充字节。
//! 旧格式约定这 `n` 个字节都等于 `n`，但这里不再逐字节校验：
//! 错误密钥得到的截断长度本就是随机的，交给解压阶段去发现。

use crate::error::{Result, RevtransError};

/// 去掉尾部填充，返回剩余数据的切片
///
/// `n == 0` 或 `n` 超过数据长度时返回 [`RevtransError::InvalidPadding`]。
pub fn strip_padding(data: &[u8]) -> Result<&[u8]> {
    let padding = data.last().copied().map(usize::from).unwrap_or(0);

    if padding == 0 || padding > data.len() {
        return Err(RevtransError::InvalidPadding {
            padding,
            len: data.len(),
        });
    }

    Ok(&data[..data.len() - padding])
}
