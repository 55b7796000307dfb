//! 外部メモリ読み取りの抽象化

use crate::Result;

/// メモリ読み取りトレイト
///
/// 外部所有メモリへの有界で失敗しうる読み取りを抽象化します。
/// 実装は、読み取りが安全に完了できない場合（未マップ領域など）に
/// エラーを返さなければなりません。外部メモリを変更してはいけません。
pub trait MemoryReader {
    /// addrからlenバイトをローカルメモリへコピーする
    fn read(&self, addr: u64, len: usize) -> Result<Vec<u8>>;

    /// u64値を読み取る（リトルエンディアン）
    fn read_u64(&self, addr: u64) -> Result<u64> {
        let bytes = self.read(addr, 8)?;
        let array: [u8; 8] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| anyhow::anyhow!("Failed to read 8 bytes at 0x{:x}", addr))?;
        Ok(u64::from_le_bytes(array))
    }
}
