//! Kanshi ターゲットプロセスアクセス
//!
//! 稼働中のターゲットプロセスからフィールドを読み取るための
//! 本番用メモリリーダー実装を提供します。

pub mod memory;

pub use memory::ProcessMemory;

/// ターゲットアクセスの結果型
pub type Result<T> = anyhow::Result<T>;
