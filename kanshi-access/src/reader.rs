//! 再配置対応フィールドリーダー
//!
//! フィールド記述子をロード時に構築されたレイアウトテーブルに対して
//! 解決し、外部メモリから単一の有界コピーで値を取り出します。不在
//! ハンドル・レイアウト不一致・読み取り失敗はすべてNoneに畳み込まれ、
//! この層が読み取りの失敗理由を区別することはありません。

use crate::handle::Handle;
use crate::memory::MemoryReader;
use kanshi_layout::{FieldLayout, FieldSpec, LayoutTable, MemberKind};

/// フィールド値として読み取れる型
pub trait FieldValue: Sized {
    /// 型のサイズ（バイト数）
    const SIZE: u64;

    /// リトルエンディアンのバイト列から値を構築する
    fn from_le_bytes(bytes: &[u8]) -> Option<Self>;
}

impl FieldValue for i32 {
    const SIZE: u64 = 4;

    fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        Some(i32::from_le_bytes(bytes.try_into().ok()?))
    }
}

impl FieldValue for u32 {
    const SIZE: u64 = 4;

    fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        Some(u32::from_le_bytes(bytes.try_into().ok()?))
    }
}

impl FieldValue for i64 {
    const SIZE: u64 = 8;

    fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        Some(i64::from_le_bytes(bytes.try_into().ok()?))
    }
}

impl FieldValue for u64 {
    const SIZE: u64 = 8;

    fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }
}

/// 再配置対応フィールドリーダー
///
/// レイアウトテーブルとメモリリーダーへの参照だけを持つ状態なしの
/// オブジェクトで、呼び出しごとに独立して動作します。ハンドルを
/// 保持・キャッシュすることはありません。
pub struct FieldReader<'a> {
    table: &'a LayoutTable,
    memory: &'a dyn MemoryReader,
}

impl<'a> FieldReader<'a> {
    /// 新しいフィールドリーダーを作成する
    pub fn new(table: &'a LayoutTable, memory: &'a dyn MemoryReader) -> Self {
        Self { table, memory }
    }

    /// フィールドパスを解決して最終フィールドのアドレスとレイアウトを返す
    ///
    /// 埋め込みメンバはオフセットを加算し、ポインタメンバは1回の有界
    /// 読み取りで参照先へ進みます。パス長はコンパイル時に決まっている
    /// ため、反復は常に有界です。
    fn resolve(&self, base: u64, spec: &FieldSpec) -> Option<(u64, &'a FieldLayout)> {
        if base == 0 {
            return None;
        }
        let mut layout = self.table.strukt(spec.strukt)?;
        let mut addr = base;

        for (i, seg) in spec.path.iter().enumerate() {
            let field = layout.member(seg)?;
            if i + 1 == spec.path.len() {
                return Some((addr.checked_add(field.offset)?, field));
            }
            match &field.kind {
                MemberKind::Embedded { layout: inner } => {
                    addr = addr.checked_add(field.offset)?;
                    layout = inner;
                }
                MemberKind::Pointer { pointee } => {
                    let ptr = self.memory.read_u64(addr.checked_add(field.offset)?).ok()?;
                    if ptr == 0 {
                        return None;
                    }
                    addr = ptr;
                    layout = self.table.strukt(pointee.as_deref()?)?;
                }
                MemberKind::Scalar => return None,
            }
        }
        None
    }

    /// スカラフィールドを読み取る
    ///
    /// 宣言した型のサイズとターゲット上のフィールドサイズが食い違う
    /// 場合は読み取りを行わずNoneを返します。
    pub fn read_scalar<T: FieldValue>(&self, base: u64, spec: &FieldSpec) -> Option<T> {
        let (addr, field) = self.resolve(base, spec)?;
        if !matches!(field.kind, MemberKind::Scalar) {
            return None;
        }
        if field.size != T::SIZE {
            return None;
        }
        let bytes = self.memory.read(addr, T::SIZE as usize).ok()?;
        T::from_le_bytes(&bytes)
    }

    /// ポインタフィールドを読み取ってハンドルとして返す
    ///
    /// 格納値がNULLの場合も不在として扱われNoneになります。
    pub fn read_ptr<T>(&self, base: u64, spec: &FieldSpec) -> Option<Handle<T>> {
        let (addr, field) = self.resolve(base, spec)?;
        if !matches!(field.kind, MemberKind::Pointer { .. }) {
            return None;
        }
        let raw = self.memory.read_u64(addr).ok()?;
        if raw == 0 {
            return None;
        }
        Some(Handle::from_addr(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use kanshi_layout::StructLayout;

    struct MockMemory {
        data: Vec<u8>,
    }

    impl MemoryReader for MockMemory {
        fn read(&self, addr: u64, len: usize) -> Result<Vec<u8>> {
            let start = addr as usize;
            self.data
                .get(start..start + len)
                .map(|bytes| bytes.to_vec())
                .ok_or_else(|| anyhow::anyhow!("Unmapped read at 0x{:x}", addr))
        }
    }

    fn sample_table() -> LayoutTable {
        let mut task = StructLayout::new("task_struct", 32);
        task.insert_member(
            "pid",
            FieldLayout {
                offset: 0,
                size: 4,
                kind: MemberKind::Scalar,
            },
        );
        task.insert_member(
            "mm",
            FieldLayout {
                offset: 8,
                size: 8,
                kind: MemberKind::Pointer {
                    pointee: Some("mm_struct".to_string()),
                },
            },
        );

        let mut mm = StructLayout::new("mm_struct", 16);
        mm.insert_member(
            "arg_start",
            FieldLayout {
                offset: 0,
                size: 8,
                kind: MemberKind::Scalar,
            },
        );
        mm.insert_member(
            "arg_end",
            FieldLayout {
                offset: 8,
                size: 8,
                kind: MemberKind::Scalar,
            },
        );

        let mut table = LayoutTable::new();
        table.insert(task);
        table.insert(mm);
        table
    }

    // メモリレイアウト:
    // 0x40: task_struct { pid: 1234, mm: 0x80 }
    // 0x80: mm_struct { arg_start: 0x7000, arg_end: 0x7050 }
    fn sample_memory() -> MockMemory {
        let mut data = vec![0u8; 0x100];
        data[0x40..0x44].copy_from_slice(&1234i32.to_le_bytes());
        data[0x48..0x50].copy_from_slice(&0x80u64.to_le_bytes());
        data[0x80..0x88].copy_from_slice(&0x7000u64.to_le_bytes());
        data[0x88..0x90].copy_from_slice(&0x7050u64.to_le_bytes());
        MockMemory { data }
    }

    #[test]
    fn test_read_scalar() {
        let table = sample_table();
        let memory = sample_memory();
        let reader = FieldReader::new(&table, &memory);

        let pid: Option<i32> = reader.read_scalar(
            0x40,
            &FieldSpec {
                strukt: "task_struct",
                path: &["pid"],
            },
        );
        assert_eq!(pid, Some(1234));
    }

    #[test]
    fn test_chained_pointer_path() {
        let table = sample_table();
        let memory = sample_memory();
        let reader = FieldReader::new(&table, &memory);

        // task->mm->arg_start を1つの記述子として解決する
        let chained: Option<u64> = reader.read_scalar(
            0x40,
            &FieldSpec {
                strukt: "task_struct",
                path: &["mm", "arg_start"],
            },
        );
        // 直接mm_structを読んだ値と一致する
        let direct: Option<u64> = reader.read_scalar(
            0x80,
            &FieldSpec {
                strukt: "mm_struct",
                path: &["arg_start"],
            },
        );
        assert_eq!(chained, Some(0x7000));
        assert_eq!(chained, direct);
    }

    #[test]
    fn test_null_intermediate_pointer() {
        let table = sample_table();
        let mut memory = sample_memory();
        // mmポインタをNULLにする
        memory.data[0x48..0x50].copy_from_slice(&0u64.to_le_bytes());
        let reader = FieldReader::new(&table, &memory);

        let chained: Option<u64> = reader.read_scalar(
            0x40,
            &FieldSpec {
                strukt: "task_struct",
                path: &["mm", "arg_start"],
            },
        );
        assert_eq!(chained, None);
    }

    #[test]
    fn test_size_mismatch_is_unavailable() {
        let table = sample_table();
        let memory = sample_memory();
        let reader = FieldReader::new(&table, &memory);

        // pidは4バイトなのでi64としては読めない
        let pid: Option<i64> = reader.read_scalar(
            0x40,
            &FieldSpec {
                strukt: "task_struct",
                path: &["pid"],
            },
        );
        assert_eq!(pid, None);
    }

    #[test]
    fn test_unknown_field_is_unavailable() {
        let table = sample_table();
        let memory = sample_memory();
        let reader = FieldReader::new(&table, &memory);

        let value: Option<i32> = reader.read_scalar(
            0x40,
            &FieldSpec {
                strukt: "task_struct",
                path: &["exit_code"],
            },
        );
        assert_eq!(value, None);
    }

    #[test]
    fn test_unmapped_read_is_unavailable() {
        let table = sample_table();
        let memory = sample_memory();
        let reader = FieldReader::new(&table, &memory);

        // テーブル上は解決できてもメモリが読めなければNone
        let pid: Option<i32> = reader.read_scalar(
            0xFF0,
            &FieldSpec {
                strukt: "task_struct",
                path: &["pid"],
            },
        );
        assert_eq!(pid, None);
    }

    #[test]
    fn test_read_ptr_rejects_scalar_field() {
        let table = sample_table();
        let memory = sample_memory();
        let reader = FieldReader::new(&table, &memory);

        let handle: Option<Handle<crate::kernel::MmStruct>> = reader.read_ptr(
            0x40,
            &FieldSpec {
                strukt: "task_struct",
                path: &["pid"],
            },
        );
        assert_eq!(handle, None);
    }
}
