//! 自プロセスのメモリに対する読み取りテスト
//!
//! テストプロセス自身のアドレス空間を「外部メモリ」に見立てて、
//! ProcessMemoryとアクセサファサードを通した読み取りを検証します。

use kanshi_access::kernel::{MmStruct, TaskStruct};
use kanshi_access::{FieldReader, Handle, MemoryReader};
use kanshi_layout::{FieldLayout, LayoutTable, MemberKind, StructLayout};
use kanshi_target::ProcessMemory;
use std::mem;

#[repr(C)]
struct MmFixture {
    arg_start: u64,
    arg_end: u64,
}

#[repr(C)]
struct TaskFixture {
    pid: i32,
    tgid: i32,
    mm: *const MmFixture,
}

fn fixture_table() -> LayoutTable {
    let mut task = StructLayout::new("task_struct", mem::size_of::<TaskFixture>() as u64);
    task.insert_member(
        "pid",
        FieldLayout {
            offset: mem::offset_of!(TaskFixture, pid) as u64,
            size: 4,
            kind: MemberKind::Scalar,
        },
    );
    task.insert_member(
        "tgid",
        FieldLayout {
            offset: mem::offset_of!(TaskFixture, tgid) as u64,
            size: 4,
            kind: MemberKind::Scalar,
        },
    );
    task.insert_member(
        "mm",
        FieldLayout {
            offset: mem::offset_of!(TaskFixture, mm) as u64,
            size: 8,
            kind: MemberKind::Pointer {
                pointee: Some("mm_struct".to_string()),
            },
        },
    );

    let mut mm = StructLayout::new("mm_struct", mem::size_of::<MmFixture>() as u64);
    mm.insert_member(
        "arg_start",
        FieldLayout {
            offset: mem::offset_of!(MmFixture, arg_start) as u64,
            size: 8,
            kind: MemberKind::Scalar,
        },
    );
    mm.insert_member(
        "arg_end",
        FieldLayout {
            offset: mem::offset_of!(MmFixture, arg_end) as u64,
            size: 8,
            kind: MemberKind::Scalar,
        },
    );

    let mut table = LayoutTable::new();
    table.insert(task);
    table.insert(mm);
    table
}

#[test]
fn test_read_own_process_fields() {
    let mm = MmFixture {
        arg_start: 0x7ffe_e000_1000,
        arg_end: 0x7ffe_e000_1050,
    };
    let task = TaskFixture {
        pid: 1234,
        tgid: 1234,
        mm: &mm,
    };

    let table = fixture_table();
    let memory = ProcessMemory::new(std::process::id() as i32);
    let reader = FieldReader::new(&table, &memory);

    let handle: Handle<TaskStruct> = Handle::from_addr(&task as *const _ as u64);
    assert_eq!(reader.task_struct_pid(handle), Some(1234));
    assert_eq!(reader.task_struct_tgid(handle), Some(1234));

    // ポインタフィールドはハンドルとして返り、そこからさらに読める
    let mm_handle: Handle<MmStruct> = reader.task_struct_mm(handle).expect("mm should resolve");
    assert_eq!(mm_handle.addr(), &mm as *const _ as u64);
    assert_eq!(reader.mm_struct_arg_start(mm_handle), Some(0x7ffe_e000_1000));
    assert_eq!(reader.mm_struct_arg_end(mm_handle), Some(0x7ffe_e000_1050));

    // 不在ハンドルは実メモリ相手でもNone
    assert_eq!(reader.task_struct_pid(Handle::null()), None);
}

#[test]
fn test_chained_spec_over_live_memory() {
    let mm = MmFixture {
        arg_start: 0xdead_0000,
        arg_end: 0xdead_0040,
    };
    let task = TaskFixture {
        pid: 1,
        tgid: 1,
        mm: &mm,
    };

    let table = fixture_table();
    let memory = ProcessMemory::new(std::process::id() as i32);
    let reader = FieldReader::new(&table, &memory);

    // task->mm->arg_start を1つの記述子で解決した結果が直接読みと一致する
    let chained: Option<u64> = reader.read_scalar(
        &task as *const _ as u64,
        &kanshi_layout::FieldSpec {
            strukt: "task_struct",
            path: &["mm", "arg_start"],
        },
    );
    assert_eq!(chained, Some(0xdead_0000));
    assert_eq!(chained, Some(mm.arg_start));
}

#[test]
fn test_unmapped_read_fails() {
    let memory = ProcessMemory::new(std::process::id() as i32);
    // カーネル空間のアドレスはユーザ空間からは読めない
    assert!(memory.read(0xffff_8000_0000_0000, 8).is_err());
}
