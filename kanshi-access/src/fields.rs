//! アクセサが読み取るフィールドの記述子
//!
//! 構造体名とフィールドパスはビルド時の仮定ではなく、ロード時に
//! 構築されたレイアウトテーブルに対して解決されます。`REQUIRED`は
//! ロード時のバージョンチェック（`LayoutTable::verify`）に使います。

use kanshi_layout::FieldSpec;

pub const CGROUP_KN: FieldSpec = FieldSpec {
    strukt: "cgroup",
    path: &["kn"],
};

pub const KERNFS_NODE_ID: FieldSpec = FieldSpec {
    strukt: "kernfs_node",
    path: &["id"],
};

pub const FILE_F_PATH_MNT: FieldSpec = FieldSpec {
    strukt: "file",
    path: &["f_path", "mnt"],
};

pub const FILE_F_PATH_DENTRY: FieldSpec = FieldSpec {
    strukt: "file",
    path: &["f_path", "dentry"],
};

pub const LINUX_BINPRM_FILE: FieldSpec = FieldSpec {
    strukt: "linux_binprm",
    path: &["file"],
};

pub const LINUX_BINPRM_ARGC: FieldSpec = FieldSpec {
    strukt: "linux_binprm",
    path: &["argc"],
};

pub const LINUX_BINPRM_FILENAME: FieldSpec = FieldSpec {
    strukt: "linux_binprm",
    path: &["filename"],
};

pub const SIGNAL_LIVE_COUNTER: FieldSpec = FieldSpec {
    strukt: "signal_struct",
    path: &["live", "counter"],
};

pub const MM_ARG_START: FieldSpec = FieldSpec {
    strukt: "mm_struct",
    path: &["arg_start"],
};

pub const MM_ARG_END: FieldSpec = FieldSpec {
    strukt: "mm_struct",
    path: &["arg_end"],
};

pub const TASK_MM: FieldSpec = FieldSpec {
    strukt: "task_struct",
    path: &["mm"],
};

pub const TASK_EXIT_CODE: FieldSpec = FieldSpec {
    strukt: "task_struct",
    path: &["exit_code"],
};

pub const TASK_PID: FieldSpec = FieldSpec {
    strukt: "task_struct",
    path: &["pid"],
};

pub const TASK_TGID: FieldSpec = FieldSpec {
    strukt: "task_struct",
    path: &["tgid"],
};

pub const TASK_PARENT: FieldSpec = FieldSpec {
    strukt: "task_struct",
    path: &["parent"],
};

pub const TASK_CHILDREN_NEXT: FieldSpec = FieldSpec {
    strukt: "task_struct",
    path: &["children", "next"],
};

pub const TASK_SIBLING_NEXT: FieldSpec = FieldSpec {
    strukt: "task_struct",
    path: &["sibling", "next"],
};

pub const TASK_GROUP_LEADER: FieldSpec = FieldSpec {
    strukt: "task_struct",
    path: &["group_leader"],
};

pub const TASK_SIGNAL: FieldSpec = FieldSpec {
    strukt: "task_struct",
    path: &["signal"],
};

/// ロード時検証に使うフィールド一覧
pub const REQUIRED: &[FieldSpec] = &[
    CGROUP_KN,
    KERNFS_NODE_ID,
    FILE_F_PATH_MNT,
    FILE_F_PATH_DENTRY,
    LINUX_BINPRM_FILE,
    LINUX_BINPRM_ARGC,
    LINUX_BINPRM_FILENAME,
    SIGNAL_LIVE_COUNTER,
    MM_ARG_START,
    MM_ARG_END,
    TASK_MM,
    TASK_EXIT_CODE,
    TASK_PID,
    TASK_TGID,
    TASK_PARENT,
    TASK_CHILDREN_NEXT,
    TASK_SIBLING_NEXT,
    TASK_GROUP_LEADER,
    TASK_SIGNAL,
];

/// レイアウトテーブルに取り込む構造体名の一覧
///
/// vfsmountとdentryはこの層では中身を読まないため含めません。
pub const REQUIRED_STRUCTS: &[&str] = &[
    "task_struct",
    "mm_struct",
    "signal_struct",
    "linux_binprm",
    "file",
    "cgroup",
    "kernfs_node",
];
