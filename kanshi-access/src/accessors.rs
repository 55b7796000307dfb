//! 構造体アクセサファサード
//!
//! (構造体, フィールド)の組ごとに1つの型付きアクセサを提供します。
//! どのアクセサも同じ雛形に従います: 不在ハンドルなら読み取りを試みず
//! None、それ以外はフィールドリーダーで解決し、失敗も同じNoneに
//! 畳み込みます。呼び出し側から見える結果は「値」か「利用不可」の
//! 2通りだけで、部分的な値が観測されることはありません。
//!
//! ヌル検査以外の妥当性検査（pidが正かどうか等）は行いません。
//! 意味的な解釈は呼び出し側の責務です。

use crate::fields;
use crate::handle::Handle;
use crate::kernel::{
    Cgroup, Dentry, File, KernfsNode, LinuxBinprm, ListHead, MmStruct, RawStr, SignalStruct,
    TaskStruct, Vfsmount,
};
use crate::reader::FieldReader;

impl FieldReader<'_> {
    /*
     * struct cgroup
     */

    /// cgroupの関連kernfsノードを取得する
    pub fn cgroup_kn(&self, cgrp: Handle<Cgroup>) -> Option<Handle<KernfsNode>> {
        if cgrp.is_null() {
            return None;
        }
        self.read_ptr(cgrp.addr(), &fields::CGROUP_KN)
    }

    /*
     * struct kernfs_node
     */

    /// kernfsノードの安定識別子を取得する
    pub fn kernfs_node_id(&self, kn: Handle<KernfsNode>) -> Option<u64> {
        if kn.is_null() {
            return None;
        }
        self.read_scalar(kn.addr(), &fields::KERNFS_NODE_ID)
    }

    /*
     * struct file
     */

    /// ファイルのマウントを取得する
    pub fn file_f_path_mnt(&self, file: Handle<File>) -> Option<Handle<Vfsmount>> {
        if file.is_null() {
            return None;
        }
        self.read_ptr(file.addr(), &fields::FILE_F_PATH_MNT)
    }

    /// ファイルのディレクトリエントリを取得する
    pub fn file_f_path_dentry(&self, file: Handle<File>) -> Option<Handle<Dentry>> {
        if file.is_null() {
            return None;
        }
        self.read_ptr(file.addr(), &fields::FILE_F_PATH_DENTRY)
    }

    /*
     * struct linux_binprm
     */

    /// exec対象の実行ファイルを取得する
    pub fn linux_binprm_file(&self, bprm: Handle<LinuxBinprm>) -> Option<Handle<File>> {
        if bprm.is_null() {
            return None;
        }
        self.read_ptr(bprm.addr(), &fields::LINUX_BINPRM_FILE)
    }

    /// execの引数個数を取得する
    pub fn linux_binprm_argc(&self, bprm: Handle<LinuxBinprm>) -> Option<i32> {
        if bprm.is_null() {
            return None;
        }
        self.read_scalar(bprm.addr(), &fields::LINUX_BINPRM_ARGC)
    }

    /// execのファイル名文字列のアドレスを取得する
    ///
    /// 返るのはカーネルメモリ上のアドレスであり、文字列本体の読み出しは
    /// 呼び出し側の有界読み取り機構で行います。
    pub fn linux_binprm_filename(&self, bprm: Handle<LinuxBinprm>) -> Option<Handle<RawStr>> {
        if bprm.is_null() {
            return None;
        }
        self.read_ptr(bprm.addr(), &fields::LINUX_BINPRM_FILENAME)
    }

    /*
     * struct signal_struct
     */

    /// スレッドグループの生存スレッド数を取得する
    pub fn signal_struct_live_counter(&self, signal: Handle<SignalStruct>) -> Option<i32> {
        if signal.is_null() {
            return None;
        }
        self.read_scalar(signal.addr(), &fields::SIGNAL_LIVE_COUNTER)
    }

    /*
     * struct mm_struct
     */

    /// コマンドライン領域の先頭アドレスを取得する
    pub fn mm_struct_arg_start(&self, mm: Handle<MmStruct>) -> Option<u64> {
        if mm.is_null() {
            return None;
        }
        self.read_scalar(mm.addr(), &fields::MM_ARG_START)
    }

    /// コマンドライン領域の終端アドレスを取得する
    pub fn mm_struct_arg_end(&self, mm: Handle<MmStruct>) -> Option<u64> {
        if mm.is_null() {
            return None;
        }
        self.read_scalar(mm.addr(), &fields::MM_ARG_END)
    }

    /*
     * struct task_struct
     */

    /// タスクのアドレス空間を取得する
    pub fn task_struct_mm(&self, task: Handle<TaskStruct>) -> Option<Handle<MmStruct>> {
        if task.is_null() {
            return None;
        }
        self.read_ptr(task.addr(), &fields::TASK_MM)
    }

    /// タスクの終了コードを取得する
    pub fn task_struct_exit_code(&self, task: Handle<TaskStruct>) -> Option<i32> {
        if task.is_null() {
            return None;
        }
        self.read_scalar(task.addr(), &fields::TASK_EXIT_CODE)
    }

    /// タスクのpidを取得する
    pub fn task_struct_pid(&self, task: Handle<TaskStruct>) -> Option<i32> {
        if task.is_null() {
            return None;
        }
        self.read_scalar(task.addr(), &fields::TASK_PID)
    }

    /// タスクのtgidを取得する
    pub fn task_struct_tgid(&self, task: Handle<TaskStruct>) -> Option<i32> {
        if task.is_null() {
            return None;
        }
        self.read_scalar(task.addr(), &fields::TASK_TGID)
    }

    /// 親タスクを取得する
    pub fn task_struct_parent(&self, task: Handle<TaskStruct>) -> Option<Handle<TaskStruct>> {
        if task.is_null() {
            return None;
        }
        self.read_ptr(task.addr(), &fields::TASK_PARENT)
    }

    /// 子リストの次リンクを取得する
    ///
    /// 返るのは次のリンク1つだけです。循環リストの終端（先頭への到達）
    /// 検出と打ち切りは呼び出し側の責務です。この層は非有界な反復を
    /// 提供しません。
    pub fn task_struct_children_next(&self, task: Handle<TaskStruct>) -> Option<Handle<ListHead>> {
        if task.is_null() {
            return None;
        }
        self.read_ptr(task.addr(), &fields::TASK_CHILDREN_NEXT)
    }

    /// 兄弟リストの次リンクを取得する
    pub fn task_struct_sibling_next(&self, task: Handle<TaskStruct>) -> Option<Handle<ListHead>> {
        if task.is_null() {
            return None;
        }
        self.read_ptr(task.addr(), &fields::TASK_SIBLING_NEXT)
    }

    /// スレッドグループのリーダーを取得する
    pub fn task_struct_group_leader(&self, task: Handle<TaskStruct>) -> Option<Handle<TaskStruct>> {
        if task.is_null() {
            return None;
        }
        self.read_ptr(task.addr(), &fields::TASK_GROUP_LEADER)
    }

    /// タスクのシグナル状態を取得する
    pub fn task_struct_signal(&self, task: Handle<TaskStruct>) -> Option<Handle<SignalStruct>> {
        if task.is_null() {
            return None;
        }
        self.read_ptr(task.addr(), &fields::TASK_SIGNAL)
    }
}
