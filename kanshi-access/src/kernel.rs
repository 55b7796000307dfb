//! 監視対象カーネル構造体の型タグ
//!
//! 各タグは`Handle<T>`の型パラメータとしてのみ使われる無人型です。
//! 実体の生成・所有はすべてカーネル側にあり、この層はハンドル越しに
//! 読み取るだけです。

/// struct task_struct（スケジュール可能なプロセス/スレッド）
pub enum TaskStruct {}

/// struct mm_struct（アドレス空間）
pub enum MmStruct {}

/// struct signal_struct（スレッドグループ共有のシグナル/会計状態）
pub enum SignalStruct {}

/// struct linux_binprm（実行中のexecの状態）
pub enum LinuxBinprm {}

/// struct file（オープンファイル記述）
pub enum File {}

/// struct vfsmount（マウント。パス解決用に呼び出し側へ返すだけ）
pub enum Vfsmount {}

/// struct dentry（ディレクトリエントリ。同上）
pub enum Dentry {}

/// struct cgroup（cgroup所属レコード）
pub enum Cgroup {}

/// struct kernfs_node（cgroupのファイルシステムノード）
pub enum KernfsNode {}

/// struct list_head（侵入型循環双方向リストのリンク）
pub enum ListHead {}

/// カーネルメモリ上のNUL終端文字列の先頭アドレス
///
/// 文字列本体のコピーはこの層の範囲外で、別の有界読み取り機構で行います。
pub enum RawStr {}
