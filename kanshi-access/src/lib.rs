//! Kanshi 外部構造体アクセス層
//!
//! カーネル所有メモリ上の構造体フィールドを、稼働中ターゲットの
//! 実際のレイアウトに対して解決しながら安全に読み取るための中核層です。
//! プロセス監視エージェントの上位機能（プロセス木の再構築、コマンド
//! ライン抽出、cgroup帰属、終了状態の追跡）はすべてこの層を経由して
//! 外部メモリに触れます。
//!
//! この層の契約:
//! - すべてのアクセサは全域関数で、パニックも例外送出もしない
//! - 不在ハンドルは常に正当な入力で、読み取りを試みずNoneを返す
//! - レイアウト不一致・未マップ領域などの失敗も一律Noneに畳み込む
//! - 読み取りパスでは状態を持たず、ログも出さない
//!
//! 外部メモリは所有者（カーネル）によって並行に書き換えられうるため、
//! 複数フィールドにまたがる観測は別々の瞬間を反映することがあります。
//! 呼び出し側はこの良性の不整合を許容しなければなりません。

pub mod accessors;
pub mod fields;
pub mod handle;
pub mod kernel;
pub mod memory;
pub mod reader;

pub use handle::Handle;
pub use memory::MemoryReader;
pub use reader::{FieldReader, FieldValue};

/// メモリ読み取りの結果型
pub type Result<T> = anyhow::Result<T>;
