//! 外部メモリ上の構造体への不透明ハンドル

use std::fmt;
use std::marker::PhantomData;

/// 外部構造体への型付きハンドル
///
/// アドレスとコンパイル時の型タグのみを持ち、所有権を持ちません。
/// 参照先はいつでも無効になりうるため直接の参照外しは行わず、
/// すべてのアクセスは`FieldReader`を経由します。アドレス0は
/// 「不在ハンドル」で、どのアクセサに渡してもNoneになります。
pub struct Handle<T> {
    addr: u64,
    _tag: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// 不在ハンドル
    pub const fn null() -> Self {
        Self {
            addr: 0,
            _tag: PhantomData,
        }
    }

    /// 生アドレスからハンドルを作る（0も許容される）
    pub const fn from_addr(addr: u64) -> Self {
        Self {
            addr,
            _tag: PhantomData,
        }
    }

    /// 不在ハンドルかどうか
    pub const fn is_null(&self) -> bool {
        self.addr == 0
    }

    /// 生アドレスを取得する
    pub const fn addr(&self) -> u64 {
        self.addr
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle(0x{:x})", self.addr)
    }
}
