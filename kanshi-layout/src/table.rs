//! レイアウトテーブルとフィールド記述子

use std::collections::HashMap;
use std::fmt;

/// 読み取り対象フィールドの記述子
///
/// 構造体名とフィールドパスの組。パスは埋め込み構造体のメンバや
/// ポインタ先のメンバへの多段アクセスを表現できます
/// （例: `task_struct` の `children.next`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// 構造体名（例: "task_struct"）
    pub strukt: &'static str,
    /// フィールドパス（例: &["children", "next"]）
    pub path: &'static [&'static str],
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.strukt, self.path.join("."))
    }
}

/// メンバの種別
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    /// スカラ値（整数・列挙・配列など）
    Scalar,
    /// ポインタ。指し先の構造体名（判明している場合）
    Pointer { pointee: Option<String> },
    /// 値として埋め込まれた構造体
    Embedded { layout: StructLayout },
}

/// メンバ1つ分のレイアウト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// 構造体先頭からのオフセット（バイト）
    pub offset: u64,
    /// サイズ（バイト）
    pub size: u64,
    /// メンバ種別
    pub kind: MemberKind,
}

/// 構造体1つ分のレイアウト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    name: String,
    size: u64,
    members: HashMap<String, FieldLayout>,
}

impl StructLayout {
    /// 空のレイアウトを作成する
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            members: HashMap::new(),
        }
    }

    /// メンバを追加する
    pub fn insert_member(&mut self, name: impl Into<String>, layout: FieldLayout) {
        self.members.insert(name.into(), layout);
    }

    /// 名前からメンバのレイアウトを取得する
    pub fn member(&self, name: &str) -> Option<&FieldLayout> {
        self.members.get(name)
    }

    /// 構造体名を取得する
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 構造体サイズ（バイト）を取得する
    pub fn size(&self) -> u64 {
        self.size
    }

    /// 全メンバを列挙する（順序は不定）
    pub fn members(&self) -> impl Iterator<Item = (&str, &FieldLayout)> {
        self.members.iter().map(|(name, field)| (name.as_str(), field))
    }
}

/// ロード時検証のエラー
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("struct not found in layout table: {0}")]
    UnknownStruct(String),
    #[error("empty field path for struct: {0}")]
    EmptyPath(String),
    #[error("field not found: {strukt}.{field}")]
    UnknownField { strukt: String, field: String },
    #[error("field is not traversable: {strukt}.{field}")]
    NotTraversable { strukt: String, field: String },
}

/// 構造体レイアウトテーブル
///
/// ロード時に一度だけ構築され、以後はプロセス全体で読み取り専用と
/// して共有される想定です。読み取りパスはこのテーブルに対して
/// フィールドを解決します。
#[derive(Debug, Clone, Default)]
pub struct LayoutTable {
    structs: HashMap<String, StructLayout>,
}

impl LayoutTable {
    /// 空のテーブルを作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 構造体レイアウトを登録する
    pub fn insert(&mut self, layout: StructLayout) {
        self.structs.insert(layout.name().to_string(), layout);
    }

    /// 名前から構造体レイアウトを取得する
    pub fn strukt(&self, name: &str) -> Option<&StructLayout> {
        self.structs.get(name)
    }

    /// フィールド記述子がこのテーブル上で解決できるかを静的に検証する
    ///
    /// メモリアクセスは行わず、パス上の各メンバの存在と辿れる種別で
    /// あることのみを確認します。エージェントが必要とする全フィールド
    /// のロード時バージョンチェックに使います。
    pub fn verify_spec(&self, spec: &FieldSpec) -> Result<(), LayoutError> {
        // 空のパスは読み取りパスでも解決できないため、検証でも落とす
        if spec.path.is_empty() {
            return Err(LayoutError::EmptyPath(spec.strukt.to_string()));
        }
        let mut layout = self
            .strukt(spec.strukt)
            .ok_or_else(|| LayoutError::UnknownStruct(spec.strukt.to_string()))?;

        for (i, seg) in spec.path.iter().enumerate() {
            let field = layout.member(seg).ok_or_else(|| LayoutError::UnknownField {
                strukt: layout.name().to_string(),
                field: seg.to_string(),
            })?;
            if i + 1 == spec.path.len() {
                return Ok(());
            }
            match &field.kind {
                MemberKind::Embedded { layout: inner } => layout = inner,
                MemberKind::Pointer { pointee } => {
                    let name = pointee.as_deref().ok_or_else(|| LayoutError::NotTraversable {
                        strukt: layout.name().to_string(),
                        field: seg.to_string(),
                    })?;
                    layout = self
                        .strukt(name)
                        .ok_or_else(|| LayoutError::UnknownStruct(name.to_string()))?;
                }
                MemberKind::Scalar => {
                    return Err(LayoutError::NotTraversable {
                        strukt: layout.name().to_string(),
                        field: seg.to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    /// 複数のフィールド記述子をまとめて検証する
    pub fn verify(&self, specs: &[FieldSpec]) -> Result<(), LayoutError> {
        for spec in specs {
            self.verify_spec(spec)?;
        }
        Ok(())
    }
}
