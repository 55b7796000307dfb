//! Kanshi 構造体レイアウト解決
//!
//! このクレートは、ターゲットカーネルのデバッグ情報から監視対象構造体の
//! 実際のメンバオフセットを解決し、ロード時に読み取り専用のレイアウト
//! テーブルを構築する機能を提供します。ビルド時に仮定したレイアウトでは
//! なく、稼働中のターゲットのレイアウトに対してフィールドを解決するため、
//! カーネルバージョン間の構造体差異に耐性があります。

pub mod extract;
pub mod image;
pub mod table;

pub use extract::{extract_layouts, LayoutExtractor};
pub use image::DebugImage;
pub use table::{FieldLayout, FieldSpec, LayoutError, LayoutTable, MemberKind, StructLayout};

/// レイアウト解決の結果型
pub type Result<T> = anyhow::Result<T>;
