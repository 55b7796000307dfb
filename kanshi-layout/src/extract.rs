//! DWARFからの構造体レイアウト抽出
//!
//! 要求された構造体のDIEを全コンパイル単位から探し、メンバの
//! オフセット・サイズ・種別をレイアウトテーブルに取り込みます。

use crate::image::{DebugImage, Reader};
use crate::table::{FieldLayout, LayoutTable, MemberKind, StructLayout};
use crate::Result;
use std::collections::HashSet;
use tracing::{debug, warn};

/// 埋め込み構造体を展開する最大深さ
const MAX_EMBED_DEPTH: usize = 8;

/// typedef・型修飾子の連鎖を剥がす最大回数
const MAX_TYPE_CHAIN: usize = 16;

type UnitOffset = gimli::UnitOffset<usize>;

/// イメージから要求された構造体のレイアウトを抽出する
pub fn extract_layouts(image: &DebugImage, wanted: &[&str]) -> Result<LayoutTable> {
    LayoutExtractor::new(image).extract(wanted)
}

/// 構造体レイアウト抽出器
pub struct LayoutExtractor<'a> {
    dwarf: &'a gimli::Dwarf<Reader>,
}

impl<'a> LayoutExtractor<'a> {
    /// 新しい抽出器を作成する
    pub fn new(image: &'a DebugImage) -> Self {
        Self {
            dwarf: image.dwarf(),
        }
    }

    /// 要求された構造体のレイアウトを全コンパイル単位から抽出する
    ///
    /// 見つからなかった構造体は警告を出すだけでエラーにはしません。
    /// 解決できたかどうかの最終判断は`LayoutTable::verify`で行います。
    pub fn extract(&self, wanted: &[&str]) -> Result<LayoutTable> {
        let mut table = LayoutTable::new();
        let mut remaining: HashSet<&str> = wanted.iter().copied().collect();

        let mut units = self.dwarf.units();
        while let Some(header) = units.next()? {
            if remaining.is_empty() {
                break;
            }
            let unit = self.dwarf.unit(header)?;
            self.scan_unit(&unit, &mut table, &mut remaining)?;
        }

        for name in &remaining {
            warn!("Struct {} not found in debug info", name);
        }

        Ok(table)
    }

    /// 1つのコンパイル単位を走査して構造体定義を探す
    fn scan_unit(
        &self,
        unit: &gimli::Unit<Reader>,
        table: &mut LayoutTable,
        remaining: &mut HashSet<&str>,
    ) -> Result<()> {
        let mut entries = unit.entries();
        while let Some((_, entry)) = entries.next_dfs()? {
            if entry.tag() != gimli::DW_TAG_structure_type {
                continue;
            }
            // 前方宣言はスキップ
            if self.is_declaration(entry) {
                continue;
            }
            let name = match self.entry_name(unit, entry) {
                Some(name) => name,
                None => continue,
            };
            if !remaining.contains(name.as_str()) {
                continue;
            }

            let layout = self.extract_struct(unit, entry, &name, 0)?;
            debug!("Resolved layout of {} ({} bytes)", name, layout.size());
            remaining.remove(name.as_str());
            table.insert(layout);
        }
        Ok(())
    }

    /// 構造体DIEからレイアウトを抽出する
    fn extract_struct(
        &self,
        unit: &gimli::Unit<Reader>,
        entry: &gimli::DebuggingInformationEntry<Reader>,
        name: &str,
        depth: usize,
    ) -> Result<StructLayout> {
        let size = self.entry_byte_size(entry).unwrap_or(0);
        let mut layout = StructLayout::new(name, size);

        // メンバを列挙
        let mut tree = unit.entries_tree(Some(entry.offset()))?;
        let root = tree.root()?;
        let mut children = root.children();
        while let Some(child) = children.next()? {
            let member = child.entry();
            if member.tag() != gimli::DW_TAG_member {
                continue;
            }
            let member_name = match self.entry_name(unit, member) {
                Some(name) => name,
                None => continue,
            };
            let offset = self.member_offset(member).unwrap_or(0);
            if let Some(field) = self.member_layout(unit, member, offset, depth)? {
                layout.insert_member(member_name, field);
            }
        }

        Ok(layout)
    }

    /// メンバDIEからフィールドレイアウトを組み立てる
    fn member_layout(
        &self,
        unit: &gimli::Unit<Reader>,
        member: &gimli::DebuggingInformationEntry<Reader>,
        offset: u64,
        depth: usize,
    ) -> Result<Option<FieldLayout>> {
        let type_offset = match self.entry_type(member) {
            Some(offset) => offset,
            None => return Ok(None),
        };
        let resolved = match self.resolve_type(unit, type_offset)? {
            Some(offset) => offset,
            None => return Ok(None),
        };

        let mut entries = unit.entries_at_offset(resolved)?;
        let entry = match entries.next_dfs()? {
            Some((_, entry)) => entry,
            None => return Ok(None),
        };

        let field = match entry.tag() {
            gimli::DW_TAG_pointer_type => FieldLayout {
                offset,
                size: self.entry_byte_size(entry).unwrap_or(8),
                kind: MemberKind::Pointer {
                    pointee: self.pointee_name(unit, entry)?,
                },
            },
            gimli::DW_TAG_structure_type | gimli::DW_TAG_union_type => {
                if depth >= MAX_EMBED_DEPTH {
                    return Ok(None);
                }
                let name = self
                    .entry_name(unit, entry)
                    .unwrap_or_else(|| "<anonymous>".to_string());
                let inner = self.extract_struct(unit, entry, &name, depth + 1)?;
                FieldLayout {
                    offset,
                    size: inner.size(),
                    kind: MemberKind::Embedded { layout: inner },
                }
            }
            gimli::DW_TAG_base_type
            | gimli::DW_TAG_enumeration_type
            | gimli::DW_TAG_array_type => FieldLayout {
                offset,
                size: self.entry_byte_size(entry).unwrap_or(0),
                kind: MemberKind::Scalar,
            },
            _ => return Ok(None),
        };

        Ok(Some(field))
    }

    /// ポインタの指し先構造体名を解決する
    fn pointee_name(
        &self,
        unit: &gimli::Unit<Reader>,
        entry: &gimli::DebuggingInformationEntry<Reader>,
    ) -> Result<Option<String>> {
        let type_offset = match self.entry_type(entry) {
            Some(offset) => offset,
            None => return Ok(None),
        };
        let resolved = match self.resolve_type(unit, type_offset)? {
            Some(offset) => offset,
            None => return Ok(None),
        };

        let mut entries = unit.entries_at_offset(resolved)?;
        let target = match entries.next_dfs()? {
            Some((_, entry)) => entry,
            None => return Ok(None),
        };

        // 指し先は名前だけ記録する。task_structのような自己参照を
        // 再帰的に展開してはならない
        if target.tag() == gimli::DW_TAG_structure_type {
            Ok(self.entry_name(unit, target))
        } else {
            Ok(None)
        }
    }

    /// typedef・const・volatile等の連鎖を有限回だけ剥がす
    fn resolve_type(
        &self,
        unit: &gimli::Unit<Reader>,
        mut offset: UnitOffset,
    ) -> Result<Option<UnitOffset>> {
        for _ in 0..MAX_TYPE_CHAIN {
            let mut entries = unit.entries_at_offset(offset)?;
            let entry = match entries.next_dfs()? {
                Some((_, entry)) => entry,
                None => return Ok(None),
            };
            match entry.tag() {
                gimli::DW_TAG_typedef
                | gimli::DW_TAG_const_type
                | gimli::DW_TAG_volatile_type
                | gimli::DW_TAG_restrict_type => match self.entry_type(entry) {
                    Some(next) => offset = next,
                    None => return Ok(None),
                },
                _ => return Ok(Some(offset)),
            }
        }
        Ok(None)
    }

    /// DIEの名前を取得する
    fn entry_name(
        &self,
        unit: &gimli::Unit<Reader>,
        entry: &gimli::DebuggingInformationEntry<Reader>,
    ) -> Option<String> {
        let attr = entry.attr_value(gimli::DW_AT_name).ok()??;
        let s = self.dwarf.attr_string(unit, attr).ok()?;
        Some(s.to_string_lossy().into_owned())
    }

    /// バイトサイズを取得する
    fn entry_byte_size(&self, entry: &gimli::DebuggingInformationEntry<Reader>) -> Option<u64> {
        let attr = entry.attr_value(gimli::DW_AT_byte_size).ok()??;
        attr.udata_value()
    }

    /// メンバオフセットを取得する
    fn member_offset(&self, entry: &gimli::DebuggingInformationEntry<Reader>) -> Option<u64> {
        let attr = entry.attr_value(gimli::DW_AT_data_member_location).ok()??;
        attr.udata_value()
    }

    /// 参照先の型DIEオフセットを取得する
    fn entry_type(&self, entry: &gimli::DebuggingInformationEntry<Reader>) -> Option<UnitOffset> {
        match entry.attr_value(gimli::DW_AT_type).ok()?? {
            gimli::AttributeValue::UnitRef(offset) => Some(offset),
            _ => None,
        }
    }

    /// 前方宣言かどうかを判定する
    fn is_declaration(&self, entry: &gimli::DebuggingInformationEntry<Reader>) -> bool {
        matches!(
            entry.attr_value(gimli::DW_AT_declaration),
            Ok(Some(gimli::AttributeValue::Flag(true)))
        )
    }
}
