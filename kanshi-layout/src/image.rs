//! デバッグ情報付きイメージの読み込み

use crate::Result;
use object::{Object, ObjectSection};
use std::fs;
use std::path::Path;

/// DWARFセクションの読み取りに使うリーダ型
pub type Reader = gimli::EndianSlice<'static, gimli::RunTimeEndian>;

/// デバッグ情報付きイメージ
///
/// vmlinuxのようなELFイメージからDWARFセクションを読み込んで
/// 保持します。レイアウト抽出の入力になります。
pub struct DebugImage {
    dwarf: gimli::Dwarf<Reader>,
}

impl DebugImage {
    /// ELFイメージからDWARF情報を読み込む
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file_data = fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to read image {:?}: {}", path, e))?;

        // レイアウトテーブルはプロセス寿命と同じ寿命を持つため、
        // Box::leakで'staticライフタイムを得る
        let file_data: &'static [u8] = Box::leak(file_data.into_boxed_slice());

        let object_file = object::File::parse(file_data)
            .map_err(|e| anyhow::anyhow!("Failed to parse ELF image {:?}: {}", path, e))?;

        // エンディアンを取得
        let endian = if object_file.is_little_endian() {
            gimli::RunTimeEndian::Little
        } else {
            gimli::RunTimeEndian::Big
        };

        // DWARFセクションを読み込む
        let load_section = |id: gimli::SectionId| -> Result<Reader> {
            let data = object_file
                .section_by_name(id.name())
                .and_then(|section| section.data().ok())
                .unwrap_or(&[]);
            Ok(gimli::EndianSlice::new(data, endian))
        };

        let dwarf = gimli::Dwarf::load(load_section)
            .map_err(|e| anyhow::anyhow!("Failed to load DWARF sections: {}", e))?;

        Ok(Self { dwarf })
    }

    /// DWARFコンテキストへの参照を取得
    pub fn dwarf(&self) -> &gimli::Dwarf<Reader> {
        &self.dwarf
    }
}
