//! Kanshi CLI - レイアウト検査ツール
//!
//! カーネルイメージのDWARFから監視対象構造体のレイアウトを抽出して
//! 表示・検証する開発用ツールです。監視エージェントが読み取る全
//! フィールドが対象カーネルで解決できるかをデプロイ前に確認できます。

use anyhow::Result;
use clap::{Parser, Subcommand};
use kanshi_access::fields;
use kanshi_layout::{extract_layouts, DebugImage, MemberKind};

/// Kanshi - 構造体レイアウト検査ツール
#[derive(Parser)]
#[command(name = "kanshi")]
#[command(version = "0.1.0")]
#[command(about = "Struct layout inspection for the kanshi accessor layer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: LayoutCommand,
}

#[derive(Subcommand)]
enum LayoutCommand {
    /// Dump resolved struct layouts from a kernel image
    Layout {
        /// Path to an image with debug info (e.g. vmlinux)
        image: String,

        /// Struct names to dump (defaults to the monitored set)
        #[arg(short, long)]
        strukt: Vec<String>,
    },

    /// Verify that every field the agent reads resolves on this image
    Check {
        /// Path to an image with debug info (e.g. vmlinux)
        image: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        LayoutCommand::Layout { image, strukt } => dump_layouts(&image, &strukt),
        LayoutCommand::Check { image } => check_required(&image),
    }
}

/// レイアウトを抽出して表示する
fn dump_layouts(path: &str, strukt: &[String]) -> Result<()> {
    let image = DebugImage::open(path)?;
    let wanted: Vec<&str> = if strukt.is_empty() {
        fields::REQUIRED_STRUCTS.to_vec()
    } else {
        strukt.iter().map(String::as_str).collect()
    };
    let table = extract_layouts(&image, &wanted)?;

    for name in &wanted {
        let layout = match table.strukt(name) {
            Some(layout) => layout,
            None => {
                println!("struct {}: not found", name);
                continue;
            }
        };
        println!("struct {} ({} bytes)", name, layout.size());

        let mut members: Vec<_> = layout.members().collect();
        members.sort_by_key(|(_, field)| field.offset);
        for (member, field) in members {
            println!("  +0x{:04x} {:24} {}", field.offset, member, describe(&field.kind));
        }
        println!();
    }

    Ok(())
}

/// メンバ種別の表示用文字列
fn describe(kind: &MemberKind) -> String {
    match kind {
        MemberKind::Scalar => "scalar".to_string(),
        MemberKind::Pointer { pointee: Some(name) } => format!("*{}", name),
        MemberKind::Pointer { pointee: None } => "*<opaque>".to_string(),
        MemberKind::Embedded { layout } => format!("struct {}", layout.name()),
    }
}

/// エージェントが必要とする全フィールドの解決を検証する
fn check_required(path: &str) -> Result<()> {
    let image = DebugImage::open(path)?;
    let table = extract_layouts(&image, fields::REQUIRED_STRUCTS)?;

    let mut failed = 0;
    for spec in fields::REQUIRED {
        match table.verify_spec(spec) {
            Ok(()) => println!("ok   {}", spec),
            Err(e) => {
                println!("FAIL {} ({})", spec, e);
                failed += 1;
            }
        }
    }

    println!();
    if failed > 0 {
        anyhow::bail!("{} field(s) failed to resolve", failed);
    }
    println!("All {} fields resolved", fields::REQUIRED.len());
    Ok(())
}
