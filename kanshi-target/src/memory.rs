//! ターゲットプロセスのメモリ読み取り

use crate::Result;
use kanshi_access::MemoryReader;
use nix::unistd::Pid;
use std::fs::File;
use std::io::{Read as _, Seek, SeekFrom};

/// 稼働中プロセスのメモリへの読み取り専用アクセス
///
/// /proc/pid/memを使用してターゲットプロセスのメモリを読み取ります。
/// /proc/pid/memが使用できない場合（EIOエラー）、PTRACE_PEEKDATAに
/// フォールバックします。書き込みは提供しません。
pub struct ProcessMemory {
    pid: Pid,
}

impl ProcessMemory {
    /// プロセスIDからメモリアクセスを作成する
    pub fn new(pid: i32) -> Self {
        Self {
            pid: Pid::from_raw(pid),
        }
    }

    /// /proc/pid/mem のパスを取得する
    fn mem_path(&self) -> String {
        format!("/proc/{}/mem", self.pid)
    }

    /// /proc/pid/mem経由でメモリを読み取る（内部実装）
    fn read_via_proc_mem(&self, addr: u64, len: usize) -> Result<Vec<u8>> {
        let mem_path = self.mem_path();
        let mut file = File::open(&mem_path)
            .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", mem_path, e))?;

        // 指定されたアドレスにシーク
        file.seek(SeekFrom::Start(addr))?;

        // データを読み取る
        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    /// PTRACE_PEEKDATAを使用してメモリを読み取る
    ///
    /// /proc/pid/memが使用できない場合のフォールバック。
    /// フィールド1つ分の小さな読み取りに適しています。
    fn read_via_ptrace(&self, addr: u64, len: usize) -> Result<Vec<u8>> {
        use nix::sys::ptrace;

        let mut data = Vec::with_capacity(len);
        let word_size = std::mem::size_of::<usize>();

        // word単位で読み取り
        for offset in (0..len).step_by(word_size) {
            let word_addr = (addr as usize + offset) as *mut std::ffi::c_void;
            let word = ptrace::read(self.pid, word_addr).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to read via ptrace at 0x{:x}: {}",
                    addr as usize + offset,
                    e
                )
            })?;

            // wordをバイト列に変換
            let bytes = word.to_ne_bytes();
            let remaining = len - offset;
            let copy_size = remaining.min(word_size);

            data.extend_from_slice(&bytes[..copy_size]);
        }

        data.truncate(len);
        Ok(data)
    }
}

impl MemoryReader for ProcessMemory {
    fn read(&self, addr: u64, len: usize) -> Result<Vec<u8>> {
        // まず /proc/pid/mem で試す
        match self.read_via_proc_mem(addr, len) {
            Ok(data) => Ok(data),
            Err(e) => {
                // EIOエラー（未マップ領域）の場合、ptraceにフォールバック
                if let Some(io_err) = e.downcast_ref::<std::io::Error>() {
                    if io_err.raw_os_error() == Some(5) {
                        return self.read_via_ptrace(addr, len);
                    }
                }
                Err(e)
            }
        }
    }
}
