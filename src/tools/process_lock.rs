use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use sysinfo::{Pid, ProcessesToUpdate, System};

/// 具名互斥鎖服務
///
/// 同一個名稱同時只能有一個持有者；取得失敗代表已有批次在執行。
pub trait LockService: Send + Sync {
    fn try_acquire(&self, name: &str) -> Result<bool>;
    fn release(&self, name: &str) -> Result<()>;
}

/// 持有中的鎖，離開作用域（包含 panic 展開）時自動釋放
#[must_use = "鎖在 guard 被丟棄時立即釋放"]
pub struct LockGuard<'a> {
    service: &'a dyn LockService,
    name: String,
}

impl LockGuard<'_> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        match self.service.release(&self.name) {
            Ok(()) => debug!("已釋放鎖: {}", self.name),
            Err(e) => warn!("無法釋放鎖 {}: {e:#}", self.name),
        }
    }
}

/// 嘗試取得鎖；已被持有時回傳 `None`
pub fn try_lock<'a>(service: &'a dyn LockService, name: &str) -> Result<Option<LockGuard<'a>>> {
    if !service.try_acquire(name)? {
        return Ok(None);
    }

    debug!("已取得鎖: {name}");
    Ok(Some(LockGuard {
        service,
        name: name.to_string(),
    }))
}

/// 僅在單一程序內有效的鎖
#[derive(Debug, Default)]
pub struct MemoryLockService {
    held: Mutex<HashSet<String>>,
}

impl MemoryLockService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_held(&self, name: &str) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }
}

impl LockService for MemoryLockService {
    fn try_acquire(&self, name: &str) -> Result<bool> {
        Ok(self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string()))
    }

    fn release(&self, name: &str) -> Result<()> {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        Ok(())
    }
}

/// 以 `<dir>/<name>.lock` 檔案實作的跨程序鎖
///
/// 鎖檔以 `create_new` 建立並寫入 pid，釋放時刪除。
/// 鎖檔已存在但記錄的程序已不存在（例如被 SIGKILL）時，視為殘留鎖並接手。
#[derive(Debug, Clone)]
pub struct FileLockService {
    directory: PathBuf,
}

impl FileLockService {
    #[must_use]
    pub fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
        }
    }

    #[must_use]
    pub fn lock_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.lock"))
    }
}

impl FileLockService {
    fn create_lock_file(path: &Path) -> Result<bool> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                if let Err(e) = writeln!(file, "{}", std::process::id()) {
                    drop(file);
                    let _ = fs::remove_file(path);
                    return Err(e).with_context(|| format!("無法寫入鎖檔: {}", path.display()));
                }
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e).with_context(|| format!("無法建立鎖檔: {}", path.display())),
        }
    }

    /// 鎖檔記錄的 pid 已不在執行時回傳該 pid
    ///
    /// 讀不到或無法解析 pid 時視為仍被持有，持有者可能正在寫入。
    fn stale_owner(path: &Path) -> Option<u32> {
        let content = fs::read_to_string(path).ok()?;
        let pid: u32 = content.trim().parse().ok()?;
        if pid == std::process::id() || is_process_alive(pid) {
            return None;
        }
        Some(pid)
    }
}

fn is_process_alive(pid: u32) -> bool {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).is_some()
}

impl LockService for FileLockService {
    fn try_acquire(&self, name: &str) -> Result<bool> {
        let path = self.lock_path(name);
        if Self::create_lock_file(&path)? {
            return Ok(true);
        }

        let Some(pid) = Self::stale_owner(&path) else {
            return Ok(false);
        };

        warn!("鎖檔 {} 的持有程序 {pid} 已不存在，接手鎖", path.display());
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("無法刪除殘留鎖檔: {}", path.display()));
            }
        }
        Self::create_lock_file(&path)
    }

    fn release(&self, name: &str) -> Result<()> {
        let path = self.lock_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("無法刪除鎖檔: {}", path.display())),
        }
    }
}
