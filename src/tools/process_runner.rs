use log::{debug, warn};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// 輪詢子程序狀態的間隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("無法啟動 {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} 執行失敗 (code {code:?}): {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} 超過 {secs}s 未結束，已終止", secs = .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} 已因中斷訊號終止")]
    Cancelled { program: String },

    #[error("無法檢查程序狀態: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// 執行外部程序並等待結束
///
/// 以 `try_wait` 輪詢，期間檢查逾時與中斷訊號；stdout/stderr 由背景執行緒讀取，
/// 避免管線緩衝區塞滿造成子程序卡住。
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    shutdown_signal: Arc<AtomicBool>,
}

impl ProcessRunner {
    #[must_use]
    pub const fn new(timeout: Option<Duration>, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            timeout,
            shutdown_signal,
        }
    }

    pub fn run(&self, mut command: Command) -> Result<ProcessOutput, ProcessError> {
        let program = command.get_program().to_string_lossy().to_string();
        debug!("執行命令: {command:?}");

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdout_reader = spawn_pipe_reader(child.stdout.take());
        let stderr_reader = spawn_pipe_reader(child.stderr.take());

        let status = self.wait(&mut child, &program);

        let stdout = join_pipe_reader(stdout_reader);
        let stderr = String::from_utf8_lossy(&join_pipe_reader(stderr_reader))
            .trim()
            .to_string();

        let status = status?;
        if !status.success() {
            return Err(ProcessError::Failed {
                program,
                code: status.code(),
                stderr,
            });
        }

        Ok(ProcessOutput { stdout, stderr })
    }

    fn wait(&self, child: &mut Child, program: &str) -> Result<ExitStatus, ProcessError> {
        let started = Instant::now();

        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }

            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，終止程序 [{}] {program}", child.id());
                terminate(child);
                return Err(ProcessError::Cancelled {
                    program: program.to_string(),
                });
            }

            if let Some(timeout) = self.timeout.filter(|t| started.elapsed() >= *t) {
                warn!("程序逾時，終止 [{}] {program}", child.id());
                terminate(child);
                return Err(ProcessError::TimedOut {
                    program: program.to_string(),
                    timeout,
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_pipe_reader<R>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn join_pipe_reader(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}
