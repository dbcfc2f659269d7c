use crate::config::ProbeSettings;
use crate::tools::error::{MediaError, MediaResult};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// 子行程結束後等待管線讀完的上限；背景孫行程可能一直握著管線
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(500);
const BYTES_PER_MIB: u64 = 1024 * 1024;

/// 影片串流資訊；探測程式沒有回報的欄位為 `None`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_seconds: Option<f64>,
    pub size_mib: u64,
    /// 探測程式回報的其他欄位
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl VideoInfo {
    fn new(path: &Path, size_bytes: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            width: None,
            height: None,
            duration_seconds: None,
            size_mib: size_bytes / BYTES_PER_MIB,
            extra: BTreeMap::new(),
        }
    }

    fn merge(&mut self, key: &str, value: &str) {
        match key {
            "width" => self.width = value.parse().ok(),
            "height" => self.height = value.parse().ok(),
            "duration" => {
                self.duration_seconds = value.parse::<f64>().ok().filter(|d| d.is_finite());
            }
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
    }
}

/// 探測程式設定
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub program: PathBuf,
    /// `None` 代表不限制等待時間
    pub timeout: Option<Duration>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self::from(&ProbeSettings::default())
    }
}

impl From<&ProbeSettings> for ProbeOptions {
    fn from(settings: &ProbeSettings) -> Self {
        Self {
            program: settings.program.clone(),
            timeout: (settings.timeout_secs > 0).then(|| Duration::from_secs(settings.timeout_secs)),
        }
    }
}

/// 使用外部探測程式取得第一條視訊串流的寬、高與長度
pub fn get_video_info(path: &Path, options: &ProbeOptions) -> MediaResult<VideoInfo> {
    let size_bytes = fs::metadata(path)?.len();
    let output = run_probe(path, options)?;

    let mut info = VideoInfo::new(path, size_bytes);
    for (key, value) in parse_key_values(&output) {
        info.merge(key, value);
    }
    Ok(info)
}

/// 解析 `key=value` 行；沒有 `=` 的行直接略過
pub fn parse_key_values(output: &str) -> impl Iterator<Item = (&str, &str)> {
    output
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
}

fn run_probe(path: &Path, options: &ProbeOptions) -> MediaResult<String> {
    let mut child = Command::new(&options.program)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,duration",
            "-of",
            "default=noprint_wrappers=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| MediaError::ProbeSpawn {
            program: options.program.display().to_string(),
            source,
        })?;

    let stdout = PipeReader::spawn(child.stdout.take(), "stdout");
    let stderr = PipeReader::spawn(child.stderr.take(), "stderr");

    let Some(status) = wait_with_timeout(&mut child, options.timeout)? else {
        let _ = child.kill();
        let _ = child.wait();
        let deadline = Instant::now() + PIPE_DRAIN_GRACE;
        stdout.collect(deadline);
        stderr.collect(deadline);
        return Err(MediaError::ProbeTimeout(options.timeout.unwrap_or_default()));
    };

    let deadline = Instant::now() + PIPE_DRAIN_GRACE;
    let stdout = stdout.collect(deadline);
    let stderr = stderr.collect(deadline);

    if !status.success() {
        return Err(MediaError::ProbeFailed {
            status: status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(stdout)
}

/// 背景讀取子行程管線，內容邊讀邊存，不必等到 EOF 才拿得到
struct PipeReader {
    name: &'static str,
    buffer: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl PipeReader {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>, name: &'static str) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let (sender, done) = mpsc::channel();
        let shared = Arc::clone(&buffer);

        thread::spawn(move || {
            if let Some(mut pipe) = pipe {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(read) => match shared.lock() {
                            Ok(mut buffer) => buffer.extend_from_slice(&chunk[..read]),
                            Err(_) => break,
                        },
                    }
                }
            }
            let _ = sender.send(());
        });

        Self { name, buffer, done }
    }

    /// 最多等到 `deadline`，之後取走目前已讀到的內容
    fn collect(self, deadline: Instant) -> String {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if let Err(RecvTimeoutError::Timeout) = self.done.recv_timeout(remaining) {
            debug!("{} 管線仍被其他行程佔用，放棄等待 EOF", self.name);
        }

        self.buffer
            .lock()
            .map(|buffer| String::from_utf8_lossy(&buffer).into_owned())
            .unwrap_or_default()
    }
}

/// 等待子行程結束；逾時回傳 `None`
fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> MediaResult<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return Ok(Some(child.wait()?));
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
