use super::{Converter, types::*};
use crate::{config::Config, util::expand_tilde};
use anyhow::{Context, Result, anyhow};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const RUNNER_SCRIPT: &str = "pdf2docx_runner.py";
pub const PYTHON_ENV_VAR: &str = "PDF_TOOLS_PYTHON";

/// Runs `pdf2docx` in a Python child process, one JSON request per call.
pub struct PythonEngine {
    cfg: Config,
    script: PathBuf,
    python_exe: PathBuf,
}

impl PythonEngine {
    pub fn new(cfg: &Config) -> Result<Self> {
        let scripts_dir = expand_tilde(&cfg.converter.scripts_dir);
        let script = scripts_dir.join(RUNNER_SCRIPT);
        if !script.exists() {
            return Err(anyhow!("missing script: {}", script.display()));
        }
        let python_exe = resolve_python_exe(&cfg.converter.python_exe);
        debug!(
            "converter python={} script={}",
            python_exe.display(),
            script.display()
        );
        Ok(Self {
            cfg: cfg.clone(),
            script,
            python_exe,
        })
    }

    fn timeout(&self) -> Option<Duration> {
        match self.cfg.converter.timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    fn run_json<I: serde::Serialize, O: for<'de> serde::Deserialize<'de>>(
        &self,
        input: &I,
    ) -> Result<O> {
        let script = &self.script;
        let timeout = self.timeout();
        debug!("python run {} timeout={:?}", script.display(), timeout);

        let mut cmd = Command::new(&self.python_exe);
        cmd.arg(script);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        for (k, v) in &self.cfg.converter.env {
            cmd.env(k, v);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning {}", self.python_exe.display()))?;

        {
            let mut stdin = child.stdin.take().ok_or_else(|| anyhow!("no stdin"))?;
            let bytes = serde_json::to_vec(input)?;
            use std::io::Write;
            stdin.write_all(&bytes)?;
            stdin.flush().ok();
        }

        let output = match timeout {
            Some(limit) => wait_with_timeout(&mut child, limit)?,
            None => child
                .wait_with_output()
                .with_context(|| "waiting for python")?,
        };

        if self.cfg.debug.log_converter_stderr && !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("python stderr {}: {}", script.display(), stderr.trim());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "converter exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let out: O = serde_json::from_slice(&output.stdout)
            .with_context(|| format!("parsing converter JSON output: {}", script.display()))?;
        Ok(out)
    }
}

impl Converter for PythonEngine {
    fn convert(&self, req: &ConvertIn) -> Result<ConvertOut> {
        self.run_json(req)
    }
}

fn resolve_python_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var(PYTHON_ENV_VAR) {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
            warn!("{PYTHON_ENV_VAR} points at a missing file: {}", p.display());
        }
        return PathBuf::from("python3");
    }
    expand_tilde(raw)
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Output> {
    // Drain pipes while waiting so a chatty converter can't block on a full
    // stdout/stderr buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf).with_context(|| "read stdout")?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf).with_context(|| "read stderr")?;
        }
        Ok(buf)
    });

    let start = Instant::now();
    let timed_out = loop {
        if child.try_wait().with_context(|| "try_wait")?.is_some() {
            break false;
        }
        if start.elapsed() > timeout {
            warn!("converter timed out after {:?}", timeout);
            let _ = child.kill();
            break true;
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    let status = child.wait().with_context(|| "wait for converter")?;
    let stdout = stdout_thread
        .join()
        .map_err(|_| anyhow!("stdout reader thread panicked"))??;
    let stderr = stderr_thread
        .join()
        .map_err(|_| anyhow!("stderr reader thread panicked"))??;

    if timed_out {
        return Err(anyhow!(
            "converter exceeded timeout ({:?}); stderr: {}",
            timeout,
            String::from_utf8_lossy(&stderr).trim()
        ));
    }

    Ok(Output {
        status,
        stdout,
        stderr,
    })
}
