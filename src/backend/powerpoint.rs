//! PowerPoint 백엔드
//!
//! PowerShell 자식 프로세스 하나가 `PowerPoint.Application` COM 객체를 붙잡고,
//! 표준 입력으로 한 줄씩 명령을 받아 실행합니다. 각 명령은 `try/catch`로 감싸
//! 표준 출력에 성공/실패 마커를 한 줄 남깁니다.
//!
//! 리다이렉트된 표준 입력은 콘솔 코드 페이지로 해석되므로, 경로는 UTF-8
//! base64로 보내고 PowerShell 쪽에서 복원합니다. 명령 줄은 항상 ASCII입니다.

use base64::{engine::general_purpose, Engine as _};
use log::{debug, warn};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::{AutomationBackend, AutomationSession, PDF_FORMAT_CODE};
use crate::error::{Pptx2PdfError, Result};

const BACKEND_NAME: &str = "PowerPoint";
const DEFAULT_POWERSHELL: &str = "powershell";
const OK_MARKER: &str = "__PPTX2PDF_OK__";
const ERR_MARKER: &str = "__PPTX2PDF_ERR__:";

/// Office `msoTrue`
const MSO_TRUE: i32 = -1;

/// 정리되지 않은 세션을 닫을 때 기다리는 최대 시간
const DROP_GRACE: Duration = Duration::from_secs(5);

/// PowerShell로 PowerPoint를 구동하는 백엔드
#[derive(Debug, Clone)]
pub struct PowerPointBackend {
    powershell: PathBuf,
}

impl PowerPointBackend {
    /// 새 백엔드 생성 (None이면 PATH의 `powershell` 사용)
    pub fn new(powershell: Option<PathBuf>) -> Self {
        Self {
            powershell: powershell.unwrap_or_else(|| PathBuf::from(DEFAULT_POWERSHELL)),
        }
    }
}

impl Default for PowerPointBackend {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AutomationBackend for PowerPointBackend {
    type Session = PowerPointSession;

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn open_session(&self) -> Result<PowerPointSession> {
        debug!("PowerShell 시작: {:?}", self.powershell);

        let mut child = Command::new(&self.powershell)
            .args(["-NoLogo", "-NoProfile", "-NonInteractive", "-Command", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| unavailable(format!("{:?} 실행 실패: {}", self.powershell, e)))?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(unavailable("PowerShell 파이프를 열 수 없습니다".to_string()));
            }
        };

        let mut session = PowerPointSession {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            next_id: 0,
            closed: false,
        };

        session
            .run(&start_script())
            .map_err(|e| unavailable(e.to_string()))?
            .map_err(unavailable)?;

        Ok(session)
    }
}

/// PowerPoint에서 열린 프레젠테이션
#[derive(Debug)]
pub struct PowerPointDocument {
    var: String,
    path: PathBuf,
}

/// 실행 중인 PowerShell + PowerPoint 세션
pub struct PowerPointSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: usize,
    closed: bool,
}

impl PowerPointSession {
    /// 명령 한 줄을 실행하고 마커 응답을 기다림
    ///
    /// 바깥 `Err`는 세션 자체가 깨진 경우, 안쪽 `Err`는 PowerPoint가 명령을
    /// 거부한 경우입니다.
    fn run(&mut self, script: &str) -> Result<std::result::Result<(), String>> {
        debug!("PowerShell> {}", script);

        writeln!(self.stdin, "{}", wrap_script(script))
            .and_then(|_| self.stdin.flush())
            .map_err(|e| broken(format!("명령 전송 실패: {}", e)))?;

        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = self
                .stdout
                .read_until(b'\n', &mut buf)
                .map_err(|e| broken(format!("응답 읽기 실패: {}", e)))?;

            if read == 0 {
                return Err(broken("PowerShell이 예기치 않게 종료되었습니다".to_string()));
            }

            let line = String::from_utf8_lossy(&buf);
            match parse_reply(&line) {
                Some(reply) => return Ok(reply),
                None => debug!("PowerShell< {}", line.trim_end()),
            }
        }
    }

    /// 종료 명령을 보내고 프로세스가 끝나기를 기다림
    fn shutdown(&mut self) -> std::io::Result<()> {
        writeln!(self.stdin, "exit")?;
        self.stdin.flush()?;
        self.child.wait()?;
        Ok(())
    }
}

impl AutomationSession for PowerPointSession {
    type Document = PowerPointDocument;

    fn open_document(&mut self, path: &Path) -> Result<PowerPointDocument> {
        self.next_id += 1;
        let var = format!("deck{}", self.next_id);

        self.run(&open_script(&var, path))?
            .map_err(|reason| Pptx2PdfError::OpenDocument {
                file: path.to_path_buf(),
                reason,
            })?;

        Ok(PowerPointDocument {
            var,
            path: path.to_path_buf(),
        })
    }

    fn export_as_pdf(&mut self, document: &PowerPointDocument, output: &Path) -> Result<()> {
        self.run(&save_script(&document.var, output))?
            .map_err(|reason| Pptx2PdfError::Export {
                file: output.to_path_buf(),
                reason,
            })
    }

    fn close_document(&mut self, document: PowerPointDocument) -> Result<()> {
        self.run(&close_script(&document.var))?
            .map_err(|reason| Pptx2PdfError::CloseDocument {
                file: document.path,
                reason,
            })
    }

    fn close_session(mut self) -> Result<()> {
        let quit = self.run(&quit_script());
        self.closed = true;

        let shutdown = self.shutdown().map_err(|e| Pptx2PdfError::CloseSession {
            backend: BACKEND_NAME.to_string(),
            reason: e.to_string(),
        });

        quit?.map_err(|reason| Pptx2PdfError::CloseSession {
            backend: BACKEND_NAME.to_string(),
            reason,
        })?;
        shutdown
    }
}

impl Drop for PowerPointSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        warn!("닫히지 않은 PowerPoint 세션을 정리합니다");
        let _ = writeln!(self.stdin, "{}", wrap_script(&quit_script()));
        let _ = writeln!(self.stdin, "exit");
        let _ = self.stdin.flush();

        let started = Instant::now();
        while started.elapsed() < DROP_GRACE {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => thread::sleep(Duration::from_millis(100)),
                Err(_) => break,
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn unavailable(reason: String) -> Pptx2PdfError {
    Pptx2PdfError::BackendUnavailable {
        backend: BACKEND_NAME.to_string(),
        reason,
    }
}

fn broken(reason: String) -> Pptx2PdfError {
    Pptx2PdfError::Session {
        backend: BACKEND_NAME.to_string(),
        reason,
    }
}

/// 경로를 PowerShell에서 UTF-8 문자열로 복원되는 ASCII 식으로 변환
fn ps_path(path: &Path) -> String {
    let encoded = general_purpose::STANDARD.encode(path.to_string_lossy().as_bytes());
    format!("([Text.Encoding]::UTF8.GetString([Convert]::FromBase64String('{encoded}')))")
}

fn wrap_script(script: &str) -> String {
    format!(
        "try {{ {script}; Write-Output '{OK_MARKER}' }} catch {{ Write-Output ('{ERR_MARKER}' + ($_.Exception.Message -replace '\\r?\\n', ' ')) }}"
    )
}

fn parse_reply(line: &str) -> Option<std::result::Result<(), String>> {
    let line = line.trim();
    if line == OK_MARKER {
        Some(Ok(()))
    } else {
        line.strip_prefix(ERR_MARKER)
            .map(|reason| Err(reason.trim().to_string()))
    }
}

fn start_script() -> String {
    format!(
        "[Console]::OutputEncoding = [Text.Encoding]::UTF8; $app = New-Object -ComObject PowerPoint.Application; $app.Visible = {MSO_TRUE}"
    )
}

fn open_script(var: &str, path: &Path) -> String {
    format!("${var} = $app.Presentations.Open({})", ps_path(path))
}

fn save_script(var: &str, output: &Path) -> String {
    format!("${var}.SaveAs({}, {PDF_FORMAT_CODE})", ps_path(output))
}

fn close_script(var: &str) -> String {
    format!("${var}.Close(); Remove-Variable {var}")
}

fn quit_script() -> String {
    "$app.Quit(); [void][System.Runtime.InteropServices.Marshal]::ReleaseComObject($app); Remove-Variable app".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(encoded: &str) -> String {
        String::from_utf8(general_purpose::STANDARD.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn test_ps_path_is_base64_of_utf8() {
        let expr = ps_path(Path::new("C:\\발표\\Bob's 자료.pptx"));
        let encoded = expr
            .trim_start_matches("([Text.Encoding]::UTF8.GetString([Convert]::FromBase64String('")
            .trim_end_matches("')))");

        assert!(expr.is_ascii());
        assert!(!expr.contains("Bob"));
        assert_eq!(decode(encoded), "C:\\발표\\Bob's 자료.pptx");
    }

    #[test]
    fn test_save_script_uses_pdf_format_code() {
        let script = save_script("deck1", Path::new("/out/talk.pdf"));
        assert_eq!(
            script,
            "$deck1.SaveAs(([Text.Encoding]::UTF8.GetString([Convert]::FromBase64String('L291dC90YWxrLnBkZg=='))), 32)"
        );
    }

    #[test]
    fn test_open_and_close_scripts() {
        assert_eq!(
            open_script("deck2", Path::new("/in/a.pptx")),
            "$deck2 = $app.Presentations.Open(([Text.Encoding]::UTF8.GetString([Convert]::FromBase64String('L2luL2EucHB0eA=='))))"
        );
        assert_eq!(close_script("deck2"), "$deck2.Close(); Remove-Variable deck2");
    }

    #[test]
    fn test_non_ascii_paths_produce_ascii_scripts() {
        let input = Path::new("C:\\발표\\자료.pptx");
        let output = Path::new("C:\\결과\\자료.pdf");

        let open = open_script("deck1", input);
        let save = save_script("deck1", output);

        assert!(open.is_ascii());
        assert!(save.is_ascii());
        assert!(wrap_script(&save).is_ascii());
        assert!(open.contains("Qzpc67Cc7ZGcXOyekOujjC5wcHR4"));
    }

    #[test]
    fn test_start_script_makes_app_visible() {
        let script = start_script();
        assert!(script.contains("PowerPoint.Application"));
        assert!(script.ends_with("$app.Visible = -1"));
    }

    #[test]
    fn test_wrap_script_reports_markers() {
        let wrapped = wrap_script("$app.Quit()");
        assert!(wrapped.starts_with("try { $app.Quit();"));
        assert!(wrapped.contains(OK_MARKER));
        assert!(wrapped.contains(ERR_MARKER));
    }

    #[test]
    fn test_parse_reply() {
        assert_eq!(parse_reply("__PPTX2PDF_OK__\r\n"), Some(Ok(())));
        assert_eq!(
            parse_reply("__PPTX2PDF_ERR__: file is locked\n"),
            Some(Err("file is locked".to_string()))
        );
        assert_eq!(parse_reply("PS C:\\> "), None);
    }

    #[test]
    fn test_missing_powershell_is_unavailable() {
        let backend = PowerPointBackend::new(Some(PathBuf::from(
            "/nonexistent/pptx2pdf/powershell",
        )));

        match backend.open_session() {
            Err(Pptx2PdfError::BackendUnavailable { backend, .. }) => {
                assert_eq!(backend, "PowerPoint")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("session should not start"),
        }
    }
    #[cfg(unix)]
    mod process {
        use super::super::*;
        use crate::backend::write_fake_program;
        use crate::converter::convert_file;
        use std::fs;
        use tempfile::TempDir;

        /// 명령을 로그에 남기고 Open/SaveAs에 지정한 동작으로 응답하는 가짜 PowerShell
        fn fake_powershell(dir: &Path, on_open: &str, on_save: &str) -> (PowerPointBackend, PathBuf) {
            let log = dir.join("commands.log");
            let body = format!(
                r#"log='{log}'
while IFS= read -r line; do
  [ "$line" = "exit" ] && exit 0
  printf '%s\n' "$line" >> "$log"
  case "$line" in
    *Presentations.Open*) {on_open} ;;
    *SaveAs*) {on_save} ;;
    *) echo "{OK_MARKER}" ;;
  esac
done"#,
                log = log.display(),
            );
            let program = write_fake_program(dir, "powershell", &body);
            (PowerPointBackend::new(Some(program)), log)
        }

        fn commands(log: &Path) -> Vec<String> {
            fs::read_to_string(log)
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }

        fn ok() -> String {
            format!("echo \"{OK_MARKER}\"")
        }

        #[test]
        fn test_session_runs_full_lifecycle() {
            let temp_dir = TempDir::new().unwrap();
            let (backend, log) = fake_powershell(temp_dir.path(), &ok(), &ok());

            let output = convert_file(
                &backend,
                &temp_dir.path().join("발표.pptx"),
                &temp_dir.path().join("발표"),
            )
            .unwrap();

            assert!(output.ends_with("발표.pdf"));
            let commands = commands(&log);
            assert_eq!(commands.len(), 5);
            assert!(commands[0].contains("PowerPoint.Application"));
            assert!(commands[1].contains("$deck1 = $app.Presentations.Open("));
            assert!(commands[2].contains("$deck1.SaveAs("));
            assert!(commands[3].contains("$deck1.Close()"));
            assert!(commands[4].contains("$app.Quit()"));
            assert!(commands.iter().all(|c| c.is_ascii()));
        }

        #[test]
        fn test_error_reply_maps_to_open_document() {
            let temp_dir = TempDir::new().unwrap();
            let (backend, log) = fake_powershell(
                temp_dir.path(),
                &format!("echo \"{ERR_MARKER} cannot open\""),
                &ok(),
            );

            let err = convert_file(
                &backend,
                &temp_dir.path().join("fail.pptx"),
                &temp_dir.path().join("fail.pdf"),
            )
            .unwrap_err();

            match err {
                Pptx2PdfError::OpenDocument { reason, .. } => assert_eq!(reason, "cannot open"),
                other => panic!("unexpected error: {other}"),
            }
            let commands = commands(&log);
            assert!(!commands.iter().any(|c| c.contains("SaveAs")));
            assert!(commands.last().unwrap().contains("$app.Quit()"));
        }

        #[test]
        fn test_exit_mid_command_maps_to_session_error() {
            let temp_dir = TempDir::new().unwrap();
            let (backend, _log) = fake_powershell(temp_dir.path(), &ok(), "exit 3");

            let err = convert_file(
                &backend,
                &temp_dir.path().join("a.pptx"),
                &temp_dir.path().join("a.pdf"),
            )
            .unwrap_err();

            assert!(matches!(err, Pptx2PdfError::Session { .. }));
        }

        #[test]
        fn test_drop_quits_unclosed_session() {
            let temp_dir = TempDir::new().unwrap();
            let (backend, log) = fake_powershell(temp_dir.path(), &ok(), &ok());

            let session = backend.open_session().unwrap_or_else(|e| panic!("{e}"));
            drop(session);

            let commands = commands(&log);
            assert_eq!(commands.len(), 2);
            assert!(commands[1].contains("$app.Quit()"));
        }
    }
}
