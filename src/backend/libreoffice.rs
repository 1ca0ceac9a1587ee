//! LibreOffice 백엔드
//!
//! `soffice --headless --convert-to pdf`를 파일마다 실행합니다.
//! 세션은 임시 사용자 프로필 하나를 공유하고, 변환 결과는 스테이징 폴더에서
//! 요청된 출력 경로로 옮깁니다.

use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

use super::{AutomationBackend, AutomationSession};
use crate::error::{Pptx2PdfError, Result};

const BACKEND_NAME: &str = "LibreOffice";

/// 경로를 지정하지 않았을 때 PATH에서 찾는 실행 파일 이름
const CANDIDATES: [&str; 2] = ["soffice", "libreoffice"];

/// headless LibreOffice 백엔드
#[derive(Debug, Clone, Default)]
pub struct LibreOfficeBackend {
    program: Option<PathBuf>,
}

impl LibreOfficeBackend {
    /// 새 백엔드 생성 (None이면 PATH에서 `soffice`, `libreoffice` 순으로 탐색)
    pub fn new(program: Option<PathBuf>) -> Self {
        Self { program }
    }

    /// 실행 가능한 LibreOffice 찾기
    fn locate(&self) -> Result<PathBuf> {
        let candidates: Vec<PathBuf> = match &self.program {
            Some(p) => vec![p.clone()],
            None => CANDIDATES.iter().map(PathBuf::from).collect(),
        };

        let mut failures = Vec::new();
        for candidate in candidates {
            match check_version(&candidate) {
                Ok(()) => return Ok(candidate),
                Err(reason) => failures.push(format!("{:?}: {}", candidate, reason)),
            }
        }

        Err(unavailable(failures.join("; ")))
    }
}

impl AutomationBackend for LibreOfficeBackend {
    type Session = LibreOfficeSession;

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn open_session(&self) -> Result<LibreOfficeSession> {
        let program = self.locate()?;
        let profile = tempfile::Builder::new()
            .prefix("pptx2pdf-profile-")
            .tempdir()
            .map_err(|e| unavailable(format!("임시 프로필 생성 실패: {}", e)))?;

        debug!("LibreOffice 세션: {:?}, 프로필 {:?}", program, profile.path());

        Ok(LibreOfficeSession { program, profile })
    }
}

/// LibreOffice로 변환할 문서
#[derive(Debug)]
pub struct LibreOfficeDocument {
    path: PathBuf,
}

/// LibreOffice 세션 (실행 파일 + 임시 사용자 프로필)
#[derive(Debug)]
pub struct LibreOfficeSession {
    program: PathBuf,
    profile: TempDir,
}

impl AutomationSession for LibreOfficeSession {
    type Document = LibreOfficeDocument;

    fn open_document(&mut self, path: &Path) -> Result<LibreOfficeDocument> {
        let open_err = |reason: String| Pptx2PdfError::OpenDocument {
            file: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(open_err("파일이 아닙니다".to_string()));
        }
        File::open(path).map_err(|e| open_err(e.to_string()))?;

        Ok(LibreOfficeDocument {
            path: path.to_path_buf(),
        })
    }

    fn export_as_pdf(&mut self, document: &LibreOfficeDocument, output: &Path) -> Result<()> {
        let export_err = |reason: String| Pptx2PdfError::Export {
            file: output.to_path_buf(),
            reason,
        };

        let staging = tempfile::Builder::new()
            .prefix("pptx2pdf-")
            .tempdir()
            .map_err(|e| export_err(format!("스테이징 폴더 생성 실패: {}", e)))?;

        let args = convert_args(self.profile.path(), staging.path(), &document.path);
        debug!("{:?} {:?}", self.program, args);

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| export_err(format!("{:?} 실행 실패: {}", self.program, e)))?;

        let stderr = String::from_utf8_lossy(&result.stderr);
        if !result.status.success() {
            return Err(export_err(format!(
                "soffice 종료 상태 {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        let produced = staging.path().join(staged_pdf_name(&document.path));
        if !produced.is_file() {
            return Err(export_err(format!(
                "PDF가 생성되지 않았습니다: {}",
                stderr.trim()
            )));
        }

        move_file(&produced, output).map_err(|e| export_err(e.to_string()))
    }

    fn close_document(&mut self, document: LibreOfficeDocument) -> Result<()> {
        debug!("문서 닫기: {:?}", document.path);
        Ok(())
    }

    fn close_session(self) -> Result<()> {
        self.profile
            .close()
            .map_err(|e| Pptx2PdfError::CloseSession {
                backend: BACKEND_NAME.to_string(),
                reason: e.to_string(),
            })
    }
}

fn unavailable(reason: String) -> Pptx2PdfError {
    Pptx2PdfError::BackendUnavailable {
        backend: BACKEND_NAME.to_string(),
        reason,
    }
}

/// `--version`으로 실행 가능 여부 확인
fn check_version(program: &Path) -> std::result::Result<(), String> {
    let status = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| e.to_string())?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("종료 상태 {}", status))
    }
}

fn convert_args(profile: &Path, outdir: &Path, input: &Path) -> Vec<OsString> {
    vec![
        "--headless".into(),
        "--norestore".into(),
        "--nolockcheck".into(),
        format!("-env:UserInstallation={}", file_url(profile)).into(),
        "--convert-to".into(),
        "pdf".into(),
        "--outdir".into(),
        outdir.as_os_str().to_owned(),
        input.as_os_str().to_owned(),
    ]
}

/// soffice가 `--outdir`에 만드는 파일 이름 (마지막 확장자만 교체)
fn staged_pdf_name(input: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(".pdf");
    PathBuf::from(name)
}

/// URL 경로에서 그대로 둘 문자 (RFC 3986 unreserved + `/`, `:`)
const URL_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b':');

/// 로컬 경로를 `file://` URL로 변환
fn file_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let raw = if raw.starts_with('/') {
        raw
    } else {
        format!("/{}", raw)
    };

    format!("file://{}", utf8_percent_encode(&raw, URL_PATH))
}

/// 파일 이동 (다른 파일시스템이면 복사 후 삭제)
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}
