//! 단일 파일 변환 모듈
//!
//! 백엔드 세션을 열어 프레젠테이션 하나를 PDF로 내보냅니다.

use log::{debug, warn};
use std::path::{Component, Path, PathBuf};

use crate::backend::{AutomationBackend, AutomationSession};
use crate::error::{Pptx2PdfError, Result};

/// 세션 재사용 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPolicy {
    /// 파일마다 새 세션을 열고 닫음
    #[default]
    PerFile,
    /// 첫 파일에서 연 세션을 배치 끝까지 유지
    Shared,
}

/// 출력 경로가 `pdf`로 끝나지 않으면 `.pdf`를 붙임
///
/// 대소문자를 구분하는 문자열 접미사 검사입니다.
///
/// # Examples
/// ```
/// use std::path::{Path, PathBuf};
/// use pptx2pdf::converter::normalize_pdf_path;
///
/// assert_eq!(normalize_pdf_path(Path::new("report")), PathBuf::from("report.pdf"));
/// assert_eq!(normalize_pdf_path(Path::new("report.pdf")), PathBuf::from("report.pdf"));
/// ```
pub fn normalize_pdf_path(path: &Path) -> PathBuf {
    if path.to_string_lossy().ends_with("pdf") {
        return path.to_path_buf();
    }

    let mut normalized = path.as_os_str().to_owned();
    normalized.push(".pdf");
    PathBuf::from(normalized)
}

/// 현재 작업 폴더 기준 절대 경로로 변환
///
/// `.`과 `..`은 문자열 기준으로 정리하며, 경로가 존재하지 않아도 됩니다.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|source| Pptx2PdfError::ResolvePath {
        path: path.to_path_buf(),
        source,
    })?;

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }

    Ok(resolved)
}

/// 파일 하나를 새 세션으로 변환
///
/// 최종 출력 경로(절대 경로, `.pdf` 보장)를 반환합니다.
pub fn convert_file<B: AutomationBackend>(
    backend: &B,
    input: &Path,
    output: &Path,
) -> Result<PathBuf> {
    Converter::new(backend, SessionPolicy::PerFile).convert(input, output)
}

/// 세션 정책을 적용하는 변환기
pub struct Converter<'a, B: AutomationBackend> {
    backend: &'a B,
    policy: SessionPolicy,
    shared: Option<B::Session>,
}

impl<'a, B: AutomationBackend> Converter<'a, B> {
    pub fn new(backend: &'a B, policy: SessionPolicy) -> Self {
        Self {
            backend,
            policy,
            shared: None,
        }
    }

    /// 입력 파일을 `output` 경로에 PDF로 저장
    pub fn convert(&mut self, input: &Path, output: &Path) -> Result<PathBuf> {
        let input = absolutize(input)?;
        let output = absolutize(&normalize_pdf_path(output))?;

        let mut session = match self.shared.take() {
            Some(session) => session,
            None => {
                debug!("{} 세션 시작", self.backend.name());
                self.backend.open_session()?
            }
        };

        if let Err(e) = export_document(&mut session, &input, &output) {
            discard_session(self.backend.name(), session);
            return Err(e);
        }

        match self.policy {
            SessionPolicy::PerFile => session.close_session()?,
            SessionPolicy::Shared => self.shared = Some(session),
        }

        Ok(output)
    }

    /// 유지 중인 세션 종료
    pub fn finish(mut self) -> Result<()> {
        match self.shared.take() {
            Some(session) => session.close_session(),
            None => Ok(()),
        }
    }
}

/// 열기 → 내보내기 → 닫기
///
/// 내보내기에 실패해도 문서는 닫고, 처음 에러를 반환합니다.
fn export_document<S: AutomationSession>(session: &mut S, input: &Path, output: &Path) -> Result<()> {
    let document = session.open_document(input)?;

    if let Err(e) = session.export_as_pdf(&document, output) {
        if let Err(close_err) = session.close_document(document) {
            warn!("문서 정리 실패: {}", close_err);
        }
        return Err(e);
    }

    session.close_document(document)
}

fn discard_session<S: AutomationSession>(name: &str, session: S) {
    if let Err(e) = session.close_session() {
        warn!("{} 세션 정리 실패: {}", name, e);
    }
}
