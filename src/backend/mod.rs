//! 외부 변환 프로그램 추상화 모듈
//!
//! 프레젠테이션을 PDF로 내보내는 외부 프로그램(PowerPoint, LibreOffice 등)을
//! 세션 단위로 다루기 위한 트레이트를 정의합니다.

use std::path::Path;

use crate::error::Result;

pub mod libreoffice;
pub mod powerpoint;

pub use libreoffice::LibreOfficeBackend;
pub use powerpoint::PowerPointBackend;

/// PowerPoint `ppSaveAsPDF` 포맷 코드
pub const PDF_FORMAT_CODE: i32 = 32;

/// 자동화 세션을 만들어 주는 백엔드
pub trait AutomationBackend {
    /// 백엔드가 여는 세션 타입
    type Session: AutomationSession;

    /// 로그/에러 메시지에 쓰이는 이름
    fn name(&self) -> &'static str;

    /// 새 자동화 세션 시작
    fn open_session(&self) -> Result<Self::Session>;
}

/// 하나의 자동화 세션
///
/// 문서를 열고, PDF로 내보내고, 닫는 순서로 사용합니다.
/// 세션은 `close_session`으로 소비되어 종료됩니다.
pub trait AutomationSession {
    /// 열린 문서 핸들
    type Document;

    /// 절대 경로의 문서 열기
    fn open_document(&mut self, path: &Path) -> Result<Self::Document>;

    /// 열린 문서를 `output` 경로에 PDF로 저장
    fn export_as_pdf(&mut self, document: &Self::Document, output: &Path) -> Result<()>;

    /// 문서 닫기
    fn close_document(&mut self, document: Self::Document) -> Result<()>;

    /// 세션 종료
    fn close_session(self) -> Result<()>;
}

/// 테스트용 가짜 실행 파일(sh 스크립트) 작성
#[cfg(all(test, unix))]
pub(crate) fn write_fake_program(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
