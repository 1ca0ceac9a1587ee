//! 에러 타입 정의 모듈
//!
//! pptx2pdf에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::path::PathBuf;
use thiserror::Error;

/// pptx2pdf에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum Pptx2PdfError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 폴더 읽기 실패
    #[error("폴더를 읽을 수 없습니다 ({path}): {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 출력 폴더 생성 실패
    #[error("출력 폴더를 만들 수 없습니다 ({path}): {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 절대 경로 변환 실패
    #[error("절대 경로로 변환할 수 없습니다 ({path}): {source}")]
    ResolvePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 외부 프로그램을 시작할 수 없음
    #[error("{backend} 세션을 시작할 수 없습니다: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    /// 문서 열기 실패
    #[error("문서를 열 수 없습니다 ({file}): {reason}")]
    OpenDocument { file: PathBuf, reason: String },

    /// PDF 내보내기 실패
    #[error("PDF 저장 실패 ({file}): {reason}")]
    Export { file: PathBuf, reason: String },

    /// 문서 닫기 실패
    #[error("문서를 닫을 수 없습니다 ({file}): {reason}")]
    CloseDocument { file: PathBuf, reason: String },

    /// 세션 종료 실패
    #[error("{backend} 세션 종료 실패: {reason}")]
    CloseSession { backend: String, reason: String },

    /// 세션 통신 실패 (프로세스 비정상 종료 등)
    #[error("{backend} 세션 통신 실패: {reason}")]
    Session { backend: String, reason: String },
}

/// pptx2pdf 결과 타입 별칭
pub type Result<T> = std::result::Result<T, Pptx2PdfError>;
