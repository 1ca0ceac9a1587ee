//! 출력 폴더 준비 모듈

use std::fmt;
use std::path::Path;

use crate::error::{Pptx2PdfError, Result};

/// 출력 폴더 준비 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    /// 새로 생성함
    Created,
    /// 이미 존재함
    AlreadyExists,
}

impl fmt::Display for FolderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolderStatus::Created => write!(f, "created successfully"),
            FolderStatus::AlreadyExists => write!(f, "already exists"),
        }
    }
}

/// 폴더가 없으면 상위 경로까지 포함해 생성
///
/// 여러 번 호출해도 안전하며, 두 번째 호출부터는 `AlreadyExists`를 반환합니다.
pub fn ensure_folder(path: &Path) -> Result<FolderStatus> {
    if path.is_dir() {
        return Ok(FolderStatus::AlreadyExists);
    }

    std::fs::create_dir_all(path).map_err(|source| Pptx2PdfError::CreateFolder {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(FolderStatus::Created)
}
