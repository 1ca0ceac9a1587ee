//! 파일 탐색 모듈
//!
//! 입력 폴더에서 확장자가 일치하는 파일을 찾습니다.

use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Pptx2PdfError, Result};

/// 변환 대상 프레젠테이션 확장자
pub const PRESENTATION_EXTENSION: &str = "pptx";

/// 대소문자 구분 없는 확장자 필터
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    suffixes: Vec<String>,
}

impl ExtensionFilter {
    /// 새 확장자 필터 생성
    ///
    /// `"pptx"`, `".pptx"`, `"PPTX"` 모두 `.pptx` 접미사로 정규화됩니다.
    ///
    /// # Examples
    /// ```
    /// use pptx2pdf::scan::ExtensionFilter;
    ///
    /// let filter = ExtensionFilter::new(&["pptx"]);
    /// assert!(filter.matches("talk.PPTX"));
    /// assert!(!filter.matches("notes.txt"));
    /// ```
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        let suffixes = extensions
            .iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .map(|e| format!(".{}", e))
            .collect();

        Self { suffixes }
    }

    /// 프레젠테이션(.pptx) 전용 필터
    pub fn presentations() -> Self {
        Self::new(&[PRESENTATION_EXTENSION])
    }

    /// 파일 이름이 허용된 확장자 중 하나로 끝나는지 확인
    pub fn matches(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.suffixes.iter().any(|s| lower.ends_with(s.as_str()))
    }
}

/// 입력 폴더에서 일치하는 파일 수집
///
/// `recursive`가 false이면 루트 바로 아래 파일만 봅니다.
/// 결과 순서는 디렉토리 탐색 순서 그대로이며 정렬하지 않습니다.
pub fn find_files(root: &Path, recursive: bool, filter: &ExtensionFilter) -> Result<Vec<PathBuf>> {
    validate_root(root)?;

    let walker = WalkDir::new(root).min_depth(1);
    let walker = if recursive {
        walker
    } else {
        walker.max_depth(1)
    };

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(Pptx2PdfError::ReadDir {
                    path: root.to_path_buf(),
                    source: e.into(),
                });
            }
            Err(e) => {
                warn!("하위 폴더를 건너뜁니다: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        // UTF-8이 아닌 이름도 접미사만 맞으면 포함
        if filter.matches(&entry.file_name().to_string_lossy()) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// 루트 폴더 확인
fn validate_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(Pptx2PdfError::InputNotFound {
            path: root.to_path_buf(),
        });
    }

    if !root.is_dir() {
        return Err(Pptx2PdfError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    std::fs::read_dir(root).map_err(|source| Pptx2PdfError::ReadDir {
        path: root.to_path_buf(),
        source,
    })?;

    Ok(())
}
