//! pptx2pdf - PPTX FOLDER TO PDF CONVERTER
//!
//! 폴더 내 PPTX 파일들을 외부 프로그램(PowerPoint 또는 LibreOffice)으로
//! 하나씩 PDF로 변환하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 🔍 **파일 탐색**: 대소문자 구분 없이 `.pptx` 파일 탐색, 선택적 재귀 탐색
//! - 📂 **출력 폴더 준비**: 출력 폴더가 없으면 상위 경로까지 생성
//! - 🖨️ **백엔드 선택**: PowerPoint(COM) 또는 headless LibreOffice
//! - ♻️ **세션 재사용**: 옵션으로 하나의 세션을 배치 전체에 사용
//! - 🧪 **드라이런 모드**: 실제 변환 없이 작업 목록 확인
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법
//! pptx2pdf ./slides ./pdf
//!
//! # 하위 폴더까지 탐색
//! pptx2pdf ./slides ./pdf --recursively
//! ```

pub mod backend;
pub mod batch;
pub mod cli;
pub mod converter;
pub mod error;
pub mod folder;
pub mod scan;

// Re-exports for convenient access
pub use backend::{AutomationBackend, AutomationSession, LibreOfficeBackend, PowerPointBackend};
pub use batch::{output_path_for, run_batch, BatchOptions, ConversionJob};
pub use cli::{Args, BackendKind};
pub use converter::{absolutize, convert_file, normalize_pdf_path, Converter, SessionPolicy};
pub use error::{Pptx2PdfError, Result};
pub use folder::{ensure_folder, FolderStatus};
pub use scan::{find_files, ExtensionFilter};
