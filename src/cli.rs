//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::batch::BatchOptions;
use crate::converter::SessionPolicy;

/// 변환 백엔드 종류
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum BackendKind {
    /// PowerShell을 통해 Microsoft PowerPoint 구동 (Windows)
    #[value(name = "powerpoint")]
    PowerPoint,
    /// headless LibreOffice (`soffice`)
    #[value(name = "libreoffice")]
    LibreOffice,
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(windows) {
            BackendKind::PowerPoint
        } else {
            BackendKind::LibreOffice
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::PowerPoint => write!(f, "powerpoint"),
            BackendKind::LibreOffice => write!(f, "libreoffice"),
        }
    }
}

/// pptx2pdf CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "pptx2pdf",
    author = "YourName <your@email.com>",
    version,
    about = "Convert all pptx files in a folder into pdf files.",
    long_about = r#"
PPTX FOLDER TO PDF CONVERTER
============================

입력 폴더의 모든 .pptx 파일을 찾아 외부 프로그램으로 PDF를 만듭니다.
파일은 한 번에 하나씩 순서대로 변환되며, 하나라도 실패하면 즉시 중단합니다.

예제:
  pptx2pdf ./slides ./pdf
  pptx2pdf ./slides ./pdf --recursively
  pptx2pdf ./slides ./pdf -r --backend libreoffice --soffice /opt/libreoffice/program/soffice
  pptx2pdf ./slides ./pdf --dry-run
"#,
    after_help = "Usage: <input_folder> <output_folder>"
)]
pub struct Args {
    /// Input folder with PPTX files.
    pub input_folder: PathBuf,

    /// Output folder where the PDF files will be saved (it will be created if it does not exist).
    pub output_folder: PathBuf,

    /// Search input folder recursively (look inside subfolders).
    #[arg(short, long)]
    pub recursively: bool,

    /// 변환 백엔드
    #[arg(short, long, value_enum, env = "PPTX2PDF_BACKEND", default_value_t = BackendKind::default())]
    pub backend: BackendKind,

    /// LibreOffice 실행 파일 경로 (기본값: PATH에서 soffice, libreoffice 탐색)
    #[arg(long, env = "PPTX2PDF_SOFFICE")]
    pub soffice: Option<PathBuf>,

    /// PowerPoint 백엔드가 사용할 PowerShell 경로 (기본값: powershell)
    #[arg(long, env = "PPTX2PDF_POWERSHELL")]
    pub powershell: Option<PathBuf>,

    /// 파일마다 세션을 새로 열지 않고 하나의 세션을 재사용
    #[arg(long)]
    pub reuse_session: bool,

    /// 실제 변환 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 상세 로그 출력
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 세션 정책 반환
    pub fn session_policy(&self) -> SessionPolicy {
        if self.reuse_session {
            SessionPolicy::Shared
        } else {
            SessionPolicy::PerFile
        }
    }

    /// 일괄 변환 옵션으로 변환
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::new(&self.input_folder, &self.output_folder)
            .with_recursive(self.recursively)
            .with_session_policy(self.session_policy())
            .with_dry_run(self.dry_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_positional_and_recursive_flag() {
        let args = Args::try_parse_from(["pptx2pdf", "in", "out", "-r"]).unwrap();
        assert_eq!(args.input_folder, PathBuf::from("in"));
        assert_eq!(args.output_folder, PathBuf::from("out"));
        assert!(args.recursively);

        let args = Args::try_parse_from(["pptx2pdf", "in", "out", "--recursively"]).unwrap();
        assert!(args.recursively);
    }

    #[test]
    fn test_defaults_are_shallow_per_file() {
        let args = Args::try_parse_from(["pptx2pdf", "in", "out"]).unwrap();
        let options = args.batch_options();

        assert!(!options.recursive);
        assert!(!options.dry_run);
        assert_eq!(options.session_policy, SessionPolicy::PerFile);
    }

    #[test]
    fn test_output_folder_required() {
        assert!(Args::try_parse_from(["pptx2pdf", "in"]).is_err());
    }

    #[test]
    fn test_backend_and_session_flags() {
        let args = Args::try_parse_from([
            "pptx2pdf",
            "in",
            "out",
            "--backend",
            "powerpoint",
            "--reuse-session",
        ])
        .unwrap();

        assert_eq!(args.backend, BackendKind::PowerPoint);
        assert_eq!(args.session_policy(), SessionPolicy::Shared);
    }
}
