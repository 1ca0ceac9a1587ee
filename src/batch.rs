//! 일괄 변환 모듈
//!
//! 출력 폴더 준비, 파일 탐색, 파일별 변환을 순서대로 실행합니다.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::AutomationBackend;
use crate::converter::{absolutize, Converter, SessionPolicy};
use crate::error::Result;
use crate::folder::{ensure_folder, FolderStatus};
use crate::scan::{find_files, ExtensionFilter, PRESENTATION_EXTENSION};

/// 일괄 변환 옵션
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// 프레젠테이션이 있는 입력 폴더
    pub input_dir: PathBuf,
    /// PDF를 저장할 출력 폴더
    pub output_dir: PathBuf,
    /// 하위 폴더까지 탐색
    pub recursive: bool,
    /// 세션 재사용 정책
    pub session_policy: SessionPolicy,
    /// 변환 없이 작업 목록만 출력
    pub dry_run: bool,
}

impl BatchOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            recursive: false,
            session_policy: SessionPolicy::PerFile,
            dry_run: false,
        }
    }

    /// 재귀 탐색 설정
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 세션 정책 설정
    pub fn with_session_policy(mut self, policy: SessionPolicy) -> Self {
        self.session_policy = policy;
        self
    }

    /// 드라이런 설정
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// 한 번의 반복에서 처리할 입력/출력 쌍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// 1부터 시작하는 순번
    pub index: usize,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ConversionJob {
    /// 입력 파일과 출력 폴더로 작업 생성 (두 경로 모두 절대 경로)
    pub fn new(index: usize, input: &Path, output_dir: &Path) -> Result<Self> {
        Ok(Self {
            index,
            input: absolutize(input)?,
            output: absolutize(&output_path_for(input, output_dir))?,
        })
    }

    /// `# <순번> : input = <입력> => output = <출력>`
    pub fn progress_line(&self) -> String {
        format!(
            "# {} : input = {} => output = {}",
            self.index,
            self.input.display(),
            self.output.display()
        )
    }
}

/// 입력 파일 이름의 확장자를 `.pdf`로 바꿔 출력 폴더에 연결
///
/// # Examples
/// ```
/// use std::path::{Path, PathBuf};
/// use pptx2pdf::batch::output_path_for;
///
/// assert_eq!(
///     output_path_for(Path::new("talks/talk.pptx"), Path::new("/out")),
///     PathBuf::from("/out/talk.pdf")
/// );
/// ```
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(".pdf");
    output_dir.join(name)
}

/// 탐색 결과 요약 문장
pub fn found_message(count: usize, input_dir: &Path, recursive: bool) -> String {
    if recursive {
        format!(
            "Found {} files with extension {} with a recursive search inside folder {}",
            count,
            PRESENTATION_EXTENSION,
            input_dir.display()
        )
    } else {
        format!(
            "Found {} files with extension {} under folder {} (did not conduct a recursive search)",
            count,
            PRESENTATION_EXTENSION,
            input_dir.display()
        )
    }
}

/// 일괄 변환 실행
///
/// 변환한 파일 수를 반환합니다. 변환 중 에러가 나면 남은 파일은 처리하지 않고
/// 즉시 에러를 반환하며, 이미 만들어진 PDF는 그대로 둡니다.
pub fn run_batch<B: AutomationBackend>(options: &BatchOptions, backend: &B) -> Result<usize> {
    let status = ensure_folder(&options.output_dir)?;
    println!("{}", folder_status_message(&options.output_dir, status));

    let files = find_files(
        &options.input_dir,
        options.recursive,
        &ExtensionFilter::presentations(),
    )?;

    println!(
        "{}",
        found_message(files.len(), &options.input_dir, options.recursive)
    );

    let mut converter = Converter::new(backend, options.session_policy);
    let mut converted = 0;

    for (i, input) in files.iter().enumerate() {
        let job = ConversionJob::new(i + 1, input, &options.output_dir)?;
        println!("{}", job.progress_line());

        if options.dry_run {
            continue;
        }

        let spinner = create_spinner(&job.input);
        let result = converter.convert(&job.input, &job.output);
        spinner.finish_and_clear();

        result?;
        converted += 1;
    }

    converter.finish()?;

    if options.dry_run {
        println!(
            "{} {}",
            "[DRY-RUN]".yellow().bold(),
            "변환은 수행하지 않았습니다".dimmed()
        );
    }

    Ok(converted)
}

/// 출력 폴더 상태 문장
pub fn folder_status_message(path: &Path, status: FolderStatus) -> String {
    format!("Folder '{}' {}.", path.display(), status)
}

/// 변환 중 표시할 스피너
fn create_spinner(input: &Path) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style.tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]));
    }
    pb.set_message(format!(
        "변환 중: {}",
        input.file_name().unwrap_or_default().to_string_lossy()
    ));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
