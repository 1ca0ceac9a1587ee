//! pptx2pdf - PPTX FOLDER TO PDF CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::debug;

use pptx2pdf::{
    backend::{LibreOfficeBackend, PowerPointBackend},
    batch::run_batch,
    cli::{Args, BackendKind},
};

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);
    print_header(&args);

    let options = args.batch_options();
    debug!("옵션: {:?}", options);

    let converted = match args.backend {
        BackendKind::PowerPoint => {
            run_batch(&options, &PowerPointBackend::new(args.powershell.clone()))
        }
        BackendKind::LibreOffice => {
            run_batch(&options, &LibreOfficeBackend::new(args.soffice.clone()))
        }
    }
    .with_context(|| format!("{:?} 폴더 변환 실패", args.input_folder))?;

    debug!("변환 완료: {} 개", converted);

    Ok(())
}

/// 로거 초기화 (RUST_LOG가 있으면 우선)
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// 헤더 출력
fn print_header(args: &Args) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🖨️  PPTX FOLDER TO PDF CONVERTER".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input_folder);
    println!("  {} 출력 폴더: {:?}", "📄".bright_green(), args.output_folder);
    println!("  {} 백엔드: {}", "⚙️".bright_yellow(), args.backend);

    if args.recursively {
        println!("  {} {}", "🔁".bright_magenta(), "재귀 탐색".magenta());
    }

    if args.reuse_session {
        println!("  {} {}", "♻️".bright_cyan(), "세션 재사용".cyan());
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 변환 없음)".yellow()
        );
    }

    println!("{}", "═".repeat(50).bright_blue());
}
