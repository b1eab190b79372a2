use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "labor-cost")]
#[command(about = "출역표・인적사항으로 노무비 명세서와 근로계약서를 만드는 도구", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 자세한 로그 출력
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 노무비 명세서와 근로계약서 생성
    Convert {
        /// 출역표 (최종 출역 현황)
        #[arg(required = true)]
        attendance: PathBuf,

        /// 인적사항
        #[arg(required = true)]
        personnel: PathBuf,

        /// 노무비 명세서 템플릿
        #[arg(required = true)]
        payroll: PathBuf,

        /// 노무비 명세서 출력 파일 (기본: <템플릿 파일명>.xlsx)
        #[arg(long)]
        payroll_out: Option<PathBuf>,

        /// 근로계약서 출력 파일 (기본: <기간>_근로계약서.xlsx)
        #[arg(long)]
        contract_out: Option<PathBuf>,

        /// 근로계약서 템플릿 (기본: 설정값, 없으면 내장 템플릿)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// 기존 파일을 묻지 않고 덮어쓰기
        #[arg(short, long)]
        force: bool,
    },

    /// 병합된 작업자 프로필 출력
    Profiles {
        /// 출역표
        #[arg(required = true)]
        attendance: PathBuf,

        /// 인적사항
        #[arg(required = true)]
        personnel: PathBuf,

        /// 출력 파일 (생략 시 JSON을 표준 출력으로)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 출력 형식 (json/excel)
        #[arg(long, default_value = "json")]
        format: ProfileFormat,
    },

    /// 설정 표시/편집
    Config {
        /// 근로계약서 템플릿 경로 설정
        #[arg(long)]
        set_template: Option<PathBuf>,

        /// 출력 디렉터리 설정
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// 설정 표시
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProfileFormat {
    #[default]
    Json,
    Excel,
}

impl ProfileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ProfileFormat::Json => "json",
            ProfileFormat::Excel => "xlsx",
        }
    }
}

impl std::str::FromStr for ProfileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ProfileFormat::Json),
            "excel" | "xlsx" => Ok(ProfileFormat::Excel),
            _ => Err(format!("Unknown format: {}. Use json or excel", s)),
        }
    }
}

impl std::fmt::Display for ProfileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileFormat::Json => write!(f, "json"),
            ProfileFormat::Excel => write!(f, "excel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_format_from_str() {
        assert_eq!("json".parse::<ProfileFormat>(), Ok(ProfileFormat::Json));
        assert_eq!("XLSX".parse::<ProfileFormat>(), Ok(ProfileFormat::Excel));
        assert!("pdf".parse::<ProfileFormat>().is_err());
    }

    #[test]
    fn test_parse_convert_args() {
        let cli = Cli::parse_from([
            "labor-cost", "-v", "convert", "a.xlsx", "b.xlsx", "c.xlsx", "--force",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Convert { attendance, force, payroll_out, .. } => {
                assert_eq!(attendance, PathBuf::from("a.xlsx"));
                assert!(force);
                assert!(payroll_out.is_none());
            }
            _ => panic!("convert 명령이 아님"),
        }
    }
}
