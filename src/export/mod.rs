pub mod excel;

use crate::cli::ProfileFormat;
use crate::error::Result;
use labor_cost_common::types::{PeriodMetadata, WorkerProfile};
use std::path::{Path, PathBuf};

/// 출력 경로가 디렉터리면 `<제목>.<확장자>`를 붙인다
fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.to_path_buf()
    }
}

/// 작업자 프로필 내보내기
///
/// `output`이 없으면 JSON은 표준 출력으로, 엑셀은 `output_dir`에 쓴다.
pub fn export_profiles(
    profiles: &[WorkerProfile],
    period: &PeriodMetadata,
    format: ProfileFormat,
    output: Option<&Path>,
    output_dir: &Path,
) -> Result<Option<PathBuf>> {
    let title = "작업자";

    match (format, output) {
        (ProfileFormat::Json, None) => {
            println!("{}", serde_json::to_string_pretty(profiles)?);
            Ok(None)
        }
        (ProfileFormat::Json, Some(output)) => {
            let output_path = output_path_for_format(output, title, format.extension());
            std::fs::write(&output_path, serde_json::to_string_pretty(profiles)?)?;
            Ok(Some(output_path))
        }
        (ProfileFormat::Excel, output) => {
            let output_path = output_path_for_format(output.unwrap_or(output_dir), title, format.extension());
            excel::generate_excel(profiles, period, &output_path)?;
            Ok(Some(output_path))
        }
    }
}
