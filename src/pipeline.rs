//! 변환 파이프라인
//!
//! 출역표 → 인적사항 → 병합 → 노무비 명세서 → 근로계약서 순서로 한 번씩 실행한다.
//! 파일 입출력만 비동기이고, 각 단계는 앞 단계가 끝난 뒤에 시작한다.

use crate::config::BUILTIN_TEMPLATE;
use crate::error::{LaborCostError, Result};
use dialoguer::Confirm;
use labor_cost_common::attendance::{parse_attendance, AttendanceSheet, SkipCounts};
use labor_cost_common::contract::generate_contracts;
use labor_cost_common::merger::{merge_records, MergeOutcome};
use labor_cost_common::payroll::fill_payroll;
use labor_cost_common::personnel::parse_personnel;
use labor_cost_common::types::PeriodMetadata;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 변환 요청
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub attendance: PathBuf,
    pub personnel: PathBuf,
    pub payroll: PathBuf,
    /// 노무비 명세서 출력 (None이면 `<템플릿 파일명>.xlsx`)
    pub payroll_out: Option<PathBuf>,
    /// 근로계약서 출력 (None이면 `<기간>_근로계약서.xlsx`)
    pub contract_out: Option<PathBuf>,
    /// 근로계약서 템플릿 (None이면 내장 템플릿)
    pub contract_template: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// 기존 파일 덮어쓰기 확인 생략
    pub force: bool,
}

/// 건너뛴 레코드 집계
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub workers: usize,
    pub personnel_records: usize,
    pub skipped: SkipCounts,
    /// 인적사항을 찾지 못한 작업자
    pub lookup_misses: Vec<String>,
    pub numbered: usize,
    pub rows_written: usize,
}

/// 근로계약서 단계 결과
#[derive(Debug, Clone)]
pub enum ContractStage {
    Written { path: PathBuf, sheets: usize },
    /// 노무비 명세서는 저장된 상태
    Failed(String),
}

/// 변환 결과
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub payroll_path: PathBuf,
    pub contract: ContractStage,
    pub report: ConversionReport,
}

/// 출역표・인적사항 해석과 병합
pub async fn load_profiles(attendance: &Path, personnel: &Path) -> Result<(AttendanceSheet, MergeOutcome, usize)> {
    let sheet = parse_attendance(&read_input(attendance).await?)?;
    let records = parse_personnel(&read_input(personnel).await?)?;
    let merged = merge_records(&sheet.workers, &records);
    Ok((sheet, merged, records.len()))
}

/// 변환 실행
///
/// 노무비 명세서를 먼저 저장한 뒤 근로계약서를 만든다.
/// 근로계약서 단계가 실패해도 노무비 명세서는 남는다.
pub async fn run_conversion(request: &ConvertRequest) -> Result<ConversionOutcome> {
    // 1. 출역표
    println!("[1/5] 출역표 읽는 중...");
    let sheet = parse_attendance(&read_input(&request.attendance).await?)?;
    println!("✔ 작업자 {}명 ({})\n", sheet.workers.len(), sheet.period.period_label);
    if sheet.skipped.total() > 0 {
        println!(
            "  건너뜀: 주민번호 오류 {}건, 짝 없는 하단 행 {}건, 짝 없는 상단 행 {}건\n",
            sheet.skipped.invalid_id, sheet.skipped.orphan_bottom, sheet.skipped.abandoned_top
        );
    }

    // 2. 인적사항
    println!("[2/5] 인적사항 읽는 중...");
    let records = parse_personnel(&read_input(&request.personnel).await?)?;
    println!("✔ {}건\n", records.len());

    // 3. 병합
    println!("[3/5] 병합 중...");
    let merged = merge_records(&sheet.workers, &records);
    if merged.lookup_misses.is_empty() {
        println!("✔ 병합 완료\n");
    } else {
        println!("✔ 병합 완료 (인적사항 없음: {})\n", merged.lookup_misses.join(", "));
    }

    // 4. 노무비 명세서
    println!("[4/5] 노무비 명세서 작성 중...");
    let template = read_input(&request.payroll).await?;
    let fill = fill_payroll(&template, &merged.profiles, &sheet.period)?;
    let payroll_path = request
        .payroll_out
        .clone()
        .unwrap_or_else(|| default_payroll_path(&request.payroll, &request.output_dir));
    write_output(&payroll_path, &fill.bytes, request.force).await?;
    println!("✔ 노무비 명세서 저장: {}\n", payroll_path.display());

    // 5. 근로계약서
    println!("[5/5] 근로계약서 작성 중...");
    let contract = match contract_stage(request, &merged, &sheet.period).await {
        Ok((path, sheets)) => {
            println!("✔ 근로계약서 {}장 저장: {}", sheets, path.display());
            ContractStage::Written { path, sheets }
        }
        Err(e) => {
            tracing::error!("근로계약서 단계 실패: {}", e);
            ContractStage::Failed(e.to_string())
        }
    };

    Ok(ConversionOutcome {
        payroll_path,
        contract,
        report: ConversionReport {
            workers: sheet.workers.len(),
            personnel_records: records.len(),
            skipped: sheet.skipped,
            lookup_misses: merged.lookup_misses,
            numbered: fill.numbered,
            rows_written: fill.rows_written,
        },
    })
}

async fn contract_stage(
    request: &ConvertRequest,
    merged: &MergeOutcome,
    period: &PeriodMetadata,
) -> Result<(PathBuf, usize)> {
    let path = match &request.contract_out {
        Some(path) => path.clone(),
        None => default_contract_path(period, &request.output_dir)?,
    };
    let template = match &request.contract_template {
        Some(path) => read_input(path).await?,
        None => {
            tracing::debug!("내장 근로계약서 템플릿 사용");
            BUILTIN_TEMPLATE.to_vec()
        }
    };
    let bundle = generate_contracts(&template, &merged.profiles, period)?;
    write_output(&path, &bundle.bytes, request.force).await?;
    Ok((path, bundle.sheet_names.len()))
}

/// `<템플릿 파일명>.xlsx`
pub fn default_payroll_path(payroll: &Path, output_dir: &Path) -> PathBuf {
    let file_name = payroll
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "노무비".to_string());
    output_dir.join(format!("{}.xlsx", file_name))
}

/// `<기간>_근로계약서.xlsx`
pub fn default_contract_path(period: &PeriodMetadata, output_dir: &Path) -> Result<PathBuf> {
    let label = period.period_label.trim();
    if label.is_empty() {
        return Err(LaborCostError::InvalidPeriod(period.period_label.clone()));
    }
    Ok(output_dir.join(format!("{}_근로계약서.xlsx", sanitize_file_name(label))))
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

async fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(LaborCostError::FileNotFound(path.display().to_string()));
    }
    tracing::debug!("읽기: {}", path.display());
    Ok(tokio::fs::read(path).await?)
}

/// 기존 파일이 있으면 덮어쓸지 묻는다
async fn write_output(path: &Path, bytes: &[u8], force: bool) -> Result<()> {
    if path.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} 파일이 이미 있습니다. 덮어쓸까요?", path.display()))
            .default(false)
            .interact()
            .map_err(|e| LaborCostError::Prompt(e.to_string()))?;
        if !overwrite {
            return Err(LaborCostError::Aborted);
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_payroll_path() {
        let path = default_payroll_path(Path::new("/in/노무비.xlsx"), Path::new("/out"));
        assert_eq!(path, PathBuf::from("/out/노무비.xlsx.xlsx"));
    }

    #[test]
    fn test_default_contract_path() {
        let period = PeriodMetadata {
            period_label: "2024년 07월 A/B 현장".to_string(),
            work_location: String::new(),
        };
        let path = default_contract_path(&period, Path::new("out")).unwrap();
        assert_eq!(path, PathBuf::from("out/2024년 07월 A_B 현장_근로계약서.xlsx"));
    }

    #[test]
    fn test_default_contract_path_without_label() {
        let result = default_contract_path(&PeriodMetadata::default(), Path::new("."));
        assert!(matches!(result, Err(LaborCostError::InvalidPeriod(_))));
    }
}
