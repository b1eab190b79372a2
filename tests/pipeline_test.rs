//! 변환 파이프라인 통합 테스트
//!
//! 입력 파일을 임시 디렉터리에 만들고 출력 파일을 calamine으로 다시 읽어 확인한다.

mod common;

use calamine::Data;
use common::*;
use labor_cost_rust::error::LaborCostError;
use labor_cost_rust::pipeline::{load_profiles, run_conversion, ContractStage, ConvertRequest};
use std::path::Path;
use tempfile::tempdir;

fn prepare_inputs(dir: &Path) -> ConvertRequest {
    write_workbook(&dir.join("출역.xlsx"), &[("출역", attendance_cells())]);
    write_workbook(&dir.join("인적사항.xlsx"), &[("인적사항", personnel_cells())]);
    write_workbook(
        &dir.join("노무비.xlsx"),
        &[("관리자", admin_cells()), ("노무비", payroll_cells())],
    );
    write_workbook(&dir.join("계약서.xlsx"), &[("근로계약서", contract_cells())]);

    ConvertRequest {
        attendance: dir.join("출역.xlsx"),
        personnel: dir.join("인적사항.xlsx"),
        payroll: dir.join("노무비.xlsx"),
        payroll_out: None,
        contract_out: None,
        contract_template: Some(dir.join("계약서.xlsx")),
        output_dir: dir.join("out"),
        force: true,
    }
}

#[tokio::test]
async fn test_full_conversion() {
    let dir = tempdir().expect("Failed to create temp dir");
    let request = prepare_inputs(dir.path());

    let outcome = run_conversion(&request).await.expect("변환 실패");

    assert_eq!(outcome.payroll_path, dir.path().join("out").join("노무비.xlsx.xlsx"));
    assert_eq!(outcome.report.workers, 2);
    assert_eq!(outcome.report.personnel_records, 1);
    assert_eq!(outcome.report.skipped.invalid_id, 1);
    assert_eq!(outcome.report.lookup_misses, vec!["김철수".to_string()]);
    assert_eq!(outcome.report.numbered, 2);
    assert_eq!(outcome.report.rows_written, 2);

    // 관리자 시트
    let admin = read_sheet(&outcome.payroll_path, "관리자");
    assert_eq!(text(&admin, 1, 22), "2024년 07월 작업일보");
    assert_eq!(text(&admin, 3, 28), "2024-07-01");
    assert_eq!(text(&admin, 3, 34), "2024-07-31");

    // 노무비 시트
    let payroll = read_sheet(&outcome.payroll_path, "노무비");
    assert_eq!(value(&payroll, 10, 1), Data::Float(1.0));
    assert_eq!(value(&payroll, 12, 1), Data::Float(2.0));
    assert_eq!(text(&payroll, 9, 1), "A01");
    assert_eq!(text(&payroll, 9, 5), "공무");
    assert_eq!(text(&payroll, 9, 8), "900101-1234567");
    assert_eq!(text(&payroll, 9, 13), "010-1234-5678");
    assert_eq!(value(&payroll, 9, 18), Data::Float(150000.0));
    assert_eq!(text(&payroll, 10, 8), "서울시 강남구");
    assert_eq!(value(&payroll, 9, 20), Data::Float(1.0));
    assert_eq!(value(&payroll, 9, 21), Data::Float(0.0));
    assert_eq!(value(&payroll, 10, 20), Data::Float(1.0));
    assert_eq!(text(&payroll, 11, 5), "보통인부");
    assert_eq!(value(&payroll, 11, 21), Data::Float(1.0));
    // 인적사항이 없으면 템플릿의 견본 연락처도 지운다
    assert!(is_blank(&payroll, 11, 13));

    // 근로계약서
    let (contract_path, sheets) = match &outcome.contract {
        ContractStage::Written { path, sheets } => (path.clone(), *sheets),
        ContractStage::Failed(reason) => panic!("근로계약서 실패: {}", reason),
    };
    assert_eq!(
        contract_path,
        dir.path().join("out").join("2024년 07월 일용노무비명세서_근로계약서.xlsx")
    );
    assert_eq!(sheets, 2);
    assert_eq!(sheet_names(&contract_path), vec!["홍길동".to_string(), "김철수".to_string()]);

    let hong = read_sheet(&contract_path, "홍길동");
    assert_eq!(text(&hong, 1, 1), "일용근로자 표준근로계약서");
    assert_eq!(text(&hong, 9, 3), "홍 길 동");
    assert_eq!(text(&hong, 11, 3), "연락처 : 010-1234-5678");
    assert_eq!(text(&hong, 16, 2), "계좌번호(국민) : 123-456-789012");
    assert_eq!(text(&hong, 16, 7), "홍길동");
    assert_eq!(text(&hong, 20, 2), "2024년 07월 01일 ~ 2024년 07월 31일");
    assert_eq!(text(&hong, 62, 6), "2024년 07월 03일");
    assert_eq!(text(&hong, 64, 6), " 을 근 로 자 홍길동 ( 인 )");

    let kim = read_sheet(&contract_path, "김철수");
    assert_eq!(text(&kim, 9, 3), "김 철 수");
    assert_eq!(text(&kim, 11, 3), "연락처 : ");
    assert_eq!(text(&kim, 62, 6), "2024년 7월 01일");
}

#[tokio::test]
async fn test_missing_contract_template_keeps_payroll() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut request = prepare_inputs(dir.path());
    request.contract_template = Some(dir.path().join("없는파일.xlsx"));

    let outcome = run_conversion(&request).await.expect("노무비 단계는 성공해야 함");

    assert!(outcome.payroll_path.exists());
    match outcome.contract {
        ContractStage::Failed(reason) => assert!(reason.contains("없는파일.xlsx")),
        ContractStage::Written { .. } => panic!("템플릿이 없는데 근로계약서가 생성됨"),
    }
}

#[tokio::test]
async fn test_builtin_contract_template() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut request = prepare_inputs(dir.path());
    request.contract_template = None;

    let outcome = run_conversion(&request).await.expect("변환 실패");

    let contract_path = match &outcome.contract {
        ContractStage::Written { path, sheets } => {
            assert_eq!(*sheets, 2);
            path.clone()
        }
        ContractStage::Failed(reason) => panic!("내장 템플릿으로 근로계약서 실패: {}", reason),
    };
    assert_eq!(sheet_names(&contract_path), vec!["홍길동".to_string(), "김철수".to_string()]);

    let hong = read_sheet(&contract_path, "홍길동");
    assert_eq!(text(&hong, 1, 1), "일용근로자 표준근로계약서");
    assert_eq!(text(&hong, 9, 3), "홍 길 동");
    assert_eq!(text(&hong, 11, 3), "연락처 : 010-1234-5678");
    assert_eq!(text(&hong, 20, 2), "2024년 07월 01일 ~ 2024년 07월 31일");
    assert_eq!(text(&hong, 64, 6), " 을 근 로 자 홍길동 ( 인 )");
}

#[tokio::test]
async fn test_explicit_output_paths() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut request = prepare_inputs(dir.path());
    request.payroll_out = Some(dir.path().join("결과").join("명세서.xlsx"));
    request.contract_out = Some(dir.path().join("결과").join("계약서.xlsx"));

    let outcome = run_conversion(&request).await.expect("변환 실패");
    assert_eq!(outcome.payroll_path, dir.path().join("결과").join("명세서.xlsx"));
    assert!(outcome.payroll_path.exists());
    assert!(dir.path().join("결과").join("계약서.xlsx").exists());
}

#[tokio::test]
async fn test_missing_attendance() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut request = prepare_inputs(dir.path());
    request.attendance = dir.path().join("없음.xlsx");

    let result = run_conversion(&request).await;
    assert!(matches!(result, Err(LaborCostError::FileNotFound(_))));
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_corrupt_attendance() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut request = prepare_inputs(dir.path());
    std::fs::write(dir.path().join("깨진파일.xlsx"), b"not a workbook").unwrap();
    request.attendance = dir.path().join("깨진파일.xlsx");

    let result = run_conversion(&request).await;
    assert!(matches!(result, Err(LaborCostError::Common(_))));
}

#[tokio::test]
async fn test_load_profiles() {
    let dir = tempdir().expect("Failed to create temp dir");
    let request = prepare_inputs(dir.path());

    let (sheet, merged, personnel_count) = load_profiles(&request.attendance, &request.personnel)
        .await
        .expect("프로필 읽기 실패");

    assert_eq!(sheet.period.period_label, "2024년 07월 일용노무비명세서");
    assert_eq!(sheet.period.work_location, "현장A");
    assert_eq!(personnel_count, 1);
    assert_eq!(merged.profiles.len(), 2);
    assert_eq!(merged.profiles[0].first_working_day, "2024-07-03");
    assert_eq!(merged.profiles[0].work_days.present_days(), vec![1, 16]);
    assert_eq!(merged.profiles[1].work_days.present_days(), vec![2]);
}
