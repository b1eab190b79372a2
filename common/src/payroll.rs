//! 노무비 명세서 채우기
//!
//! 노무비 템플릿 통합문서에 작업자 정보를 써 넣는다.
//! 1. 순번 매기기: 9행부터, 성명이 작업자 이름에 포함되고 순번이 비어 있는 행
//! 2. 관리자 시트의 제목・기간을 출역표의 연월로 바꾸기
//! 3. 성명 행과 그 윗행에 인적사항・출근일 쓰기
//!
//! 서식・병합 영역・손대지 않은 셀은 그대로 남는다.

use crate::error::Result;
use crate::layout::payroll::{
    ADDRESS_COL, ADMIN_SHEET, CODE_COL, DAY_FIRST_COL, JOB_COL, NAME_COL, NATIONAL_ID_COL,
    NUMBERING_AFTER_ROW, PERIOD_END_CELL, PERIOD_START_CELL, PHONE_COL, SEQUENCE_COL, TITLE_CELL,
    UNIT_PRICE_COL,
};
use crate::layout::attendance::TOP_ROW_DAYS;
use crate::merger::reconcile_duplicates;
use crate::text::{excel_serial_to_date, parse_date_text, replace_year_month, shift_to_year_month, YearMonth};
use crate::types::{PeriodMetadata, WorkerProfile};
use crate::workbook::{CellValue, Workbook, Worksheet};
use chrono::NaiveDate;
use std::collections::HashSet;

/// 노무비 명세서 결과
#[derive(Debug, Clone)]
pub struct PayrollFill {
    pub bytes: Vec<u8>,
    /// 새로 매긴 순번 수
    pub numbered: usize,
    /// 작업자 정보를 쓴 성명 행 수
    pub rows_written: usize,
}

/// 노무비 템플릿 채우기
///
/// # Arguments
/// * `template` - 노무비 템플릿 통합문서 (xlsx)
/// * `profiles` - 병합된 작업자 프로필 (중복은 여기서 정리한다)
/// * `period` - 출역표 머리글
pub fn fill_payroll(template: &[u8], profiles: &[WorkerProfile], period: &PeriodMetadata) -> Result<PayrollFill> {
    let profiles = reconcile_duplicates(profiles);
    let mut workbook = Workbook::from_bytes(template)?;

    let numbered = number_rows(&mut workbook, &profiles);

    match period.year_month() {
        Some(ym) => rewrite_period(&mut workbook, ym),
        None => tracing::warn!("기간 표기에서 연월을 찾지 못했습니다: {:?}", period.period_label),
    }

    let rows_written = write_profiles(&mut workbook, &profiles);
    tracing::info!(
        "노무비 명세서: 순번 {}개, 작업자 행 {}개 작성 (작업자 {}명)",
        numbered,
        rows_written,
        profiles.len()
    );

    Ok(PayrollFill {
        bytes: workbook.to_bytes()?,
        numbered,
        rows_written,
    })
}

/// 성명 칸이 작업자 이름 중 하나에 포함되는지
fn row_name<'a>(sheet: &'a Worksheet, row: u32) -> Option<&'a str> {
    sheet
        .text(row, NAME_COL)
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// 시트별로 순번을 매긴다. 이미 쓰인 번호는 건너뛴다.
fn number_rows(workbook: &mut Workbook, profiles: &[WorkerProfile]) -> usize {
    let mut total = 0;

    for sheet in workbook.worksheets_mut() {
        let rows: Vec<u32> = sheet
            .row_numbers()
            .into_iter()
            .filter(|&row| row > NUMBERING_AFTER_ROW)
            .collect();

        let used: HashSet<u64> = rows
            .iter()
            .filter_map(|&row| sheet.value(row, SEQUENCE_COL).as_number())
            .filter(|n| *n >= 1.0 && n.fract() == 0.0)
            .map(|n| n as u64)
            .collect();

        let targets: Vec<u32> = rows
            .into_iter()
            .filter(|&row| {
                let matched = row_name(sheet, row)
                    .map(|name| profiles.iter().any(|p| p.name.contains(name)))
                    .unwrap_or(false);
                matched && sheet.value(row, SEQUENCE_COL).is_blank()
            })
            .collect();

        let mut counter = 0u64;
        for row in targets {
            counter += 1;
            while used.contains(&counter) {
                counter += 1;
            }
            sheet.set_number(row, SEQUENCE_COL, counter as f64);
            total += 1;
        }
    }

    total
}

/// 관리자 시트의 제목과 기간 갱신
fn rewrite_period(workbook: &mut Workbook, ym: YearMonth) {
    let Some(sheet) = workbook.sheet_mut(ADMIN_SHEET) else {
        tracing::debug!("'{}' 시트가 없어 기간을 갱신하지 않습니다", ADMIN_SHEET);
        return;
    };

    if let Some(title) = sheet.text(TITLE_CELL.row, TITLE_CELL.col).map(str::to_string) {
        sheet.set_text(TITLE_CELL.row, TITLE_CELL.col, &replace_year_month(&title, ym));
    }

    let start = cell_date(sheet.value(PERIOD_START_CELL.row, PERIOD_START_CELL.col));
    let end = cell_date(sheet.value(PERIOD_END_CELL.row, PERIOD_END_CELL.col));
    match (start, end) {
        (Some(start), Some(end)) => {
            for (cell, date) in [(PERIOD_START_CELL, start), (PERIOD_END_CELL, end)] {
                if let Some(shifted) = shift_to_year_month(date, ym) {
                    sheet.set_text(cell.row, cell.col, &shifted.format("%Y-%m-%d").to_string());
                }
            }
        }
        _ => tracing::debug!("관리자 시트의 기간 칸이 비어 있거나 날짜가 아닙니다"),
    }
}

fn cell_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Number(n) => excel_serial_to_date(*n),
        CellValue::Text(text) => parse_date_text(text),
        _ => None,
    }
}

/// 작업자마다 모든 시트에서 성명 행을 찾아 쓴다
fn write_profiles(workbook: &mut Workbook, profiles: &[WorkerProfile]) -> usize {
    let mut written = 0;

    for profile in profiles {
        for sheet in workbook.worksheets_mut() {
            let rows: Vec<u32> = sheet
                .row_numbers()
                .into_iter()
                .filter(|&row| row > 1)
                .filter(|&row| row_name(sheet, row).is_some_and(|name| profile.name.contains(name)))
                .collect();

            for row in rows {
                write_row_pair(sheet, row, profile);
                written += 1;
            }
        }
    }

    written
}

/// 성명 행(`row`)과 윗행에 쓰기
fn write_row_pair(sheet: &mut Worksheet, row: u32, profile: &WorkerProfile) {
    let top = row - 1;

    if sheet.value(top, JOB_COL).is_blank() {
        sheet.set_text(top, JOB_COL, &profile.job);
    }
    // 인적사항이 없는 작업자는 빈 값으로 덮어쓴다
    sheet.set_text(top, CODE_COL, &profile.code);
    sheet.set_text(top, NATIONAL_ID_COL, &profile.national_id);
    sheet.set_text(top, PHONE_COL, &profile.phone);
    match profile.unit_price.replace(',', "").trim().parse::<f64>() {
        Ok(price) => sheet.set_number(top, UNIT_PRICE_COL, price),
        Err(_) => sheet.set_text(top, UNIT_PRICE_COL, &profile.unit_price),
    }
    sheet.set_text(row, ADDRESS_COL, &profile.address);

    for (i, &present) in profile.work_days.flags().iter().enumerate() {
        let flag = if present { 1.0 } else { 0.0 };
        if i < TOP_ROW_DAYS {
            sheet.set_number(top, DAY_FIRST_COL + i as u32, flag);
        } else {
            sheet.set_number(row, DAY_FIRST_COL + (i - TOP_ROW_DAYS) as u32, flag);
        }
    }
}
