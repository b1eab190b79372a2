//! 작업자 요약 엑셀 생성
//!
//! layout.rs의 summary 정의를 써서 병합된 프로필을 표 한 장으로 만든다.

use crate::error::{Error, Result};
use crate::layout::summary::{DAY_COL_WIDTH, SUMMARY_FIELDS, SUMMARY_SHEET};
use crate::types::{PeriodMetadata, WorkerProfile, DAYS_PER_MONTH};
use rust_xlsxwriter::*;

const TITLE_ROW: u32 = 0;
const HEADER_ROW: u32 = 1;
const FIRST_DATA_ROW: u32 = 2;

/// 항목 값
fn get_field_value<'a>(profile: &'a WorkerProfile, key: &str) -> &'a str {
    match key {
        "name" => &profile.name,
        "job" => &profile.job,
        "nationalId" => &profile.national_id,
        "address" => &profile.address,
        "unitPrice" => &profile.unit_price,
        "phone" => &profile.phone,
        "bankInfo" => &profile.bank_info,
        "code" => &profile.code,
        "firstWorkingDay" => &profile.first_working_day,
        _ => "",
    }
}

fn export_err(context: &str) -> impl Fn(XlsxError) -> Error + '_ {
    move |e| Error::Export(format!("{}: {}", context, e))
}

/// 요약 엑셀을 버퍼에 생성
///
/// # Arguments
/// * `profiles` - 중복 정리된 작업자 프로필
/// * `period` - 제목에 쓸 출역표 머리글
pub fn generate_summary_buffer(profiles: &[WorkerProfile], period: &PeriodMetadata) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let title_format = Format::new()
        .set_bold()
        .set_font_size(14.0)
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter);

    let header_format = Format::new()
        .set_bold()
        .set_font_size(9.0)
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_font_size(10.0)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let day_format = Format::new()
        .set_font_size(9.0)
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SUMMARY_SHEET)
        .map_err(export_err("시트 이름 설정 오류"))?;

    // 열: 순번, 항목들, 출근일수, 1~31일
    let count_col = SUMMARY_FIELDS.len() as u16 + 1;
    let first_day_col = count_col + 1;
    let last_col = first_day_col + DAYS_PER_MONTH as u16 - 1;

    let title = format!("{} 작업자 명부", period.period_label.trim());
    worksheet
        .merge_range(TITLE_ROW, 0, TITLE_ROW, count_col, title.trim(), &title_format)
        .map_err(export_err("제목 병합 오류"))?;
    if !period.work_location.is_empty() {
        worksheet
            .write_string(TITLE_ROW, first_day_col, &period.work_location)
            .map_err(export_err("현장명 쓰기 오류"))?;
    }

    // 머리글
    worksheet
        .write_string_with_format(HEADER_ROW, 0, "순번", &header_format)
        .map_err(export_err("머리글 쓰기 오류"))?;
    worksheet.set_column_width(0, 5.0).map_err(export_err("열 너비 설정 오류"))?;
    for (i, field) in SUMMARY_FIELDS.iter().enumerate() {
        let col = i as u16 + 1;
        worksheet
            .write_string_with_format(HEADER_ROW, col, field.label, &header_format)
            .map_err(export_err("머리글 쓰기 오류"))?;
        worksheet
            .set_column_width(col, field.width)
            .map_err(export_err("열 너비 설정 오류"))?;
    }
    worksheet
        .write_string_with_format(HEADER_ROW, count_col, "출근일수", &header_format)
        .map_err(export_err("머리글 쓰기 오류"))?;
    for day in 0..DAYS_PER_MONTH as u16 {
        let col = first_day_col + day;
        worksheet
            .write_number_with_format(HEADER_ROW, col, f64::from(day + 1), &header_format)
            .map_err(export_err("머리글 쓰기 오류"))?;
        worksheet
            .set_column_width(col, DAY_COL_WIDTH)
            .map_err(export_err("열 너비 설정 오류"))?;
    }

    // 작업자 행
    for (i, profile) in profiles.iter().enumerate() {
        let row = FIRST_DATA_ROW + i as u32;
        worksheet
            .write_number_with_format(row, 0, (i + 1) as f64, &value_format)
            .map_err(export_err("순번 쓰기 오류"))?;

        for (j, field) in SUMMARY_FIELDS.iter().enumerate() {
            let value = get_field_value(profile, field.key);
            worksheet
                .write_string_with_format(row, j as u16 + 1, value, &value_format)
                .map_err(export_err("값 쓰기 오류"))?;
        }

        worksheet
            .write_number_with_format(row, count_col, profile.work_days.present_count() as f64, &value_format)
            .map_err(export_err("출근일수 쓰기 오류"))?;
        for day in profile.work_days.present_days() {
            worksheet
                .write_string_with_format(row, first_day_col + day as u16 - 1, "○", &day_format)
                .map_err(export_err("출근일 쓰기 오류"))?;
        }
    }

    worksheet
        .set_freeze_panes(FIRST_DATA_ROW, 2)
        .map_err(export_err("틀 고정 오류"))?;
    if !profiles.is_empty() {
        let last_row = FIRST_DATA_ROW + profiles.len() as u32 - 1;
        worksheet
            .autofilter(HEADER_ROW, 0, last_row, last_col)
            .map_err(export_err("자동 필터 오류"))?;
    }

    workbook
        .save_to_buffer()
        .map_err(export_err("엑셀 저장 오류"))
}
