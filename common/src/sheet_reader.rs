//! 입력 통합문서 읽기 (calamine)
//!
//! 출역표・인적사항은 첫 번째 시트만 읽는다. 좌표는 엑셀 표기대로 1부터.

use crate::error::{Error, Result};
use crate::text::format_number;
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use std::io::Cursor;

/// 첫 번째 시트의 셀 범위
pub fn first_sheet_range(bytes: &[u8]) -> Result<Range<Data>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    match workbook.worksheet_range_at(0) {
        Some(range) => Ok(range?),
        None => Err(Error::SheetNotFound("첫 번째 시트".to_string())),
    }
}

pub fn cell(range: &Range<Data>, row: u32, col: u32) -> Option<&Data> {
    if row == 0 || col == 0 {
        return None;
    }
    range.get_value((row - 1, col - 1))
}

/// 셀을 화면에 보이는 문자열처럼 읽는다 (앞뒤 공백 제거)
pub fn cell_text(range: &Range<Data>, row: u32, col: u32) -> String {
    match cell(range, row, col) {
        Some(data) => data_text(data),
        None => String::new(),
    }
}

pub fn data_text(data: &Data) -> String {
    match data {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// 출근 표시: 숫자 1만 인정한다
pub fn is_day_flag(range: &Range<Data>, row: u32, col: u32) -> bool {
    match cell(range, row, col) {
        Some(Data::Float(f)) => *f == 1.0,
        Some(Data::Int(i)) => *i == 1,
        _ => false,
    }
}

/// 값이 하나라도 있는 행 번호 (1부터, 오름차순)
pub fn used_rows(range: &Range<Data>) -> Vec<u32> {
    let Some((start_row, _)) = range.start() else {
        return Vec::new();
    };
    range
        .rows()
        .enumerate()
        .filter(|(_, cells)| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|(i, _)| start_row + i as u32 + 1)
        .collect()
}
