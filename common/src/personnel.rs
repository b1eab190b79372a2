//! 인적사항 해석
//!
//! 1행은 머리글, 2행부터 한 행이 한 사람이다.
//! 열: 성명, 단가, 연락처, 주민등록번호, 계좌(은행 계좌번호 예금주), 코드, 최초 근무일

use crate::error::Result;
use crate::layout::personnel::{
    BANK_INFO_COL, CODE_COL, FIRST_WORKING_DAY_COL, HEADER_ROWS, NAME_COL, NATIONAL_ID_COL,
    PHONE_COL, UNIT_PRICE_COL,
};
use crate::sheet_reader::{cell, cell_text, first_sheet_range, used_rows};
use crate::text::{excel_serial_to_date, format_number, parse_date_text};
use crate::types::PersonnelRecord;
use calamine::{Data, Range};

/// 주민등록번호 자릿수 (구분자 제외)
const NATIONAL_ID_DIGITS: usize = 13;

/// 인적사항 바이트열 해석
pub fn parse_personnel(bytes: &[u8]) -> Result<Vec<PersonnelRecord>> {
    let range = first_sheet_range(bytes)?;
    Ok(parse_personnel_range(&range))
}

pub fn parse_personnel_range(range: &Range<Data>) -> Vec<PersonnelRecord> {
    let records: Vec<PersonnelRecord> = used_rows(range)
        .into_iter()
        .filter(|&row| row > HEADER_ROWS)
        .map(|row| PersonnelRecord {
            name: cell_text(range, row, NAME_COL),
            unit_price: cell_text(range, row, UNIT_PRICE_COL),
            phone: cell_text(range, row, PHONE_COL),
            national_id: national_id(cell(range, row, NATIONAL_ID_COL)),
            bank_info: cell_text(range, row, BANK_INFO_COL),
            code: cell_text(range, row, CODE_COL),
            first_working_day: first_working_day(row, cell(range, row, FIRST_WORKING_DAY_COL)),
        })
        .collect();

    tracing::debug!("인적사항: {}건", records.len());
    records
}

/// 구분자 없는 13자리로. 숫자 셀은 앞자리 0이 빠져 있으므로 채운다.
fn national_id(data: Option<&Data>) -> String {
    match data {
        Some(Data::Float(f)) => format!("{:0>width$}", format_number(*f), width = NATIONAL_ID_DIGITS),
        Some(Data::Int(i)) => format!("{:0>width$}", i, width = NATIONAL_ID_DIGITS),
        Some(Data::String(s)) => s.chars().filter(char::is_ascii_digit).collect(),
        _ => String::new(),
    }
}

/// ISO 날짜(YYYY-MM-DD) 또는 빈 문자열
fn first_working_day(row: u32, data: Option<&Data>) -> String {
    let date = match data {
        None | Some(Data::Empty) => return String::new(),
        Some(Data::DateTime(dt)) => excel_serial_to_date(dt.as_f64()),
        Some(Data::Float(f)) => excel_serial_to_date(*f),
        Some(Data::Int(i)) => excel_serial_to_date(*i as f64),
        Some(Data::String(s)) if s.trim().is_empty() => return String::new(),
        Some(Data::String(s)) | Some(Data::DateTimeIso(s)) => parse_date_text(s),
        Some(_) => None,
    };

    match date {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => {
            tracing::warn!("{}행: 최초 근무일을 해석할 수 없습니다 ({:?})", row, data);
            String::new()
        }
    }
}
