//! 통합 테스트용 입력 파일 생성

#![allow(dead_code)]

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

/// 셀 값 (행・열 1부터)
pub enum Value<'a> {
    Text(&'a str),
    Number(f64),
}

/// 시트 이름과 셀 목록으로 xlsx 파일 작성
pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<(u32, u32, Value)>)]) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for (name, cells) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("시트 이름");
        for (row, col, value) in cells {
            let (row, col) = (row - 1, (col - 1) as u16);
            match value {
                Value::Text(text) => worksheet.write_string(row, col, *text).map(|_| ()),
                // 4만 이상은 날짜 일련번호로 본다
                Value::Number(n) if *n > 40000.0 => worksheet
                    .write_number_with_format(row, col, *n, &date_format)
                    .map(|_| ()),
                Value::Number(n) => worksheet.write_number(row, col, *n).map(|_| ()),
            }
            .expect("셀 쓰기");
        }
    }

    workbook.save(path).expect("통합문서 저장");
}

/// 2024년 7월 출역표: 홍길동(1, 16일), 김철수(2일), 주민번호 오류 1명
pub fn attendance_cells() -> Vec<(u32, u32, Value<'static>)> {
    use Value::*;
    vec![
        (1, 1, Text("2024년 07월 일용노무비명세서")),
        (2, 2, Text("현장A")),
        (4, 2, Text("직종")),
        // 홍길동
        (5, 2, Text("공무")),
        (5, 3, Text("홍길동")),
        (5, 4, Text("900101-1234567")),
        (5, 5, Number(1.0)),
        (6, 3, Text("서울시 강남구")),
        (6, 5, Number(1.0)),
        // 김철수 (인적사항 없음)
        (7, 2, Text("보통인부")),
        (7, 3, Text("김철수")),
        (7, 4, Text("850505-2345678")),
        (7, 6, Number(1.0)),
        (8, 3, Text("부산시 해운대구")),
        // 주민번호 오류
        (9, 2, Text("보통인부")),
        (9, 3, Text("이영희")),
        (9, 4, Text("미상")),
        (10, 3, Text("대구시")),
        // 소계
        (11, 2, Text("직종계")),
    ]
}

pub fn personnel_cells() -> Vec<(u32, u32, Value<'static>)> {
    use Value::*;
    vec![
        (1, 1, Text("성명")),
        (1, 2, Text("단가")),
        (1, 3, Text("연락처")),
        (1, 4, Text("주민번호")),
        (1, 5, Text("계좌")),
        (1, 6, Text("코드")),
        (1, 7, Text("최초근무일")),
        (2, 1, Text("홍길동")),
        (2, 2, Number(150000.0)),
        (2, 3, Text("010-1234-5678")),
        (2, 4, Text("900101-1234567")),
        (2, 5, Text("국민 123-456-789012 홍길동")),
        (2, 6, Text("A01")),
        (2, 7, Number(45476.0)),
    ]
}

pub fn admin_cells() -> Vec<(u32, u32, Value<'static>)> {
    use Value::*;
    vec![
        (1, 22, Text("2023년 05월 작업일보")),
        (3, 28, Text("2023-05-01")),
        (3, 34, Text("2023-05-31")),
    ]
}

pub fn payroll_cells() -> Vec<(u32, u32, Value<'static>)> {
    use Value::*;
    vec![
        (8, 2, Text("성명")),
        (10, 2, Text("홍길동")),
        (11, 13, Text("010-0000-0000")),
        (12, 2, Text("김철수")),
    ]
}

pub fn contract_cells() -> Vec<(u32, u32, Value<'static>)> {
    use Value::*;
    vec![
        (1, 1, Text("일용근로자 표준근로계약서")),
        (9, 3, Text("김 청 월")),
        (11, 3, Text("연락처 : 010-0000-0000")),
        (16, 2, Text("계좌번호(은행명) : 000-0000-0000")),
        (20, 2, Text("2024 년 01월 01일 ~ 2024 년 01월 31일")),
        (31, 1, Text("동의자 성명 : 김청월 (인)")),
        (34, 1, Text("동의자 성명 : 김청월 (인)")),
        (62, 6, Text("2024년 01월 01일")),
        (64, 6, Text(" 을 근 로 자 김청월 ( 인 )")),
    ]
}

/// 출력 파일의 시트 읽기
pub fn read_sheet(path: &Path, sheet: &str) -> Range<Data> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("출력 파일 열기");
    workbook.worksheet_range(sheet).expect("시트 읽기")
}

pub fn sheet_names(path: &Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).expect("출력 파일 열기");
    workbook.sheet_names()
}

/// 1부터 시작하는 좌표로 셀 읽기
pub fn value(range: &Range<Data>, row: u32, col: u32) -> Data {
    range.get_value((row - 1, col - 1)).cloned().unwrap_or(Data::Empty)
}

/// 값이 없거나 빈 문자열
pub fn is_blank(range: &Range<Data>, row: u32, col: u32) -> bool {
    match value(range, row, col) {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

pub fn text(range: &Range<Data>, row: u32, col: u32) -> String {
    match value(range, row, col) {
        Data::String(s) => s,
        other => panic!("{}행 {}열이 문자열이 아님: {:?}", row, col, other),
    }
}
