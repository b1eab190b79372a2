//! 문자열・날짜 보조 함수
//!
//! - 주민등록번호 형식 확인
//! - 이름 정규화 (한글 이름만 추출)
//! - "YYYY년 MM월" 연월 추출・치환
//! - 날짜 문자열/엑셀 일련번호 해석

use chrono::{Datelike, Duration, NaiveDate};
use regex::{NoExpand, Regex};

lazy_static::lazy_static! {
    static ref NATIONAL_ID_RE: Regex = Regex::new(r"^\d{6}-\d{7}$").unwrap();
    static ref HANGUL_ONLY_RE: Regex = Regex::new(r"^[가-힣]+$").unwrap();
    static ref LEADING_HANGUL_RE: Regex = Regex::new(r"^[가-힣]+").unwrap();
    static ref YEAR_MONTH_RE: Regex = Regex::new(r"(\d{4})년\s*(\d{1,2})월").unwrap();
    static ref YEAR_TOKEN_RE: Regex = Regex::new(r"\d{4}년").unwrap();
    static ref MONTH_TOKEN_RE: Regex = Regex::new(r"\d{2}월").unwrap();
}

/// 연월
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// 두 자리 월 ("07")
    pub fn month_padded(&self) -> String {
        format!("{:02}", self.month)
    }

    pub fn last_day(&self) -> u32 {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.map(|d| (d - Duration::days(1)).day()).unwrap_or(31)
    }
}

/// 주민등록번호 형식(000000-0000000) 확인
pub fn is_valid_national_id(id: &str) -> bool {
    NATIONAL_ID_RE.is_match(id)
}

/// 구분자(-) 제거
pub fn strip_id_separator(id: &str) -> String {
    id.replace('-', "")
}

/// 이름 정규화
///
/// 한글 이외의 문자가 섞여 있으면 앞쪽의 연속된 한글만 남긴다.
/// 예: "홍길동(Hong)" → "홍길동"
pub fn normalize_worker_name(name: &str) -> String {
    if name.is_empty() || HANGUL_ONLY_RE.is_match(name) {
        return name.to_string();
    }
    LEADING_HANGUL_RE
        .find(name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| name.to_string())
}

/// "YYYY년 MM월" 형식에서 연월 추출
pub fn parse_year_month(text: &str) -> Option<YearMonth> {
    let caps = YEAR_MONTH_RE.captures(text)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    YearMonth::new(year, month)
}

/// 문자열의 첫 "YYYY년"・"MM월" 토큰만 바꾸고 나머지는 유지한다
///
/// 예: "2023년 05월 작업일보" → "2024년 07월 작업일보"
pub fn replace_year_month(template: &str, ym: YearMonth) -> String {
    let year = format!("{}년", ym.year);
    let month = format!("{}월", ym.month_padded());
    let replaced = YEAR_TOKEN_RE.replace(template, NoExpand(&year));
    MONTH_TOKEN_RE.replace(&replaced, NoExpand(&month)).into_owned()
}

/// 일(day)을 유지한 채 연월만 바꾼다
///
/// 대상 월에 없는 날짜(예: 6월 31일)는 그 달의 말일로 맞춘다.
pub fn shift_to_year_month(date: NaiveDate, ym: YearMonth) -> Option<NaiveDate> {
    let day = date.day().min(ym.last_day());
    NaiveDate::from_ymd_opt(ym.year, ym.month, day)
}

/// 엑셀 일련번호 → 날짜 (1900 날짜 체계)
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// 날짜 문자열 해석
///
/// 지원 형식: 2024-07-01, 2024.07.01, 2024/07/01, 20240701,
/// 2024. 7. 1., 2024년 7월 1일, 2024-07-01T00:00:00(시각 무시)
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    lazy_static::lazy_static! {
        static ref KOREAN_DATE_RE: Regex =
            Regex::new(r"(\d{4})년\s*(\d{1,2})월\s*(\d{1,2})일").unwrap();
        static ref SEPARATED_DATE_RE: Regex =
            Regex::new(r"^(\d{4})\s*[-./]\s*(\d{1,2})\s*[-./]\s*(\d{1,2})").unwrap();
        static ref COMPACT_DATE_RE: Regex = Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap();
    }

    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let caps = SEPARATED_DATE_RE
        .captures(text)
        .or_else(|| COMPACT_DATE_RE.captures(text))
        .or_else(|| KOREAN_DATE_RE.captures(text))?;

    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// 숫자 값을 엑셀 표시처럼 문자열화 (정수는 소수점 없이)
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
