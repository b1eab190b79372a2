//! 근로계약서 문구 치환
//!
//! 템플릿 문구의 모양(공백, 괄호 등)은 그대로 두고 이름・날짜・계좌 부분만 바꾼다.

use crate::text::YearMonth;
use chrono::{Datelike, NaiveDate};
use regex::{NoExpand, Regex};

lazy_static::lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"\d{3}-\d{4}-\d{4}").unwrap();
    static ref BANK_INFO_RE: Regex = Regex::new(r"([가-힣]+)\s([\d-]+)\s(.+)$").unwrap();
    static ref PARENTHESIZED_RE: Regex = Regex::new(r"\(.*\)").unwrap();
    static ref ACCOUNT_RE: Regex = Regex::new(r"[\d-]+").unwrap();
    static ref PERIOD_START_RE: Regex = Regex::new(r"\d{4}\s*년\s*\d{1,2}월\s*\d{1,2}일").unwrap();
    static ref PERIOD_END_RE: Regex = Regex::new(r"\d{4}\s*년\s*\d{1,2}월\s*\d{1,2}일$").unwrap();
    static ref CONSENT_NAME_RE: Regex = Regex::new(r"동의자 성명\s*[:：]\s*([^(]+)").unwrap();
    static ref NAME_BEFORE_PAREN_RE: Regex = Regex::new(r"([가-힣]+)\(").unwrap();
    static ref SIGNER_RE: Regex = Regex::new(r"\s([^\s()]+)\s*\(\s*인\s*\)").unwrap();
    static ref YEAR_RE: Regex = Regex::new(r"\d{4}년").unwrap();
    static ref MONTH_RE: Regex = Regex::new(r"\d{2}월").unwrap();
    static ref DAY_RE: Regex = Regex::new(r"\d{2}일").unwrap();
}

/// 동의자 이름과 "(" 사이 공백 수
const CONSENT_NAME_GAP: usize = 16;

/// "홍길동" → "홍 길 동"
pub fn space_out_name(name: &str) -> String {
    name.chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 첫 번째 `ddd-dddd-dddd`를 연락처로 바꾼다
///
/// 앞뒤에 영숫자가 붙어 있는 숫자열은 연락처로 보지 않는다.
pub fn replace_phone(text: &str, phone: &str) -> String {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let found = PHONE_RE.find_iter(text).find(|m| {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    });
    match found {
        Some(m) => format!("{}{}{}", &text[..m.start()], phone, &text[m.end()..]),
        None => text.to_string(),
    }
}

/// 계좌 정보 ("은행 계좌번호 예금주")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccount {
    pub bank: String,
    pub account: String,
    pub holder: String,
}

impl BankAccount {
    pub fn parse(bank_info: &str) -> Option<Self> {
        let caps = BANK_INFO_RE.captures(bank_info.trim())?;
        Some(Self {
            bank: caps[1].to_string(),
            account: caps[2].to_string(),
            holder: caps[3].trim().to_string(),
        })
    }
}

/// 괄호 부분을 "(은행)"으로, 첫 숫자・하이픈 묶음을 계좌번호로
///
/// 예: "계좌번호(은행) : 000-000" → "계좌번호(국민) : 123-456"
pub fn splice_bank_account(text: &str, account: &BankAccount) -> String {
    let bank = format!("({})", account.bank);
    let replaced = PARENTHESIZED_RE.replace(text, NoExpand(&bank));
    ACCOUNT_RE.replace(&replaced, NoExpand(&account.account)).into_owned()
}

/// 계약 기간을 그 달 1일 ~ 말일로
///
/// 예: "2024 년 01월 01일 ~ 2024 년 01월 31일" → "2024년 07월 01일 ~ 2024년 07월 31일"
pub fn contract_period(text: &str, ym: YearMonth) -> String {
    let start = format!("{}년 {}월 01일", ym.year, ym.month_padded());
    let end = format!("{}년 {}월 {}일", ym.year, ym.month_padded(), ym.last_day());
    let replaced = PERIOD_START_RE.replace(text, NoExpand(&start));
    PERIOD_END_RE.replace(&replaced, NoExpand(&end)).into_owned()
}

/// "동의자 성명 : 김청월 (인)" → "동의자 성명 : 홍길동                (인)"
pub fn replace_consent_name(text: &str, name: &str) -> String {
    let Some(found) = CONSENT_NAME_RE.captures(text).and_then(|caps| caps.get(1)) else {
        return text.to_string();
    };
    let spliced = format!("{}{}{}", &text[..found.start()], name, &text[found.end()..]);

    NAME_BEFORE_PAREN_RE
        .replace(&spliced, |caps: &regex::Captures| {
            format!("{}{}(", &caps[1], " ".repeat(CONSENT_NAME_GAP))
        })
        .into_owned()
}

/// 계약일 갱신
///
/// 최초 근무일이 있으면 그 날짜로 연・월・일을 바꾸고, 없으면 기간의 연・월만 바꾼다
/// (이 경우 월은 앞자리 0 없이 쓴다).
pub fn replace_contract_date(text: &str, first_working_day: Option<NaiveDate>, ym: Option<YearMonth>) -> String {
    match (first_working_day, ym) {
        (Some(date), _) => {
            let year = format!("{}년", date.year());
            let month = format!("{:02}월", date.month());
            let day = format!("{:02}일", date.day());
            let replaced = YEAR_RE.replace(text, NoExpand(&year));
            let replaced = MONTH_RE.replace(&replaced, NoExpand(&month));
            DAY_RE.replace(&replaced, NoExpand(&day)).into_owned()
        }
        (None, Some(ym)) => {
            let year = format!("{}년", ym.year);
            let month = format!("{}월", ym.month);
            let replaced = YEAR_RE.replace(text, NoExpand(&year));
            MONTH_RE.replace(&replaced, NoExpand(&month)).into_owned()
        }
        (None, None) => text.to_string(),
    }
}

/// "을 근 로 자 김청월 ( 인 )"의 이름 부분만 바꾼다
pub fn replace_signer_name(text: &str, name: &str) -> String {
    match SIGNER_RE.captures(text).and_then(|caps| caps.get(1)) {
        Some(found) => format!("{}{}{}", &text[..found.start()], name, &text[found.end()..]),
        None => text.to_string(),
    }
}
