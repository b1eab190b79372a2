//! 근로계약서 생성
//!
//! 계약서 템플릿(첫 번째 시트)을 작업자마다 복사해 인적사항을 채우고,
//! 마지막에 템플릿 시트를 지운다. 결과는 작업자 한 명당 시트 한 장.

pub mod boilerplate;

use crate::error::{Error, Result};
use crate::layout::contract::{
    ACCOUNT_HOLDER_CELL, ADDRESS_CELL, BANK_CELL, CONSENT_CELLS, CONTRACT_DATE_CELL,
    CONTRACT_PERIOD_CELL, COPY_SUFFIX, NAME_CELL, NATIONAL_ID_CELL, PHONE_CELL, SIGNER_CELL,
    UNIT_PRICE_CELL,
};
use crate::layout::CellPos;
use crate::types::{PeriodMetadata, WorkerProfile};
use crate::workbook::{sanitize_sheet_name, Workbook, Worksheet, MAX_SHEET_NAME_LEN};
use boilerplate::{
    contract_period, replace_consent_name, replace_contract_date, replace_phone,
    replace_signer_name, space_out_name, splice_bank_account, BankAccount,
};
use chrono::NaiveDate;

/// 근로계약서 결과
#[derive(Debug, Clone)]
pub struct ContractBundle {
    pub bytes: Vec<u8>,
    /// 생성된 시트 이름 (작업자 순서)
    pub sheet_names: Vec<String>,
}

/// 작업자별 근로계약서 생성
///
/// # Arguments
/// * `template` - 근로계약서 템플릿 통합문서 (첫 번째 시트를 쓴다)
/// * `profiles` - 작업자 프로필 (한 건당 시트 한 장)
/// * `period` - 출역표 머리글 (계약 기간・계약일에 쓴다)
pub fn generate_contracts(
    template: &[u8],
    profiles: &[WorkerProfile],
    period: &PeriodMetadata,
) -> Result<ContractBundle> {
    let mut workbook = Workbook::from_bytes(template)?;
    let template_name = workbook
        .sheet_names()
        .first()
        .map(|name| name.to_string())
        .ok_or_else(|| Error::SheetNotFound("근로계약서 템플릿".to_string()))?;
    if workbook.sheet(&template_name).is_none() {
        return Err(Error::SheetNotFound(template_name));
    }

    let mut sheet_names = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let name = unique_sheet_name(&workbook.sheet_names(), &profile.name);
        workbook.duplicate_sheet(&template_name, &name)?;
        if let Some(sheet) = workbook.sheet_mut(&name) {
            fill_contract(sheet, profile, period);
        }
        tracing::debug!("근로계약서 시트 생성: {}", name);
        sheet_names.push(name);
    }

    workbook.remove_sheet(&template_name)?;
    tracing::info!("근로계약서: {}장", sheet_names.len());

    Ok(ContractBundle {
        bytes: workbook.to_bytes()?,
        sheet_names,
    })
}

/// 겹치지 않는 시트 이름 (대소문자 구분 없음)
///
/// "홍길동" → "홍길동-copy" → "홍길동-copy2" …
fn unique_sheet_name(existing: &[&str], worker_name: &str) -> String {
    let base = sanitize_sheet_name(worker_name);
    let taken = |candidate: &str| existing.iter().any(|name| name.to_lowercase() == candidate.to_lowercase());

    if !taken(&base) {
        return base;
    }

    let mut n = 1;
    loop {
        let suffix = if n == 1 {
            COPY_SUFFIX.to_string()
        } else {
            format!("{}{}", COPY_SUFFIX, n)
        };
        let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
        let head: String = base.chars().take(keep).collect();
        let candidate = format!("{}{}", head, suffix);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// 복사한 계약서 시트에 작업자 정보 쓰기
fn fill_contract(sheet: &mut Worksheet, profile: &WorkerProfile, period: &PeriodMetadata) {
    let ym = period.year_month();

    sheet.set_text(NAME_CELL.row, NAME_CELL.col, &space_out_name(&profile.name));
    sheet.set_text(NATIONAL_ID_CELL.row, NATIONAL_ID_CELL.col, &profile.national_id);
    match profile.unit_price.replace(',', "").trim().parse::<f64>() {
        Ok(price) => sheet.set_number(UNIT_PRICE_CELL.row, UNIT_PRICE_CELL.col, price),
        Err(_) => sheet.set_text(UNIT_PRICE_CELL.row, UNIT_PRICE_CELL.col, &profile.unit_price),
    }
    sheet.set_text(ADDRESS_CELL.row, ADDRESS_CELL.col, &profile.address);
    rewrite_text(sheet, PHONE_CELL, |text| replace_phone(text, &profile.phone));

    match BankAccount::parse(&profile.bank_info) {
        Some(account) => {
            rewrite_text(sheet, BANK_CELL, |text| splice_bank_account(text, &account));
            sheet.set_text(ACCOUNT_HOLDER_CELL.row, ACCOUNT_HOLDER_CELL.col, &account.holder);
        }
        None if !profile.bank_info.is_empty() => {
            tracing::warn!("{}: 계좌 정보 형식이 다릅니다 ({:?})", profile.name, profile.bank_info);
        }
        None => {}
    }

    if let Some(ym) = ym {
        rewrite_text(sheet, CONTRACT_PERIOD_CELL, |text| contract_period(text, ym));
    }

    for cell in CONSENT_CELLS {
        rewrite_text(sheet, cell, |text| replace_consent_name(text, &profile.name));
    }

    let first_working_day = NaiveDate::parse_from_str(&profile.first_working_day, "%Y-%m-%d").ok();
    rewrite_text(sheet, CONTRACT_DATE_CELL, |text| {
        replace_contract_date(text, first_working_day, ym)
    });

    rewrite_text(sheet, SIGNER_CELL, |text| replace_signer_name(text, &profile.name));
}

/// 문자열 셀만 고치고, 바뀐 경우에만 쓴다
fn rewrite_text(sheet: &mut Worksheet, cell: CellPos, rewrite: impl FnOnce(&str) -> String) {
    let Some(text) = sheet.text(cell.row, cell.col) else {
        return;
    };
    let updated = rewrite(text);
    if updated != text {
        sheet.set_text(cell.row, cell.col, &updated);
    }
}
