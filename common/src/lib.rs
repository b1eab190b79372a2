//! Labor Cost Common Library
//!
//! CLI에서 쓰는 타입, 엑셀 해석, 템플릿 채우기

pub mod types;
pub mod layout;
pub mod error;
pub mod text;
pub mod workbook;
pub mod sheet_reader;
pub mod attendance;
pub mod personnel;
pub mod merger;
pub mod payroll;
pub mod contract;
pub mod export;

#[cfg(test)]
mod test_support;

pub use types::{PeriodMetadata, PersonnelRecord, WorkDays, WorkerAttendance, WorkerProfile};
pub use error::{Error, Result};
pub use text::YearMonth;
pub use workbook::{CellValue, Workbook, Worksheet};
pub use attendance::{parse_attendance, AttendanceSheet, SkipCounts};
pub use personnel::parse_personnel;
pub use merger::{merge_records, reconcile_duplicates, MergeOutcome};
pub use payroll::{fill_payroll, PayrollFill};
pub use contract::{generate_contracts, ContractBundle};
