//! 출역표 해석
//!
//! 5행부터 2행이 한 사람분이다.
//! - 홀수 행(상단): 직종, 성명, 주민등록번호, 1~15일 출근 표시
//! - 짝수 행(하단): 주소, 16~31일 출근 표시
//!
//! 행 쌍은 `PairState` 접기(fold)로 맞춘다. 상단 행이 들어오면 대기 상태가 되고,
//! 하단 행이 들어오면 한 사람분이 완성된다.

use crate::error::Result;
use crate::layout::attendance::{
    ADDRESS_COL, AGGREGATE_MARKERS, BOTTOM_ROW_DAYS, DAY_FLAG_FIRST_COL, FIRST_WORKER_ROW,
    JOB_COL, NAME_COL, NATIONAL_ID_COL, PERIOD_LABEL, TOP_ROW_DAYS, WORK_LOCATION,
};
use crate::sheet_reader::{cell_text, first_sheet_range, is_day_flag, used_rows};
use crate::text::{is_valid_national_id, normalize_worker_name};
use crate::types::{PeriodMetadata, WorkDays, WorkerAttendance};
use calamine::{Data, Range};
use serde::Serialize;

/// 건너뛴 행 집계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipCounts {
    /// 주민등록번호 형식이 아님
    pub invalid_id: usize,
    /// 짝이 되는 상단 행이 없는 하단 행
    pub orphan_bottom: usize,
    /// 하단 행 없이 끝난 상단 행
    pub abandoned_top: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.invalid_id + self.orphan_bottom + self.abandoned_top
    }
}

/// 출역표 해석 결과
#[derive(Debug, Clone, Default)]
pub struct AttendanceSheet {
    pub workers: Vec<WorkerAttendance>,
    pub period: PeriodMetadata,
    pub skipped: SkipCounts,
}

#[derive(Debug, Clone, PartialEq)]
struct TopRow {
    job: String,
    name: String,
    national_id: String,
    days: [bool; TOP_ROW_DAYS],
}

#[derive(Debug, Clone, PartialEq)]
enum SheetRow {
    /// 직종계・외주계 등 소계 행
    Aggregate,
    Top(TopRow),
    Bottom {
        address: String,
        days: [bool; BOTTOM_ROW_DAYS],
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
enum PairState {
    #[default]
    Idle,
    Pending(TopRow),
}

/// 한 단계 진행 결과
#[derive(Debug, PartialEq)]
enum Step {
    Nothing,
    Completed(WorkerAttendance),
    DroppedTop,
    OrphanBottom,
}

impl PairState {
    fn advance(self, row: SheetRow) -> (PairState, Step) {
        match (self, row) {
            (PairState::Idle, SheetRow::Aggregate) => (PairState::Idle, Step::Nothing),
            (PairState::Pending(_), SheetRow::Aggregate) => (PairState::Idle, Step::DroppedTop),
            (PairState::Idle, SheetRow::Top(top)) => (PairState::Pending(top), Step::Nothing),
            (PairState::Pending(_), SheetRow::Top(top)) => (PairState::Pending(top), Step::DroppedTop),
            (PairState::Idle, SheetRow::Bottom { .. }) => (PairState::Idle, Step::OrphanBottom),
            (PairState::Pending(top), SheetRow::Bottom { address, days }) => {
                let worker = WorkerAttendance {
                    name: top.name,
                    job: top.job,
                    national_id: top.national_id,
                    address,
                    work_days: WorkDays::from_halves(&top.days, &days),
                };
                (PairState::Idle, Step::Completed(worker))
            }
        }
    }
}

/// 출역표 바이트열 해석
pub fn parse_attendance(bytes: &[u8]) -> Result<AttendanceSheet> {
    let range = first_sheet_range(bytes)?;
    Ok(parse_attendance_range(&range))
}

/// 이미 읽어 들인 시트 범위 해석
pub fn parse_attendance_range(range: &Range<Data>) -> AttendanceSheet {
    let period = PeriodMetadata {
        period_label: cell_text(range, PERIOD_LABEL.row, PERIOD_LABEL.col),
        work_location: cell_text(range, WORK_LOCATION.row, WORK_LOCATION.col),
    };

    let mut skipped = SkipCounts::default();
    let mut workers = Vec::new();

    let rows = used_rows(range)
        .into_iter()
        .filter(|&row| row >= FIRST_WORKER_ROW)
        .map(|row| (row, classify_row(range, row)));

    let state = rows.fold(PairState::Idle, |state, (row, sheet_row)| {
        let (next, step) = state.advance(sheet_row);
        match step {
            Step::Completed(worker) => {
                if is_valid_national_id(&worker.national_id) {
                    workers.push(worker);
                } else {
                    tracing::debug!("{}행: 주민등록번호 형식 아님 ({:?})", row, worker.national_id);
                    skipped.invalid_id += 1;
                }
            }
            Step::DroppedTop => {
                tracing::debug!("{}행 이전의 상단 행에 짝이 없어 버림", row);
                skipped.abandoned_top += 1;
            }
            Step::OrphanBottom => {
                tracing::debug!("{}행: 상단 행 없는 하단 행", row);
                skipped.orphan_bottom += 1;
            }
            Step::Nothing => {}
        }
        next
    });

    if let PairState::Pending(top) = state {
        tracing::debug!("마지막 상단 행({})에 짝이 없어 버림", top.name);
        skipped.abandoned_top += 1;
    }

    if skipped.total() > 0 {
        tracing::info!(
            "출역표: {}명 읽음, 건너뜀 {}건 (주민번호 {}, 짝 없는 하단 {}, 짝 없는 상단 {})",
            workers.len(),
            skipped.total(),
            skipped.invalid_id,
            skipped.orphan_bottom,
            skipped.abandoned_top
        );
    }

    AttendanceSheet { workers, period, skipped }
}

/// 소계 표시는 상단 행에서만 본다. 하단 행의 직종 칸은 무시한다.
fn classify_row(range: &Range<Data>, row: u32) -> SheetRow {
    if (row - FIRST_WORKER_ROW) % 2 == 0 {
        let job = cell_text(range, row, JOB_COL);
        if AGGREGATE_MARKERS.iter().any(|marker| job.contains(marker)) {
            return SheetRow::Aggregate;
        }

        let mut days = [false; TOP_ROW_DAYS];
        for (i, day) in days.iter_mut().enumerate() {
            *day = is_day_flag(range, row, DAY_FLAG_FIRST_COL + i as u32);
        }
        SheetRow::Top(TopRow {
            job,
            name: normalize_worker_name(&cell_text(range, row, NAME_COL)),
            national_id: cell_text(range, row, NATIONAL_ID_COL),
            days,
        })
    } else {
        let mut days = [false; BOTTOM_ROW_DAYS];
        for (i, day) in days.iter_mut().enumerate() {
            *day = is_day_flag(range, row, DAY_FLAG_FIRST_COL + i as u32);
        }
        SheetRow::Bottom {
            address: cell_text(range, row, ADDRESS_COL),
            days,
        }
    }
}
