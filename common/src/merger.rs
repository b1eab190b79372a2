//! 출역 + 인적사항 병합
//!
//! - `merge_records`: 주민등록번호(구분자 제거)로 인적사항을 찾아 붙인다
//! - `reconcile_duplicates`: 같은 주민등록번호의 프로필을 하나로 합친다

use crate::text::strip_id_separator;
use crate::types::{PersonnelRecord, WorkerAttendance, WorkerProfile};
use std::collections::HashMap;

/// 병합 결과
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// 출역 기록 한 건당 하나 (중복 정리 전)
    pub profiles: Vec<WorkerProfile>,
    /// 인적사항을 찾지 못한 작업자 이름
    pub lookup_misses: Vec<String>,
}

/// 출역 기록에 인적사항을 붙인다
///
/// 같은 주민등록번호가 인적사항에 여러 번 있으면 먼저 나온 행을 쓴다.
pub fn merge_records(attendance: &[WorkerAttendance], personnel: &[PersonnelRecord]) -> MergeOutcome {
    let mut index: HashMap<&str, &PersonnelRecord> = HashMap::with_capacity(personnel.len());
    for record in personnel {
        index.entry(record.national_id.as_str()).or_insert(record);
    }

    let mut outcome = MergeOutcome::default();
    for worker in attendance {
        match index.get(strip_id_separator(&worker.national_id).as_str()) {
            Some(record) => outcome.profiles.push(WorkerProfile::with_personnel(worker, record)),
            None => {
                tracing::warn!("인적사항 없음: {} ({})", worker.name, worker.national_id);
                outcome.lookup_misses.push(worker.name.clone());
                outcome.profiles.push(WorkerProfile::from_attendance(worker));
            }
        }
    }
    outcome
}

/// 주민등록번호 기준 중복 정리
///
/// - 출근일: 날짜별 OR
/// - 직종: 출근일이 더 많은 쪽 (같으면 나중 기록)
/// - 나머지 항목: 나중 기록
/// - 순서: 처음 나온 순서
pub fn reconcile_duplicates(profiles: &[WorkerProfile]) -> Vec<WorkerProfile> {
    let mut merged: Vec<WorkerProfile> = Vec::with_capacity(profiles.len());
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for current in profiles {
        match positions.get(current.national_id.as_str()) {
            Some(&pos) => {
                let previous = &merged[pos];
                let job = if previous.work_days.present_count() > current.work_days.present_count() {
                    previous.job.clone()
                } else {
                    current.job.clone()
                };
                let work_days = previous.work_days.union(&current.work_days);
                merged[pos] = WorkerProfile {
                    job,
                    work_days,
                    ..current.clone()
                };
            }
            None => {
                positions.insert(current.national_id.as_str(), merged.len());
                merged.push(current.clone());
            }
        }
    }

    if merged.len() < profiles.len() {
        tracing::debug!("중복 정리: {}건 → {}건", profiles.len(), merged.len());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WorkDays;
    use pretty_assertions::assert_eq;

    fn attendance(name: &str, job: &str, id: &str, days: &[u32]) -> WorkerAttendance {
        WorkerAttendance {
            name: name.to_string(),
            job: job.to_string(),
            national_id: id.to_string(),
            address: format!("{} 주소", name),
            work_days: WorkDays::from_present_days(days),
        }
    }

    fn personnel(name: &str, id: &str, unit_price: &str) -> PersonnelRecord {
        PersonnelRecord {
            name: name.to_string(),
            unit_price: unit_price.to_string(),
            national_id: id.to_string(),
            ..Default::default()
        }
    }

    fn profile(id: &str, job: &str, phone: &str, days: &[u32]) -> WorkerProfile {
        WorkerProfile {
            name: "홍길동".to_string(),
            job: job.to_string(),
            national_id: id.to_string(),
            phone: phone.to_string(),
            work_days: WorkDays::from_present_days(days),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_by_stripped_id() {
        let outcome = merge_records(
            &[attendance("홍길동", "공무", "900101-1234567", &[1])],
            &[personnel("홍길동", "9001011234567", "150000")],
        );
        assert_eq!(outcome.profiles.len(), 1);
        assert_eq!(outcome.profiles[0].unit_price, "150000");
        assert_eq!(outcome.profiles[0].job, "공무");
        assert!(outcome.lookup_misses.is_empty());
    }

    #[test]
    fn test_lookup_miss_keeps_attendance() {
        let outcome = merge_records(&[attendance("김철수", "보통인부", "850505-2345678", &[2])], &[]);
        assert_eq!(outcome.profiles.len(), 1);
        assert_eq!(outcome.profiles[0].unit_price, "");
        assert_eq!(outcome.profiles[0].address, "김철수 주소");
        assert_eq!(outcome.lookup_misses, vec!["김철수".to_string()]);
    }

    #[test]
    fn test_first_personnel_match_wins() {
        let outcome = merge_records(
            &[attendance("홍길동", "공무", "900101-1234567", &[1])],
            &[
                personnel("홍길동", "9001011234567", "150000"),
                personnel("홍길동", "9001011234567", "999999"),
            ],
        );
        assert_eq!(outcome.profiles[0].unit_price, "150000");
    }

    #[test]
    fn test_one_profile_per_attendance_record() {
        let outcome = merge_records(
            &[
                attendance("홍길동", "공무", "900101-1234567", &[1]),
                attendance("홍길동", "반장", "900101-1234567", &[2]),
            ],
            &[personnel("홍길동", "9001011234567", "150000")],
        );
        assert_eq!(outcome.profiles.len(), 2);
    }

    #[test]
    fn test_reconcile_unions_days_and_picks_job() {
        let merged = reconcile_duplicates(&[
            profile("900101-1234567", "공무", "010-1111-1111", &[1, 2, 3]),
            profile("900101-1234567", "반장", "010-2222-2222", &[4]),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].work_days.present_days(), vec![1, 2, 3, 4]);
        assert_eq!(merged[0].job, "공무");
        assert_eq!(merged[0].phone, "010-2222-2222");
    }

    #[test]
    fn test_reconcile_tie_keeps_later_job() {
        let merged = reconcile_duplicates(&[
            profile("900101-1234567", "공무", "", &[1]),
            profile("900101-1234567", "반장", "", &[2]),
        ]);
        assert_eq!(merged[0].job, "반장");
    }

    #[test]
    fn test_reconcile_preserves_first_appearance_order() {
        let merged = reconcile_duplicates(&[
            profile("900101-1234567", "공무", "", &[1]),
            profile("850505-2345678", "보통인부", "", &[1]),
            profile("900101-1234567", "공무", "", &[2]),
        ]);
        let ids: Vec<_> = merged.iter().map(|p| p.national_id.as_str()).collect();
        assert_eq!(ids, vec!["900101-1234567", "850505-2345678"]);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let once = reconcile_duplicates(&[
            profile("900101-1234567", "공무", "", &[1, 5]),
            profile("900101-1234567", "반장", "", &[5, 9]),
        ]);
        assert_eq!(reconcile_duplicates(&once), once);
    }
}
