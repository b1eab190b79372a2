//! 데이터 타입 정의
//!
//! CLI와 라이브러리가 공유하는 레코드:
//! - WorkerAttendance: 출역표 한 사람분 (2행 1조)
//! - PersonnelRecord: 인적사항 한 행
//! - WorkerProfile: 위 두 레코드를 합친 최종 데이터
//! - PeriodMetadata: 출역표 머리글의 기간/현장 정보

use crate::layout::attendance::{BOTTOM_ROW_DAYS, TOP_ROW_DAYS};
use crate::text::{parse_year_month, YearMonth};
use serde::{Deserialize, Serialize};

/// 한 달 최대 일수 (상단 15일 + 하단 16일)
pub const DAYS_PER_MONTH: usize = TOP_ROW_DAYS + BOTTOM_ROW_DAYS;

/// 1~31일 출근 여부
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDays([bool; DAYS_PER_MONTH]);

impl Default for WorkDays {
    fn default() -> Self {
        Self([false; DAYS_PER_MONTH])
    }
}

impl WorkDays {
    /// 상단 행(1~15일)과 하단 행(16~31일)의 플래그를 이어붙인다
    pub fn from_halves(top: &[bool; TOP_ROW_DAYS], bottom: &[bool; BOTTOM_ROW_DAYS]) -> Self {
        let mut days = [false; DAYS_PER_MONTH];
        days[..TOP_ROW_DAYS].copy_from_slice(top);
        days[TOP_ROW_DAYS..].copy_from_slice(bottom);
        Self(days)
    }

    /// 출근일(1부터 시작)의 목록으로 생성
    pub fn from_present_days(present: &[u32]) -> Self {
        let mut days = [false; DAYS_PER_MONTH];
        for &day in present {
            if (1..=DAYS_PER_MONTH as u32).contains(&day) {
                days[day as usize - 1] = true;
            }
        }
        Self(days)
    }

    pub fn flags(&self) -> &[bool; DAYS_PER_MONTH] {
        &self.0
    }

    /// `day`는 1부터 시작
    pub fn is_present(&self, day: u32) -> bool {
        day >= 1 && self.0.get(day as usize - 1).copied().unwrap_or(false)
    }

    pub fn present_count(&self) -> usize {
        self.0.iter().filter(|&&d| d).count()
    }

    pub fn present_days(&self) -> Vec<u32> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, d)| **d)
            .map(|(i, _)| i as u32 + 1)
            .collect()
    }

    /// 날짜별 OR 결합
    pub fn union(&self, other: &WorkDays) -> WorkDays {
        let mut days = self.0;
        for (day, &theirs) in days.iter_mut().zip(other.0.iter()) {
            *day = *day || theirs;
        }
        WorkDays(days)
    }
}

/// 출역표 한 사람분
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerAttendance {
    pub name: String,
    pub job: String,              // 직종
    pub national_id: String,      // 주민등록번호 (000000-0000000)
    pub address: String,
    pub work_days: WorkDays,
}

/// 인적사항 한 행
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonnelRecord {
    pub name: String,
    pub unit_price: String,       // 단가
    pub phone: String,
    /// 구분자 없는 13자리
    pub national_id: String,
    /// "은행명 계좌번호 예금주"
    pub bank_info: String,
    pub code: String,
    /// ISO 날짜(YYYY-MM-DD) 또는 빈 문자열
    pub first_working_day: String,
}

/// 출역 + 인적사항 병합 결과
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfile {
    pub name: String,
    pub job: String,
    pub national_id: String,
    pub address: String,
    pub work_days: WorkDays,

    #[serde(default)]
    pub unit_price: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub bank_info: String,

    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub first_working_day: String,
}

impl WorkerProfile {
    /// 인적사항이 없는 프로필 (LookupMiss)
    pub fn from_attendance(attendance: &WorkerAttendance) -> Self {
        Self {
            name: attendance.name.clone(),
            job: attendance.job.clone(),
            national_id: attendance.national_id.clone(),
            address: attendance.address.clone(),
            work_days: attendance.work_days,
            ..Default::default()
        }
    }

    pub fn with_personnel(attendance: &WorkerAttendance, personnel: &PersonnelRecord) -> Self {
        Self {
            unit_price: personnel.unit_price.clone(),
            phone: personnel.phone.clone(),
            bank_info: personnel.bank_info.clone(),
            code: personnel.code.clone(),
            first_working_day: personnel.first_working_day.clone(),
            ..Self::from_attendance(attendance)
        }
    }
}

/// 출역표 머리글 정보
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMetadata {
    /// 예: "2024년 07월 일용노무비명세서"
    pub period_label: String,
    pub work_location: String,
}

impl PeriodMetadata {
    pub fn year_month(&self) -> Option<YearMonth> {
        parse_year_month(&self.period_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_days_from_halves() {
        let mut top = [false; TOP_ROW_DAYS];
        let mut bottom = [false; BOTTOM_ROW_DAYS];
        top[0] = true;
        bottom[15] = true;

        let days = WorkDays::from_halves(&top, &bottom);
        assert_eq!(days.flags().len(), 31);
        assert!(days.is_present(1));
        assert!(days.is_present(31));
        assert!(!days.is_present(16));
        assert_eq!(days.present_days(), vec![1, 31]);
    }

    #[test]
    fn test_work_days_union_is_idempotent() {
        let a = WorkDays::from_present_days(&[1, 3]);
        let b = WorkDays::from_present_days(&[2, 3]);

        let merged = a.union(&b);
        assert_eq!(merged.present_days(), vec![1, 2, 3]);
        assert_eq!(merged.union(&a), merged);
        assert_eq!(merged.union(&b), merged);
        assert_eq!(b.union(&a), merged);
    }

    #[test]
    fn test_work_days_out_of_range_ignored() {
        let days = WorkDays::from_present_days(&[0, 32, 5]);
        assert_eq!(days.present_count(), 1);
        assert!(!days.is_present(0));
    }

    #[test]
    fn test_profile_serialize_camel_case() {
        let profile = WorkerProfile {
            name: "홍길동".to_string(),
            national_id: "900101-1234567".to_string(),
            first_working_day: "2024-07-01".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_string(&profile).expect("직렬화 실패");
        assert!(json.contains("\"nationalId\":\"900101-1234567\""));
        assert!(json.contains("\"firstWorkingDay\":\"2024-07-01\""));
    }

    #[test]
    fn test_profile_with_personnel() {
        let attendance = WorkerAttendance {
            name: "홍길동".to_string(),
            job: "공무".to_string(),
            national_id: "900101-1234567".to_string(),
            ..Default::default()
        };
        let personnel = PersonnelRecord {
            unit_price: "150000".to_string(),
            phone: "010-1234-5678".to_string(),
            ..Default::default()
        };

        let profile = WorkerProfile::with_personnel(&attendance, &personnel);
        assert_eq!(profile.name, "홍길동");
        assert_eq!(profile.job, "공무");
        assert_eq!(profile.unit_price, "150000");
        assert_eq!(profile.phone, "010-1234-5678");
        assert_eq!(profile.code, "");
    }

    #[test]
    fn test_period_year_month() {
        let period = PeriodMetadata {
            period_label: "2024년 07월 일용노무비명세서".to_string(),
            work_location: "현장A".to_string(),
        };
        let ym = period.year_month().expect("연월 추출 실패");
        assert_eq!(ym.year, 2024);
        assert_eq!(ym.month, 7);
    }
}
