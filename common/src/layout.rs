//! 셀 위치 정의
//!
//! 입력/템플릿 파일과의 약속(행・열 위치)을 한곳에 모은다.
//! 행・열 번호는 엑셀 표기와 같이 1부터 시작한다.

/// 셀 좌표 (1부터 시작)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub row: u32,
    pub col: u32,
}

impl CellPos {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// 출역표 (최종 출역 현황)
pub mod attendance {
    use super::CellPos;

    /// "2024년 07월 …" 기간 표기
    pub const PERIOD_LABEL: CellPos = CellPos::new(1, 1);
    pub const WORK_LOCATION: CellPos = CellPos::new(2, 2);

    /// 5행부터 2행 1조로 작업자가 나열된다
    pub const FIRST_WORKER_ROW: u32 = 5;

    // 상단 행
    pub const JOB_COL: u32 = 2;
    pub const NAME_COL: u32 = 3;
    pub const NATIONAL_ID_COL: u32 = 4;

    // 하단 행
    pub const ADDRESS_COL: u32 = 3;

    /// 출근 표시 시작 열 (상단・하단 공통)
    pub const DAY_FLAG_FIRST_COL: u32 = 5;
    pub const TOP_ROW_DAYS: usize = 15;
    pub const BOTTOM_ROW_DAYS: usize = 16;

    /// 소계 행 표시 (직종 열)
    pub const AGGREGATE_MARKERS: &[&str] = &["직종계", "외주계", "공종계", "현장계"];
}

/// 인적사항
pub mod personnel {
    pub const HEADER_ROWS: u32 = 1;

    pub const NAME_COL: u32 = 1;
    pub const UNIT_PRICE_COL: u32 = 2;
    pub const PHONE_COL: u32 = 3;
    pub const NATIONAL_ID_COL: u32 = 4;
    pub const BANK_INFO_COL: u32 = 5;
    pub const CODE_COL: u32 = 6;
    pub const FIRST_WORKING_DAY_COL: u32 = 7;
}

/// 노무비 명세서 템플릿
pub mod payroll {
    use super::CellPos;

    /// 기간 정보가 있는 관리 시트
    pub const ADMIN_SHEET: &str = "관리자";
    pub const TITLE_CELL: CellPos = CellPos::new(1, 22);
    pub const PERIOD_START_CELL: CellPos = CellPos::new(3, 28);
    pub const PERIOD_END_CELL: CellPos = CellPos::new(3, 34);

    /// 이 행 번호를 넘는 행만 순번을 매긴다
    pub const NUMBERING_AFTER_ROW: u32 = 8;
    pub const SEQUENCE_COL: u32 = 1;
    pub const NAME_COL: u32 = 2;

    // 이름 행의 윗행
    pub const CODE_COL: u32 = 1;
    pub const JOB_COL: u32 = 5;
    pub const NATIONAL_ID_COL: u32 = 8;
    pub const PHONE_COL: u32 = 13;
    pub const UNIT_PRICE_COL: u32 = 18;

    // 이름 행
    pub const ADDRESS_COL: u32 = 8;

    /// 출근 표시 시작 열 (윗행 1~15일, 이름 행 16~31일)
    pub const DAY_FIRST_COL: u32 = 20;
}

/// 근로계약서 템플릿
pub mod contract {
    use super::CellPos;

    pub const NAME_CELL: CellPos = CellPos::new(9, 3);
    pub const NATIONAL_ID_CELL: CellPos = CellPos::new(9, 7);
    pub const UNIT_PRICE_CELL: CellPos = CellPos::new(9, 16);
    pub const ADDRESS_CELL: CellPos = CellPos::new(10, 3);
    pub const PHONE_CELL: CellPos = CellPos::new(11, 3);
    pub const BANK_CELL: CellPos = CellPos::new(16, 2);
    pub const ACCOUNT_HOLDER_CELL: CellPos = CellPos::new(16, 7);
    pub const CONTRACT_PERIOD_CELL: CellPos = CellPos::new(20, 2);
    /// 개인정보 동의란
    pub const CONSENT_CELLS: [CellPos; 2] = [CellPos::new(31, 1), CellPos::new(34, 1)];
    pub const CONTRACT_DATE_CELL: CellPos = CellPos::new(62, 6);
    pub const SIGNER_CELL: CellPos = CellPos::new(64, 6);

    /// 시트 복사 시 이름 충돌 접미사
    pub const COPY_SUFFIX: &str = "-copy";
}

/// 프로필 요약 엑셀
pub mod summary {
    /// 요약 표의 한 열
    pub struct SummaryField {
        pub key: &'static str,
        pub label: &'static str,
        pub width: f64,
    }

    pub const SUMMARY_SHEET: &str = "작업자";

    pub const SUMMARY_FIELDS: &[SummaryField] = &[
        SummaryField { key: "name", label: "성명", width: 10.0 },
        SummaryField { key: "job", label: "직종", width: 10.0 },
        SummaryField { key: "nationalId", label: "주민등록번호", width: 16.0 },
        SummaryField { key: "address", label: "주소", width: 30.0 },
        SummaryField { key: "unitPrice", label: "단가", width: 10.0 },
        SummaryField { key: "phone", label: "연락처", width: 14.0 },
        SummaryField { key: "bankInfo", label: "계좌", width: 26.0 },
        SummaryField { key: "code", label: "코드", width: 8.0 },
        SummaryField { key: "firstWorkingDay", label: "최초 근무일", width: 12.0 },
    ];

    /// 출근일 열 너비
    pub const DAY_COL_WIDTH: f64 = 3.5;
}
