use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaborCostError {
    #[error(transparent)]
    Common(#[from] labor_cost_common::Error),

    #[error("설정 오류: {0}")]
    Config(String),

    #[error("파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),

    #[error("출역표 기간 표기에서 연월을 찾을 수 없습니다: {0:?}")]
    InvalidPeriod(String),

    #[error("근로계약서 생성 실패: {0}")]
    ContractStage(String),

    #[error("입력 오류: {0}")]
    Prompt(String),

    #[error("사용자가 작업을 취소했습니다")]
    Aborted,

    #[error("JSON 오류: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LaborCostError>;
