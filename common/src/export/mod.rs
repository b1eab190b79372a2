//! 작업자 프로필 내보내기

#[cfg(feature = "excel")]
pub mod excel_core;
