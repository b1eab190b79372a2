//! 작업자 요약 엑셀 (CLI)

use crate::error::Result;
use labor_cost_common::export::excel_core::generate_summary_buffer;
use labor_cost_common::types::{PeriodMetadata, WorkerProfile};
use std::path::Path;

pub fn generate_excel(profiles: &[WorkerProfile], period: &PeriodMetadata, output_path: &Path) -> Result<()> {
    let buffer = generate_summary_buffer(profiles, period)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, buffer)?;
    Ok(())
}
