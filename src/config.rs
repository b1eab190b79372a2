use crate::error::{LaborCostError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 템플릿 경로를 덮어쓰는 환경 변수
pub const TEMPLATE_ENV: &str = "LABOR_COST_TEMPLATE";

/// 내장 근로계약서 템플릿 (경로를 지정하지 않았을 때 사용)
pub const BUILTIN_TEMPLATE: &[u8] = include_bytes!("../assets/employment_contract_sample.xlsx");

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub contract_template: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LaborCostError::Config("홈 디렉터리를 찾을 수 없습니다".into()))?;
        Ok(home.join(".config").join("labor-cost").join("config.json"))
    }

    /// 근로계약서 템플릿 경로 (환경 변수 > 설정 파일)
    ///
    /// None이면 내장 템플릿을 쓴다.
    pub fn template_path(&self) -> Option<PathBuf> {
        if let Ok(path) = std::env::var(TEMPLATE_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        self.contract_template.clone()
    }

    /// 출력 디렉터리 (미설정이면 현재 디렉터리)
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn set_template(&mut self, path: PathBuf) -> Result<()> {
        if !path.exists() {
            return Err(LaborCostError::FileNotFound(path.display().to_string()));
        }
        self.contract_template = Some(path);
        self.save()
    }

    pub fn set_output_dir(&mut self, path: PathBuf) -> Result<()> {
        self.output_dir = Some(path);
        self.save()
    }
}
