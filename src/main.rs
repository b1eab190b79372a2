use clap::Parser;
use labor_cost_common::merger::reconcile_duplicates;
use labor_cost_rust::{cli, config, error, export, pipeline};
use cli::{Cli, Commands};
use config::Config;
use error::{LaborCostError, Result};
use pipeline::{ContractStage, ConvertRequest};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "labor_cost=debug,labor_cost_rust=debug,labor_cost_common=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Convert { attendance, personnel, payroll, payroll_out, contract_out, template, force } => {
            println!("📋 labor-cost - 노무비 명세서・근로계약서 작성\n");

            let request = ConvertRequest {
                attendance,
                personnel,
                payroll,
                payroll_out,
                contract_out,
                contract_template: template.or_else(|| config.template_path()),
                output_dir: config.output_dir(),
                force,
            };
            let outcome = pipeline::run_conversion(&request).await?;

            if cli.verbose {
                println!("\n{}", serde_json::to_string_pretty(&outcome.report)?);
            }

            match outcome.contract {
                ContractStage::Written { .. } => println!("\n✅ 완료"),
                ContractStage::Failed(reason) => {
                    println!("\n⚠ 노무비 명세서만 저장되었습니다: {}", outcome.payroll_path.display());
                    return Err(LaborCostError::ContractStage(reason));
                }
            }
        }

        Commands::Profiles { attendance, personnel, output, format } => {
            let (sheet, merged, _) = pipeline::load_profiles(&attendance, &personnel).await?;
            let profiles = reconcile_duplicates(&merged.profiles);

            let written = export::export_profiles(
                &profiles,
                &sheet.period,
                format,
                output.as_deref(),
                &config.output_dir(),
            )?;
            if let Some(path) = written {
                println!("✔ 작업자 {}명 저장 ({}): {}", profiles.len(), format, path.display());
            }
        }

        Commands::Config { set_template, set_output_dir, show } => {
            let mut config = config;

            if let Some(path) = set_template {
                config.set_template(path)?;
                println!("✔ 근로계약서 템플릿을 설정했습니다");
            }

            if let Some(path) = set_output_dir {
                config.set_output_dir(path)?;
                println!("✔ 출력 디렉터리를 설정했습니다");
            }

            if show {
                println!("설정:");
                println!("  설정 파일: {}", Config::config_path()?.display());
                match config.template_path() {
                    Some(path) => println!("  근로계약서 템플릿: {}", path.display()),
                    None => println!("  근로계약서 템플릿: 내장 템플릿"),
                }
                println!("  출력 디렉터리: {}", config.output_dir().display());
            }
        }
    }

    Ok(())
}
