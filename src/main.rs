use anyhow::Context;
use clap::Parser;
use landscape_order::core::steps::StepId;
use landscape_order::utils::{logger, validation::Validate};
use landscape_order::{
    CliConfig, EstimateBreakdown, HttpSubmissionClient, OrderDraft, OrderError, WizardConfig,
    WizardController,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🌱 Starting order wizard");

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            WizardConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path))?
        }
        None => WizardConfig::default(),
    };

    if let Some(endpoint) = &args.endpoint {
        tracing::info!("🔧 Submission endpoint overridden to: {}", endpoint);
        config.submission.endpoint = endpoint.clone();
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let draft = OrderDraft::from_json_file(&args.draft)
        .with_context(|| format!("failed to load draft file '{}'", args.draft))?;

    let estimator = config.estimator()?;
    let client = HttpSubmissionClient::from_settings(&config.submission)?;
    let mut wizard = WizardController::with_draft(estimator, client, draft);

    if let Err(e) = walk_steps(&mut wizard) {
        report_error(&e);
        std::process::exit(1);
    }

    print_breakdown(&wizard.breakdown());

    if !args.submit {
        tracing::info!("Dry run finished, pass --submit to send the order");
        return Ok(());
    }

    match wizard.submit().await {
        Ok(receipt) => {
            tracing::info!("✅ Order accepted");
            println!("✅ Order sent for {} <{}>", receipt.summary.name, receipt.summary.email);
            println!("   Services: {}", receipt.summary.service);
            println!("   Estimate: {}", receipt.estimate.total);
        }
        Err(e) => {
            tracing::error!("❌ Order submission failed: {}", e);
            report_error(&e);
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Advances through every step, stopping at the first one that does not validate.
fn walk_steps(wizard: &mut WizardController<HttpSubmissionClient>) -> Result<(), OrderError> {
    loop {
        let step = wizard.current_step();
        wizard.next()?;
        println!("✔ {}", step);
        if step == StepId::LAST {
            return Ok(());
        }
    }
}

fn report_error(e: &OrderError) {
    eprintln!("❌ {}", e.user_friendly_message());
    if let OrderError::Validation { errors, .. } = e {
        for (field, message) in errors.iter() {
            eprintln!("   {}: {}", field, message);
        }
    }
}

fn print_breakdown(breakdown: &EstimateBreakdown) {
    println!();
    println!("Estimate");
    for line in &breakdown.lines {
        println!("  {:<24} {:>8}", line.label, line.base_price.to_string());
    }
    for id in &breakdown.unknown_services {
        println!("  {:<24} {:>8}", format!("{} (no rate)", id), "$0");
    }
    println!("  {:<24} {:>8}", "Subtotal", breakdown.subtotal.to_string());
    println!("  {:<24} {:>8}", "Frequency ×", breakdown.frequency_multiplier.to_string());
    println!("  {:<24} {:>8}", "Size factor ×", breakdown.size_factor.round_dp(3).to_string());
    println!("  {:<24} {:>8}", "Total", breakdown.total.to_string());
}
