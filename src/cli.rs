//! Command-line interface: training, one-shot scoring, bundle info, and
//! the interactive intake form.

use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::path::{Path, PathBuf};

use crate::inference::{
    threshold_from_env, FormInput, InferenceEngine, Prediction, RiskClass, ViewState,
    CONTRACT_OPTIONS, GENDER_OPTIONS, PLACEHOLDER, SUBSCRIPTION_OPTIONS, THRESHOLD_MAX,
    THRESHOLD_MIN,
};
use crate::training::{self, TrainOptions, DEFAULT_MODEL_PATH};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}

fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn warn(s: &str) -> ColoredString {
    s.truecolor(235, 180, 80)
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "churn-ai")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Customer churn risk scoring")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the churn model and persist the bundle
    Train {
        /// Input data file (CSV, TSV, JSON, or Parquet); defaults to the
        /// raw dataset, falling back to the bundled sample
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Output model file
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Holdout fraction for evaluation
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,

        /// Random seed for the stratified split
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Score one customer record supplied through flags
    Predict {
        /// Trained model file
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Decision threshold; falls back to THRESHOLD, then 0.50
        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        tenure: Option<String>,
        #[arg(long)]
        usage: Option<String>,
        #[arg(long)]
        support: Option<String>,
        #[arg(long)]
        payment_delay: Option<String>,
        #[arg(long)]
        subscription: Option<String>,
        #[arg(long)]
        contract: Option<String>,
        #[arg(long)]
        total_spend: Option<String>,
        #[arg(long)]
        last_interaction: Option<String>,
    },

    /// Show bundle metadata and holdout metrics
    Info {
        /// Trained model file
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data: Option<PathBuf>,
    model: PathBuf,
    test_fraction: f64,
    seed: u64,
) -> anyhow::Result<()> {
    section("Train");

    let options = TrainOptions {
        data_path: data,
        model_path: model,
        test_fraction,
        seed,
        ..Default::default()
    };

    let report = training::train(&options)?;

    println!();
    println!(
        "  {} {} rows, {} train / {} test",
        ok("✓"),
        report.n_rows,
        report.n_train,
        report.n_test
    );
    println!(
        "  {} {}",
        ok("✓"),
        format!("Saved model → {}", report.model_path.display()).white()
    );
    println!();
    println!(
        "  {:<16} {}",
        muted("Validation AUC"),
        format!("{:.4}", report.metrics.auc).white().bold()
    );
    println!(
        "  {:<16} {}",
        muted("Validation F1"),
        format!("{:.4}", report.metrics.f1).white().bold()
    );
    println!();

    Ok(())
}

pub fn cmd_predict(
    model: &Path,
    threshold: Option<f64>,
    form: FormInput,
) -> anyhow::Result<()> {
    section("Predict");

    let record = match form.validate() {
        Ok(record) => record,
        Err(missing) => {
            println!(
                "  {} Please fill all fields: {}",
                warn("!"),
                missing.join(", ")
            );
            println!();
            anyhow::bail!("incomplete record: {}", missing.join(", "));
        }
    };

    let threshold = threshold
        .unwrap_or_else(threshold_from_env)
        .clamp(THRESHOLD_MIN, THRESHOLD_MAX);

    let engine = InferenceEngine::load(model)?;
    let prediction = engine.predict(&record, threshold)?;
    render_result(&prediction);

    Ok(())
}

pub fn cmd_info(model: &Path) -> anyhow::Result<()> {
    section("Model Info");

    let engine = InferenceEngine::load(model)?;
    let bundle = engine.bundle();

    println!("  {:<16} {}", muted("File"), model.display());
    println!("  {:<16} v{}", muted("Trained with"), bundle.metadata.crate_version);
    println!("  {:<16} {}", muted("Trained at"), bundle.metadata.trained_at);
    println!(
        "  {:<16} {} train / {} test",
        muted("Rows"),
        bundle.metadata.n_train,
        bundle.metadata.n_test
    );
    println!(
        "  {:<16} {}",
        muted("Numeric"),
        bundle.numeric_columns.join(", ")
    );
    println!(
        "  {:<16} {}",
        muted("Categorical"),
        bundle.categorical_columns.join(", ")
    );
    println!();
    println!(
        "  {:<16} {}",
        muted("Holdout AUC"),
        format!("{:.4}", bundle.metrics.auc).white().bold()
    );
    println!(
        "  {:<16} {}",
        muted("Holdout F1"),
        format!("{:.4}", bundle.metrics.f1).white().bold()
    );
    println!();

    Ok(())
}

// ─── Interactive form ──────────────────────────────────────────────────────────

fn prompt_number(theme: &ColorfulTheme, label: &str, hint: &str) -> anyhow::Result<String> {
    let value: String = Input::with_theme(theme)
        .with_prompt(format!("{label} {}", dim(hint)))
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

fn prompt_select(
    theme: &ColorfulTheme,
    label: &str,
    options: &[&str],
) -> anyhow::Result<String> {
    let mut items: Vec<&str> = vec![PLACEHOLDER];
    items.extend_from_slice(options);

    let choice = Select::with_theme(theme)
        .with_prompt(label)
        .items(&items)
        .default(0)
        .interact()?;
    Ok(items[choice].to_string())
}

fn prompt_form(theme: &ColorfulTheme) -> anyhow::Result<FormInput> {
    Ok(FormInput {
        age: prompt_number(theme, "Age", "e.g., 32")?,
        gender: prompt_select(theme, "Gender", GENDER_OPTIONS)?,
        tenure: prompt_number(theme, "Tenure (months)", "e.g., 18")?,
        usage: prompt_number(theme, "Usage (score)", "e.g., 45")?,
        support: prompt_number(theme, "Support Calls", "e.g., 2")?,
        payment_delay: prompt_number(theme, "Payment Delay (days)", "e.g., 0")?,
        subscription: prompt_select(theme, "Subscription", SUBSCRIPTION_OPTIONS)?,
        contract: prompt_select(theme, "Contract", CONTRACT_OPTIONS)?,
        total_spend: prompt_number(theme, "Total Spend", "e.g., 900")?,
        last_interaction: prompt_number(theme, "Last Interaction (days)", "e.g., 7")?,
    })
}

fn prompt_threshold(theme: &ColorfulTheme, current: f64) -> anyhow::Result<f64> {
    let raw: String = Input::with_theme(theme)
        .with_prompt(format!(
            "Decision threshold [{THRESHOLD_MIN:.2}-{THRESHOLD_MAX:.2}]"
        ))
        .default(format!("{current:.2}"))
        .interact_text()?;

    Ok(raw
        .trim()
        .parse::<f64>()
        .unwrap_or(current)
        .clamp(THRESHOLD_MIN, THRESHOLD_MAX))
}

fn render_result(prediction: &Prediction) {
    let percent = format!("{:.1}%", prediction.probability * 100.0);

    println!();
    println!("  {}", "Prediction Result".white().bold());
    println!("  {}", dim(&"─".repeat(56)));

    match prediction.risk {
        RiskClass::High => {
            println!("  {}  {}", percent.red().bold(), "Churn Risk".white());
            println!("  {}", "At Risk! High Churn Probability".red().bold());
            println!("  {}", muted("Immediate retention efforts recommended."));
            println!(
                "  {}",
                dim("Contact this customer soon and consider targeted incentives.")
            );
        }
        RiskClass::Low => {
            println!("  {}  {}", percent.green().bold(), "Churn Risk".white());
            println!("  {}", "Fantastic! Low Churn Probability".green().bold());
            println!("  {}", muted("This customer is highly likely to stay."));
            println!(
                "  {}",
                dim("Great time to offer loyalty perks while satisfaction is high.")
            );
        }
    }

    println!();
    println!(
        "  {:<12} {:<10} {:<12} {:<8} {:<12} {}",
        muted("Threshold"),
        format!("{:.2}", prediction.threshold).white(),
        muted("Risk Class"),
        prediction.risk.to_string().white().bold(),
        muted("Confidence"),
        format!("{:.1}%", prediction.confidence * 100.0).white()
    );
    println!();
}

/// Interactive intake loop: a Form view collecting one record, a Result
/// view rendering the scored prediction. The view state value is threaded
/// through the loop explicitly.
pub fn cmd_interactive(model: &Path) -> anyhow::Result<()> {
    let engine = InferenceEngine::load(model)?;
    let theme = ColorfulTheme::default();
    let mut threshold = threshold_from_env().clamp(THRESHOLD_MIN, THRESHOLD_MAX);

    println!();
    println!("  {}", "Churn AI".white().bold());
    println!(
        "  {}",
        dim("Customer Risk Intelligence · one-screen intake, focused result")
    );

    let mut state = ViewState::Form;

    loop {
        state = match state {
            ViewState::Form => {
                section("Enter customer details");
                let form = prompt_form(&theme)?;
                threshold = prompt_threshold(&theme, threshold)?;

                match form.validate() {
                    Err(missing) => {
                        println!();
                        println!(
                            "  {} Please fill all fields: {}",
                            warn("!"),
                            missing.join(", ")
                        );
                        ViewState::Form
                    }
                    Ok(record) => {
                        let prediction = engine.predict(&record, threshold)?;
                        ViewState::Form.submit(prediction)
                    }
                }
            }
            ViewState::Result(prediction) => {
                render_result(&prediction);

                let choice = Select::with_theme(&theme)
                    .with_prompt("What next")
                    .items(&["Predict again", "Close"])
                    .default(0)
                    .interact_opt()?;

                match choice {
                    Some(0) => ViewState::Result(prediction).reset(),
                    _ => {
                        println!();
                        println!("  {}", dim("goodbye"));
                        println!();
                        break;
                    }
                }
            }
        };
    }

    Ok(())
}
