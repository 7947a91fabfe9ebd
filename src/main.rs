//! Churn AI - main entry point

use churn_ai::cli::{cmd_info, cmd_interactive, cmd_predict, cmd_train, Cli, Commands};
use churn_ai::inference::FormInput;
use churn_ai::training::DEFAULT_MODEL_PATH;
use clap::Parser;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "churn_ai=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Train {
            data,
            model,
            test_fraction,
            seed,
        }) => {
            cmd_train(data, model, test_fraction, seed)?;
        }
        Some(Commands::Predict {
            model,
            threshold,
            age,
            gender,
            tenure,
            usage,
            support,
            payment_delay,
            subscription,
            contract,
            total_spend,
            last_interaction,
        }) => {
            let form = FormInput {
                age: age.unwrap_or_default(),
                gender: gender.unwrap_or_default(),
                tenure: tenure.unwrap_or_default(),
                usage: usage.unwrap_or_default(),
                support: support.unwrap_or_default(),
                payment_delay: payment_delay.unwrap_or_default(),
                subscription: subscription.unwrap_or_default(),
                contract: contract.unwrap_or_default(),
                total_spend: total_spend.unwrap_or_default(),
                last_interaction: last_interaction.unwrap_or_default(),
            };
            cmd_predict(&model, threshold, form)?;
        }
        Some(Commands::Info { model }) => {
            cmd_info(&model)?;
        }
        None => {
            // Default: the interactive intake form
            cmd_interactive(Path::new(DEFAULT_MODEL_PATH))?;
        }
    }

    Ok(())
}
