//! `pantry` command-line driver.
//!
//! ```text
//! pantry list [filter]        print ingredients (titled exactly `filter`, if given)
//! pantry add <title> <amount> add an ingredient, printing it with its new id
//! pantry remove <id>          remove an ingredient
//! pantry replay               dispatch newline-delimited JSON actions from stdin
//! ```
//!
//! Configuration comes from `PANTRY_*` environment variables; logging from
//! `RUST_LOG`. Exits non-zero when the last request ended in an error.

use anyhow::{bail, Context};
use pantry_ingredients::{Ingredient, IngredientId, IngredientsApp, NewIngredient, PantryConfig};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: pantry <list [filter] | add <title> <amount> | remove <id> | replay>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pantry_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = PantryConfig::from_env().context("invalid configuration")?;
    let app = IngredientsApp::from_config(&config)?;

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["list"] => {
            app.load_ingredients().await?;
            print_ingredients(&app.ingredients().await);
        },
        ["list", filter] => {
            app.search_ingredients(*filter).await?;
            print_ingredients(&app.ingredients().await);
        },
        ["add", title, amount] => {
            let amount: f64 = amount
                .parse()
                .with_context(|| format!("amount must be a number, got {amount:?}"))?;
            app.add_ingredient(NewIngredient::new(*title, amount)).await?;
            // Nothing was loaded, so the list holds at most the new ingredient
            print_ingredients(&app.ingredients().await);
        },
        ["remove", id] => {
            let id = IngredientId::new(*id);
            app.remove_ingredient(id.clone()).await?;
            if app.error().await.is_none() {
                tracing::info!(%id, "Ingredient removed");
            }
        },
        ["replay"] => {
            replay(&app).await?;
            print_ingredients(&app.ingredients().await);
        },
        _ => bail!(USAGE),
    }

    let error = app.error().await;
    app.shutdown(Duration::from_secs(5)).await?;

    if let Some(error) = error {
        bail!("request failed: {error}");
    }
    Ok(())
}

fn print_ingredients(ingredients: &[Ingredient]) {
    for ingredient in ingredients {
        println!("{}\t{}\t{}", ingredient.id, ingredient.title, ingredient.amount);
    }
}

/// Dispatch each stdin line as a wire action, stopping at the first rejected one
async fn replay(app: &IngredientsApp) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        app.dispatch_json(&line)
            .await
            .with_context(|| format!("line {line_number}"))?;
    }

    tracing::info!(actions = line_number, "Replay finished");
    Ok(())
}
