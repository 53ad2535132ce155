use crate::infra::{FixtureCatalog, HashingEmbedder, OfflineWriter};
use clap::Args;
use gift_ai::engine::{
    EmptyReason, EngineConfig, GiftQuery, Occasion, Recommendation, RecommendationEngine,
};
use gift_ai::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Who the gift is for
    #[arg(long, default_value = "Alex")]
    pub(crate) recipient: String,
    /// Occasion label, e.g. "birthday" or "thank you"
    #[arg(long, default_value = "birthday", value_parser = crate::infra::parse_occasion)]
    pub(crate) occasion: Occasion,
    /// Lower budget bound in dollars
    #[arg(long)]
    pub(crate) budget_min: Option<f64>,
    /// Upper budget bound in dollars
    #[arg(long)]
    pub(crate) budget_max: Option<f64>,
    /// Comma-separated things the recipient loves
    #[arg(long, value_delimiter = ',', default_value = "chocolate")]
    pub(crate) loves: Vec<String>,
    /// Comma-separated things the recipient dislikes
    #[arg(long, value_delimiter = ',')]
    pub(crate) hates: Vec<String>,
    /// Comma-separated allergies; matching products are always excluded
    #[arg(long, value_delimiter = ',')]
    pub(crate) allergies: Vec<String>,
    /// Free-text interests for the semantic matcher
    #[arg(long)]
    pub(crate) interests: Option<String>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let query = GiftQuery {
        occasion: args.occasion,
        budget_min: args.budget_min,
        budget_max: args.budget_max,
        same_day_required: false,
        recipient_name: args.recipient,
        loves: args.loves,
        hates: args.hates,
        allergies: args.allergies,
        interests: args.interests,
    };

    println!("Gift recommendation demo (offline collaborators)");
    println!(
        "Recipient {} | occasion {} | budget {}..{}",
        query.recipient_name,
        query.occasion.label(),
        query
            .budget_min
            .map_or("open".to_string(), |min| format!("${min:.2}")),
        query
            .budget_max
            .map_or("open".to_string(), |max| format!("${max:.2}")),
    );

    let engine = Arc::new(RecommendationEngine::new(
        Arc::new(FixtureCatalog),
        Arc::new(HashingEmbedder),
        Arc::new(OfflineWriter),
        EngineConfig::default(),
    ));

    let set = engine.recommend(query).await?;

    render_slot("Best match", set.best_match.as_ref());
    render_slot("Safe bet", set.safe_bet.as_ref());
    render_slot("Something unique", set.unique.as_ref());

    if let Some(reason) = set.empty_reason {
        let detail = match reason {
            EmptyReason::NoCandidates => "the catalog returned no candidates",
            EmptyReason::BudgetExcludedAll => "no candidate fit the budget",
            EmptyReason::SafetyExcludedAll => "every candidate conflicted with a hate or allergy",
        };
        println!("\nNo recommendations: {detail}.");
    }

    Ok(())
}

fn render_slot(label: &str, slot: Option<&Recommendation>) {
    match slot {
        Some(rec) => {
            println!(
                "\n{label}: {} (${:.2}, score {:.2})",
                rec.product.name, rec.product.price, rec.score
            );
            println!("  {}", rec.explanation);
        }
        None => println!("\n{label}: none"),
    }
}
