//! Command surface.
//!
//! Each command maps onto one screen or action of the tracker and returns
//! its text output; `main` prints it.

use anyhow::{bail, Context as _};
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use gastro_model::{
    AlertSeverity, FoodGroups, InsightType, MealFoodItem, MealType, NewMealRecord, NewSymptomRecord,
    SignalOverrides,
};
use gastro_store::gateway::{DEFAULT_HISTORY_LIMIT, DEFAULT_INSIGHT_LIMIT};
use tracing::{info, warn};

use crate::context::AppContext;
use crate::dashboard::{load_dashboard, load_home};
use crate::render;

/// Top-level commands
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Record how you feel right now
    LogSymptom {
        /// Pain level, 0 (none) to 10 (worst)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
        pain: u8,
        /// Appetite level, 0 (none) to 5 (normal)
        #[arg(long, default_value = "3", value_parser = clap::value_parser!(u8).range(0..=5))]
        appetite: u8,
        #[arg(long)]
        acid_reflux: bool,
        /// Lump or foreign-body sensation in the throat
        #[arg(long)]
        throat: bool,
        #[arg(long)]
        bloating: bool,
        #[arg(long)]
        nausea: bool,
        /// Suspected trigger (repeatable)
        #[arg(long = "trigger")]
        triggers: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Care dashboard: risk, trends, tips and today's checklist
    Dashboard {
        /// Override today's acid-reflux signal
        #[arg(long)]
        acid_reflux: Option<bool>,
        /// Override today's throat-discomfort signal
        #[arg(long)]
        throat: Option<bool>,
        /// Override today's poor-appetite signal
        #[arg(long)]
        poor_appetite: Option<bool>,
    },

    /// Today's status and recommended foods
    Home,

    /// Browse the food catalog
    #[command(subcommand)]
    Foods(FoodCommands),

    /// Ask the AI advisor about one food
    Advise {
        /// Food to evaluate
        food: String,
    },

    /// Meal log (signed-in users)
    #[command(subcommand)]
    Meals(MealCommands),

    /// Periodic health insights (signed-in users)
    #[command(subcommand)]
    Insights(InsightCommands),

    /// Your profile (signed-in users)
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Print alerts for new severe symptom records until Ctrl-C
    Watch,
}

/// Food catalog queries
#[derive(Debug, Clone, Subcommand)]
pub enum FoodCommands {
    /// Search foods by name
    Search { query: String },
    /// Foods in one category
    Category { category: String },
    /// Recommended foods
    Safe {
        /// Only foods suited to throat discomfort
        #[arg(long)]
        throat: bool,
    },
    /// The whole catalog
    All,
}

/// Meal log operations
#[derive(Debug, Clone, Subcommand)]
pub enum MealCommands {
    /// List logged meals
    List {
        /// Only meals on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },
    /// Log a meal
    Add {
        /// breakfast, lunch, dinner or snack
        #[arg(long)]
        meal_type: MealType,
        /// Meal date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Food eaten as FOOD_ID:AMOUNT:UNIT (repeatable)
        #[arg(long = "food", value_parser = parse_food_item)]
        foods: Vec<MealFoodItem>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a logged meal
    Delete { id: String },
}

/// Insight queries
#[derive(Debug, Clone, Subcommand)]
pub enum InsightCommands {
    /// Most recent insight
    Latest,
    /// Insights of one period type
    List {
        /// daily, weekly or monthly
        #[arg(long = "type")]
        insight_type: InsightType,
        #[arg(short, long, default_value_t = DEFAULT_INSIGHT_LIMIT)]
        limit: usize,
    },
}

/// Profile operations
#[derive(Debug, Clone, Subcommand)]
pub enum ProfileCommands {
    /// Show your profile
    Show,
}

/// Parse `FOOD_ID:AMOUNT:UNIT`; the unit defaults to grams.
pub fn parse_food_item(value: &str) -> Result<MealFoodItem, String> {
    let mut parts = value.splitn(3, ':');
    let food_id = parts.next().map(str::trim).filter(|s| !s.is_empty());
    let amount = parts.next().map(str::trim);
    let unit = parts.next().map(str::trim).filter(|s| !s.is_empty()).unwrap_or("g");

    let (Some(food_id), Some(amount)) = (food_id, amount) else {
        return Err(format!("expected FOOD_ID:AMOUNT[:UNIT], got `{}`", value));
    };
    let amount: f64 = amount
        .parse()
        .map_err(|_| format!("invalid amount `{}` in `{}`", amount, value))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(format!("amount must be positive in `{}`", value));
    }

    Ok(MealFoodItem {
        food_id: food_id.to_string(),
        amount,
        unit: unit.to_string(),
    })
}

/// Execute a command
pub async fn execute(ctx: &AppContext, command: Command) -> anyhow::Result<String> {
    match command {
        Command::LogSymptom {
            pain,
            appetite,
            acid_reflux,
            throat,
            bloating,
            nausea,
            triggers,
            notes,
        } => {
            let mut symptom = NewSymptomRecord::new(ctx.session.user_id(), pain, appetite)
                .with_acid_reflux(acid_reflux)
                .with_throat_discomfort(throat)
                .with_bloating(bloating)
                .with_nausea(nausea)
                .with_triggers(triggers);
            if let Some(notes) = notes {
                symptom = symptom.with_notes(notes);
            }

            let record = ctx.symptoms.create(symptom).await?;
            info!(record_id = %record.id, store = ctx.symptoms.kind(), "Symptom recorded");

            let mut out = render::symptom_logged(&record);
            if let Some(severity) = AlertSeverity::from_pain(record.pain_level) {
                out.push('\n');
                out.push_str(&render::alert_line(severity));
            }
            Ok(out)
        }

        Command::Dashboard {
            acid_reflux,
            throat,
            poor_appetite,
        } => {
            let overrides = SignalOverrides {
                acid_reflux,
                throat_discomfort: throat,
                poor_appetite,
            };
            let view = load_dashboard(ctx.symptoms.as_ref(), ctx.session.user_id(), &overrides).await;
            Ok(render::dashboard(&view, ctx.session.is_guest()))
        }

        Command::Home => {
            let summary = load_home(ctx.symptoms.as_ref(), &ctx.gateway.foods(), ctx.session.user_id()).await;
            Ok(render::home(&summary))
        }

        Command::Foods(cmd) => execute_foods(ctx, cmd).await,

        Command::Advise { food } => {
            let advisor = ctx.food_advisor()?;
            let advisory = advisor.advise(&food).await?;
            if advisory.degraded {
                warn!(food = %advisory.food, "Showing conservative advice");
            }
            Ok(render::advisory(&advisory))
        }

        Command::Meals(cmd) => execute_meals(ctx, cmd).await,

        Command::Insights(cmd) => {
            let user_id = ctx.require_user("insights")?;
            let insights = ctx.gateway.insights();
            match cmd {
                InsightCommands::Latest => Ok(match insights.get_latest(user_id).await? {
                    Some(insight) => render::insight(&insight),
                    None => "No insights yet.".to_string(),
                }),
                InsightCommands::List { insight_type, limit } => {
                    let list = insights.get_by_type(user_id, insight_type, limit).await?;
                    Ok(render::insights(&list))
                }
            }
        }

        Command::Profile(ProfileCommands::Show) => {
            let user_id = ctx.require_user("profile show")?;
            Ok(match ctx.gateway.profiles().get(user_id).await? {
                Some(profile) => render::profile(&profile),
                None => format!("No profile found for {}.", user_id),
            })
        }

        Command::Watch => watch(ctx).await,
    }
}

async fn execute_foods(ctx: &AppContext, cmd: FoodCommands) -> anyhow::Result<String> {
    let foods = ctx.gateway.foods();
    match cmd {
        FoodCommands::Search { query } => {
            let found = foods.search(&query).await?;
            Ok(render::food_groups(&FoodGroups::partition(found)))
        }
        FoodCommands::Category { category } => {
            let found = foods.get_by_category(&category).await?;
            Ok(render::food_groups(&FoodGroups::partition(found)))
        }
        FoodCommands::Safe { throat } => Ok(render::food_list(&foods.get_safe(throat).await?)),
        FoodCommands::All => Ok(render::food_groups(&FoodGroups::partition(foods.get_all().await?))),
    }
}

async fn execute_meals(ctx: &AppContext, cmd: MealCommands) -> anyhow::Result<String> {
    let user_id = ctx.require_user("meals")?;
    let meals = ctx.gateway.meals();
    match cmd {
        MealCommands::List { date, limit } => {
            let list = match date {
                Some(date) => meals.get_by_date(user_id, date).await?,
                None => meals.get_by_user(user_id, limit).await?,
            };
            Ok(render::meals(&list))
        }
        MealCommands::Add {
            meal_type,
            date,
            foods,
            notes,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let mut meal = NewMealRecord::new(user_id, date, meal_type);
            meal.foods = foods;
            if let Some(notes) = notes {
                meal = meal.with_notes(notes);
            }
            let stored = meals.create(&meal).await?;
            Ok(format!("Logged {} on {} ({}).", stored.meal_type, stored.meal_date, stored.id))
        }
        MealCommands::Delete { id } => {
            meals.delete(&id).await?;
            Ok(format!("Deleted meal {}.", id))
        }
    }
}

/// Print alerts until Ctrl-C or until the channel ends. The subscription is
/// released on every path out of the wait.
async fn watch(ctx: &AppContext) -> anyhow::Result<String> {
    let user_id = ctx.require_user("watch")?;
    let mut subscription = ctx
        .realtime()?
        .subscribe_symptom_alerts(user_id, |alert| {
            println!("{}", render::alert(&alert));
        })
        .await
        .context("Failed to subscribe to symptom alerts")?;

    info!(topic = %subscription.topic(), "Watching for symptom alerts, press Ctrl-C to stop");
    let signal = tokio::select! {
        signal = tokio::signal::ctrl_c() => Some(signal),
        _ = subscription.closed() => None,
    };
    let topic = subscription.topic().to_string();
    subscription.unsubscribe().await;

    match signal {
        Some(signal) => {
            signal.context("Failed to listen for Ctrl-C")?;
            Ok("Stopped watching symptom alerts.".to_string())
        }
        None => {
            warn!(%topic, "Alert channel ended, no more alerts will arrive");
            bail!("Alert channel {} closed unexpectedly", topic)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_food_item() {
        let item = parse_food_item("f1:150:g").unwrap();
        assert_eq!(item.food_id, "f1");
        assert_eq!(item.amount, 150.0);
        assert_eq!(item.unit, "g");

        assert_eq!(parse_food_item("f2:1.5").unwrap().unit, "g");
        assert_eq!(parse_food_item("f3:2:bowl").unwrap().unit, "bowl");
        assert!(parse_food_item("f1").is_err());
        assert!(parse_food_item(":100:g").is_err());
        assert!(parse_food_item("f1:lots:g").is_err());
        assert!(parse_food_item("f1:-5:g").is_err());
    }
}
