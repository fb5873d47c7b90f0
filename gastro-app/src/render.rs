//! Plain-text rendering of command results.

use std::fmt::Write as _;

use gastro_advisor::Advisory;
use gastro_model::{
    sparkline, AlertSeverity, DashboardView, Food, FoodGroups, HealthInsight, HomeSummary, MealRecord,
    Profile, SymptomRecord,
};
use gastro_store::SymptomAlert;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One-line sparkline for a series of levels.
pub fn bars(values: &[u8]) -> String {
    sparkline(values)
        .into_iter()
        .map(|v| BARS[((v * (BARS.len() - 1) as f64).round() as usize).min(BARS.len() - 1)])
        .collect()
}

pub fn symptom_logged(record: &SymptomRecord) -> String {
    format!(
        "Recorded pain {}/10, appetite {}/5 at {}.",
        record.pain_level,
        record.appetite_level,
        record.recorded_at.format("%Y-%m-%d %H:%M UTC")
    )
}

pub fn alert_line(severity: AlertSeverity) -> String {
    format!("[{}] {}", severity, severity.message())
}

pub fn alert(alert: &SymptomAlert) -> String {
    format!(
        "{} (pain {}/10 recorded {})",
        alert_line(alert.severity),
        alert.record.pain_level,
        alert.record.recorded_at.format("%Y-%m-%d %H:%M UTC")
    )
}

pub fn dashboard(view: &DashboardView, guest: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Risk today: {}", view.risk);
    match (view.today_pain, view.today_appetite) {
        (Some(pain), Some(appetite)) => {
            let _ = writeln!(out, "Today: pain {}/10, appetite {}/5", pain, appetite);
        }
        _ => {
            let _ = writeln!(out, "Today: nothing recorded yet");
        }
    }

    if view.has_history {
        let _ = writeln!(out, "Pain     {}", bars(&view.pain_series));
        let _ = writeln!(out, "Appetite {}", bars(&view.appetite_series));
    } else if guest {
        let _ = writeln!(out, "No history yet. Log a symptom to start your trend (guest data stays on this machine).");
    } else {
        let _ = writeln!(out, "No history yet. Log a symptom to start your trend.");
    }

    if let Some(tips) = &view.care_tips {
        for block in &tips.blocks {
            let _ = writeln!(out, "\n{}", block.title);
            for tip in block.tips {
                let _ = writeln!(out, "  - {}", tip);
            }
        }
        let _ = writeln!(out, "\n{}", tips.disclaimer);
    }

    let _ = writeln!(out, "\nToday's checklist");
    for item in &view.checklist {
        let _ = writeln!(out, "  [ ] {}", item);
    }
    let _ = write!(out, "\nSuggested foods: gastro foods search {}", view.food_query);
    out
}

pub fn home(summary: &HomeSummary) -> String {
    let mut out = String::new();
    match &summary.today {
        Some(today) => {
            let _ = writeln!(
                out,
                "Today: pain {}/10, appetite {}/5, risk {}",
                today.pain_level, today.appetite_level, summary.risk
            );
        }
        None => {
            let _ = writeln!(out, "Today: nothing recorded yet");
        }
    }
    let _ = writeln!(out, "\nRecommended foods");
    if summary.recommended.is_empty() {
        let _ = write!(out, "  (none available)");
    } else {
        out.push_str(&food_list(&summary.recommended));
    }
    out
}

fn food_line(food: &Food) -> String {
    let mut line = format!("  {} ({}, {})", food.name, food.category, food.safety_level.label());
    if let Some(tips) = &food.preparation_tips {
        let _ = write!(line, ": {}", tips);
    }
    line
}

pub fn food_list(foods: &[Food]) -> String {
    if foods.is_empty() {
        return "No foods found.".to_string();
    }
    foods.iter().map(food_line).collect::<Vec<_>>().join("\n")
}

pub fn food_groups(groups: &FoodGroups) -> String {
    if groups.is_empty() {
        return "No foods found.".to_string();
    }
    groups
        .iter()
        .map(|(level, foods)| {
            let mut section = format!("{} ({})", level.label(), foods.len());
            for food in foods {
                section.push('\n');
                section.push_str(&food_line(food));
            }
            section
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn advisory(advisory: &Advisory) -> String {
    let advice = &advisory.advice;
    let mut out = format!("{}: {}\n{}", advisory.food, advice.level.label(), advice.reason);
    if !advice.alternatives.is_empty() {
        let _ = write!(out, "\nAlternatives: {}", advice.alternatives.join(", "));
    }
    if let Some(tips) = &advice.preparation_tips {
        let _ = write!(out, "\nPreparation: {}", tips);
    }
    let _ = write!(out, "\n(model: {}{})", advisory.model, if advisory.used_fallback { ", fallback" } else { "" });
    out
}

pub fn meals(meals: &[MealRecord]) -> String {
    if meals.is_empty() {
        return "No meals logged.".to_string();
    }
    meals
        .iter()
        .map(|m| {
            let mut line = format!("{} {:<9} {} item(s)  [{}]", m.meal_date, m.meal_type.as_str(), m.foods.len(), m.id);
            if let Some(notes) = &m.notes {
                let _ = write!(line, "  {}", notes);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn insight(insight: &HealthInsight) -> String {
    let mut out = format!(
        "{} insight for {} (risk {})",
        insight.insight_type, insight.insight_date, insight.risk_level
    );
    for (key, value) in &insight.metrics.0 {
        let _ = write!(out, "\n  {}: {}", key, value);
    }
    for rec in &insight.recommendations {
        let _ = write!(out, "\n  - {}", rec);
    }
    out
}

pub fn insights(list: &[HealthInsight]) -> String {
    if list.is_empty() {
        return "No insights yet.".to_string();
    }
    list.iter().map(insight).collect::<Vec<_>>().join("\n\n")
}

pub fn profile(profile: &Profile) -> String {
    let mut out = format!("{} <{}>", profile.full_name.as_deref().unwrap_or("(no name)"), profile.email);
    if let Some(age) = profile.age {
        let _ = write!(out, "\nAge: {}", age);
    }
    if let Some(date) = profile.diagnosis_date {
        let _ = write!(out, "\nDiagnosed: {}", date);
    }
    if profile.has_intestinal_metaplasia {
        let _ = write!(out, "\nIntestinal metaplasia: yes");
    }
    if profile.throat_foreign_sensation {
        let _ = write!(out, "\nThroat foreign-body sensation: yes");
    }
    if !profile.medications.is_empty() {
        let names: Vec<&str> = profile.medications.iter().map(|m| m.name.as_str()).collect();
        let _ = write!(out, "\nMedications: {}", names.join(", "));
    }
    if !profile.allergies.is_empty() {
        let _ = write!(out, "\nAllergies: {}", profile.allergies.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bars() {
        assert_eq!(bars(&[0, 5, 10]), "▁▅█");
        assert_eq!(bars(&[]), "");
        assert_eq!(bars(&[0, 0]), "▁▁");
    }

    #[test]
    fn test_alert_line() {
        assert!(alert_line(AlertSeverity::Severe).starts_with("[severe] "));
    }
}
