//! Prompt text for food suitability questions.

use crate::backend::CompletionRequest;

/// Sampling temperature; low so repeated questions get stable answers.
pub const TEMPERATURE: f32 = 0.2;

/// Role and output contract for the model.
pub const SYSTEM_PROMPT: &str = "You are a dietary advisor for gastritis and reflux disease. \
Judge foods by the principles of a weak, cold-prone stomach and gastric mucosa repair. \
Reply with strict JSON only, no extra text. Fields: \
level (safe|caution|avoid), reason (50 to 120 words), \
alternatives (at most 5 foods), preparationTips (a short preparation method).";

/// Dietary context the model judges against.
pub const PATIENT_CONTEXT: &str = "erosive atrophic gastritis with mild intestinal metaplasia; \
meals must be warm and soft, low in oil and irritants; avoid raw or cold foods and anything high in fat or salt.";

/// The question for one food.
pub fn user_prompt(food_name: &str) -> String {
    format!("Evaluate food: {}\nContext: {}", food_name.trim(), PATIENT_CONTEXT)
}

/// Complete request for one food: system contract, question, JSON output.
pub fn advice_request(food_name: &str) -> CompletionRequest {
    CompletionRequest::user(user_prompt(food_name))
        .with_system(SYSTEM_PROMPT)
        .with_temperature(TEMPERATURE)
        .with_json_output()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ResponseFormat;

    #[test]
    fn test_advice_request() {
        let req = advice_request("  fried dough sticks ");
        assert_eq!(req.system_prompt.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(req.temperature, Some(0.2));
        assert_eq!(req.response_format, Some(ResponseFormat::JsonObject));

        let question = &req.messages[0].content;
        assert!(question.starts_with("Evaluate food: fried dough sticks\n"));
        assert!(question.contains("warm and soft"));
    }
}
