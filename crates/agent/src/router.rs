//! Complexity-tiered model routing. Simple queries run on the cheap
//! model; certain intents force the complex tier regardless of what the
//! classifier said.

use maildesk_core::config::LlmConfig;
use maildesk_core::domain::classification::{Complexity, Intent};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub description: &'static str,
}

/// Per-1K-token USD prices. Unknown models are billed at the cheap tier
/// so estimates stay conservative rather than absent.
const PRICING: &[(&str, f64, f64)] = &[
    ("gpt-4o-mini", 0.00015, 0.0006),
    ("gpt-4o", 0.0025, 0.01),
];

const INTENT_OVERRIDES: &[(Intent, Complexity)] = &[
    (Intent::Complaint, Complexity::Complex),
    (Intent::RefundRequest, Complexity::Complex),
    (Intent::EscalationRequest, Complexity::Complex),
];

#[derive(Clone, Debug)]
pub struct ModelRouter {
    simple: ModelConfig,
    medium: ModelConfig,
    complex: ModelConfig,
}

impl ModelRouter {
    pub fn new(llm: &LlmConfig) -> Self {
        Self {
            simple: ModelConfig {
                model: llm.simple_model.clone(),
                max_tokens: 500,
                temperature: 0.3,
                description: "Fast model for simple lookups and FAQ responses",
            },
            medium: ModelConfig {
                model: llm.medium_model.clone(),
                max_tokens: 1000,
                temperature: 0.5,
                description: "Balanced model for moderate complexity queries",
            },
            complex: ModelConfig {
                model: llm.complex_model.clone(),
                max_tokens: 2000,
                temperature: 0.7,
                description: "Advanced model for complex reasoning and escalations",
            },
        }
    }

    /// Tier selection. Intent overrides only ever upgrade: a complex
    /// classification is never routed down because of the intent.
    pub fn model_config(&self, complexity: Complexity, intent: Option<Intent>) -> &ModelConfig {
        let effective = intent
            .and_then(|intent| {
                INTENT_OVERRIDES
                    .iter()
                    .find(|(candidate, _)| *candidate == intent)
                    .map(|(_, forced)| *forced)
            })
            .filter(|forced| forced.rank() > complexity.rank())
            .unwrap_or(complexity);

        self.tier(effective)
    }

    fn tier(&self, complexity: Complexity) -> &ModelConfig {
        match complexity {
            Complexity::Simple => &self.simple,
            Complexity::Medium => &self.medium,
            Complexity::Complex => &self.complex,
        }
    }

    /// Pre-call cost estimate. Output cost assumes the tier's full
    /// `max_tokens` budget is spent.
    pub fn estimate_cost(&self, complexity: Complexity, input_tokens: u32) -> CostEstimate {
        let config = self.tier(complexity);
        let (input_price, output_price) = PRICING
            .iter()
            .find(|(model, _, _)| *model == config.model)
            .map(|(_, input, output)| (*input, *output))
            .unwrap_or((PRICING[0].1, PRICING[0].2));

        let input_cost = (f64::from(input_tokens) / 1000.0) * input_price;
        let output_cost = (f64::from(config.max_tokens) / 1000.0) * output_price;

        CostEstimate {
            model: config.model.clone(),
            input_tokens,
            max_output_tokens: config.max_tokens,
            estimated_input_cost: round6(input_cost),
            estimated_output_cost: round6(output_cost),
            estimated_total_cost: round6(input_cost + output_cost),
        }
    }

    /// Routing table snapshot for diagnostics endpoints.
    pub fn routing_stats(&self) -> Value {
        let tier_entry = |config: &ModelConfig| {
            json!({
                "model": config.model,
                "max_tokens": config.max_tokens,
                "temperature": config.temperature,
                "description": config.description,
            })
        };

        let overrides: serde_json::Map<String, Value> = INTENT_OVERRIDES
            .iter()
            .map(|(intent, complexity)| {
                (intent.as_str().to_string(), Value::String(complexity.as_str().to_string()))
            })
            .collect();

        json!({
            "tiers": {
                "simple": tier_entry(&self.simple),
                "medium": tier_entry(&self.medium),
                "complex": tier_entry(&self.complex),
            },
            "intent_overrides": overrides,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostEstimate {
    pub model: String,
    pub input_tokens: u32,
    pub max_output_tokens: u32,
    pub estimated_input_cost: f64,
    pub estimated_output_cost: f64,
    pub estimated_total_cost: f64,
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use maildesk_core::config::AppConfig;
    use maildesk_core::domain::classification::{Complexity, Intent};

    use super::ModelRouter;

    fn router() -> ModelRouter {
        ModelRouter::new(&AppConfig::default().llm)
    }

    #[test]
    fn tiers_map_to_configured_models() {
        let router = router();

        assert_eq!(router.model_config(Complexity::Simple, None).model, "gpt-4o-mini");
        assert_eq!(router.model_config(Complexity::Simple, None).max_tokens, 500);
        assert_eq!(router.model_config(Complexity::Complex, None).model, "gpt-4o");
        assert_eq!(router.model_config(Complexity::Complex, None).max_tokens, 2000);
    }

    #[test]
    fn refund_intent_upgrades_simple_to_complex() {
        let router = router();
        let config = router.model_config(Complexity::Simple, Some(Intent::RefundRequest));

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 2000);
    }

    #[test]
    fn overrides_never_downgrade() {
        let router = router();

        // Complaint forces Complex, which is already the level; a
        // hypothetical lower override would be ignored by the rank check.
        let config = router.model_config(Complexity::Complex, Some(Intent::OrderStatus));
        assert_eq!(config.model, "gpt-4o");
    }

    #[test]
    fn non_override_intents_keep_classified_tier() {
        let router = router();
        let config = router.model_config(Complexity::Simple, Some(Intent::PolicyQuestion));

        assert_eq!(config.max_tokens, 500);
    }

    #[test]
    fn cost_estimate_uses_tier_output_budget() {
        let router = router();
        let estimate = router.estimate_cost(Complexity::Simple, 1000);

        assert_eq!(estimate.model, "gpt-4o-mini");
        assert_eq!(estimate.estimated_input_cost, 0.00015);
        assert_eq!(estimate.estimated_output_cost, 0.0003);
        assert_eq!(estimate.estimated_total_cost, 0.00045);
    }

    #[test]
    fn routing_stats_expose_tiers_and_overrides() {
        let stats = router().routing_stats();

        assert_eq!(stats["tiers"]["medium"]["max_tokens"], 1000);
        assert_eq!(stats["intent_overrides"]["complaint"], "complex");
    }
}
