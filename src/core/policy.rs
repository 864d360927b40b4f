use serde::Serialize;

use super::types::{Recommendation, RiskMetrics};

pub const VALUE_AT_RISK_THRESHOLD: f64 = 15.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskMetric {
    ValueAtRiskPercent,
    VolatilityIndex,
}

impl RiskMetric {
    fn read(self, risk: &RiskMetrics) -> f64 {
        match self {
            RiskMetric::ValueAtRiskPercent => risk.value_at_risk_percent,
            RiskMetric::VolatilityIndex => risk.volatility_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRule {
    pub metric: RiskMetric,
    pub threshold: f64,
    pub actions: Vec<Recommendation>,
}

impl RiskRule {
    pub fn fires(&self, risk: &RiskMetrics) -> bool {
        self.metric.read(risk) > self.threshold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPolicy {
    pub rules: Vec<RiskRule>,
    pub fallback: Vec<Recommendation>,
}

impl RecommendationPolicy {
    pub fn new(rules: Vec<RiskRule>, fallback: Vec<Recommendation>) -> Self {
        Self { rules, fallback }
    }

    pub fn with_rule(mut self, rule: RiskRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn recommend(&self, risk: &RiskMetrics) -> Vec<Recommendation> {
        let mut actions = self
            .rules
            .iter()
            .filter(|rule| rule.fires(risk))
            .flat_map(|rule| rule.actions.iter().cloned())
            .collect::<Vec<_>>();

        if actions.is_empty() {
            return self.fallback.clone();
        }
        actions.sort_by_key(|action| action.priority);
        actions
    }
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self::new(
            vec![RiskRule {
                metric: RiskMetric::ValueAtRiskPercent,
                threshold: VALUE_AT_RISK_THRESHOLD,
                actions: vec![
                    advisory(
                        "Deploy Delta-Neutral Hedge",
                        "Worst-case drawdown exceeds the 15% limit. Moving part of the exposed \
                         position into delta-neutral liquidity caps downside near the threshold.",
                        1,
                    ),
                    advisory(
                        "Set Stop-Loss Grid",
                        "A laddered stop-loss grid below the median band dampens the impact of \
                         volatility on the remaining exposure.",
                        2,
                    ),
                ],
            }],
            vec![advisory(
                "Hold Current Allocation",
                "Risk within acceptable limits. No intervention required.",
                1,
            )],
        )
    }
}

fn advisory(title: &str, rationale: &str, priority: u8) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        rationale: rationale.to_string(),
        priority,
    }
}
