//! LUIS v3 prediction adapter.
//!
//! `GET {endpoint}/luis/prediction/v3.0/apps/{app_id}/slots/{slot}/predict`
//! with the utterance as the `query` parameter. Entity values come back as
//! arrays keyed by entity name; per-value confidence, when the service
//! reports one, lives under `$instance`.

use super::{map_request_error, read_json};
use async_trait::async_trait;
use orderbot_application::ports::intent_classifier::{ClassifierError, IntentClassifier};
use orderbot_domain::{ClassifierResult, EntityValue};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct LuisResponse {
    prediction: LuisPrediction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LuisPrediction {
    top_intent: String,
    #[serde(default)]
    intents: HashMap<String, LuisIntent>,
    #[serde(default)]
    entities: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct LuisIntent {
    score: Option<f64>,
}

pub struct LuisClassifier {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl LuisClassifier {
    pub fn new(
        endpoint: &str,
        app_id: &str,
        slot: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: Self::prediction_url(endpoint, app_id, slot),
            api_key: api_key.into(),
        })
    }

    fn prediction_url(endpoint: &str, app_id: &str, slot: &str) -> String {
        format!(
            "{}/luis/prediction/v3.0/apps/{}/slots/{}/predict",
            endpoint.trim_end_matches('/'),
            app_id,
            slot
        )
    }
}

fn into_result(prediction: LuisPrediction) -> ClassifierResult {
    let score = prediction
        .intents
        .get(&prediction.top_intent)
        .and_then(|intent| intent.score);
    let mut result = ClassifierResult::new(prediction.top_intent);
    if let Some(score) = score {
        result = result.with_score(score);
    }

    let instances = prediction.entities.get("$instance");
    for (name, values) in &prediction.entities {
        if name.starts_with('$') {
            continue;
        }
        let Value::Array(values) = values else {
            continue;
        };
        for (index, value) in values.iter().enumerate() {
            let confidence = instances
                .and_then(|i| i.get(name))
                .and_then(|i| i.get(index))
                .and_then(|i| i.get("score"))
                .and_then(Value::as_f64)
                .unwrap_or(1.0);
            result.push_entity(name.as_str(), EntityValue::new(value.clone(), confidence));
        }
    }
    result
}

#[async_trait]
impl IntentClassifier for LuisClassifier {
    fn name(&self) -> &str {
        "luis"
    }

    async fn classify(&self, utterance: &str) -> Result<ClassifierResult, ClassifierError> {
        debug!("LUIS request to {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("subscription-key", self.api_key.as_str()),
                ("query", utterance),
                ("show-all-intents", "true"),
            ])
            .send()
            .await
            .map_err(map_request_error)?;

        let body: LuisResponse = read_json(response).await?;
        Ok(into_result(body.prediction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ClassifierResult {
        let body: LuisResponse = serde_json::from_str(json).unwrap();
        into_result(body.prediction)
    }

    #[test]
    fn test_prediction_url() {
        assert_eq!(
            LuisClassifier::prediction_url(
                "https://westus.api.cognitive.microsoft.com/",
                "abc",
                "production"
            ),
            "https://westus.api.cognitive.microsoft.com/luis/prediction/v3.0/apps/abc/slots/production/predict"
        );
    }

    #[test]
    fn test_parse_prediction_with_entities() {
        let result = parse(
            r#"{
                "query": "two margherita please",
                "prediction": {
                    "topIntent": "OrderPizza",
                    "intents": { "OrderPizza": { "score": 0.97 }, "None": { "score": 0.02 } },
                    "entities": {
                        "number": [2],
                        "PizzaName": [["Margherita"]],
                        "$instance": {
                            "PizzaName": [{ "text": "margherita", "score": 0.88 }]
                        }
                    }
                }
            }"#,
        );

        assert_eq!(result.intent, "OrderPizza");
        assert_eq!(result.score, Some(0.97));
        let quantity = &result.entity("number").unwrap()[0];
        assert_eq!(quantity.value, serde_json::json!(2));
        assert_eq!(quantity.confidence, 1.0);
        let name = &result.entity("PizzaName").unwrap()[0];
        assert_eq!(name.as_text().as_deref(), Some("Margherita"));
        assert_eq!(name.confidence, 0.88);
        assert!(result.entity("$instance").is_none());
    }

    #[test]
    fn test_parse_prediction_without_entities() {
        let result = parse(r#"{ "prediction": { "topIntent": "None", "intents": {} } }"#);
        assert_eq!(result.intent, "None");
        assert_eq!(result.score, None);
        assert!(!result.has_entities());
    }
}
