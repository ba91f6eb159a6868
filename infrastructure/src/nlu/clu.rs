//! Conversational Language Understanding adapter.
//!
//! `POST {endpoint}/language/:analyze-conversations` with a single
//! conversation item. Entities come back as a flat list of categories; list
//! entities carry their canonical key in `extraInformation` and prebuilt
//! numbers their value in `resolutions`.

use super::{map_request_error, read_json};
use async_trait::async_trait;
use orderbot_application::ports::intent_classifier::{ClassifierError, IntentClassifier};
use orderbot_domain::{ClassifierResult, EntityValue};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

const API_VERSION: &str = "2023-04-01";

#[derive(Debug, Deserialize)]
struct CluResponse {
    result: CluResult,
}

#[derive(Debug, Deserialize)]
struct CluResult {
    prediction: CluPrediction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CluPrediction {
    top_intent: Option<String>,
    #[serde(default)]
    intents: Vec<CluIntent>,
    #[serde(default)]
    entities: Vec<CluEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CluIntent {
    category: String,
    confidence_score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CluEntity {
    category: String,
    text: String,
    #[serde(default = "full_confidence")]
    confidence_score: f64,
    #[serde(default)]
    extra_information: Vec<Value>,
    #[serde(default)]
    resolutions: Vec<Value>,
}

fn full_confidence() -> f64 {
    1.0
}

impl CluEntity {
    /// Resolved number, then list key, then the matched text.
    fn value(&self) -> Value {
        let number = self
            .resolutions
            .iter()
            .find(|r| r.get("resolutionKind").and_then(Value::as_str) == Some("NumberResolution"))
            .and_then(|r| r.get("value"))
            .cloned();
        let list_key = self
            .extra_information
            .iter()
            .find(|e| e.get("extraInformationKind").and_then(Value::as_str) == Some("ListKey"))
            .and_then(|e| e.get("key"))
            .cloned();

        number
            .or(list_key)
            .unwrap_or_else(|| Value::String(self.text.clone()))
    }
}

pub struct CluClassifier {
    client: reqwest::Client,
    url: String,
    api_key: String,
    project: String,
    deployment: String,
}

impl CluClassifier {
    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        project: impl Into<String>,
        deployment: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!(
                "{}/language/:analyze-conversations",
                endpoint.trim_end_matches('/')
            ),
            api_key: api_key.into(),
            project: project.into(),
            deployment: deployment.into(),
        })
    }

    fn request_body(&self, utterance: &str) -> Value {
        json!({
            "kind": "Conversation",
            "analysisInput": {
                "conversationItem": {
                    "id": "1",
                    "participantId": "user",
                    "text": utterance,
                }
            },
            "parameters": {
                "projectName": self.project,
                "deploymentName": self.deployment,
                "stringIndexType": "TextElement_V8",
            }
        })
    }
}

fn into_result(prediction: CluPrediction) -> ClassifierResult {
    let top_intent = prediction
        .top_intent
        .or_else(|| prediction.intents.first().map(|i| i.category.clone()))
        .unwrap_or_else(|| "None".to_string());
    let score = prediction
        .intents
        .iter()
        .find(|i| i.category == top_intent)
        .map(|i| i.confidence_score);

    let mut result = ClassifierResult::new(top_intent);
    if let Some(score) = score {
        result = result.with_score(score);
    }
    for entity in &prediction.entities {
        result.push_entity(
            entity.category.as_str(),
            EntityValue::new(entity.value(), entity.confidence_score),
        );
    }
    result
}

#[async_trait]
impl IntentClassifier for CluClassifier {
    fn name(&self) -> &str {
        "clu"
    }

    async fn classify(&self, utterance: &str) -> Result<ClassifierResult, ClassifierError> {
        debug!("CLU request to {} ({})", self.url, self.project);
        let response = self
            .client
            .post(&self.url)
            .query(&[("api-version", API_VERSION)])
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&self.request_body(utterance))
            .send()
            .await
            .map_err(map_request_error)?;

        let body: CluResponse = read_json(response).await?;
        Ok(into_result(body.result.prediction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ClassifierResult {
        let body: CluResponse = serde_json::from_str(json).unwrap();
        into_result(body.result.prediction)
    }

    #[test]
    fn test_parse_prediction_resolves_entities() {
        let result = parse(
            r#"{
                "kind": "ConversationResult",
                "result": {
                    "query": "two margheritas",
                    "prediction": {
                        "projectKind": "Conversation",
                        "topIntent": "Ordering",
                        "intents": [
                            { "category": "Ordering", "confidenceScore": 0.93 },
                            { "category": "None", "confidenceScore": 0.1 }
                        ],
                        "entities": [
                            {
                                "category": "Pizza",
                                "text": "margheritas",
                                "offset": 4,
                                "length": 11,
                                "confidenceScore": 1,
                                "extraInformation": [
                                    { "extraInformationKind": "ListKey", "key": "Margherita" }
                                ]
                            },
                            {
                                "category": "Quantity",
                                "text": "two",
                                "offset": 0,
                                "length": 3,
                                "confidenceScore": 0.8,
                                "resolutions": [
                                    { "resolutionKind": "NumberResolution", "numberKind": "Integer", "value": 2 }
                                ]
                            }
                        ]
                    }
                }
            }"#,
        );

        assert_eq!(result.intent, "Ordering");
        assert_eq!(result.score, Some(0.93));
        assert_eq!(
            result.entity("Pizza").unwrap()[0].as_text().as_deref(),
            Some("Margherita")
        );
        let quantity = &result.entity("Quantity").unwrap()[0];
        assert_eq!(quantity.value, serde_json::json!(2));
        assert_eq!(quantity.confidence, 0.8);
    }

    #[test]
    fn test_unresolved_entity_falls_back_to_text() {
        let result = parse(
            r#"{ "result": { "prediction": {
                "topIntent": "None",
                "intents": [],
                "entities": [ { "category": "Pizza", "text": "calzone" } ]
            } } }"#,
        );
        let name = &result.entity("Pizza").unwrap()[0];
        assert_eq!(name.value, serde_json::json!("calzone"));
        assert_eq!(name.confidence, 1.0);
    }

    #[test]
    fn test_request_body() {
        let classifier = CluClassifier::new(
            "https://example.cognitiveservices.azure.com/",
            "key",
            "pizza",
            "production",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            classifier.url,
            "https://example.cognitiveservices.azure.com/language/:analyze-conversations"
        );

        let body = classifier.request_body("one funghi");
        assert_eq!(body["analysisInput"]["conversationItem"]["text"], "one funghi");
        assert_eq!(body["parameters"]["projectName"], "pizza");
        assert_eq!(body["parameters"]["deploymentName"], "production");
    }
}
