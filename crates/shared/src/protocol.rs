use serde::{Deserialize, Serialize};

/// Body of `POST /predict`. Field names match the service's model schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "Size")]
    pub size: f64,
    #[serde(rename = "Bedrooms")]
    pub bedrooms: i64,
    #[serde(rename = "Age")]
    pub age: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersionResponse {
    pub model_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfoResponse {
    pub message: String,
    pub model_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_request_uses_capitalized_field_names() {
        let request = PredictionRequest {
            size: 1500.0,
            bedrooms: 3,
            age: 10,
        };
        let value = serde_json::to_value(request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({ "Size": 1500.0, "Bedrooms": 3, "Age": 10 })
        );
    }

    #[test]
    fn prediction_response_ignores_extra_fields() {
        let body: PredictionResponse =
            serde_json::from_str(r#"{"predicted_price": 250000.0, "currency": "usd"}"#)
                .expect("decode");
        assert_eq!(body.predicted_price, 250000.0);
    }

    #[test]
    fn model_version_response_requires_version_field() {
        assert!(serde_json::from_str::<ModelVersionResponse>("{}").is_err());
    }
}
