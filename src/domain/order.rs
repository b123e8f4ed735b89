//! Order descriptor and its up-front validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::currency::Country;

/// Fulfillment model for the order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentModel {
    /// Fulfillment by operator: the warehouse stores and ships, so package
    /// dimensions are required.
    #[default]
    Fbo,
    /// Fulfillment by seller: the seller ships, priced via a delivery lookup.
    Fbs,
}

impl FulfillmentModel {
    pub fn name(&self) -> &'static str {
        match self {
            FulfillmentModel::Fbo => "FBO",
            FulfillmentModel::Fbs => "FBS",
        }
    }
}

impl std::str::FromStr for FulfillmentModel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "FBO" => Ok(FulfillmentModel::Fbo),
            "FBS" => Ok(FulfillmentModel::Fbs),
            other => Err(format!("unknown fulfillment model: {other}")),
        }
    }
}

/// Inputs for one cost calculation. Built fresh per calculation and treated
/// as immutable; the engine never persists or mutates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub model: FulfillmentModel,
    pub country: Country,
    pub city: String,
    pub weight_kg: f64,
    pub unit_count: u32,
    pub order_count: u32,
    /// Longest package side; required and positive for FBO, must stay 0 for FBS.
    #[serde(default)]
    pub longest_side_cm: f64,
    #[serde(default)]
    pub storage_days: u32,
    #[serde(default)]
    pub declared_value: f64,
    #[serde(default)]
    pub is_express: bool,
}

impl OrderRequest {
    /// Check every field constraint, collecting all violations so the caller
    /// can surface them together.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        let mut issues = Vec::new();

        if !(self.weight_kg > 0.0) || !self.weight_kg.is_finite() {
            issues.push(FieldIssue::new("weight_kg", "must be a positive number"));
        }
        if self.unit_count == 0 {
            issues.push(FieldIssue::new("unit_count", "must be at least 1"));
        }
        if self.order_count == 0 {
            issues.push(FieldIssue::new("order_count", "must be at least 1"));
        }
        match self.model {
            FulfillmentModel::Fbo => {
                if !(self.longest_side_cm > 0.0) || !self.longest_side_cm.is_finite() {
                    issues.push(FieldIssue::new(
                        "longest_side_cm",
                        "must be a positive number for FBO orders",
                    ));
                }
            }
            FulfillmentModel::Fbs => {
                if self.longest_side_cm != 0.0 {
                    issues.push(FieldIssue::new(
                        "longest_side_cm",
                        "must be 0 for FBS orders",
                    ));
                }
            }
        }
        if !(self.declared_value >= 0.0) || !self.declared_value.is_finite() {
            issues.push(FieldIssue::new("declared_value", "must be 0 or greater"));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(OrderValidationError { issues })
        }
    }
}

/// One offending input field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldIssue {
    fn new(field: &'static str, message: &'static str) -> FieldIssue {
        FieldIssue { field, message }
    }
}

/// All field constraint violations found in one request.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid order request: {}", self.describe())]
pub struct OrderValidationError {
    pub issues: Vec<FieldIssue>,
}

impl OrderValidationError {
    fn describe(&self) -> String {
        self.issues
            .iter()
            .map(|issue| format!("{} {}", issue.field, issue.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
