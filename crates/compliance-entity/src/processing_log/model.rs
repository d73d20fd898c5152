//! Data-processing log entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use compliance_core::error::AppError;
use compliance_core::result::AppResult;

use super::activity::ActivityType;
use super::legal_basis::LegalBasis;

/// An append-only record of one processing event on a subject's data.
///
/// Rows are never updated or deleted once written; `timestamp` is always
/// assigned by the database at insert time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DataProcessingLog {
    /// Store-assigned identifier.
    pub id: i32,
    /// The data subject.
    pub user_id: i32,
    /// Stored activity label (see [`DataProcessingLog::activity`]).
    pub activity_type: String,
    /// Request path that triggered the processing.
    pub endpoint: Option<String>,
    /// HTTP method of the request.
    pub method: Option<String>,
    /// Originating IP address.
    pub ip_address: Option<String>,
    /// User-Agent of the caller.
    pub user_agent: Option<String>,
    /// Stated purpose of the processing.
    pub purpose: Option<String>,
    /// JSON array of the personal-data categories touched.
    pub data_categories: Option<String>,
    /// Stored legal basis label (see [`DataProcessingLog::basis`]).
    pub legal_basis: Option<String>,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// The administrator acting on the subject's behalf, if any.
    pub performed_by_user_id: Option<i32>,
}

impl DataProcessingLog {
    /// Typed activity.
    pub fn activity(&self) -> ActivityType {
        ActivityType::from(self.activity_type.as_str())
    }

    /// Typed legal basis. Fails if the stored label is not a known basis.
    pub fn basis(&self) -> AppResult<Option<LegalBasis>> {
        self.legal_basis
            .as_deref()
            .map(str::parse::<LegalBasis>)
            .transpose()
    }

    /// Decoded data categories; an absent column is an empty list.
    pub fn categories(&self) -> AppResult<Vec<String>> {
        match self.data_categories.as_deref() {
            None | Some("") => Ok(Vec::new()),
            Some(raw) => Ok(serde_json::from_str(raw)?),
        }
    }

    /// Whether someone other than the subject performed the action.
    pub fn is_delegated(&self) -> bool {
        self.performed_by_user_id
            .is_some_and(|actor| actor != self.user_id)
    }
}

/// Data required to append a processing log entry.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDataProcessingLog {
    /// The data subject.
    pub user_id: i32,
    /// What was done.
    #[validate(custom(function = "validate_activity_type"))]
    pub activity_type: ActivityType,
    /// Request path.
    #[validate(length(max = 255))]
    pub endpoint: Option<String>,
    /// HTTP method.
    #[validate(length(max = 10))]
    pub method: Option<String>,
    /// Caller IP address.
    #[validate(length(max = 45))]
    pub ip_address: Option<String>,
    /// Caller User-Agent.
    #[validate(length(max = 255))]
    pub user_agent: Option<String>,
    /// Stated purpose.
    pub purpose: Option<String>,
    /// Personal-data categories touched.
    #[validate(custom(function = "validate_data_categories"))]
    #[serde(default)]
    pub data_categories: Vec<String>,
    /// Legal basis.
    pub legal_basis: Option<LegalBasis>,
    /// Acting administrator.
    pub performed_by_user_id: Option<i32>,
}

impl CreateDataProcessingLog {
    /// Start an entry for `user_id` with every optional field unset.
    pub fn new(user_id: i32, activity_type: impl Into<ActivityType>) -> Self {
        Self {
            user_id,
            activity_type: activity_type.into(),
            endpoint: None,
            method: None,
            ip_address: None,
            user_agent: None,
            purpose: None,
            data_categories: Vec::new(),
            legal_basis: None,
            performed_by_user_id: None,
        }
    }

    /// Attach the request that triggered the processing.
    pub fn with_request(mut self, method: &str, endpoint: &str) -> Self {
        self.method = Some(method.to_uppercase());
        self.endpoint = Some(endpoint.to_string());
        self
    }

    /// Attach caller details.
    pub fn with_client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    /// Attach purpose, categories and legal basis.
    pub fn with_justification(
        mut self,
        purpose: impl Into<String>,
        data_categories: Vec<String>,
        legal_basis: LegalBasis,
    ) -> Self {
        self.purpose = Some(purpose.into());
        self.data_categories = data_categories;
        self.legal_basis = Some(legal_basis);
        self
    }

    /// Record that an administrator acted on the subject's behalf.
    pub fn performed_by(mut self, actor_id: i32) -> Self {
        self.performed_by_user_id = Some(actor_id);
        self
    }

    /// Validate field lengths and labels, mapping failures to [`AppError`].
    pub fn check(&self) -> AppResult<()> {
        self.validate().map_err(|e| {
            AppError::validation(format!("Invalid processing log entry: {e}"))
        })
    }

    /// Serialized form of `data_categories`; `None` when the list is empty.
    pub fn data_categories_json(&self) -> AppResult<Option<String>> {
        if self.data_categories.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_string(&self.data_categories)?))
    }
}

fn validate_activity_type(activity: &ActivityType) -> Result<(), ValidationError> {
    let label = activity.as_str();
    if label.trim().is_empty() {
        return Err(ValidationError::new("activity_type_empty"));
    }
    if label.len() > 50 {
        return Err(ValidationError::new("activity_type_too_long"));
    }
    Ok(())
}

fn validate_data_categories(categories: &[String]) -> Result<(), ValidationError> {
    if categories.iter().any(|c| c.trim().is_empty()) {
        return Err(ValidationError::new("data_category_empty"));
    }
    Ok(())
}
