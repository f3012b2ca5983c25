use crate::error::PoolChemError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSignupDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub market: Option<String>,
    pub session: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSignup {
    #[serde(default)]
    pub id: String,
    pub signed_up_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub market: String,
    pub session: String,
}

impl TrainingSignupDraft {
    pub fn validate(&self, at: DateTime<Utc>) -> Result<TrainingSignup, PoolChemError> {
        let field = |value: &Option<String>, label: &str| match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(PoolChemError::Validation(format!("{label} is required"))),
        };

        let name = field(&self.name, "name")?;
        let email = field(&self.email, "email")?;
        if !email.contains('@') {
            return Err(PoolChemError::Validation(format!(
                "'{email}' is not an email address"
            )));
        }

        Ok(TrainingSignup {
            id: String::new(),
            signed_up_at: at,
            name,
            email,
            market: field(&self.market, "market")?,
            session: field(&self.session, "training session")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> TrainingSignupDraft {
        TrainingSignupDraft {
            name: Some("Alex".into()),
            email: Some("alex@example.org".into()),
            market: Some("North".into()),
            session: Some("June 3 AM".into()),
        }
    }

    #[test]
    fn test_valid_signup() {
        let signup = draft().validate(Utc::now()).unwrap();
        assert_eq!(signup.name, "Alex");
        assert!(signup.id.is_empty());
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut d = draft();
        d.email = Some("alex".into());
        assert!(matches!(d.validate(Utc::now()), Err(PoolChemError::Validation(_))));
    }

    #[test]
    fn test_missing_session_rejected() {
        let mut d = draft();
        d.session = None;
        let err = d.validate(Utc::now()).unwrap_err();
        assert!(err.to_string().contains("training session"));
    }
}
