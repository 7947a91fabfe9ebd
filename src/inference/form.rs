//! Record intake: raw form fields, validation, and the view state machine

use super::{CustomerRecord, Prediction};

/// Placeholder entry shown before a category is chosen.
pub const PLACEHOLDER: &str = "— Select —";

pub const GENDER_OPTIONS: &[&str] = &["Male", "Female", "Other"];
pub const SUBSCRIPTION_OPTIONS: &[&str] = &["Basic", "Standard", "Premium"];
pub const CONTRACT_OPTIONS: &[&str] = &["Monthly", "Quarterly", "Annual"];

/// Raw intake fields, exactly as the user typed or selected them.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub age: String,
    pub gender: String,
    pub tenure: String,
    pub usage: String,
    pub support: String,
    pub payment_delay: String,
    pub subscription: String,
    pub contract: String,
    pub total_spend: String,
    pub last_interaction: String,
}

fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn selection(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() || s == PLACEHOLDER {
        None
    } else {
        Some(s.to_string())
    }
}

impl FormInput {
    /// Validate every field, producing a typed record or the display names
    /// of everything still missing, in form order. The model is never
    /// consulted here.
    pub fn validate(&self) -> std::result::Result<CustomerRecord, Vec<String>> {
        let mut missing = Vec::new();

        let age = parse_number(&self.age);
        if age.is_none() {
            missing.push("Age".to_string());
        }
        let gender = selection(&self.gender);
        if gender.is_none() {
            missing.push("Gender".to_string());
        }
        let tenure = parse_number(&self.tenure);
        if tenure.is_none() {
            missing.push("Tenure".to_string());
        }
        let usage = parse_number(&self.usage);
        if usage.is_none() {
            missing.push("Usage".to_string());
        }
        let support = parse_number(&self.support);
        if support.is_none() {
            missing.push("Support".to_string());
        }
        let payment_delay = parse_number(&self.payment_delay);
        if payment_delay.is_none() {
            missing.push("PaymentDelay".to_string());
        }
        let subscription = selection(&self.subscription);
        if subscription.is_none() {
            missing.push("Subscription".to_string());
        }
        let contract = selection(&self.contract);
        if contract.is_none() {
            missing.push("Contract".to_string());
        }
        let total_spend = parse_number(&self.total_spend);
        if total_spend.is_none() {
            missing.push("TotalSpend".to_string());
        }
        let last_interaction = parse_number(&self.last_interaction);
        if last_interaction.is_none() {
            missing.push("LastInteraction".to_string());
        }

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(CustomerRecord {
            age: age.unwrap(),
            gender: gender.unwrap(),
            tenure: tenure.unwrap(),
            usage: usage.unwrap(),
            support: support.unwrap(),
            payment_delay: payment_delay.unwrap(),
            subscription: subscription.unwrap(),
            contract: contract.unwrap(),
            total_spend: total_spend.unwrap(),
            last_interaction: last_interaction.unwrap(),
        })
    }
}

/// The surface's two-state view model.
///
/// Submit with a scored prediction moves to `Result`; reset returns to
/// `Form`. The state value is passed through the rendering loop explicitly
/// rather than living in a global.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Form,
    Result(Prediction),
}

impl ViewState {
    pub fn submit(self, prediction: Prediction) -> ViewState {
        ViewState::Result(prediction)
    }

    pub fn reset(self) -> ViewState {
        ViewState::Form
    }

    pub fn is_form(&self) -> bool {
        matches!(self, ViewState::Form)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::Form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::RiskClass;

    fn filled_form() -> FormInput {
        FormInput {
            age: "32".to_string(),
            gender: "Male".to_string(),
            tenure: "18".to_string(),
            usage: "45".to_string(),
            support: "2".to_string(),
            payment_delay: "0".to_string(),
            subscription: "Standard".to_string(),
            contract: "Monthly".to_string(),
            total_spend: "900".to_string(),
            last_interaction: "7".to_string(),
        }
    }

    #[test]
    fn test_complete_form_validates() {
        let record = filled_form().validate().unwrap();
        assert_eq!(record.age, 32.0);
        assert_eq!(record.contract, "Monthly");
    }

    #[test]
    fn test_placeholder_selection_is_missing() {
        let mut form = filled_form();
        form.gender = PLACEHOLDER.to_string();

        let missing = form.validate().unwrap_err();
        assert_eq!(missing, vec!["Gender".to_string()]);
    }

    #[test]
    fn test_unparsable_number_is_missing() {
        let mut form = filled_form();
        form.age = "thirty-two".to_string();
        form.total_spend = " ".to_string();

        let missing = form.validate().unwrap_err();
        assert_eq!(missing, vec!["Age".to_string(), "TotalSpend".to_string()]);
    }

    #[test]
    fn test_numbers_accept_surrounding_whitespace() {
        let mut form = filled_form();
        form.usage = " 45.5 ".to_string();
        let record = form.validate().unwrap();
        assert_eq!(record.usage, 45.5);
    }

    #[test]
    fn test_view_state_transitions() {
        let prediction = Prediction {
            probability: 0.7,
            threshold: 0.5,
            risk: RiskClass::High,
            confidence: 0.7,
        };

        let state = ViewState::Form;
        let state = state.submit(prediction);
        assert_eq!(state, ViewState::Result(prediction));

        let state = state.reset();
        assert!(state.is_form());
    }
}
