//! Physical condition assessment for second-hand laptops.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallCondition {
    Excellent,
    #[default]
    Good,
    Poor,
}

/// Scratch and dent severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Minor,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFading {
    None,
    Slight,
    Moderate,
    Severe,
}

/// Screen and keyboard condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCondition {
    Perfect,
    Good,
    MinorIssues,
    MajorIssues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryHealth {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratches: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dents: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_fading: Option<ColorFading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_condition: Option<ComponentCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard_condition: Option<ComponentCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_health: Option<BatteryHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charger_included: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_included: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty_remaining: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaptopCondition {
    pub overall: OverallCondition,
    #[serde(default)]
    pub details: ConditionDetails,
}

impl LaptopCondition {
    /// A fresh assessment with every graded detail derived from `overall`.
    #[must_use]
    pub fn assessed(overall: OverallCondition) -> Self {
        Self::default().with_overall(overall)
    }

    /// Sets the overall grade and re-derives the graded details from it.
    ///
    /// Charger, box, and warranty-remaining are accessory facts, not grades,
    /// and are kept as they were. Details stay editable afterwards.
    #[must_use]
    pub fn with_overall(self, overall: OverallCondition) -> Self {
        let (wear, fading, component, battery) = match overall {
            OverallCondition::Excellent => (
                Severity::None,
                ColorFading::None,
                ComponentCondition::Perfect,
                BatteryHealth::Excellent,
            ),
            OverallCondition::Good => (
                Severity::Minor,
                ColorFading::Slight,
                ComponentCondition::Good,
                BatteryHealth::Good,
            ),
            OverallCondition::Poor => (
                Severity::Moderate,
                ColorFading::Moderate,
                ComponentCondition::MinorIssues,
                BatteryHealth::Fair,
            ),
        };

        Self {
            overall,
            details: ConditionDetails {
                scratches: Some(wear),
                dents: Some(wear),
                color_fading: Some(fading),
                screen_condition: Some(component),
                keyboard_condition: Some(component),
                battery_health: Some(battery),
                ..self.details
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excellent_derives_pristine_details() {
        let condition = LaptopCondition::assessed(OverallCondition::Excellent);
        let d = &condition.details;
        assert_eq!(d.scratches, Some(Severity::None));
        assert_eq!(d.dents, Some(Severity::None));
        assert_eq!(d.color_fading, Some(ColorFading::None));
        assert_eq!(d.screen_condition, Some(ComponentCondition::Perfect));
        assert_eq!(d.keyboard_condition, Some(ComponentCondition::Perfect));
        assert_eq!(d.battery_health, Some(BatteryHealth::Excellent));
    }

    #[test]
    fn good_derives_minor_wear() {
        let d = LaptopCondition::assessed(OverallCondition::Good).details;
        assert_eq!(d.scratches, Some(Severity::Minor));
        assert_eq!(d.color_fading, Some(ColorFading::Slight));
        assert_eq!(d.screen_condition, Some(ComponentCondition::Good));
        assert_eq!(d.battery_health, Some(BatteryHealth::Good));
    }

    #[test]
    fn poor_derives_moderate_wear() {
        let d = LaptopCondition::assessed(OverallCondition::Poor).details;
        assert_eq!(d.dents, Some(Severity::Moderate));
        assert_eq!(d.color_fading, Some(ColorFading::Moderate));
        assert_eq!(d.keyboard_condition, Some(ComponentCondition::MinorIssues));
        assert_eq!(d.battery_health, Some(BatteryHealth::Fair));
    }

    #[test]
    fn changing_overall_keeps_accessory_facts() {
        let mut condition = LaptopCondition::assessed(OverallCondition::Excellent);
        condition.details.charger_included = Some(true);
        condition.details.warranty_remaining = Some("3 months".to_string());
        condition.details.scratches = Some(Severity::Severe);

        let regraded = condition.with_overall(OverallCondition::Good);
        assert_eq!(regraded.overall, OverallCondition::Good);
        assert_eq!(regraded.details.scratches, Some(Severity::Minor));
        assert_eq!(regraded.details.charger_included, Some(true));
        assert_eq!(
            regraded.details.warranty_remaining.as_deref(),
            Some("3 months")
        );
    }

    #[test]
    fn component_condition_serializes_snake_case() {
        let json = serde_json::to_string(&ComponentCondition::MajorIssues).unwrap();
        assert_eq!(json, "\"major_issues\"");
    }
}
