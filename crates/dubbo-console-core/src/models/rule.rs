use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The governance rule families the registry manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    ConditionRoute,
    TagRoute,
    Override,
    Access,
    Weight,
    Balancing,
}

impl RuleKind {
    pub const ALL: [RuleKind; 6] = [
        RuleKind::ConditionRoute,
        RuleKind::TagRoute,
        RuleKind::Override,
        RuleKind::Access,
        RuleKind::Weight,
        RuleKind::Balancing,
    ];

    /// Path of this rule family below `/rules`
    pub fn path(&self) -> &'static str {
        match self {
            RuleKind::ConditionRoute => "/rules/route/condition",
            RuleKind::TagRoute => "/rules/route/tag",
            RuleKind::Override => "/rules/override",
            RuleKind::Access => "/rules/access",
            RuleKind::Weight => "/rules/weight",
            RuleKind::Balancing => "/rules/balancing",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::ConditionRoute => "condition-route",
            RuleKind::TagRoute => "tag-route",
            RuleKind::Override => "override",
            RuleKind::Access => "access",
            RuleKind::Weight => "weight",
            RuleKind::Balancing => "balancing",
        }
    }

    /// Whether the family supports the enable/disable switches
    pub fn can_toggle(&self) -> bool {
        matches!(self, RuleKind::ConditionRoute | RuleKind::TagRoute | RuleKind::Override)
    }
}

/// Filter for listing rules. The registry wants either an application or
/// a service; version and group narrow a service lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_group: Option<String>,
}

impl RuleQuery {
    pub fn application(name: &str) -> Self {
        Self {
            application: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn service(name: &str) -> Self {
        Self {
            service: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.application.is_none() && self.service.is_none()
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| format!("unknown rule kind '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_kind_from_str() {
        assert_eq!("condition-route".parse::<RuleKind>(), Ok(RuleKind::ConditionRoute));
        assert_eq!("TAG_ROUTE".parse::<RuleKind>(), Ok(RuleKind::TagRoute));
        assert!("mesh".parse::<RuleKind>().is_err());
    }

    #[test]
    fn test_rule_query_serializes_camel_case() {
        let query = RuleQuery {
            service_version: Some("1.0.0".into()),
            ..RuleQuery::service("a.B")
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, serde_json::json!({"service": "a.B", "serviceVersion": "1.0.0"}));
        assert!(RuleQuery::default().is_empty());
    }

    #[test]
    fn test_rule_kind_paths() {
        assert_eq!(RuleKind::ConditionRoute.path(), "/rules/route/condition");
        assert_eq!(RuleKind::Balancing.path(), "/rules/balancing");
        assert!(RuleKind::Override.can_toggle());
        assert!(!RuleKind::Weight.can_toggle());
    }
}
