use serde::{Deserialize, Serialize};

/// One row of a service search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub service: String,
    #[serde(default, alias = "application")]
    pub app_name: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl ServiceSummary {
    /// `group/service:version`, the registry's own service key format
    pub fn key(&self) -> String {
        let mut key = String::new();
        if let Some(group) = self.group.as_deref().filter(|g| !g.is_empty()) {
            key.push_str(group);
            key.push('/');
        }
        key.push_str(&self.service);
        if let Some(version) = self.version.as_deref().filter(|v| !v.is_empty()) {
            key.push(':');
            key.push_str(version);
        }
        key
    }
}

/// Providers, consumers and metadata of one service. Kept loosely typed:
/// the console only displays it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    #[serde(default)]
    pub providers: Vec<serde_json::Value>,
    #[serde(default)]
    pub consumers: Vec<serde_json::Value>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub application: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_summary() {
        let json = r#"{"service":"org.apache.dubbo.demo.DemoService","appName":"demo-provider","group":"g1","version":"1.0.0","registrySource":"INTERFACE"}"#;
        let summary: ServiceSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.app_name.as_deref(), Some("demo-provider"));
        assert_eq!(summary.key(), "g1/org.apache.dubbo.demo.DemoService:1.0.0");
    }

    #[test]
    fn test_key_without_group_or_version() {
        let summary: ServiceSummary =
            serde_json::from_str(r#"{"service":"a.B","group":"","version":null}"#).unwrap();
        assert_eq!(summary.key(), "a.B");
    }
}
