//! FILENAME: display/src/config.rs
//! PURPOSE: Saved display configuration, as written by the display builder.
//! CONTEXT: Only the parts the core consumes are modeled; renderer settings
//! in the same JSON object are ignored.

use serde::{Deserialize, Serialize};
use cogs::CogCatalog;
use filter_engine::{FilterEntry, SortKey};
use layout_engine::{GridShape, LayoutConfig};
use crate::error::SessionError;

/// The user-facing state a display opens with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayState {
    pub layout: GridShape,
    /// Attributes shown in each panel's label strip, top to bottom.
    pub labels: Vec<String>,
    pub sort: Vec<SortKey>,
    /// Active filters in activation order.
    pub filter: Vec<FilterEntry>,
    /// 1-based.
    pub page_num: usize,
}

impl Default for DisplayState {
    fn default() -> Self {
        DisplayState {
            layout: GridShape::default(),
            labels: Vec::new(),
            sort: Vec::new(),
            filter: Vec::new(),
            page_num: 1,
        }
    }
}

/// One display: its attribute catalog, initial state and geometry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    pub cog_info: CogCatalog,

    #[serde(default)]
    pub state: DisplayState,

    /// Panel height divided by panel width.
    #[serde(default = "default_panel_aspect")]
    pub panel_aspect: f64,

    #[serde(default)]
    pub layout_config: LayoutConfig,
}

fn default_panel_aspect() -> f64 {
    1.0
}

impl DisplayConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SessionError> {
        let config: DisplayConfig = serde_json::from_str(json)?;
        log::debug!(
            target: "SESSION",
            "parsed display config cogs={} filters={} labels={}",
            config.cog_info.len(),
            config.state.filter.len(),
            config.state.labels.len()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filter_engine::{FilterKind, OrderPreference, SortOrder};
    use layout_engine::Arrangement;

    const DISPLAY_JSON: &str = r#"{
        "name": "by_country",
        "cogInfo": [
            {"name": "country", "type": "factor", "desc": "Country name"},
            {"name": "mean_gdp", "type": "numeric", "desc": "Mean GDP"},
            {"name": "panelKey", "type": "panelKey", "desc": "panel key"}
        ],
        "state": {
            "layout": {"nrow": 2, "ncol": 3, "arrange": "col"},
            "labels": ["country"],
            "sort": [{"name": "mean_gdp", "dir": "desc"}],
            "filter": [
                {"name": "country", "type": "select", "value": ["Chile", "Peru"], "orderValue": "id,asc"},
                {"name": "mean_gdp", "type": "range", "value": {"from": 1000}}
            ],
            "pageNum": 2
        },
        "panelAspect": 0.75
    }"#;

    #[test]
    fn test_parses_display_object() {
        let config = DisplayConfig::from_json_str(DISPLAY_JSON).unwrap();
        assert_eq!(config.cog_info.len(), 3);
        assert_eq!(config.state.layout.arrange, Arrangement::Column);
        assert_eq!(config.state.layout.panels_per_page(), 6);
        assert_eq!(config.state.sort[0].direction, SortOrder::Descending);
        assert_eq!(config.state.page_num, 2);
        assert_eq!(config.panel_aspect, 0.75);
        assert_eq!(config.layout_config, LayoutConfig::default());

        let country = &config.state.filter[0];
        assert_eq!(country.order, OrderPreference::ValueAscending);
        assert_eq!(country.kind.selected_values().len(), 2);
        assert!(matches!(
            config.state.filter[1].kind,
            FilterKind::Range { bounds } if bounds.from == Some(1000.0) && bounds.to.is_none()
        ));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = DisplayConfig::from_json_str(r#"{"cogInfo": []}"#).unwrap();
        assert_eq!(config.state, DisplayState::default());
        assert_eq!(config.panel_aspect, 1.0);
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        assert!(matches!(
            DisplayConfig::from_json_str(r#"{"state": {}}"#),
            Err(SessionError::Config(_))
        ));
        let duplicate = r#"{"cogInfo": [{"name": "a", "type": "factor"}, {"name": "a", "type": "factor"}]}"#;
        assert!(matches!(DisplayConfig::from_json_str(duplicate), Err(SessionError::Config(_))));
    }
}
