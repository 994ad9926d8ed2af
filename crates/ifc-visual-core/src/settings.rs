// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Settings bridge between the host property panel and the visual
//!
//! The host pushes data views on every update; the bridge parses the first
//! one into a typed [`VisualSettings`] snapshot and hands it back, formatted
//! as property-panel instances, when the host enumerates objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the only object the panel knows about
pub const DATA_POINT: &str = "dataPoint";

/// Options the host passes to `update`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateOptions {
    pub data_views: Vec<DataView>,
}

/// One data view. Only its metadata objects are consumed.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DataView {
    pub metadata: DataViewMetadata,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DataViewMetadata {
    /// Object name -> property map
    pub objects: Option<Map<String, Value>>,
}

/// Options the host passes to `enumerateObjectInstances`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumerateOptions {
    pub object_name: String,
}

/// Property-panel entry returned to the host
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualObjectInstance {
    pub object_name: String,
    /// Always present (as `null`) for non-data-bound objects
    pub selector: Option<Value>,
    pub properties: Map<String, Value>,
}

/// Properties of the `dataPoint` object
#[derive(Clone, Debug, PartialEq)]
pub struct DataPointSettings {
    pub default_color: String,
    pub show_all_data_points: bool,
    pub fill: String,
    pub fill_rule: String,
    pub font_size: f64,
}

impl Default for DataPointSettings {
    fn default() -> Self {
        Self {
            default_color: String::new(),
            show_all_data_points: true,
            fill: String::new(),
            fill_rule: String::new(),
            font_size: 12.0,
        }
    }
}

impl DataPointSettings {
    fn apply(&mut self, properties: &Map<String, Value>) {
        for (key, value) in properties {
            let accepted = match key.as_str() {
                "defaultColor" => set_color(&mut self.default_color, value),
                "showAllDataPoints" => value.as_bool().map(|v| self.show_all_data_points = v).is_some(),
                "fill" => set_color(&mut self.fill, value),
                "fillRule" => set_color(&mut self.fill_rule, value),
                "fontSize" => value.as_f64().map(|v| self.font_size = v).is_some(),
                _ => {
                    log::debug!("[Settings] Ignoring unknown property {}.{}", DATA_POINT, key);
                    continue;
                }
            };
            if !accepted {
                log::debug!(
                    "[Settings] Ignoring {}.{} with unexpected value {}",
                    DATA_POINT,
                    key,
                    value
                );
            }
        }
    }

    fn to_properties(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert("defaultColor".into(), Value::from(self.default_color.clone()));
        properties.insert("showAllDataPoints".into(), Value::from(self.show_all_data_points));
        properties.insert("fill".into(), Value::from(self.fill.clone()));
        properties.insert("fillRule".into(), Value::from(self.fill_rule.clone()));
        properties.insert("fontSize".into(), Value::from(self.font_size));
        properties
    }
}

/// Typed settings snapshot
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisualSettings {
    pub data_point: DataPointSettings,
}

impl VisualSettings {
    /// Parse a data view. Anything unrecognized keeps its default.
    pub fn parse(data_view: &DataView) -> Self {
        let mut settings = Self::default();
        let Some(objects) = data_view.metadata.objects.as_ref() else {
            return settings;
        };

        for (name, object) in objects {
            match (name.as_str(), object.as_object()) {
                (DATA_POINT, Some(properties)) => settings.data_point.apply(properties),
                (DATA_POINT, None) => {
                    log::debug!("[Settings] Ignoring {} that is not an object", DATA_POINT)
                }
                _ => log::debug!("[Settings] Ignoring unknown object {}", name),
            }
        }
        settings
    }

    /// Property-panel instances for `object_name`. Unknown names yield none.
    pub fn enumerate(&self, object_name: &str) -> Vec<VisualObjectInstance> {
        match object_name {
            DATA_POINT => vec![VisualObjectInstance {
                object_name: DATA_POINT.to_string(),
                selector: None,
                properties: self.data_point.to_properties(),
            }],
            _ => Vec::new(),
        }
    }
}

/// Retains the most recent settings snapshot
#[derive(Clone, Debug, Default)]
pub struct SettingsBridge {
    current: Option<VisualSettings>,
}

impl SettingsBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot from the first data view. Returns whether a
    /// snapshot was taken; without data views the previous one is kept.
    pub fn update(&mut self, options: &UpdateOptions) -> bool {
        match options.data_views.first() {
            Some(data_view) => {
                self.current = Some(VisualSettings::parse(data_view));
                true
            }
            None => {
                log::debug!("[Settings] Update without data views, keeping current settings");
                false
            }
        }
    }

    /// Snapshot seen by the last update, if any
    pub fn current(&self) -> Option<&VisualSettings> {
        self.current.as_ref()
    }

    pub fn enumerate(&self, options: &EnumerateOptions) -> Vec<VisualObjectInstance> {
        match self.current.as_ref() {
            Some(settings) => settings.enumerate(&options.object_name),
            None => VisualSettings::default().enumerate(&options.object_name),
        }
    }
}

/// Accept a plain string or the host's `{ "solid": { "color": "..." } }` fill shape
fn set_color(slot: &mut String, value: &Value) -> bool {
    let color = value
        .as_str()
        .or_else(|| value.pointer("/solid/color").and_then(Value::as_str));
    match color {
        Some(c) => {
            *slot = c.to_string();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> UpdateOptions {
        serde_json::from_value(value).unwrap()
    }

    fn data_point_request() -> EnumerateOptions {
        EnumerateOptions {
            object_name: DATA_POINT.to_string(),
        }
    }

    #[test]
    fn test_default_fallback_before_update() {
        let bridge = SettingsBridge::new();
        assert!(bridge.current().is_none());

        let instances = bridge.enumerate(&data_point_request());
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].object_name, "dataPoint");
        assert_eq!(instances[0].properties["showAllDataPoints"], json!(true));
        assert_eq!(instances[0].properties["fontSize"], json!(12.0));
        assert_eq!(instances[0].properties["defaultColor"], json!(""));
    }

    #[test]
    fn test_parse_data_point() {
        let mut bridge = SettingsBridge::new();
        let updated = bridge.update(&options(json!({
            "dataViews": [{
                "metadata": {
                    "objects": {
                        "dataPoint": {
                            "defaultColor": { "solid": { "color": "#01B8AA" } },
                            "showAllDataPoints": false,
                            "fill": "#FF0000",
                            "fontSize": 18
                        }
                    }
                }
            }]
        })));
        assert!(updated);

        let data_point = &bridge.current().unwrap().data_point;
        assert_eq!(data_point.default_color, "#01B8AA");
        assert!(!data_point.show_all_data_points);
        assert_eq!(data_point.fill, "#FF0000");
        assert_eq!(data_point.fill_rule, "");
        assert_eq!(data_point.font_size, 18.0);
    }

    #[test]
    fn test_update_without_data_views_keeps_snapshot() {
        let mut bridge = SettingsBridge::new();
        bridge.update(&options(json!({
            "dataViews": [{ "metadata": { "objects": { "dataPoint": { "fontSize": 20 } } } }]
        })));
        let before = bridge.current().cloned();

        assert!(!bridge.update(&options(json!({ "dataViews": [] }))));
        assert!(!bridge.update(&options(json!({}))));
        assert_eq!(bridge.current().cloned(), before);
    }

    #[test]
    fn test_only_first_data_view_used() {
        let mut bridge = SettingsBridge::new();
        bridge.update(&options(json!({
            "dataViews": [
                { "metadata": { "objects": { "dataPoint": { "fontSize": 9 } } } },
                { "metadata": { "objects": { "dataPoint": { "fontSize": 30 } } } }
            ]
        })));
        assert_eq!(bridge.current().unwrap().data_point.font_size, 9.0);
    }

    #[test]
    fn test_enumeration_is_idempotent() {
        let mut bridge = SettingsBridge::new();
        bridge.update(&options(json!({
            "dataViews": [{ "metadata": { "objects": { "dataPoint": { "fill": "#123456" } } } }]
        })));
        let first = bridge.enumerate(&data_point_request());
        let second = bridge.enumerate(&data_point_request());
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_and_mistyped_values_ignored() {
        let settings = VisualSettings::parse(&DataView {
            metadata: DataViewMetadata {
                objects: Some(
                    json!({
                        "legend": { "show": true },
                        "dataPoint": { "fontSize": "big", "bogus": 1, "showAllDataPoints": 0 }
                    })
                    .as_object()
                    .cloned()
                    .unwrap(),
                ),
            },
        });
        assert_eq!(settings, VisualSettings::default());
    }

    #[test]
    fn test_data_view_without_objects_resets_to_defaults() {
        let mut bridge = SettingsBridge::new();
        bridge.update(&options(json!({
            "dataViews": [{ "metadata": { "objects": { "dataPoint": { "fontSize": 20 } } } }]
        })));
        bridge.update(&options(json!({ "dataViews": [{ "metadata": {} }] })));
        assert_eq!(bridge.current(), Some(&VisualSettings::default()));
    }

    #[test]
    fn test_unknown_object_name_yields_nothing() {
        let bridge = SettingsBridge::new();
        let instances = bridge.enumerate(&EnumerateOptions {
            object_name: "legend".to_string(),
        });
        assert!(instances.is_empty());
    }

    #[test]
    fn test_instance_serializes_for_host() {
        let instances = VisualSettings::default().enumerate(DATA_POINT);
        let value = serde_json::to_value(&instances[0]).unwrap();
        assert_eq!(value["objectName"], json!("dataPoint"));
        assert_eq!(value["selector"], Value::Null);
        assert_eq!(value["properties"]["fillRule"], json!(""));
    }
}
