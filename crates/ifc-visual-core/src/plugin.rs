// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host plugin contract

use crate::settings::{EnumerateOptions, UpdateOptions, VisualObjectInstance};
use serde::Serialize;

/// Registry key of the visual
pub const PLUGIN_NAME: &str = "pbiifcAC7183C660094BBFBAF6377A0971F532";
/// Name shown in the host UI
pub const DISPLAY_NAME: &str = "pbiifc";
/// Host API version the visual targets
pub const API_VERSION: &str = "3.8.0";

/// Static part of the registry entry. The web adapter adds `create`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    pub name: String,
    pub display_name: String,
    pub class: String,
    pub api_version: String,
    pub custom: bool,
}

impl Default for PluginDescriptor {
    fn default() -> Self {
        Self {
            name: PLUGIN_NAME.to_string(),
            display_name: DISPLAY_NAME.to_string(),
            class: "Visual".to_string(),
            api_version: API_VERSION.to_string(),
            custom: true,
        }
    }
}

/// Calls the host makes on a constructed visual
pub trait HostVisual {
    /// Data or view change
    fn update(&mut self, options: &UpdateOptions);

    /// Property-panel instances for one object
    fn enumerate_object_instances(&self, options: &EnumerateOptions) -> Vec<VisualObjectInstance>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_shape() {
        let value = serde_json::to_value(PluginDescriptor::default()).unwrap();
        assert_eq!(value["name"], "pbiifcAC7183C660094BBFBAF6377A0971F532");
        assert_eq!(value["displayName"], "pbiifc");
        assert_eq!(value["class"], "Visual");
        assert_eq!(value["apiVersion"], "3.8.0");
        assert_eq!(value["custom"], true);
    }
}
