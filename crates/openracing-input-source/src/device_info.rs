//! Device identity

use serde::{Deserialize, Serialize};

/// An attached input device as reported by the driver layer.
///
/// `instance_guid` is stable for the physical device; `product_guid`
/// identifies the model and may be shared by identical devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub instance_guid: String,
    #[serde(default)]
    pub product_guid: String,
    pub name: String,
}

impl DeviceDescriptor {
    pub fn new(instance_guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            instance_guid: instance_guid.into(),
            product_guid: String::new(),
            name: name.into(),
        }
    }

    pub fn with_product_guid(mut self, product_guid: impl Into<String>) -> Self {
        self.product_guid = product_guid.into();
        self
    }

    /// True if `guid` names this device's instance or product, ignoring braces
    /// and case.
    pub fn matches_guid(&self, guid: &str) -> bool {
        let wanted = normalize_guid(guid);
        if wanted.is_empty() {
            return false;
        }
        normalize_guid(&self.instance_guid) == wanted || normalize_guid(&self.product_guid) == wanted
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.instance_guid
        } else {
            &self.name
        }
    }
}

/// Strip surrounding braces and whitespace and lowercase a GUID.
pub fn normalize_guid(guid: &str) -> String {
    guid.trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .to_ascii_lowercase()
}

/// GUID without braces, case preserved. Used where the text is written out.
pub fn strip_guid_braces(guid: &str) -> &str {
    guid.trim().trim_start_matches('{').trim_end_matches('}')
}
