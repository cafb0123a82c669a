use serde::{ Serialize, Deserialize };

/// Predefined shortcut that answers with a canned message instead of calling the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickAction {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub response: String,
}

impl QuickAction {
    pub fn new(id: &str, label: &str, icon: &str, response: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            response: response.to_string(),
        }
    }
}
