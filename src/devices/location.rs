// MIT License - Copyright (c) 2026 Peter Wright
// Locations under the account

use super::panel::Panel;

#[derive(Debug, Clone)]
pub struct Location {
    pub id: i64,
    /// Sanitized display name.
    pub name: String,
    pub panels: Vec<Panel>,
}

impl Location {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            panels: Vec::new(),
        }
    }

    /// Return the panel with the given address, inserting `panel` first if
    /// none exists. The flag is true when the panel was inserted.
    pub fn panel_or_insert(&mut self, panel: Panel) -> (&mut Panel, bool) {
        match self.panels.iter().position(|p| p.address == panel.address) {
            Some(idx) => (&mut self.panels[idx], false),
            None => {
                self.panels.push(panel);
                let idx = self.panels.len() - 1;
                (&mut self.panels[idx], true)
            }
        }
    }
}
