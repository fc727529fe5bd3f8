//! Card templates, the catalog, and live card instances.
//!
//! Catalog entries are keyed by a stable `template_id`. The display
//! `name` is presentation only and never used for lookup.
//! Every instance is a fresh copy of its template: hands never share cards.

use crate::types::{CardInstanceId, Money};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardEffect {
    /// Drop an obstruction on the target tile.
    Barricade,
    /// Freeze every opposing token standing on the target tile.
    Freeze { turns: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTemplate {
    pub template_id: String,
    pub name:        String,
    #[serde(default)]
    pub description: String,
    pub effect:      CardEffect,
    /// BFS radius from the acting player's tile.
    pub range:       u32,
    pub price:       Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInstance {
    pub instance_id: CardInstanceId,
    pub template_id: String,
    pub effect:      CardEffect,
    pub range:       u32,
}

#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    templates:     BTreeMap<String, CardTemplate>,
    next_instance: CardInstanceId,
}

impl CardCatalog {
    pub fn new(templates: impl IntoIterator<Item = CardTemplate>) -> Self {
        Self {
            templates: templates
                .into_iter()
                .map(|t| (t.template_id.clone(), t))
                .collect(),
            next_instance: 1,
        }
    }

    pub fn get(&self, template_id: &str) -> Option<&CardTemplate> {
        self.templates.get(template_id)
    }

    /// Template ids in stable (sorted) order.
    pub fn template_ids(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Mint a fresh instance of a template. None if the id is unknown.
    pub fn instantiate(&mut self, template_id: &str) -> Option<CardInstance> {
        let template = self.templates.get(template_id)?;
        let instance = CardInstance {
            instance_id: self.next_instance,
            template_id: template.template_id.clone(),
            effect:      template.effect,
            range:       template.range,
        };
        self.next_instance += 1;
        Some(instance)
    }
}
