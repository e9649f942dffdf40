//! Fact fixtures written as TOML rows of `[entity, attribute, value]`.

use core_types::{Fact, Value};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactFixture {
    pub facts: Vec<FactRow>,
}

#[derive(Debug, Deserialize)]
pub struct FactRow(pub Value, pub String, pub Value);

impl FactFixture {
    pub fn into_facts(self) -> Vec<Fact> {
        self.facts
            .into_iter()
            .map(|FactRow(entity, attribute, value)| Fact::new(entity, &attribute, value))
            .collect()
    }
}

pub fn facts_from_toml(src: &str) -> Result<Vec<Fact>, toml::de::Error> {
    Ok(toml::from_str::<FactFixture>(src)?.into_facts())
}
