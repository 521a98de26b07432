use std::collections::BTreeMap;

use backdrop_protocol::{LayerSpec, SubsectionId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Key under which a subsection block declares its background.
pub const BACKGROUND_IMAGE_KEY: &str = "background-image";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown section: {0:?}")]
    UnknownSection(String),
}

/// Configuration of one section page, keyed by block name.
///
/// Blocks (`about`, `posts`, `gigs`, `videos`, page text and anything else
/// the site adds) are kept as raw JSON so a malformed block degrades to
/// "no background" instead of failing the whole page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionConfig {
    pub blocks: Map<String, Value>,
}

impl SectionConfig {
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    /// The raw block for a subsection, if present.
    pub fn block(&self, id: SubsectionId) -> Option<&Value> {
        self.blocks.get(id.as_str())
    }
}

/// All section pages of the site, keyed by section name (e.g. `"dubbal"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionsConfig(pub BTreeMap<String, SectionConfig>);

impl SectionsConfig {
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn section(&self, name: &str) -> Result<&SectionConfig, ConfigError> {
        self.0
            .get(name)
            .ok_or_else(|| ConfigError::UnknownSection(name.to_owned()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Background image declared by a subsection block.
///
/// Returns `None` when the block is absent, is not an object, has no
/// `background-image` key, or the value is not a string.
pub fn background_image(config: &SectionConfig, id: SubsectionId) -> Option<&str> {
    config
        .block(id)?
        .as_object()?
        .get(BACKGROUND_IMAGE_KEY)?
        .as_str()
}

/// One layer per subsection with a background image, in canonical order.
pub fn layer_specs(config: &SectionConfig) -> Vec<LayerSpec> {
    SubsectionId::ALL
        .into_iter()
        .filter_map(|id| {
            background_image(config, id).map(|image| LayerSpec {
                id,
                image: image.to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: &str) -> SectionConfig {
        SectionConfig::from_json(json).expect("valid config")
    }

    #[test]
    fn about_background_image() {
        let c = config(r#"{"title": "Test", "about": {"background-image": "about-bg.jpg"}}"#);
        assert_eq!(background_image(&c, SubsectionId::About), Some("about-bg.jpg"));
    }

    #[test]
    fn missing_key_is_none() {
        let c = config(r#"{"title": "Test", "about": {}, "posts": {"description": "x"}}"#);
        assert_eq!(background_image(&c, SubsectionId::About), None);
        assert_eq!(background_image(&c, SubsectionId::Posts), None);
    }

    #[test]
    fn non_object_block_is_none() {
        let c = config(r#"{"title": "Test", "posts": "string", "gigs": null, "videos": [1]}"#);
        assert_eq!(background_image(&c, SubsectionId::Posts), None);
        assert_eq!(background_image(&c, SubsectionId::Gigs), None);
        assert_eq!(background_image(&c, SubsectionId::Videos), None);
    }

    #[test]
    fn absent_block_is_none() {
        let c = config(r#"{"title": "Test", "subtitle": ""}"#);
        for id in SubsectionId::ALL {
            assert_eq!(background_image(&c, id), None);
        }
    }

    #[test]
    fn non_string_value_is_none() {
        let c = config(r#"{"posts": {"background-image": 42}}"#);
        assert_eq!(background_image(&c, SubsectionId::Posts), None);
    }

    #[test]
    fn every_block_can_carry_an_image() {
        let c = config(
            r#"{
                "posts": {"background-image": "posts-bg.jpg"},
                "gigs": {"background-image": "gigs-bg.jpg"},
                "videos": {"background-image": "videos-bg.jpg", "description": "Videos"}
            }"#,
        );
        assert_eq!(background_image(&c, SubsectionId::Posts), Some("posts-bg.jpg"));
        assert_eq!(background_image(&c, SubsectionId::Gigs), Some("gigs-bg.jpg"));
        assert_eq!(background_image(&c, SubsectionId::Videos), Some("videos-bg.jpg"));
    }

    #[test]
    fn specs_follow_canonical_order() {
        let c = config(
            r#"{
                "videos": {"background-image": "v.jpg"},
                "about": {"background-image": "a.jpg", "heading": "Hi"},
                "gigs": {"description": "no image"}
            }"#,
        );
        let specs = layer_specs(&c);
        let ids: Vec<_> = specs.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SubsectionId::About, SubsectionId::Videos]);
        assert_eq!(specs[0].image, "a.jpg");
    }

    #[test]
    fn page_text_is_not_a_layer() {
        let c = config(
            r#"{
                "title": "Dubbal",
                "subtitle": "Dub",
                "hero": {"image": "hero.jpg", "background-image": "ignored.jpg"}
            }"#,
        );
        assert_eq!(c.blocks.len(), 3);
        assert!(layer_specs(&c).is_empty());
        assert!(layer_specs(&config("{}")).is_empty());
    }

    #[test]
    fn non_object_config_is_an_error() {
        assert!(SectionConfig::from_json("[1, 2]").is_err());
    }

    #[test]
    fn sections_lookup() {
        let sections = SectionsConfig::from_json(
            r#"{"dubbal": {"title": "Dubbal"}, "home": {"title": "Home"}}"#,
        )
        .expect("valid sections");
        let home = sections.section("home").expect("home");
        assert_eq!(home.blocks.get("title"), Some(&Value::from("Home")));
        assert!(matches!(
            sections.section("nope"),
            Err(ConfigError::UnknownSection(name)) if name == "nope"
        ));
        assert_eq!(sections.names().collect::<Vec<_>>(), vec!["dubbal", "home"]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = SectionConfig::from_json("{").unwrap_err();
        assert!(err.to_string().starts_with("invalid JSON"));
    }
}
