use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{Ccd, Channel, ObservationId, ProductId, ProductKind, SourceProductId};
use crate::error::HiriseError;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub data_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub labels: Vec<LabelEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SourceEntry {
    Shorthand(String),
    Detailed(SourceEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SourceEntryObject {
    pub observation: String,
    pub ccd: Ccd,
    pub channel: u8,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LabelEntry {
    Shorthand(String),
    Detailed(LabelEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LabelEntryObject {
    pub observation: String,
    #[serde(default)]
    pub kind: Option<ProductKind>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub data_root: Option<Utf8PathBuf>,
    pub sources: Vec<SourceProductId>,
    pub labels: Vec<ProductId>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, HiriseError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("hirise-dl.json"),
        };

        if path.is_none() && !config_path.exists() {
            return Err(HiriseError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| HiriseError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| HiriseError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, HiriseError> {
        let schema_version = config.schema_version.unwrap_or(1);
        let data_root = config.data_root.map(Utf8PathBuf::from);

        let sources = config
            .sources
            .into_iter()
            .map(|entry| match entry {
                SourceEntry::Shorthand(value) => value.parse(),
                SourceEntry::Detailed(obj) => {
                    let observation: ObservationId = obj.observation.parse()?;
                    let channel: Channel = obj.channel.to_string().parse()?;
                    Ok(SourceProductId::new(observation, obj.ccd, channel))
                }
            })
            .collect::<Result<Vec<_>, HiriseError>>()?;

        let labels = config
            .labels
            .into_iter()
            .map(|entry| match entry {
                LabelEntry::Shorthand(value) => value.parse(),
                LabelEntry::Detailed(obj) => {
                    let observation: ObservationId = obj.observation.parse()?;
                    Ok(observation.with_kind(obj.kind.unwrap_or(ProductKind::Red)))
                }
            })
            .collect::<Result<Vec<_>, HiriseError>>()?;

        Ok(ResolvedConfig {
            schema_version,
            data_root,
            sources,
            labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config_shorthand() {
        let config = Config {
            schema_version: None,
            data_root: None,
            sources: vec![SourceEntry::Shorthand("PSP_003092_0985_RED4_0".to_string())],
            labels: vec![LabelEntry::Shorthand("ESP_011491_0985_COLOR".to_string())],
        };

        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.sources.len(), 1);
        assert_eq!(resolved.labels.len(), 1);
        assert_eq!(resolved.labels[0].kind(), ProductKind::Color);
    }
}
