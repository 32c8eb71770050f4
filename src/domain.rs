use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::HiriseError;
use crate::url::ArchiveUrl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Psp,
    Esp,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Psp => write!(f, "PSP"),
            Phase::Esp => write!(f, "ESP"),
        }
    }
}

/// A HiRISE observation id, e.g. `ESP_011491_0985`.
///
/// The phase prefix is never stored; it is derived from the orbit number
/// (PSP below orbit 11000, ESP from there on).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservationId {
    orbit: u32,
    target_code: String,
}

impl ObservationId {
    pub const MAX_ORBIT: u32 = 999_999;

    pub fn new(orbit: u32, target_code: &str) -> Result<Self, HiriseError> {
        if orbit > Self::MAX_ORBIT {
            return Err(HiriseError::InvalidOrbit(orbit.to_string()));
        }
        if target_code.chars().count() != 4 {
            return Err(HiriseError::InvalidTargetCode(target_code.to_string()));
        }
        Ok(Self {
            orbit,
            target_code: target_code.to_string(),
        })
    }

    pub fn orbit(&self) -> u32 {
        self.orbit
    }

    pub fn target_code(&self) -> &str {
        &self.target_code
    }

    pub fn phase(&self) -> Phase {
        if self.orbit < 11_000 {
            Phase::Psp
        } else {
            Phase::Esp
        }
    }

    /// The archive's 100-orbit folder bucket, e.g. orbit 11491 lives in
    /// `ORB_011400_011499`.
    pub fn orbit_bucket(&self) -> String {
        let lower = self.orbit / 100 * 100;
        format!("ORB_{:06}_{:06}", lower, lower + 99)
    }

    /// `{phase}/{orbit_bucket}/{obsid}`, the prefix shared by every product
    /// path under the archive root.
    pub fn storage_path_stem(&self) -> String {
        format!("{}/{}/{}", self.phase(), self.orbit_bucket(), self)
    }

    pub fn with_kind(&self, kind: ProductKind) -> ProductId {
        ProductId {
            observation: self.clone(),
            kind,
        }
    }
}

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:06}_{}", self.phase(), self.orbit, self.target_code)
    }
}

impl FromStr for ObservationId {
    type Err = HiriseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = value.trim().split('_').collect();
        if tokens.len() != 3 {
            return Err(HiriseError::MalformedIdentifier(value.to_string()));
        }
        let orbit: u32 = tokens[1]
            .parse()
            .map_err(|_| HiriseError::InvalidOrbit(tokens[1].to_string()))?;
        Self::new(orbit, tokens[2])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductKind {
    Red,
    Bg,
    Ir,
    Color,
    Irb,
    Mirb,
    Mrgb,
    Rgb,
}

impl ProductKind {
    pub const ALL: [ProductKind; 8] = [
        ProductKind::Red,
        ProductKind::Bg,
        ProductKind::Ir,
        ProductKind::Color,
        ProductKind::Irb,
        ProductKind::Mirb,
        ProductKind::Mrgb,
        ProductKind::Rgb,
    ];
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProductKind::Red => "RED",
            ProductKind::Bg => "BG",
            ProductKind::Ir => "IR",
            ProductKind::Color => "COLOR",
            ProductKind::Irb => "IRB",
            ProductKind::Mirb => "MIRB",
            ProductKind::Mrgb => "MRGB",
            ProductKind::Rgb => "RGB",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ProductKind {
    type Err = HiriseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "RED" => Ok(ProductKind::Red),
            "BG" => Ok(ProductKind::Bg),
            "IR" => Ok(ProductKind::Ir),
            "COLOR" => Ok(ProductKind::Color),
            "IRB" => Ok(ProductKind::Irb),
            "MIRB" => Ok(ProductKind::Mirb),
            "MRGB" => Ok(ProductKind::Mrgb),
            "RGB" => Ok(ProductKind::Rgb),
            _ => Err(HiriseError::InvalidKind(value.to_string())),
        }
    }
}

/// The published RDR/EXTRAS artifacts derivable from a product id. Each
/// variant maps to one named path accessor on [`ProductId`]; which kinds
/// support which artifact is enforced there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Artifact {
    Label,
    Image,
    NomapImage,
    Quicklook,
    AnnotatedBrowse,
    Browse,
    Thumbnail,
    NomapThumbnail,
    NomapBrowse,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Artifact::Label => "label",
            Artifact::Image => "image",
            Artifact::NomapImage => "nomap-image",
            Artifact::Quicklook => "quicklook",
            Artifact::AnnotatedBrowse => "annotated-browse",
            Artifact::Browse => "browse",
            Artifact::Thumbnail => "thumbnail",
            Artifact::NomapThumbnail => "nomap-thumbnail",
            Artifact::NomapBrowse => "nomap-browse",
        };
        write!(f, "{name}")
    }
}

/// A HiRISE RDR product id, e.g. `ESP_011491_0985_RED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductId {
    observation: ObservationId,
    kind: ProductKind,
}

impl ProductId {
    pub fn new(observation: ObservationId, kind: ProductKind) -> Self {
        Self { observation, kind }
    }

    pub fn observation(&self) -> &ObservationId {
        &self.observation
    }

    pub fn kind(&self) -> ProductKind {
        self.kind
    }

    pub fn storage_stem(&self) -> String {
        format!("{}/{}", self.observation.storage_path_stem(), self)
    }

    pub fn edr_storage_stem(&self) -> String {
        format!("EDR/{}", self.storage_stem())
    }

    pub fn label_filename(&self) -> String {
        format!("{self}.LBL")
    }

    pub fn image_filename(&self) -> String {
        format!("{self}.JP2")
    }

    pub fn label_path(&self) -> String {
        format!("RDR/{}.LBL", self.storage_stem())
    }

    /// The official JP2 image. RED and COLOR live directly under RDR;
    /// everything else is filed under RDR/EXTRAS, and IRB only exists as the
    /// unprojected NOMAP rendition.
    pub fn image_path(&self) -> String {
        let prefix = match self.kind {
            ProductKind::Red | ProductKind::Color => "RDR/",
            _ => "RDR/EXTRAS/",
        };
        let postfix = match self.kind {
            ProductKind::Irb => ".NOMAP",
            _ => "",
        };
        format!("{prefix}{}{postfix}.JP2", self.storage_stem())
    }

    pub fn nomap_image_path(&self) -> Result<String, HiriseError> {
        self.require_kind(
            "NOMAP image",
            &[ProductKind::Red, ProductKind::Irb, ProductKind::Rgb],
        )?;
        Ok(format!("RDR/EXTRAS/{}.NOMAP.JP2", self.storage_stem()))
    }

    pub fn quicklook_path(&self) -> Result<String, HiriseError> {
        self.require_kind("quicklook", &[ProductKind::Color, ProductKind::Red])?;
        Ok(format!("EXTRAS/RDR/{}.QLOOK.JP2", self.storage_stem()))
    }

    pub fn annotated_browse_path(&self) -> Result<String, HiriseError> {
        self.require_kind(
            "annotated browse image",
            &[
                ProductKind::Color,
                ProductKind::Mirb,
                ProductKind::Mrgb,
                ProductKind::Red,
            ],
        )?;
        Ok(format!("EXTRAS/RDR/{}.abrowse.jpg", self.storage_stem()))
    }

    pub fn browse_path(&self) -> Result<String, HiriseError> {
        self.require_kind(
            "browse image",
            &[
                ProductKind::Color,
                ProductKind::Mirb,
                ProductKind::Mrgb,
                ProductKind::Red,
                ProductKind::Irb,
                ProductKind::Rgb,
            ],
        )?;
        Ok(format!(
            "EXTRAS/RDR/{}{}.browse.jpg",
            self.storage_stem(),
            self.nomap_inset()
        ))
    }

    pub fn thumbnail_path(&self) -> Result<String, HiriseError> {
        if matches!(self.kind, ProductKind::Bg | ProductKind::Ir) {
            return Err(HiriseError::UnsupportedArtifact {
                artifact: "thumbnail",
                kind: self.kind.to_string(),
            });
        }
        Ok(format!(
            "EXTRAS/RDR/{}{}.thumb.jpg",
            self.storage_stem(),
            self.nomap_inset()
        ))
    }

    pub fn nomap_thumbnail_path(&self) -> Result<String, HiriseError> {
        self.require_kind(
            "NOMAP thumbnail",
            &[ProductKind::Red, ProductKind::Irb, ProductKind::Rgb],
        )?;
        Ok(format!("EXTRAS/RDR/{}.NOMAP.thumb.jpg", self.storage_stem()))
    }

    pub fn nomap_browse_path(&self) -> Result<String, HiriseError> {
        self.require_kind(
            "NOMAP browse image",
            &[ProductKind::Red, ProductKind::Irb, ProductKind::Rgb],
        )?;
        Ok(format!("EXTRAS/RDR/{}.NOMAP.browse.jpg", self.storage_stem()))
    }

    pub fn artifact_path(&self, artifact: Artifact) -> Result<String, HiriseError> {
        match artifact {
            Artifact::Label => Ok(self.label_path()),
            Artifact::Image => Ok(self.image_path()),
            Artifact::NomapImage => self.nomap_image_path(),
            Artifact::Quicklook => self.quicklook_path(),
            Artifact::AnnotatedBrowse => self.annotated_browse_path(),
            Artifact::Browse => self.browse_path(),
            Artifact::Thumbnail => self.thumbnail_path(),
            Artifact::NomapThumbnail => self.nomap_thumbnail_path(),
            Artifact::NomapBrowse => self.nomap_browse_path(),
        }
    }

    pub fn artifact_url(&self, artifact: Artifact) -> Result<String, HiriseError> {
        Ok(ArchiveUrl::new(&self.artifact_path(artifact)?)?.url())
    }

    pub fn label_url(&self) -> Result<String, HiriseError> {
        self.artifact_url(Artifact::Label)
    }

    fn nomap_inset(&self) -> &'static str {
        match self.kind {
            ProductKind::Irb | ProductKind::Rgb => ".NOMAP",
            _ => "",
        }
    }

    fn require_kind(
        &self,
        artifact: &'static str,
        legal: &[ProductKind],
    ) -> Result<(), HiriseError> {
        if legal.contains(&self.kind) {
            Ok(())
        } else {
            Err(HiriseError::UnsupportedArtifact {
                artifact,
                kind: self.kind.to_string(),
            })
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.observation, self.kind)
    }
}

impl FromStr for ProductId {
    type Err = HiriseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = value.trim().split('_').collect();
        if tokens.len() != 4 {
            return Err(HiriseError::MalformedIdentifier(value.to_string()));
        }
        let observation: ObservationId = tokens[..3].join("_").parse()?;
        let kind: ProductKind = tokens[3].parse()?;
        Ok(Self { observation, kind })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ccd {
    Red0,
    Red1,
    Red2,
    Red3,
    Red4,
    Red5,
    Red6,
    Red7,
    Red8,
    Red9,
    Ir10,
    Ir11,
    Bg12,
    Bg13,
}

impl Ccd {
    pub const ALL: [Ccd; 14] = [
        Ccd::Red0,
        Ccd::Red1,
        Ccd::Red2,
        Ccd::Red3,
        Ccd::Red4,
        Ccd::Red5,
        Ccd::Red6,
        Ccd::Red7,
        Ccd::Red8,
        Ccd::Red9,
        Ccd::Ir10,
        Ccd::Ir11,
        Ccd::Bg12,
        Ccd::Bg13,
    ];

    /// The color prefix of the detector, which is also the kind of the RDR
    /// product assembled from it.
    pub fn kind(&self) -> ProductKind {
        match self {
            Ccd::Red0
            | Ccd::Red1
            | Ccd::Red2
            | Ccd::Red3
            | Ccd::Red4
            | Ccd::Red5
            | Ccd::Red6
            | Ccd::Red7
            | Ccd::Red8
            | Ccd::Red9 => ProductKind::Red,
            Ccd::Ir10 | Ccd::Ir11 => ProductKind::Ir,
            Ccd::Bg12 | Ccd::Bg13 => ProductKind::Bg,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Ccd::Red0 => 0,
            Ccd::Red1 => 1,
            Ccd::Red2 => 2,
            Ccd::Red3 => 3,
            Ccd::Red4 => 4,
            Ccd::Red5 => 5,
            Ccd::Red6 => 6,
            Ccd::Red7 => 7,
            Ccd::Red8 => 8,
            Ccd::Red9 => 9,
            Ccd::Ir10 => 10,
            Ccd::Ir11 => 11,
            Ccd::Bg12 => 12,
            Ccd::Bg13 => 13,
        }
    }
}

impl fmt::Display for Ccd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind(), self.number())
    }
}

impl FromStr for Ccd {
    type Err = HiriseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ccd::ALL
            .into_iter()
            .find(|ccd| ccd.to_string() == value)
            .ok_or_else(|| HiriseError::InvalidCcd(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Zero,
    One,
}

impl Channel {
    pub fn as_u8(&self) -> u8 {
        match self {
            Channel::Zero => 0,
            Channel::One => 1,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl FromStr for Channel {
    type Err = HiriseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "0" => Ok(Channel::Zero),
            "1" => Ok(Channel::One),
            _ => Err(HiriseError::InvalidChannel(value.to_string())),
        }
    }
}

/// A raw per-detector readout id, e.g. `PSP_003092_0985_RED4_0`.
///
/// These live in the archive's EDR tree, not the processed RDR tree. The
/// embedded product kind is always the CCD's color prefix; `new` and
/// `with_ccd` keep the two consistent by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProductId {
    observation: ObservationId,
    ccd: Ccd,
    channel: Channel,
}

impl SourceProductId {
    pub fn new(observation: ObservationId, ccd: Ccd, channel: Channel) -> Self {
        Self {
            observation,
            ccd,
            channel,
        }
    }

    pub fn observation(&self) -> &ObservationId {
        &self.observation
    }

    pub fn ccd(&self) -> Ccd {
        self.ccd
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn product_id(&self) -> ProductId {
        self.observation.with_kind(self.ccd.kind())
    }

    pub fn with_ccd(&self, ccd: Ccd) -> Self {
        Self {
            observation: self.observation.clone(),
            ccd,
            channel: self.channel,
        }
    }

    pub fn filename(&self) -> String {
        format!("{self}.IMG")
    }

    pub fn raw_storage_path(&self) -> String {
        format!("EDR/{}/{}", self.observation.storage_path_stem(), self.filename())
    }

    pub fn url(&self) -> Result<String, HiriseError> {
        Ok(ArchiveUrl::new(&self.raw_storage_path())?.url())
    }

    /// Filename of the ISIS mosaic stitched from both channels of this CCD.
    pub fn stitched_cube_name(&self) -> String {
        format!("{}_{}.cub", self.observation, self.ccd)
    }
}

impl fmt::Display for SourceProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.observation, self.ccd, self.channel)
    }
}

impl FromStr for SourceProductId {
    type Err = HiriseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = value.trim().split('_').collect();
        if tokens.len() != 5 {
            return Err(HiriseError::MalformedIdentifier(value.to_string()));
        }
        let observation: ObservationId = tokens[..3].join("_").parse()?;
        let ccd: Ccd = tokens[3].parse()?;
        let channel: Channel = tokens[4].parse()?;
        Ok(Self {
            observation,
            ccd,
            channel,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_observation_id() {
        let obsid: ObservationId = "ESP_011491_0985".parse().unwrap();
        assert_eq!(obsid.orbit(), 11491);
        assert_eq!(obsid.target_code(), "0985");
        assert_eq!(obsid.to_string(), "ESP_011491_0985");
    }

    #[test]
    fn observation_id_wrong_token_count() {
        let err = "ESP_011491".parse::<ObservationId>().unwrap_err();
        assert_matches!(err, HiriseError::MalformedIdentifier(_));
    }

    #[test]
    fn phase_boundary() {
        let psp = ObservationId::new(10_999, "0985").unwrap();
        assert_eq!(psp.phase(), Phase::Psp);
        let esp = ObservationId::new(11_000, "0985").unwrap();
        assert_eq!(esp.phase(), Phase::Esp);
    }

    #[test]
    fn orbit_bucket() {
        let obsid = ObservationId::new(11_491, "0985").unwrap();
        assert_eq!(obsid.orbit_bucket(), "ORB_011400_011499");
    }

    #[test]
    fn product_label_path() {
        let pid: ProductId = "ESP_011491_0985_RED".parse().unwrap();
        assert_eq!(
            pid.label_path(),
            "RDR/ESP/ORB_011400_011499/ESP_011491_0985/ESP_011491_0985_RED.LBL"
        );
    }

    #[test]
    fn quicklook_rejected_for_bg() {
        let pid: ProductId = "ESP_011491_0985_BG".parse().unwrap();
        let err = pid.quicklook_path().unwrap_err();
        assert_matches!(err, HiriseError::UnsupportedArtifact { .. });
    }

    #[test]
    fn parse_source_product_id() {
        let spid: SourceProductId = "PSP_003092_0985_RED4_0".parse().unwrap();
        assert_eq!(spid.ccd(), Ccd::Red4);
        assert_eq!(spid.channel(), Channel::Zero);
        assert_eq!(spid.product_id().kind(), ProductKind::Red);
        assert_eq!(spid.to_string(), "PSP_003092_0985_RED4_0");
    }
}
