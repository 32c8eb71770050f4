use std::fmt;

use crate::error::HiriseError;

pub const SCHEME: &str = "https";
pub const HOST: &str = "hirise-pds.lpl.arizona.edu";
pub const ARCHIVE_ROOT: &str = "PDS";

/// A fully resolved URL into the HiRISE PDS archive, built from an
/// archive-relative path such as the ones produced by
/// [`ProductId`](crate::domain::ProductId) and
/// [`SourceProductId`](crate::domain::SourceProductId).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveUrl {
    relative_path: String,
}

impl ArchiveUrl {
    pub fn new(relative_path: &str) -> Result<Self, HiriseError> {
        if relative_path.is_empty() {
            return Err(HiriseError::EmptyPath);
        }
        Ok(Self {
            relative_path: relative_path.trim_start_matches('/').to_string(),
        })
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn url(&self) -> String {
        format!("{SCHEME}://{HOST}/{ARCHIVE_ROOT}/{}", self.relative_path)
    }
}

impl fmt::Display for ArchiveUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn build_url() {
        let url = ArchiveUrl::new("RDR/x.LBL").unwrap();
        assert_eq!(url.url(), "https://hirise-pds.lpl.arizona.edu/PDS/RDR/x.LBL");
    }

    #[test]
    fn empty_path_rejected() {
        let err = ArchiveUrl::new("").unwrap_err();
        assert_matches!(err, HiriseError::EmptyPath);
    }
}
