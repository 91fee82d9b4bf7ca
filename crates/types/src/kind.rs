//! Resolvable kinds

use pkgbridge_errors::OpsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of a resolvable tracked by the engine pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvableKind {
    Package,
    Patch,
    Pattern,
    Product,
    Selection,
    SrcPackage,
}

impl ResolvableKind {
    /// Kinds visited by a bulk reset, in reset order.
    pub const RESETTABLE: [Self; 5] = [
        Self::Package,
        Self::Pattern,
        Self::Patch,
        Self::Product,
        Self::SrcPackage,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Patch => "patch",
            Self::Pattern => "pattern",
            Self::Product => "product",
            Self::Selection => "selection",
            Self::SrcPackage => "srcpackage",
        }
    }

    /// Classification used in commit reports: product, pattern and patch
    /// keep their name, everything else reports as package.
    #[must_use]
    pub fn report_class(self) -> &'static str {
        match self {
            Self::Product | Self::Pattern | Self::Patch => self.as_str(),
            _ => "package",
        }
    }
}

impl fmt::Display for ResolvableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolvableKind {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "package" => Ok(Self::Package),
            "patch" => Ok(Self::Patch),
            "pattern" => Ok(Self::Pattern),
            "product" => Ok(Self::Product),
            "selection" => Ok(Self::Selection),
            "srcpackage" => Ok(Self::SrcPackage),
            other => Err(OpsError::UnknownKind {
                kind: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_class_defaults_to_package() {
        assert_eq!(ResolvableKind::Product.report_class(), "product");
        assert_eq!(ResolvableKind::Pattern.report_class(), "pattern");
        assert_eq!(ResolvableKind::Patch.report_class(), "patch");
        assert_eq!(ResolvableKind::Selection.report_class(), "package");
        assert_eq!(ResolvableKind::SrcPackage.report_class(), "package");
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert_eq!(
            "pattern".parse::<ResolvableKind>().unwrap(),
            ResolvableKind::Pattern
        );
        assert!(matches!(
            "bundle".parse::<ResolvableKind>(),
            Err(OpsError::UnknownKind { .. })
        ));
    }
}
