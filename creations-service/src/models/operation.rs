//! Operation classes and how each one is gated.

use serde::{Deserialize, Serialize};

/// How an operation is gated for non-premium callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Counted against the free-tier quota.
    Metered,
    /// Denied outright unless the caller is premium.
    PremiumOnly,
}

/// Every operation the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationClass {
    TextGeneration,
    TitleGeneration,
    ImageGeneration,
    BackgroundRemoval,
    ObjectRemoval,
    ResumeReview,
}

impl OperationClass {
    pub const ALL: [OperationClass; 6] = [
        Self::TextGeneration,
        Self::TitleGeneration,
        Self::ImageGeneration,
        Self::BackgroundRemoval,
        Self::ObjectRemoval,
        Self::ResumeReview,
    ];

    pub fn access(&self) -> Access {
        match self {
            Self::TextGeneration | Self::TitleGeneration => Access::Metered,
            Self::ImageGeneration
            | Self::BackgroundRemoval
            | Self::ObjectRemoval
            | Self::ResumeReview => Access::PremiumOnly,
        }
    }

    /// The `kind` a successful run of this operation is stored under.
    pub fn creation_kind(&self) -> CreationKind {
        match self {
            Self::TextGeneration => CreationKind::Article,
            Self::TitleGeneration => CreationKind::BlogTitle,
            Self::ImageGeneration | Self::BackgroundRemoval | Self::ObjectRemoval => {
                CreationKind::Image
            }
            Self::ResumeReview => CreationKind::ResumeReview,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextGeneration => "text-generation",
            Self::TitleGeneration => "title-generation",
            Self::ImageGeneration => "image-generation",
            Self::BackgroundRemoval => "background-removal",
            Self::ObjectRemoval => "object-removal",
            Self::ResumeReview => "resume-review",
        }
    }
}

impl std::fmt::Display for OperationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored `kind` of a creation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CreationKind {
    Article,
    BlogTitle,
    Image,
    ResumeReview,
}

impl CreationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::BlogTitle => "blog-title",
            Self::Image => "image",
            Self::ResumeReview => "resume-review",
        }
    }
}

impl std::fmt::Display for CreationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
