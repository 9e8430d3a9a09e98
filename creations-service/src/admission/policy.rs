//! Admission decisions for free and premium subscribers.
//!
//! The policy is a pure function of tier, current free usage and operation
//! class. It never touches a store; metering is done separately once the
//! operation has succeeded.

use crate::models::{Access, OperationClass, Tier};

/// Free-tier quota applied when none is configured.
pub const DEFAULT_FREE_USAGE_LIMIT: i32 = 10;

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    PremiumRequired,
    LimitReached,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PremiumRequired => "premium-required",
            Self::LimitReached => "limit-reached",
        }
    }

    /// Message shown to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            Self::PremiumRequired => "This feature is only available for premium subscription",
            Self::LimitReached => "Limit reached. Upgrade to continue.",
        }
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admitted,
    Denied(DenialReason),
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admitted => "admitted",
            Self::Denied(reason) => reason.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    free_usage_limit: i32,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FREE_USAGE_LIMIT)
    }
}

impl AdmissionPolicy {
    pub fn new(free_usage_limit: i32) -> Self {
        Self {
            free_usage_limit: free_usage_limit.max(0),
        }
    }

    pub fn free_usage_limit(&self) -> i32 {
        self.free_usage_limit
    }

    pub fn admit(&self, tier: Tier, usage_count: i32, operation: OperationClass) -> Decision {
        if tier.is_premium() {
            return Decision::Admitted;
        }

        match operation.access() {
            Access::PremiumOnly => Decision::Denied(DenialReason::PremiumRequired),
            Access::Metered if usage_count >= self.free_usage_limit => {
                Decision::Denied(DenialReason::LimitReached)
            }
            Access::Metered => Decision::Admitted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USAGE_SAMPLES: [i32; 7] = [0, 1, 5, 9, 10, 11, 1_000];

    #[test]
    fn premium_is_never_denied() {
        let policy = AdmissionPolicy::default();
        for op in OperationClass::ALL {
            for usage in USAGE_SAMPLES {
                assert_eq!(policy.admit(Tier::Premium, usage, op), Decision::Admitted);
            }
        }
    }

    #[test]
    fn free_metered_under_limit_is_admitted() {
        let policy = AdmissionPolicy::default();
        for op in [OperationClass::TextGeneration, OperationClass::TitleGeneration] {
            for usage in 0..DEFAULT_FREE_USAGE_LIMIT {
                assert_eq!(policy.admit(Tier::Free, usage, op), Decision::Admitted);
            }
        }
    }

    #[test]
    fn free_metered_at_or_over_limit_is_denied() {
        let policy = AdmissionPolicy::default();
        for op in [OperationClass::TextGeneration, OperationClass::TitleGeneration] {
            for usage in [10, 11, 250] {
                assert_eq!(
                    policy.admit(Tier::Free, usage, op),
                    Decision::Denied(DenialReason::LimitReached)
                );
            }
        }
    }

    #[test]
    fn free_premium_only_is_denied_regardless_of_usage() {
        let policy = AdmissionPolicy::default();
        let premium_only = OperationClass::ALL
            .into_iter()
            .filter(|op| op.access() == Access::PremiumOnly);
        for op in premium_only {
            for usage in USAGE_SAMPLES {
                assert_eq!(
                    policy.admit(Tier::Free, usage, op),
                    Decision::Denied(DenialReason::PremiumRequired)
                );
            }
        }
    }

    #[test]
    fn configured_limit_is_respected() {
        let policy = AdmissionPolicy::new(3);
        assert_eq!(
            policy.admit(Tier::Free, 2, OperationClass::TextGeneration),
            Decision::Admitted
        );
        assert_eq!(
            policy.admit(Tier::Free, 3, OperationClass::TextGeneration),
            Decision::Denied(DenialReason::LimitReached)
        );
    }

    #[test]
    fn negative_limit_is_clamped_to_zero() {
        let policy = AdmissionPolicy::new(-5);
        assert_eq!(policy.free_usage_limit(), 0);
        assert_eq!(
            policy.admit(Tier::Free, 0, OperationClass::TitleGeneration),
            Decision::Denied(DenialReason::LimitReached)
        );
    }
}
