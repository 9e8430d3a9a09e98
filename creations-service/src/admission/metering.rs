//! The admit, produce, persist, record sequence shared by every
//! generation endpoint.
//!
//! Usage is recorded only after the creation row is written, so a failed
//! upstream call or an empty answer never costs the caller quota.

use super::policy::{AdmissionPolicy, Decision};
use crate::error::ApiError;
use crate::middleware::Caller;
use crate::models::{Creation, NewCreation, OperationClass, Subscriber};
use crate::services::metrics::{
    ADMISSION_DECISIONS_TOTAL, OPERATIONS_TOTAL, USAGE_RECORD_FAILURES_TOTAL,
};
use crate::services::EntitlementStore;
use crate::startup::AppState;
use std::future::Future;
use tracing::{info, warn};

/// What an operation hands back for storage.
#[derive(Debug, Clone)]
pub struct Produced {
    /// Prompt recorded alongside the content.
    pub prompt: String,
    pub content: String,
    pub publish: bool,
}

impl Produced {
    pub fn new(prompt: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            content: content.into(),
            publish: false,
        }
    }

    pub fn published(mut self, publish: bool) -> Self {
        self.publish = publish;
        self
    }
}

/// Run `produce` under the caller's entitlements.
///
/// `produce` is only invoked once admission succeeds. Its content must be
/// non-blank; the resulting creation is stored and, for free callers, one
/// unit of usage is recorded.
pub async fn run_metered<F, Fut>(
    state: &AppState,
    caller: &Caller,
    operation: OperationClass,
    produce: F,
) -> Result<Creation, ApiError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Produced, ApiError>>,
{
    let subscriber = &caller.subscriber;
    let decision = state
        .policy
        .admit(subscriber.tier, subscriber.free_usage, operation);

    ADMISSION_DECISIONS_TOTAL
        .with_label_values(&[operation.as_str(), decision.label()])
        .inc();

    if let Decision::Denied(reason) = decision {
        info!(
            user_id = %caller.user_id,
            operation = %operation,
            tier = %subscriber.tier,
            free_usage = subscriber.free_usage,
            reason = %reason,
            "Operation denied"
        );
        return Err(ApiError::EntitlementDenied(reason));
    }

    let produced = match produce().await {
        Ok(produced) => produced,
        Err(e) => {
            OPERATIONS_TOTAL
                .with_label_values(&[operation.as_str(), "failed"])
                .inc();
            return Err(e);
        }
    };

    if produced.content.trim().is_empty() {
        OPERATIONS_TOTAL
            .with_label_values(&[operation.as_str(), "empty"])
            .inc();
        return Err(ApiError::empty_content());
    }

    let creation = state
        .creations
        .insert(NewCreation {
            user_id: caller.user_id.clone(),
            prompt: produced.prompt,
            content: produced.content,
            kind: operation.creation_kind(),
            publish: produced.publish,
        })
        .await
        .map_err(|e| {
            OPERATIONS_TOTAL
                .with_label_values(&[operation.as_str(), "failed"])
                .inc();
            ApiError::from(e)
        })?;

    record_usage(state.entitlements.as_ref(), &state.policy, subscriber).await;

    OPERATIONS_TOTAL
        .with_label_values(&[operation.as_str(), "succeeded"])
        .inc();

    info!(
        user_id = %caller.user_id,
        operation = %operation,
        creation_id = %creation.creation_id,
        "Creation stored"
    );

    Ok(creation)
}

/// Charge one unit of free usage after a successful operation.
///
/// Premium subscribers are never charged. A failed or refused increment is
/// logged and counted; the caller's response is unaffected.
pub async fn record_usage(
    entitlements: &dyn EntitlementStore,
    policy: &AdmissionPolicy,
    subscriber: &Subscriber,
) {
    if subscriber.tier.is_premium() {
        return;
    }

    match entitlements
        .increment_free_usage(&subscriber.user_id, policy.free_usage_limit())
        .await
    {
        Ok(Some(count)) => {
            info!(user_id = %subscriber.user_id, free_usage = count, "Free usage recorded");
        }
        Ok(None) => {
            // A concurrent request already consumed the last unit.
            USAGE_RECORD_FAILURES_TOTAL.with_label_values(&["limit"]).inc();
            warn!(
                user_id = %subscriber.user_id,
                limit = policy.free_usage_limit(),
                "Free usage already at limit; increment skipped"
            );
        }
        Err(e) => {
            USAGE_RECORD_FAILURES_TOTAL
                .with_label_values(&["store_error"])
                .inc();
            warn!(user_id = %subscriber.user_id, error = %e, "Failed to record free usage");
        }
    }
}
