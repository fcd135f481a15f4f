use crate::core::estimator::{EstimateBreakdown, PriceEstimator};
use crate::core::steps::{self, FieldErrors, StepId};
use crate::domain::model::{Money, OrderDraft, OrderSummary};
use crate::domain::ports::SubmissionClient;
use crate::utils::error::{OrderError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WizardStatus {
    Editing,
    /// Waiting on the submission service. `submit` holds `&mut self` for the
    /// whole call, so a second submit cannot start meanwhile.
    Submitting,
}

/// Marks the wizard as submitting until dropped, including when the submit
/// future itself is dropped before the service answers.
struct SubmittingGuard<'a> {
    status: &'a mut WizardStatus,
}

impl<'a> SubmittingGuard<'a> {
    fn enter(status: &'a mut WizardStatus) -> Self {
        *status = WizardStatus::Submitting;
        Self { status }
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        tracing::debug!("Submission finished or discarded, back to editing");
        *self.status = WizardStatus::Editing;
    }
}

/// One entry of the steps progress bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub step: StepId,
    pub title: &'static str,
    pub is_current: bool,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub summary: OrderSummary,
    pub estimate: EstimateBreakdown,
}

/// Owns the draft and walks it through the order steps.
pub struct WizardController<S: SubmissionClient> {
    draft: OrderDraft,
    current: StepId,
    estimator: PriceEstimator,
    submitter: S,
    errors: FieldErrors,
    status: WizardStatus,
}

impl<S: SubmissionClient> WizardController<S> {
    pub fn new(estimator: PriceEstimator, submitter: S) -> Self {
        Self {
            draft: OrderDraft::default(),
            current: StepId::FIRST,
            estimator,
            submitter,
            errors: FieldErrors::new(),
            status: WizardStatus::Editing,
        }
    }

    /// Starts the wizard on an existing draft, e.g. one loaded from disk.
    pub fn with_draft(estimator: PriceEstimator, submitter: S, draft: OrderDraft) -> Self {
        Self {
            draft,
            ..Self::new(estimator, submitter)
        }
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut OrderDraft {
        &mut self.draft
    }

    pub fn current_step(&self) -> StepId {
        self.current
    }

    pub fn is_last_step(&self) -> bool {
        self.current == StepId::LAST
    }

    /// Errors from the last rejected `next` or `submit`.
    pub fn field_errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn status(&self) -> WizardStatus {
        self.status
    }

    pub fn estimator(&self) -> &PriceEstimator {
        &self.estimator
    }

    pub fn validate_current(&self) -> steps::ValidationResult {
        steps::validate(self.current, &self.draft, self.estimator.rates())
    }

    pub fn next(&mut self) -> Result<StepId> {
        if let Err(errors) = self.validate_current() {
            tracing::debug!(
                "Staying on '{}': {} invalid field(s)",
                self.current,
                errors.len()
            );
            self.errors = errors.clone();
            return Err(OrderError::Validation {
                step: self.current,
                errors,
            });
        }

        self.errors = FieldErrors::new();
        if let Some(next) = self.current.next() {
            tracing::debug!("Step '{}' -> '{}'", self.current, next);
            self.current = next;
        }
        Ok(self.current)
    }

    pub fn back(&mut self) -> StepId {
        if let Some(previous) = self.current.previous() {
            tracing::debug!("Step '{}' -> '{}'", self.current, previous);
            self.current = previous;
            self.errors = FieldErrors::new();
        }
        self.current
    }

    /// Direct navigation from the progress bar; steps own disjoint fields so no checks apply.
    pub fn jump_to(&mut self, step: StepId) -> StepId {
        if step != self.current {
            tracing::debug!("Jump '{}' -> '{}'", self.current, step);
            self.current = step;
            self.errors = FieldErrors::new();
        }
        self.current
    }

    pub fn estimate(&self) -> Money {
        self.estimator.estimate(&self.draft)
    }

    pub fn breakdown(&self) -> EstimateBreakdown {
        self.estimator.breakdown(&self.draft)
    }

    pub fn progress(&self) -> Vec<StepProgress> {
        StepId::ALL
            .iter()
            .map(|&step| StepProgress {
                step,
                title: step.title(),
                is_current: step == self.current,
                is_complete: steps::validate(step, &self.draft, self.estimator.rates()).is_ok(),
            })
            .collect()
    }

    /// 送出訂單：全部驗證通過才呼叫外部服務，失敗時保留草稿
    pub async fn submit(&mut self) -> Result<SubmissionReceipt> {
        if !self.is_last_step() {
            return Err(OrderError::NotAtFinalStep { step: self.current });
        }

        if let Err((step, errors)) = steps::validate_all(&self.draft, self.estimator.rates()) {
            tracing::warn!("Submit blocked by '{}': {}", step, errors);
            self.errors = errors.clone();
            return Err(OrderError::Validation { step, errors });
        }
        self.errors = FieldErrors::new();

        let estimate = self.estimator.breakdown(&self.draft);
        let summary = build_summary(&self.draft, &estimate);

        tracing::info!(
            "Submitting order for {} ({} service(s), estimate {})",
            summary.email,
            estimate.lines.len(),
            estimate.total
        );

        let guard = SubmittingGuard::enter(&mut self.status);
        let outcome = self.submitter.submit(&summary).await;
        drop(guard);

        match outcome {
            Ok(response) if response.success => {
                tracing::info!("Order accepted, resetting wizard");
                self.reset();
                Ok(SubmissionReceipt { summary, estimate })
            }
            Ok(_) => {
                tracing::warn!("Order service rejected the submission, draft kept");
                Err(OrderError::SubmissionRejected)
            }
            Err(e) => {
                tracing::warn!("Order submission failed, draft kept: {}", e);
                Err(e)
            }
        }
    }

    pub fn reset(&mut self) {
        self.draft = OrderDraft::default();
        self.current = StepId::FIRST;
        self.errors = FieldErrors::new();
        self.status = WizardStatus::Editing;
    }
}

/// Flattens the draft into the four fields the order service accepts.
pub fn build_summary(draft: &OrderDraft, estimate: &EstimateBreakdown) -> OrderSummary {
    let service = estimate
        .lines
        .iter()
        .map(|line| line.label.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut message = vec![
        format!("Frequency: {}", draft.frequency.label()),
        format!(
            "Property: {} ({} sq ft)",
            draft.address.one_line(),
            draft.property_size
        ),
        format!("Preferred times: {}", draft.time_slots.join(", ")),
    ];

    let preferences = &draft.preferences;
    let flags: Vec<&str> = [
        (preferences.pest_control, "pest control"),
        (preferences.organic, "organic products"),
        (preferences.pet_friendly, "pet-friendly"),
    ]
    .into_iter()
    .filter_map(|(on, label)| on.then_some(label))
    .collect();
    if !flags.is_empty() {
        message.push(format!("Preferences: {}", flags.join(", ")));
    }

    let channels: Vec<&str> = preferences
        .notifications
        .iter()
        .map(|channel| channel.label())
        .collect();
    message.push(format!("Notify via: {}", channels.join(", ")));

    let payment = draft.billing.payment_method.label();
    if draft.billing.same_as_service {
        message.push(format!("Payment: {}", payment));
    } else {
        message.push(format!(
            "Payment: {} (billing address: {})",
            payment,
            draft.billing.billing_address.one_line()
        ));
    }

    message.push(format!("Estimate: {}", estimate.total));

    let instructions = preferences.special_instructions.trim();
    if !instructions.is_empty() {
        message.push(format!("Instructions: {}", instructions));
    }

    OrderSummary {
        name: draft.contact.name.trim().to_string(),
        email: draft.contact.email.trim().to_string(),
        service,
        message: message.join("\n"),
    }
}
