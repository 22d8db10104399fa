//! Transaction and activity handlers.

use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;

use banking::BankingService;
use common::{ReferenceId, Status};
use status_store::{Persistence, StoreError};
use task_queue::{CancellationToken, Queue, Task};

use crate::dispatch::{self, move_to_dead_letter_queue};
use crate::error::{Result, TransferError};
use crate::input::{ActivityInput, ActivityType, TransactionInput, TransferRequest};
use crate::topics;
use crate::transition::{self, Transition};

/// Runs `future` unless `token` is cancelled first.
async fn cancellable<F: Future>(token: &CancellationToken, future: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        () = token.cancelled() => Err(TransferError::Cancelled),
        output = future => Ok(output),
    }
}

/// Drives money transfers by consuming transaction events and activity tasks.
///
/// The worker holds no per-transfer state: the status store is the single
/// source of truth and every handler invocation may run concurrently with
/// any other, including duplicates of itself.
pub struct TransferWorker<Q, P, B>
where
    Q: Queue,
    P: Persistence,
    B: BankingService,
{
    queue: Q,
    persistence: P,
    bank: B,
}

impl<Q, P, B> TransferWorker<Q, P, B>
where
    Q: Queue + Clone + 'static,
    P: Persistence + 'static,
    B: BankingService + 'static,
{
    /// Creates a new worker over the given collaborators.
    pub fn new(queue: Q, persistence: P, bank: B) -> Self {
        Self {
            queue,
            persistence,
            bank,
        }
    }

    /// Registers the handlers as consumers on the transfer queues.
    ///
    /// Activity results published on [`topics::ACTIVITY_RESULTS`] are handled
    /// by the transaction handler, same as externally submitted events.
    pub fn run(self) -> Arc<Self> {
        let worker = Arc::new(self);
        let queue = worker.queue.clone();

        let handler = Arc::clone(&worker);
        let transactions = dispatch::handle_errors(queue.clone(), move |token, task| {
            let handler = Arc::clone(&handler);
            async move { handler.process_money_transfer_event(&token, &task).await }
        });

        let handler = Arc::clone(&worker);
        let activities = dispatch::handle_errors(queue.clone(), move |token, task| {
            let handler = Arc::clone(&handler);
            async move { handler.process_activity(&token, &task).await }
        });

        queue.consume(topics::MONEY_TRANSFER_EVENTS, Arc::clone(&transactions));
        queue.consume(topics::ACTIVITY_RESULTS, transactions);
        queue.consume(topics::MONEY_TRANSFER_ACTIVITIES, activities);

        tracing::info!("transfer worker started");
        worker
    }

    /// Submits a new transfer by enqueueing its `Started` event.
    #[tracing::instrument(skip(self, request), fields(reference_id = %request.reference_id))]
    pub async fn start_transfer(&self, request: TransferRequest) -> Result<ReferenceId> {
        request.validate()?;
        let input = TransactionInput::started(request);
        let payload = serde_json::to_vec(&input)?;
        self.queue
            .enqueue(topics::MONEY_TRANSFER_EVENTS, payload)
            .await?;

        metrics::counter!("transfer_started_total").increment(1);
        tracing::info!(amount = input.amount, "transfer submitted");
        Ok(input.reference_id)
    }

    /// Returns the stored status of a transfer.
    pub async fn status(&self, reference_id: &ReferenceId) -> Result<Status> {
        Ok(self.persistence.load(reference_id).await?)
    }

    /// Handles a transaction event: checks it against the stored status,
    /// schedules the next activity and advances the status.
    #[tracing::instrument(
        skip_all,
        fields(task_id = task.id, attempt = task.attempt, reference_id = tracing::field::Empty)
    )]
    pub async fn process_money_transfer_event(
        &self,
        token: &CancellationToken,
        task: &Task,
    ) -> Result<()> {
        let mut input: TransactionInput = match serde_json::from_slice(&task.payload) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode transaction event");
                return move_to_dead_letter_queue(&self.queue, task).await;
            }
        };
        tracing::Span::current().record("reference_id", input.reference_id.as_str());

        let status = match cancellable(token, self.persistence.load(&input.reference_id)).await? {
            Ok(status) => status,
            Err(e @ StoreError::Decode { .. }) => {
                // Retrying cannot fix a corrupt record; drop the task.
                tracing::error!(error = %e, "discarding event for unreadable transfer status");
                metrics::counter!("transfer_events_discarded_total", "reason" => "corrupt")
                    .increment(1);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        match status.cmp(&input.last_status) {
            Ordering::Less => {
                return Err(TransferError::PrematureEvent {
                    reference_id: input.reference_id,
                    stored: status,
                    last_status: input.last_status,
                });
            }
            Ordering::Greater => {
                tracing::info!(
                    %status,
                    last_status = %input.last_status,
                    "discarding superseded event"
                );
                metrics::counter!("transfer_events_discarded_total", "reason" => "stale")
                    .increment(1);
                return Ok(());
            }
            Ordering::Equal => {}
        }

        let (next, activity) = match transition::plan(status, input.has_error()) {
            Transition::Advance { to, activity } => (to, activity),
            Transition::Terminal => {
                tracing::warn!(%status, "discarding event for finished transfer");
                metrics::counter!("transfer_events_discarded_total", "reason" => "terminal")
                    .increment(1);
                return Ok(());
            }
        };

        if let Some(activity_type) = activity {
            if activity_type == ActivityType::Refund {
                input.error_message = None;
            }
            input.last_status = next;
            let activity = ActivityInput::new(activity_type, input.clone());
            cancellable(token, self.schedule_activity(&activity)).await??;
        }

        // The activity was scheduled before the status write; a crash or
        // conflict in between at worst duplicates an activity, which the
        // bank deduplicates by reference token.
        match cancellable(
            token,
            self.persistence
                .compare_and_swap(&input.reference_id, next, status),
        )
        .await?
        {
            Ok(()) => {
                metrics::counter!("transfer_events_processed_total").increment(1);
                tracing::info!(from = %status, to = %next, "transfer status advanced");
                if next.is_terminal() {
                    metrics::counter!("transfer_completed_total", "outcome" => next.as_str())
                        .increment(1);
                    if let Some(error) = &input.error_message {
                        tracing::warn!(%error, outcome = %next, "transfer finished with error");
                    }
                }
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!(error = %e, "status already advanced by a concurrent handler");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    /// Handles an activity task: calls the bank and reports the outcome as
    /// a new transaction event.
    #[tracing::instrument(
        skip_all,
        fields(
            task_id = task.id,
            attempt = task.attempt,
            reference_id = tracing::field::Empty,
            activity = tracing::field::Empty
        )
    )]
    pub async fn process_activity(&self, token: &CancellationToken, task: &Task) -> Result<()> {
        let ActivityInput {
            activity_type,
            account_id,
            transaction: mut tx,
        } = match serde_json::from_slice(&task.payload) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode activity");
                return move_to_dead_letter_queue(&self.queue, task).await;
            }
        };
        let span = tracing::Span::current();
        span.record("reference_id", tx.reference_id.as_str());
        span.record("activity", activity_type.as_str());

        let reference = activity_type.reference_token(&tx.reference_id);
        let call = async {
            match activity_type {
                ActivityType::Withdraw => {
                    self.bank
                        .withdraw(&account_id, tx.amount, &reference)
                        .await
                }
                ActivityType::Deposit | ActivityType::Refund => {
                    self.bank.deposit(&account_id, tx.amount, &reference).await
                }
            }
        };

        let outcome = cancellable(token, call).await?;
        match outcome {
            Ok(confirmation) => {
                metrics::counter!(
                    "transfer_activities_total",
                    "type" => activity_type.as_str(),
                    "outcome" => "ok"
                )
                .increment(1);
                tracing::info!(
                    confirmation_id = %confirmation.confirmation_id,
                    %account_id,
                    "activity completed"
                );
            }
            Err(e) if e.is_business() => {
                metrics::counter!(
                    "transfer_activities_total",
                    "type" => activity_type.as_str(),
                    "outcome" => "rejected"
                )
                .increment(1);
                tracing::warn!(error = %e, %account_id, "activity rejected by bank");
                tx.error_message = Some(e.to_string());
            }
            Err(e) => return Err(e.into()),
        }

        let payload = match serde_json::to_vec(&tx) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode activity result");
                return move_to_dead_letter_queue(&self.queue, task).await;
            }
        };
        cancellable(token, self.queue.enqueue(topics::ACTIVITY_RESULTS, payload)).await??;

        Ok(())
    }

    async fn schedule_activity(&self, activity: &ActivityInput) -> Result<()> {
        let payload = serde_json::to_vec(activity)?;
        self.queue
            .enqueue(topics::MONEY_TRANSFER_ACTIVITIES, payload)
            .await?;
        tracing::debug!(
            activity = %activity.activity_type,
            account_id = %activity.account_id,
            "activity scheduled"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banking::{InMemoryBank, OperationKind};
    use status_store::InMemoryStatusStore;
    use task_queue::{InMemoryQueue, QueueError};

    type TestWorker = TransferWorker<InMemoryQueue, InMemoryStatusStore, InMemoryBank>;

    struct Harness {
        worker: TestWorker,
        queue: InMemoryQueue,
        store: InMemoryStatusStore,
        bank: InMemoryBank,
        token: CancellationToken,
    }

    impl Harness {
        async fn new() -> Self {
            let queue = InMemoryQueue::with_history();
            let store = InMemoryStatusStore::new();
            let bank = InMemoryBank::new();
            bank.open_account("A", 1000).await;
            bank.open_account("B", 0).await;

            Self {
                worker: TransferWorker::new(queue.clone(), store.clone(), bank.clone()),
                queue,
                store,
                bank,
                token: CancellationToken::new(),
            }
        }

        async fn take(&self, queue: &str, payload: Vec<u8>) -> Task {
            self.queue.enqueue(queue, payload).await.unwrap();
            self.queue.take(queue).unwrap()
        }

        async fn handle_event(&self, input: &TransactionInput) -> Result<()> {
            let payload = serde_json::to_vec(input).unwrap();
            let task = self.take(topics::MONEY_TRANSFER_EVENTS, payload).await;
            self.worker
                .process_money_transfer_event(&self.token, &task)
                .await
        }

        async fn handle_activity(&self, activity: &ActivityInput) -> Result<()> {
            let payload = serde_json::to_vec(activity).unwrap();
            let task = self.take(topics::MONEY_TRANSFER_ACTIVITIES, payload).await;
            self.worker.process_activity(&self.token, &task).await
        }

        fn scheduled_activities(&self) -> Vec<ActivityInput> {
            self.queue
                .payloads(topics::MONEY_TRANSFER_ACTIVITIES)
                .iter()
                .map(|p| serde_json::from_slice(p).unwrap())
                .collect()
        }

        fn reported_results(&self) -> Vec<TransactionInput> {
            self.queue
                .payloads(topics::ACTIVITY_RESULTS)
                .iter()
                .map(|p| serde_json::from_slice(p).unwrap())
                .collect()
        }

        async fn status(&self) -> Option<Status> {
            self.store.status_of(&ReferenceId::new("tx-1")).await
        }
    }

    fn started() -> TransactionInput {
        TransactionInput::started(TransferRequest::new("tx-1", "A", "B", 100))
    }

    fn event(last_status: Status, error: Option<&str>) -> TransactionInput {
        TransactionInput {
            last_status,
            error_message: error.map(str::to_string),
            ..started()
        }
    }

    #[tokio::test]
    async fn test_started_event_schedules_withdrawal() {
        let h = Harness::new().await;

        h.handle_event(&started()).await.unwrap();

        assert_eq!(h.status().await, Some(Status::Withdrawing));
        let activities = h.scheduled_activities();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].activity_type, ActivityType::Withdraw);
        assert_eq!(activities[0].account_id.as_str(), "A");
        assert_eq!(activities[0].transaction.last_status, Status::Withdrawing);
    }

    #[tokio::test]
    async fn test_handlers_reach_succeeded() {
        let h = Harness::new().await;

        h.handle_event(&started()).await.unwrap();
        for _ in 0..2 {
            let task = h.queue.take(topics::MONEY_TRANSFER_ACTIVITIES).unwrap();
            h.worker.process_activity(&h.token, &task).await.unwrap();
            let task = h.queue.take(topics::ACTIVITY_RESULTS).unwrap();
            h.worker
                .process_money_transfer_event(&h.token, &task)
                .await
                .unwrap();
        }

        assert_eq!(h.status().await, Some(Status::Succeeded));
        let types: Vec<_> = h
            .scheduled_activities()
            .iter()
            .map(|a| a.activity_type)
            .collect();
        assert_eq!(types, vec![ActivityType::Withdraw, ActivityType::Deposit]);
        assert_eq!(h.bank.balance(&"A".into()).await, Some(900));
        assert_eq!(h.bank.balance(&"B".into()).await, Some(100));
    }

    #[tokio::test]
    async fn test_superseded_events_are_discarded() {
        for stored in Status::ALL {
            for last_status in Status::ALL.into_iter().filter(|s| *s < stored) {
                let h = Harness::new().await;
                h.store.set_status("tx-1", stored).await;

                h.handle_event(&event(last_status, None)).await.unwrap();

                assert!(h.scheduled_activities().is_empty());
                assert_eq!(h.store.write_count().await, 0);
                assert_eq!(h.status().await, Some(stored));
            }
        }
    }

    #[tokio::test]
    async fn test_premature_events_are_retried() {
        for stored in Status::ALL {
            for last_status in Status::ALL.into_iter().filter(|s| *s > stored) {
                let h = Harness::new().await;
                h.store.set_status("tx-1", stored).await;

                let result = h.handle_event(&event(last_status, None)).await;

                assert!(matches!(
                    result,
                    Err(TransferError::PrematureEvent { stored: s, last_status: l, .. })
                        if s == stored && l == last_status
                ));
                assert!(h.scheduled_activities().is_empty());
                assert_eq!(h.store.write_count().await, 0);
            }
        }
    }

    #[tokio::test]
    async fn test_swap_conflict_is_swallowed() {
        let h = Harness::new().await;
        h.store.force_conflict_on_next_write().await;

        h.handle_event(&started()).await.unwrap();

        assert_eq!(h.scheduled_activities().len(), 1);
        assert_eq!(h.status().await, None);
    }

    #[tokio::test]
    async fn test_store_write_failure_is_retryable() {
        let h = Harness::new().await;
        h.store.fail_next_writes(1).await;

        let result = h.handle_event(&started()).await;

        assert!(matches!(
            result,
            Err(TransferError::Store(StoreError::Unavailable(_)))
        ));
        // The activity already went out; its token makes the retry harmless.
        assert_eq!(h.scheduled_activities().len(), 1);
    }

    #[tokio::test]
    async fn test_store_load_failure_is_retryable() {
        let h = Harness::new().await;
        h.store.fail_next_loads(1).await;

        let result = h.handle_event(&started()).await;

        assert!(matches!(result, Err(TransferError::Store(_))));
        assert!(h.scheduled_activities().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_status_discards_event() {
        let h = Harness::new().await;
        h.store.corrupt_next_load().await;

        h.handle_event(&started()).await.unwrap();

        assert!(h.scheduled_activities().is_empty());
        assert_eq!(h.store.write_count().await, 0);
        assert_eq!(h.status().await, None);
    }

    #[tokio::test]
    async fn test_activity_scheduling_failure_is_retryable() {
        let h = Harness::new().await;
        let payload = serde_json::to_vec(&started()).unwrap();
        let task = h.take(topics::MONEY_TRANSFER_EVENTS, payload).await;
        h.queue.fail_next_enqueues(1);

        let result = h
            .worker
            .process_money_transfer_event(&h.token, &task)
            .await;

        assert!(matches!(
            result,
            Err(TransferError::Queue(QueueError::Unavailable(_)))
        ));
        assert!(h.scheduled_activities().is_empty());
        assert_eq!(h.store.write_count().await, 0);
        assert_eq!(h.status().await, None);

        h.worker
            .process_money_transfer_event(&h.token, &task.clone().next_attempt())
            .await
            .unwrap();

        assert_eq!(h.status().await, Some(Status::Withdrawing));
        assert_eq!(h.scheduled_activities().len(), 1);
    }

    #[tokio::test]
    async fn test_result_report_failure_does_not_move_money_twice() {
        let h = Harness::new().await;
        let activity =
            ActivityInput::new(ActivityType::Withdraw, event(Status::Withdrawing, None));
        let payload = serde_json::to_vec(&activity).unwrap();
        let task = h.take(topics::MONEY_TRANSFER_ACTIVITIES, payload).await;
        h.queue.fail_next_enqueues(1);

        let result = h.worker.process_activity(&h.token, &task).await;

        assert!(matches!(
            result,
            Err(TransferError::Queue(QueueError::Unavailable(_)))
        ));
        assert!(h.reported_results().is_empty());
        assert_eq!(h.bank.balance(&"A".into()).await, Some(900));

        h.worker
            .process_activity(&h.token, &task.clone().next_attempt())
            .await
            .unwrap();

        assert_eq!(h.bank.call_count().await, 2);
        assert_eq!(h.bank.operations().await.len(), 1);
        assert_eq!(h.bank.balance(&"A".into()).await, Some(900));
        let results = h.reported_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].last_status, Status::Withdrawing);
        assert_eq!(results[0].error_message, None);
    }

    #[tokio::test]
    async fn test_failed_withdrawal_fails_without_refund() {
        let h = Harness::new().await;
        h.store.set_status("tx-1", Status::Withdrawing).await;

        h.handle_event(&event(Status::Withdrawing, Some("insufficient funds")))
            .await
            .unwrap();

        assert_eq!(h.status().await, Some(Status::Failed));
        assert!(h.scheduled_activities().is_empty());
    }

    #[tokio::test]
    async fn test_failed_deposit_schedules_one_refund() {
        let h = Harness::new().await;
        h.store.set_status("tx-1", Status::Depositing).await;

        h.handle_event(&event(Status::Depositing, Some("account not found: B")))
            .await
            .unwrap();

        assert_eq!(h.status().await, Some(Status::Refunding));
        let activities = h.scheduled_activities();
        assert_eq!(activities.len(), 1);
        let refund = &activities[0];
        assert_eq!(refund.activity_type, ActivityType::Refund);
        assert_eq!(refund.account_id.as_str(), "A");
        assert_eq!(refund.transaction.error_message, None);
        assert_eq!(refund.transaction.last_status, Status::Refunding);
    }

    #[tokio::test]
    async fn test_failed_refund_fails_transfer() {
        let h = Harness::new().await;
        h.store.set_status("tx-1", Status::Refunding).await;

        h.handle_event(&event(Status::Refunding, Some("bank exploded")))
            .await
            .unwrap();

        assert_eq!(h.status().await, Some(Status::Failed));
        assert!(h.scheduled_activities().is_empty());
    }

    #[tokio::test]
    async fn test_successful_refund_succeeds_transfer() {
        let h = Harness::new().await;
        h.store.set_status("tx-1", Status::Refunding).await;

        h.handle_event(&event(Status::Refunding, None)).await.unwrap();

        assert_eq!(h.status().await, Some(Status::Succeeded));
    }

    #[tokio::test]
    async fn test_terminal_event_is_discarded() {
        for terminal in [Status::Succeeded, Status::Failed] {
            let h = Harness::new().await;
            h.store.set_status("tx-1", terminal).await;

            h.handle_event(&event(terminal, None)).await.unwrap();

            assert_eq!(h.store.write_count().await, 0);
            assert!(h.scheduled_activities().is_empty());
        }
    }

    #[tokio::test]
    async fn test_malformed_event_is_dead_lettered() {
        let h = Harness::new().await;
        let task = h
            .take(topics::MONEY_TRANSFER_EVENTS, b"{not json".to_vec())
            .await;

        h.worker
            .process_money_transfer_event(&h.token, &task)
            .await
            .unwrap();

        assert_eq!(
            h.queue.payloads("money-transfer-events-DLQ"),
            vec![b"{not json".to_vec()]
        );
        assert_eq!(h.store.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_activity_is_dead_lettered() {
        let h = Harness::new().await;
        let task = h
            .take(topics::MONEY_TRANSFER_ACTIVITIES, b"[]".to_vec())
            .await;

        h.worker.process_activity(&h.token, &task).await.unwrap();

        assert_eq!(
            h.queue.payloads("money-transfer-activities-DLQ"),
            vec![b"[]".to_vec()]
        );
        assert_eq!(h.bank.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_activity_uses_reference_token() {
        let h = Harness::new().await;
        let activity =
            ActivityInput::new(ActivityType::Withdraw, event(Status::Withdrawing, None));

        h.handle_activity(&activity).await.unwrap();
        h.handle_activity(&activity).await.unwrap();

        let operations = h.bank.operations().await;
        assert_eq!(operations.len(), 1);
        assert_eq!(operations[0].kind, OperationKind::Withdraw);
        assert_eq!(operations[0].reference, "tx-1-withdraw");
        assert_eq!(h.reported_results().len(), 2);
    }

    #[tokio::test]
    async fn test_refund_deposits_into_source() {
        let h = Harness::new().await;
        let activity =
            ActivityInput::new(ActivityType::Refund, event(Status::Refunding, None));

        h.handle_activity(&activity).await.unwrap();

        let operations = h.bank.operations().await;
        assert_eq!(operations[0].kind, OperationKind::Deposit);
        assert_eq!(operations[0].account.as_str(), "A");
        assert_eq!(operations[0].reference, "tx-1-refund");
        assert_eq!(h.bank.balance(&"A".into()).await, Some(1100));
    }

    #[tokio::test]
    async fn test_business_error_is_reported_forward() {
        let h = Harness::new().await;
        let mut tx = event(Status::Withdrawing, None);
        tx.amount = 5000;
        let activity = ActivityInput::new(ActivityType::Withdraw, tx);

        h.handle_activity(&activity).await.unwrap();

        let results = h.reported_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].last_status, Status::Withdrawing);
        assert_eq!(
            results[0].error_message.as_deref(),
            Some("insufficient funds in account A: requested 5000, available 1000")
        );
    }

    #[tokio::test]
    async fn test_negative_amount_is_reported_as_rejection() {
        let h = Harness::new().await;
        let mut tx = event(Status::Withdrawing, None);
        tx.amount = -100;
        let activity = ActivityInput::new(ActivityType::Withdraw, tx);

        h.handle_activity(&activity).await.unwrap();

        assert_eq!(h.bank.balance(&"A".into()).await, Some(1000));
        let results = h.reported_results();
        assert_eq!(
            results[0].error_message.as_deref(),
            Some("invalid amount -100: must be positive")
        );
    }

    #[tokio::test]
    async fn test_transient_bank_error_is_not_reported() {
        let h = Harness::new().await;
        h.bank.fail_next_calls(1).await;
        let activity =
            ActivityInput::new(ActivityType::Deposit, event(Status::Depositing, None));

        let result = h.handle_activity(&activity).await;

        assert!(matches!(result, Err(TransferError::Bank(_))));
        assert!(h.reported_results().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_handlers_have_no_side_effects() {
        let h = Harness::new().await;
        h.token.cancel();

        let event_result = h.handle_event(&started()).await;
        let activity =
            ActivityInput::new(ActivityType::Withdraw, event(Status::Withdrawing, None));
        let activity_result = h.handle_activity(&activity).await;

        assert!(matches!(event_result, Err(TransferError::Cancelled)));
        assert!(matches!(activity_result, Err(TransferError::Cancelled)));
        assert!(h.scheduled_activities().is_empty());
        assert!(h.reported_results().is_empty());
        assert_eq!(h.store.write_count().await, 0);
        assert_eq!(h.bank.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_start_transfer_enqueues_started_event() {
        let h = Harness::new().await;

        let reference = h
            .worker
            .start_transfer(TransferRequest::new("tx-1", "A", "B", 100))
            .await
            .unwrap();

        assert_eq!(reference.as_str(), "tx-1");
        let payloads = h.queue.payloads(topics::MONEY_TRANSFER_EVENTS);
        let input: TransactionInput = serde_json::from_slice(&payloads[0]).unwrap();
        assert_eq!(input, started());
        assert_eq!(h.worker.status(&reference).await.unwrap(), Status::Started);
    }

    #[tokio::test]
    async fn test_start_transfer_rejects_invalid_request() {
        let h = Harness::new().await;

        let result = h
            .worker
            .start_transfer(TransferRequest::new("tx-1", "A", "A", 100))
            .await;

        assert!(matches!(result, Err(TransferError::InvalidRequest(_))));
        assert!(h.queue.payloads(topics::MONEY_TRANSFER_EVENTS).is_empty());
    }
}
