use super::AUTO_STATUS_COMMENT;
use crate::services::media::UploadedFile;
use crate::services::notification::{NotificationOutcome, Notifier};
use crate::services::ServiceError;
use crate::store::requests::{append_status_log, insert_request, unique_reference};
use crate::store::{all_ids, Store};
use common::model::custom_request::CustomRequest;
use common::requests::custom_request::CustomRequestInput;
use log::info;
use std::collections::HashMap;
use std::path::Path;

/// Subdirectory of the media root holding request attachments.
pub const ATTACHMENT_DIR: &str = "requests";

#[derive(Debug)]
pub struct Accepted {
    pub request: CustomRequest,
    pub notification: NotificationOutcome,
}

/// Validates and stores a quote request, then tries to notify sales.
///
/// Validation, filing the attachment and writing the request row with its
/// initial log row all happen in one transaction, so the industry checked is
/// the industry stored. Nothing is written when validation fails. The
/// notification outcome is returned rather than raised: a failed send never
/// fails the submission.
pub async fn submit(
    store: &Store,
    notifier: &Notifier,
    media_root: &Path,
    fields: &HashMap<String, String>,
    attachment: Option<UploadedFile>,
) -> Result<Accepted, ServiceError> {
    let request = store.write(|tx| {
        let industries = all_ids(tx, "industries")?;
        let input = CustomRequestInput::clean(fields, |id| industries.contains(&id))?;
        let attachment = match attachment {
            Some(file) => Some(file.persist(media_root, ATTACHMENT_DIR)?),
            None => None,
        };
        let reference = unique_reference(tx)?;
        let request = insert_request(tx, &reference, &input, attachment.as_deref())?;
        append_status_log(tx, request.id, request.status, AUTO_STATUS_COMMENT)?;
        Ok::<_, ServiceError>(request)
    })?;
    info!(
        "Custom request {} received from {}",
        request.reference_code, request.company_name
    );

    let notification = notifier.notify_new_request(&request).await;
    Ok(Accepted {
        request,
        notification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::media::tests::staged;
    use crate::services::notification::tests::{FailingMailer, RecordingMailer, StalledMailer};
    use crate::services::notification::Mailer;
    use crate::store::requests::{list_requests, status_logs};
    use crate::store::{Resource, StoreError};
    use common::model::catalogue::Industry;
    use common::model::custom_request::RequestStatus;
    use common::requests::custom_request::BUDGET_ORDER_ERROR;
    use std::sync::Arc;
    use std::time::Duration;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid() -> HashMap<String, String> {
        form(&[
            ("contact_name", "Jane Doe"),
            ("company_name", "Acme Mills"),
            ("email", "jane@acme-mills.com"),
            ("machine_type", "Flour roller mill"),
            ("budget_min", "50000"),
            ("budget_max", "100000"),
            ("description", "Two-shift operation."),
        ])
    }

    fn notifier(mailer: Arc<dyn Mailer>) -> Notifier {
        notifier_with_timeout(mailer, Duration::from_secs(1))
    }

    fn notifier_with_timeout(mailer: Arc<dyn Mailer>, timeout: Duration) -> Notifier {
        Notifier::new(
            mailer,
            "noreply@titannexus.com",
            Some("hello@titannexus.com".to_string()),
            timeout,
        )
    }

    /// One stored request carrying exactly one `new` log row.
    fn assert_single_new_request(store: &Store) {
        let (requests, logs) = store
            .read(|conn| {
                let requests = list_requests(conn, None)?;
                let logs = status_logs(conn, requests[0].id)?;
                Ok::<_, StoreError>((requests, logs))
            })
            .unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, RequestStatus::New);
    }

    #[actix_web::test]
    async fn accepted_request_gets_one_new_log_and_one_email() {
        let store = Store::open_in_memory().unwrap();
        let media = tempfile::tempdir().unwrap();
        let recorder = Arc::new(RecordingMailer::default());

        let accepted = submit(&store, &notifier(recorder.clone()), media.path(), &valid(), None)
            .await
            .unwrap();

        assert_eq!(accepted.request.status, RequestStatus::New);
        assert_eq!(accepted.notification, NotificationOutcome::Sent);
        let logs = store
            .read(|conn| status_logs(conn, accepted.request.id))
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, RequestStatus::New);
        assert_eq!(logs[0].comment, AUTO_STATUS_COMMENT);

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.ends_with(&accepted.request.reference_code));
    }

    #[actix_web::test]
    async fn inverted_budget_stores_nothing() {
        let store = Store::open_in_memory().unwrap();
        let media = tempfile::tempdir().unwrap();
        let recorder = Arc::new(RecordingMailer::default());
        let mut fields = valid();
        fields.insert("budget_min".into(), "100000".into());
        fields.insert("budget_max".into(), "50000".into());

        let err = submit(&store, &notifier(recorder.clone()), media.path(), &fields, None)
            .await
            .unwrap_err();

        match err {
            ServiceError::Validation(errors) => {
                assert_eq!(errors.get("budget_max"), [BUDGET_ORDER_ERROR.to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.read(|conn| list_requests(conn, None)).unwrap().is_empty());
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn unknown_industry_is_a_field_error() {
        let store = Store::open_in_memory().unwrap();
        let media = tempfile::tempdir().unwrap();
        let mut fields = valid();
        fields.insert("industry".into(), "3".into());
        let err = submit(
            &store,
            &notifier(Arc::new(RecordingMailer::default())),
            media.path(),
            &fields,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(e) if e.contains("industry")));
    }

    #[actix_web::test]
    async fn failed_email_still_accepts_the_request() {
        let store = Store::open_in_memory().unwrap();
        let media = tempfile::tempdir().unwrap();

        let accepted = submit(&store, &notifier(Arc::new(FailingMailer)), media.path(), &valid(), None)
            .await
            .unwrap();

        assert!(matches!(accepted.notification, NotificationOutcome::Failed(_)));
        assert_single_new_request(&store);
    }

    #[actix_web::test]
    async fn stalled_email_times_out_without_failing_the_request() {
        let store = Store::open_in_memory().unwrap();
        let media = tempfile::tempdir().unwrap();
        let slow = notifier_with_timeout(Arc::new(StalledMailer), Duration::from_millis(20));

        let accepted = submit(&store, &slow, media.path(), &valid(), None)
            .await
            .unwrap();

        assert!(matches!(
            accepted.notification,
            NotificationOutcome::Failed(ref reason) if reason.starts_with("timed out")
        ));
        assert_single_new_request(&store);
    }

    #[actix_web::test]
    async fn industry_is_checked_against_the_rows_being_written() {
        let store = Store::open_in_memory().unwrap();
        let media = tempfile::tempdir().unwrap();
        let mut industry = Industry {
            id: 0,
            name: "Food & Beverage".to_string(),
            slug: String::new(),
            description: String::new(),
            icon: String::new(),
            feature_statement: String::new(),
            display_order: 1,
        };
        industry.prepare().unwrap();
        let id = store.write(|tx| industry.insert(tx)).unwrap();
        let mut fields = valid();
        fields.insert("industry".into(), id.to_string());
        let mailer = || notifier(Arc::new(RecordingMailer::default()));

        let accepted = submit(&store, &mailer(), media.path(), &fields, None)
            .await
            .unwrap();
        assert_eq!(accepted.request.industry_id, Some(id));

        store.write(|tx| Industry::delete(tx, id)).unwrap();
        let attachment = staged(media.path(), "layout.pdf", b"plant layout");
        let err = submit(&store, &mailer(), media.path(), &fields, Some(attachment))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(e) if e.contains("industry")));
        assert_eq!(store.read(|conn| list_requests(conn, None)).unwrap().len(), 1);
        assert!(!media.path().join(ATTACHMENT_DIR).exists());
    }
}
