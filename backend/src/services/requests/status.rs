use super::AUTO_STATUS_COMMENT;
use crate::services::ServiceError;
use crate::store::requests::{append_status_log, get_request, update_request};
use crate::store::{Store, StoreError};
use common::model::custom_request::{CustomRequest, RequestStatusLog};
use common::requests::admin::RequestUpdate;
use log::info;

#[derive(Debug)]
pub struct Updated {
    pub request: CustomRequest,
    /// The row appended for this update, if the status moved.
    pub logged: Option<RequestStatusLog>,
}

/// Applies an operator edit to a stored request.
///
/// Exactly one log row is appended when the status value changes and none
/// otherwise; saving notes alone, or re-sending the current status, leaves
/// the trail untouched.
pub fn apply(store: &Store, id: i64, update: &RequestUpdate) -> Result<Updated, ServiceError> {
    let updated = store.write(|tx| {
        let current = get_request(tx, id)?;
        let status = update.status.unwrap_or(current.status);
        let notes = update
            .internal_notes
            .as_deref()
            .unwrap_or(&current.internal_notes);
        let request = update_request(tx, id, status, notes)?;

        let logged = if status != current.status {
            let comment = update
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(AUTO_STATUS_COMMENT);
            Some(append_status_log(tx, id, status, comment)?)
        } else {
            None
        };
        Ok::<_, StoreError>(Updated { request, logged })
    })?;

    if updated.logged.is_some() {
        info!(
            "Request {} moved to {}",
            updated.request.reference_code, updated.request.status
        );
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::requests::{insert_request, status_logs, tests::input};
    use common::model::custom_request::RequestStatus;

    fn stored(store: &Store) -> i64 {
        store
            .write(|tx| {
                let request = insert_request(tx, "RQ250101AAAA", &input("Acme Mills"), None)?;
                append_status_log(tx, request.id, request.status, AUTO_STATUS_COMMENT)?;
                Ok::<_, StoreError>(request.id)
            })
            .unwrap()
    }

    fn log_count(store: &Store, id: i64) -> usize {
        store.read(|conn| status_logs(conn, id)).unwrap().len()
    }

    #[test]
    fn changing_status_appends_one_row() {
        let store = Store::open_in_memory().unwrap();
        let id = stored(&store);
        let updated = apply(
            &store,
            id,
            &RequestUpdate {
                status: Some(RequestStatus::Review),
                internal_notes: None,
                comment: Some("Assigned to Omar".to_string()),
            },
        )
        .unwrap();
        assert_eq!(updated.request.status, RequestStatus::Review);
        let logged = updated.logged.unwrap();
        assert_eq!(logged.status, RequestStatus::Review);
        assert_eq!(logged.comment, "Assigned to Omar");
        assert_eq!(log_count(&store, id), 2);
    }

    #[test]
    fn saves_without_a_status_change_append_nothing() {
        let store = Store::open_in_memory().unwrap();
        let id = stored(&store);
        for update in [
            RequestUpdate {
                status: Some(RequestStatus::New),
                ..RequestUpdate::default()
            },
            RequestUpdate {
                internal_notes: Some("Called back".to_string()),
                ..RequestUpdate::default()
            },
        ] {
            let updated = apply(&store, id, &update).unwrap();
            assert!(updated.logged.is_none());
        }
        assert_eq!(log_count(&store, id), 1);
        let request = store.read(|conn| get_request(conn, id)).unwrap();
        assert_eq!(request.internal_notes, "Called back");
    }

    #[test]
    fn each_transition_is_logged_with_the_default_comment() {
        let store = Store::open_in_memory().unwrap();
        let id = stored(&store);
        for status in [RequestStatus::Review, RequestStatus::Quoted, RequestStatus::Fulfilled] {
            let update = RequestUpdate {
                status: Some(status),
                ..RequestUpdate::default()
            };
            let logged = apply(&store, id, &update).unwrap().logged.unwrap();
            assert_eq!(logged.comment, AUTO_STATUS_COMMENT);
        }
        assert_eq!(log_count(&store, id), 4);
    }

    #[test]
    fn missing_request_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let err = apply(&store, 99, &RequestUpdate::default()).unwrap_err();
        assert!(err.is_not_found());
    }
}
