//! Returning picked files to the application that started us.

use tracing::{error, info, warn};

use crate::models::{ResultIntent, FLAG_GRANT_READ_URI_PERMISSION, RESULT_CANCELED, RESULT_OK};
use crate::platform::ResultHost;
use crate::{Error, Result};

pub struct ResultPublisher {
    authority_suffix: String,
}

impl ResultPublisher {
    pub fn new(authority_suffix: impl Into<String>) -> Self {
        Self {
            authority_suffix: authority_suffix.into(),
        }
    }

    /// The ordered file set a `setResult` call refers to.
    ///
    /// A non-empty `paths` is the whole set; otherwise `path` alone.
    pub fn file_set(path: Option<String>, paths: Option<Vec<String>>) -> Option<Vec<String>> {
        match (path, paths) {
            (_, Some(paths)) if !paths.is_empty() => Some(paths),
            (Some(path), _) => Some(vec![path]),
            _ => None,
        }
    }

    /// Grant every file, set the activity result and finish the activity.
    ///
    /// All URIs are resolved before anything is set. On failure the result is
    /// CANCELED and the activity still finishes. Returns `Ok(false)` without
    /// touching the activity when there is nothing to publish.
    pub fn publish<H: ResultHost>(
        &self,
        host: &H,
        path: Option<String>,
        paths: Option<Vec<String>>,
    ) -> Result<bool> {
        let Some(files) = Self::file_set(path, paths) else {
            return Ok(false);
        };

        let outcome = self
            .build_intent(host, &files)
            .and_then(|intent| host.set_result(RESULT_OK, Some(intent)));

        let outcome = match outcome {
            Ok(()) => {
                info!("Published {} file(s) as activity result", files.len());
                Ok(true)
            }
            Err(e) => {
                error!("setResult failed: {}", e);
                if let Err(cancel_err) = host.set_result(RESULT_CANCELED, None) {
                    warn!("Could not set CANCELED result: {}", cancel_err);
                }
                Err(match e {
                    Error::Resolution(_) => e,
                    other => Error::Resolution(other.to_string()),
                })
            }
        };

        if let Err(e) = host.finish() {
            warn!("Could not finish activity: {}", e);
        }
        outcome
    }

    fn build_intent<H: ResultHost>(&self, host: &H, files: &[String]) -> Result<ResultIntent> {
        let authority = format!("{}{}", host.package_name()?, self.authority_suffix);
        let uris = files
            .iter()
            .map(|file| host.uri_for_file(&authority, file))
            .collect::<Result<Vec<_>>>()?;

        let mut intent = ResultIntent {
            flags: FLAG_GRANT_READ_URI_PERMISSION,
            ..ResultIntent::default()
        };
        if uris.len() == 1 {
            intent.data = uris.into_iter().next();
        } else {
            intent.clip_items = uris;
        }
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePlatform, PlatformCall};

    #[test]
    fn test_single_path_sets_data() {
        let publisher = ResultPublisher::new(".provider");
        let host = FakePlatform::new().with_file("/a.jpg");

        assert!(publisher
            .publish(&host, Some("/a.jpg".into()), None)
            .unwrap());

        let expected = ResultIntent {
            data: Some("content://org.altlimit.dmedia.provider/root/a.jpg".into()),
            clip_items: vec![],
            flags: FLAG_GRANT_READ_URI_PERMISSION,
        };
        assert_eq!(
            host.calls(),
            vec![
                PlatformCall::SetResult(RESULT_OK, Some(expected)),
                PlatformCall::Finish
            ]
        );
    }

    #[test]
    fn test_multiple_paths_use_clip_data_in_order() {
        let publisher = ResultPublisher::new(".provider");
        let host = FakePlatform::new().with_file("/b.jpg").with_file("/a.jpg");

        publisher
            .publish(
                &host,
                None,
                Some(vec!["/a.jpg".into(), "/b.jpg".into()]),
            )
            .unwrap();

        match &host.calls()[0] {
            PlatformCall::SetResult(RESULT_OK, Some(intent)) => {
                assert_eq!(intent.data, None);
                assert_eq!(
                    intent.clip_items,
                    vec![
                        "content://org.altlimit.dmedia.provider/root/a.jpg".to_string(),
                        "content://org.altlimit.dmedia.provider/root/b.jpg".to_string(),
                    ]
                );
                assert_eq!(intent.flags, FLAG_GRANT_READ_URI_PERMISSION);
            }
            other => panic!("unexpected call: {:?}", other),
        }
        assert_eq!(host.finish_count(), 1);
    }

    #[test]
    fn test_resolution_failure_cancels_without_partial_grant() {
        let publisher = ResultPublisher::new(".provider");
        let host = FakePlatform::new().with_file("/a.jpg");

        let err = publisher
            .publish(
                &host,
                None,
                Some(vec!["/a.jpg".into(), "/missing.jpg".into()]),
            )
            .unwrap_err();
        assert_eq!(err.code(), "failed");
        assert!(err.to_string().starts_with("Error: "));

        assert_eq!(
            host.calls(),
            vec![
                PlatformCall::SetResult(RESULT_CANCELED, None),
                PlatformCall::Finish
            ]
        );
    }

    #[test]
    fn test_nothing_to_publish() {
        let publisher = ResultPublisher::new(".provider");
        let host = FakePlatform::new();
        assert!(!publisher.publish(&host, None, None).unwrap());
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_file_set_selection() {
        assert_eq!(
            ResultPublisher::file_set(Some("/p.jpg".into()), Some(vec![])),
            Some(vec!["/p.jpg".to_string()])
        );
        assert_eq!(
            ResultPublisher::file_set(Some("/p.jpg".into()), Some(vec!["/q.jpg".into()])),
            Some(vec!["/q.jpg".to_string()])
        );
        assert_eq!(ResultPublisher::file_set(None, Some(vec![])), None);
    }
}
