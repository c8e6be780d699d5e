//! Tests for the upload application service: size gate, handshake and
//! response classification.

#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use flare_cli::application::services::upload::{
    UploadOptions, confirm_prompt, prepare, send, upload,
};
use flare_cli::domain::error::FlareError;
use flare_cli::domain::upload::{MAX_UPLOAD_SIZE, success_message};

use crate::mocks::{CountingTransport, ScriptedPrompter};

struct Archive {
    _dir: tempfile::TempDir,
    path: PathBuf,
}

fn archive_of_size(size: u64) -> Archive {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("datadog-agent-2015-03-07-09-05-01.tar.bz2");
    let file = std::fs::File::create(&path).expect("create");
    file.set_len(size).expect("set_len");
    Archive { _dir: dir, path }
}

fn opts(case_id: Option<&'static str>, email: Option<&'static str>) -> UploadOptions<'static> {
    UploadOptions {
        dd_url: "https://app.example.test/",
        api_key: "abc123",
        hostname: "web-01",
        case_id,
        email,
        confirm: true,
        non_interactive: false,
    }
}

fn flare_error(err: &anyhow::Error) -> &FlareError {
    err.downcast_ref::<FlareError>().expect("FlareError")
}

#[tokio::test]
async fn oversized_archive_never_reaches_network_or_prompt() {
    let archive = archive_of_size(MAX_UPLOAD_SIZE + 1);
    let transport = CountingTransport::replying(200, r#"{"case_id": 1}"#);
    let prompter = ScriptedPrompter::new(true, "ops@example.com");

    let err = upload(
        &archive.path,
        &opts(None, None),
        &prompter,
        &transport,
    )
    .await
    .expect_err("must fail");

    assert!(matches!(flare_error(&err), FlareError::SizeLimitExceeded { .. }));
    assert!(err.to_string().contains("send it directly to support by mail"));
    assert_eq!(transport.call_count(), 0);
    assert_eq!(prompter.confirms.load(Ordering::SeqCst), 0);
    assert!(archive.path.exists(), "archive must be kept");
}

#[tokio::test]
async fn archive_at_the_limit_is_uploaded() {
    let archive = archive_of_size(MAX_UPLOAD_SIZE);
    let transport = CountingTransport::replying(200, r#"{"case_id": "42"}"#);

    let case_id = upload(
        &archive.path,
        &opts(Some("42"), None),
        &ScriptedPrompter::new(true, ""),
        &transport,
    )
    .await
    .expect("upload");

    assert_eq!(case_id, "42");
    assert!(success_message(&case_id).contains("42"));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn refusal_aborts_and_keeps_archive() {
    let archive = archive_of_size(10);
    let transport = CountingTransport::replying(200, r#"{"case_id": "1"}"#);

    let err = upload(
        &archive.path,
        &opts(None, Some("ops@example.com")),
        &ScriptedPrompter::new(false, ""),
        &transport,
    )
    .await
    .expect_err("must abort");

    assert!(matches!(flare_error(&err), FlareError::UserAborted { .. }));
    assert!(err.to_string().starts_with("Aborting (you can still use "));
    assert_eq!(transport.call_count(), 0);
    assert!(archive.path.exists());
}

#[tokio::test]
async fn new_case_prompts_for_lowercased_email() {
    let archive = archive_of_size(10);
    let transport = CountingTransport::replying(200, r#"{"case_id": 77}"#);
    let prompter = ScriptedPrompter::new(true, "Ops@Example.com");

    let case_id = upload(
        &archive.path,
        &opts(None, None),
        &prompter,
        &transport,
    )
    .await
    .expect("upload");

    assert_eq!(case_id, "77");
    assert_eq!(prompter.inputs.load(Ordering::SeqCst), 1);
    let (url, form, path) = transport.last_request().expect("request sent");
    assert_eq!(url, "https://app.example.test/zendesk/flare");
    assert_eq!(form.email.as_deref(), Some("ops@example.com"));
    assert_eq!(form.case_id, None);
    assert_eq!(form.api_key, "abc123");
    assert_eq!(form.hostname, "web-01");
    assert_eq!(path, archive.path);
}

#[tokio::test]
async fn existing_case_skips_email_and_targets_case_url() {
    let archive = archive_of_size(10);
    let transport = CountingTransport::replying(200, r#"{"case_id": "1234"}"#);
    let prompter = ScriptedPrompter::new(true, "unused@example.com");

    upload(
        &archive.path,
        &opts(Some("1234"), None),
        &prompter,
        &transport,
    )
    .await
    .expect("upload");

    assert_eq!(prompter.inputs.load(Ordering::SeqCst), 0);
    let (url, form, _) = transport.last_request().expect("request sent");
    assert_eq!(url, "https://app.example.test/zendesk/flare/1234");
    assert_eq!(form.email, None);
    assert_eq!(
        form.fields(),
        [("api_key", "abc123"), ("case_id", "1234"), ("hostname", "web-01")]
    );
}

#[test]
fn non_interactive_without_email_or_case_is_rejected() {
    let archive = archive_of_size(10);
    let prompter = ScriptedPrompter::new(true, "ops@example.com");
    let mut options = opts(None, None);
    options.confirm = false;
    options.non_interactive = true;

    let err = prepare(
        &archive.path,
        &options,
        &prompter,
    )
    .expect_err("must fail");

    assert!(matches!(flare_error(&err), FlareError::EmailRequired));
    assert_eq!(prompter.confirms.load(Ordering::SeqCst), 0);
    assert_eq!(prompter.inputs.load(Ordering::SeqCst), 0);
}

#[test]
fn confirmation_prompt_names_archive_path() {
    let archive = archive_of_size(10);
    let prompter = ScriptedPrompter::new(true, "");
    prepare(&archive.path, &opts(None, Some("ops@example.com")), &prompter)
        .expect("prepare");

    let expected = format!(
        "{} is going to be uploaded to Datadog. Do you want to continue",
        archive.path.display()
    );
    assert_eq!(prompter.prompts(), [expected.clone()]);
    assert_eq!(confirm_prompt(&archive.path), expected);
    assert!(!expected.contains("[Y/n]"));
}

async fn send_with_reply(status: u16, body: &str) -> anyhow::Error {
    let archive = archive_of_size(10);
    let request = prepare(
        &archive.path,
        &opts(Some("9"), None),
        &ScriptedPrompter::new(true, ""),
    )
    .expect("prepare");
    let transport = CountingTransport::replying(status, body);
    let err = send(&request, "https://app.example.test", &transport)
        .await
        .expect_err("must fail");
    assert_eq!(transport.call_count(), 1, "no retries");
    err
}

#[tokio::test]
async fn client_error_carries_raw_body() {
    let err = send_with_reply(400, "Invalid api_key").await;
    assert!(matches!(flare_error(&err), FlareError::ClientError(_)));
    assert!(err.to_string().contains("Invalid api_key"));
}

#[tokio::test]
async fn server_error_carries_raw_body() {
    let err = send_with_reply(500, "database down").await;
    assert!(matches!(flare_error(&err), FlareError::ServerError(_)));
    assert!(err.to_string().contains("database down"));
}

#[tokio::test]
async fn other_status_is_unknown_error_advising_email() {
    let err = send_with_reply(503, "maintenance").await;
    assert!(matches!(flare_error(&err), FlareError::UnknownError(_)));
    assert!(err.to_string().contains("Please contact support by email"));
}

#[tokio::test]
async fn success_without_case_id_is_unknown_error() {
    let err = send_with_reply(200, "<html>ok</html>").await;
    assert!(matches!(flare_error(&err), FlareError::UnknownError(_)));
}
