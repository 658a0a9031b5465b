// tests/controller_activation.rs

use std::error::Error;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::sleep;

use analysis_controller::errors::{ControllerError, SpawnError};
use analysis_controller::supervisor::SpawnConfig;
use analysis_controller::{Controller, ControllerSettings, Subscriptions};
use analysis_controller_test_utils::fake_client::FakeClient;
use analysis_controller_test_utils::fake_spawner::FakeSpawner;
use analysis_controller_test_utils::init_tracing;
use analysis_controller_test_utils::status::RecordingStatus;

type TestResult = Result<(), Box<dyn Error>>;

const BEGIN: &str = "texDocument/diagnosticsBegin";
const END: &str = "texDocument/diagnosticsEnd";

fn controller(spawner: &FakeSpawner, status: &RecordingStatus) -> Controller {
    controller_with(ControllerSettings::new(SpawnConfig::new("/srv/worker/")), spawner, status)
}

fn controller_with(
    settings: ControllerSettings,
    spawner: &FakeSpawner,
    status: &RecordingStatus,
) -> Controller {
    Controller::new(settings)
        .with_spawner(Arc::new(spawner.clone()))
        .with_status(status.sink())
}

#[tokio::test(start_paused = true)]
async fn activation_registers_handlers_and_starts_client() -> TestResult {
    init_tracing();
    let spawner = FakeSpawner::succeeding();
    let status = RecordingStatus::new();
    let (client, probe) = FakeClient::new();
    let mut subscriptions = Subscriptions::new();

    controller(&spawner, &status)
        .activate(client, &mut subscriptions)
        .await?;

    assert_eq!(subscriptions.len(), 1);
    assert!(probe.is_started());
    assert!(probe.has_channel());
    assert_eq!(probe.methods(), vec![BEGIN.to_string(), END.to_string()]);

    let options = probe.options().ok_or("client started without options")?;
    assert_eq!(options.name, "TeX Language Server");
    assert_eq!(options.document_selector, vec!["tex".to_string(), "latex".to_string()]);
    assert_eq!(options.configuration_section, "languageServerExample");

    assert_eq!(
        spawner.specs()[0].to_string(),
        "cargo run --manifest-path=/srv/worker/Cargo.toml"
    );
    assert_eq!(status.messages(), vec!["analysis: starting up".to_string()]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn notifications_drive_the_status_display() -> TestResult {
    init_tracing();
    let spawner = FakeSpawner::succeeding();
    let status = RecordingStatus::new();
    let (client, probe) = FakeClient::new();
    let mut subscriptions = Subscriptions::new();

    controller(&spawner, &status)
        .activate(client, &mut subscriptions)
        .await?;

    assert!(probe.notify(BEGIN));
    assert!(probe.notify_with(BEGIN, serde_json::json!({ "uri": "file:///main.tex" })));
    assert!(!probe.notify("texDocument/publishDiagnostics"));
    assert!(probe.notify(END));
    assert!(probe.notify(END));
    assert!(probe.notify(END), "unmatched end is harmless");

    assert_eq!(
        status.messages(),
        vec![
            "analysis: starting up".to_string(),
            "analysis: working".to_string(),
            "analysis: done".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn dispose_stops_client_and_spinner() -> TestResult {
    init_tracing();
    let spawner = FakeSpawner::succeeding();
    let status = RecordingStatus::new();
    let (client, probe) = FakeClient::new();
    let mut subscriptions = Subscriptions::new();

    controller(&spawner, &status)
        .activate(client, &mut subscriptions)
        .await?;

    probe.notify(BEGIN);
    sleep(Duration::from_millis(150)).await;
    assert_eq!(status.last().as_deref(), Some("analysis: working |"));

    subscriptions.dispose_all();
    let shown = status.len();

    assert!(subscriptions.is_empty());
    assert_eq!(probe.stop_calls(), 1);
    assert!(!probe.has_channel());

    sleep(Duration::from_secs(2)).await;
    probe.notify(END);
    probe.notify(BEGIN);
    assert_eq!(status.len(), shown, "nothing is shown after dispose");

    subscriptions.dispose_all();
    assert_eq!(probe.stop_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn dropping_subscriptions_disposes() -> TestResult {
    init_tracing();
    let spawner = FakeSpawner::succeeding();
    let status = RecordingStatus::new();
    let (client, probe) = FakeClient::new();

    {
        let mut subscriptions = Subscriptions::new();
        controller(&spawner, &status)
            .activate(client, &mut subscriptions)
            .await?;
    }

    assert_eq!(probe.stop_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn spawn_failure_registers_nothing() -> TestResult {
    init_tracing();
    let spawner = FakeSpawner::failing(io::ErrorKind::NotFound);
    let status = RecordingStatus::new();
    let (client, probe) = FakeClient::new();
    let mut subscriptions = Subscriptions::new();

    let result = controller(&spawner, &status)
        .activate(client, &mut subscriptions)
        .await;

    assert!(
        matches!(result, Err(ControllerError::Spawn(SpawnError::NotFound { .. }))),
        "got {result:?}"
    );
    assert!(subscriptions.is_empty());
    assert!(!probe.is_started());
    assert!(probe.methods().is_empty());
    assert_eq!(
        status.messages(),
        vec![
            "analysis: starting up".to_string(),
            "analysis: could not start".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn worker_without_channel_is_reported_once() -> TestResult {
    init_tracing();
    let spawner = FakeSpawner::without_channel();
    let status = RecordingStatus::new();
    let (client, probe) = FakeClient::new();
    let mut subscriptions = Subscriptions::new();

    let result = controller(&spawner, &status)
        .activate(client, &mut subscriptions)
        .await;

    assert!(
        matches!(
            result,
            Err(ControllerError::Spawn(SpawnError::MissingPipe { stream: "channel" }))
        ),
        "got {result:?}"
    );
    assert!(subscriptions.is_empty());
    assert!(!probe.is_started());
    assert_eq!(
        status.messages(),
        vec![
            "analysis: starting up".to_string(),
            "analysis: could not start".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn refused_handshake_releases_worker() -> TestResult {
    init_tracing();
    let spawner = FakeSpawner::succeeding();
    let status = RecordingStatus::new();
    let (client, probe) = FakeClient::refusing();
    let mut subscriptions = Subscriptions::new();

    let result = controller(&spawner, &status)
        .activate(client, &mut subscriptions)
        .await;

    assert!(matches!(result, Err(ControllerError::Client(_))), "got {result:?}");
    assert!(subscriptions.is_empty());
    assert!(!probe.is_started());

    let mut worker_side = spawner.take_worker_side().ok_or("no worker side")?;
    let mut buf = [0u8; 8];
    assert_eq!(worker_side.read(&mut buf).await?, 0, "controller side is closed");
    Ok(())
}

#[tokio::test]
async fn client_channel_reaches_the_worker() -> TestResult {
    init_tracing();
    let spawner = FakeSpawner::succeeding();
    let status = RecordingStatus::new();
    let (client, probe) = FakeClient::new();
    let mut subscriptions = Subscriptions::new();

    controller(&spawner, &status)
        .activate(client, &mut subscriptions)
        .await?;

    let mut channel = probe.take_channel().ok_or("client has no channel")?;
    let mut worker_side = spawner.take_worker_side().ok_or("no worker side")?;

    channel.input.write_all(b"hello").await?;
    let mut request = [0u8; 5];
    worker_side.read_exact(&mut request).await?;
    assert_eq!(&request, b"hello");

    worker_side.write_all(b"world").await?;
    let mut reply = [0u8; 5];
    channel.output.read_exact(&mut reply).await?;
    assert_eq!(&reply, b"world");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn custom_namespace_and_label_are_used() -> TestResult {
    init_tracing();
    let spawner = FakeSpawner::succeeding();
    let status = RecordingStatus::new();
    let (client, probe) = FakeClient::new();
    let mut subscriptions = Subscriptions::new();

    let mut settings = ControllerSettings::new(SpawnConfig::new("/srv/worker/"));
    settings.namespace = "workspace".to_string();
    settings.progress.label = "lint".to_string();

    controller_with(settings, &spawner, &status)
        .activate(client, &mut subscriptions)
        .await?;

    assert_eq!(
        probe.methods(),
        vec![
            "workspace/diagnosticsBegin".to_string(),
            "workspace/diagnosticsEnd".to_string(),
        ]
    );
    assert!(!probe.notify(BEGIN));
    assert!(probe.notify("workspace/diagnosticsBegin"));
    assert_eq!(status.last().as_deref(), Some("lint: working"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn controllers_do_not_share_progress() -> TestResult {
    init_tracing();
    let first_status = RecordingStatus::new();
    let second_status = RecordingStatus::new();
    let (first_client, first_probe) = FakeClient::new();
    let (second_client, _second_probe) = FakeClient::new();
    let mut subscriptions = Subscriptions::new();

    controller(&FakeSpawner::succeeding(), &first_status)
        .activate(first_client, &mut subscriptions)
        .await?;
    controller(&FakeSpawner::succeeding(), &second_status)
        .activate(second_client, &mut subscriptions)
        .await?;

    first_probe.notify(BEGIN);

    assert_eq!(first_status.last().as_deref(), Some("analysis: working"));
    assert_eq!(
        second_status.messages(),
        vec!["analysis: starting up".to_string()]
    );
    assert_eq!(subscriptions.len(), 2);
    Ok(())
}
